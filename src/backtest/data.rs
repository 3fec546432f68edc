use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::types::{
    Price, Quantity, Symbol, observation::ConversionObservation, order_depth::OrderDepth,
    trade::Trade,
};

/// Product whose conversion observations ship in a separate file.
pub const OBSERVED_PRODUCT: &str = "ORCHIDS";

const TRADE_FILE_SUFFIXES: &[&str] = &["wn", "nn"];

/// One row of a prices file: a product's top three levels at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub day: i32,
    pub timestamp: i64,
    pub product: Symbol,
    pub bids: Vec<(Price, Quantity)>,
    /// Volumes as published, positive.
    pub asks: Vec<(Price, Quantity)>,
    pub mid_price: f64,
    pub profit_and_loss: f64,
}

impl PriceRow {
    pub fn order_depth(&self) -> OrderDepth {
        OrderDepth::new(
            self.bids.iter().copied(),
            self.asks.iter().map(|(price, volume)| (*price, -volume)),
        )
    }
}

/// Everything recorded for one round and day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayData {
    pub round: u32,
    pub day: i32,
    pub prices: Vec<PriceRow>,
    pub trades: Vec<Trade>,
    /// Keyed by timestamp.
    pub observations: BTreeMap<i64, ConversionObservation>,
}

impl DayData {
    pub fn products(&self) -> Vec<Symbol> {
        let mut products: Vec<Symbol> = self.prices.iter().map(|row| row.product.clone()).collect();
        products.sort();
        products.dedup();
        products
    }
}

/// Reads the `round{r}/` CSV layout of the historical data set.
#[derive(Debug, Clone)]
pub struct DataReader {
    root: PathBuf,
}

impl DataReader {
    pub const ROOT_ENV: &'static str = "PROSPERITY_DATA_ROOT";
    pub const DEFAULT_ROOT: &'static str = "data";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `PROSPERITY_DATA_ROOT`, else `fallback`.
    pub fn from_env_or(fallback: impl Into<PathBuf>) -> Self {
        match env::var(Self::ROOT_ENV) {
            Ok(root) if !root.is_empty() => Self::new(root),
            _ => Self::new(fallback),
        }
    }

    fn round_dir(&self, round: u32) -> PathBuf {
        self.root.join(format!("round{round}"))
    }

    pub fn prices_path(&self, round: u32, day: i32) -> PathBuf {
        self.round_dir(round)
            .join(format!("prices_round_{round}_day_{day}.csv"))
    }

    pub fn observations_path(&self, round: u32, day: i32) -> PathBuf {
        self.round_dir(round)
            .join(format!("observations_round_{round}_day_{day}.csv"))
    }

    /// First existing trades file, preferring the one with counterparty names.
    pub fn trades_path(&self, round: u32, day: i32) -> Result<PathBuf> {
        TRADE_FILE_SUFFIXES
            .iter()
            .map(|suffix| {
                self.round_dir(round)
                    .join(format!("trades_round_{round}_day_{day}_{suffix}.csv"))
            })
            .find(|path| path.is_file())
            .ok_or_else(|| anyhow!("Cannot find trades data for round {round} day {day}"))
    }

    pub fn read_prices(&self, round: u32, day: i32) -> Result<Vec<PriceRow>> {
        let path = self.prices_path(round, day);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read prices {}", path.display()))?;
        parse_prices(&raw).with_context(|| format!("failed to parse prices {}", path.display()))
    }

    pub fn read_trades(&self, round: u32, day: i32) -> Result<Vec<Trade>> {
        let path = self.trades_path(round, day)?;
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read trades {}", path.display()))?;
        parse_trades(&raw).with_context(|| format!("failed to parse trades {}", path.display()))
    }

    /// Conversion observations, empty for rounds that have none.
    pub fn read_observations(
        &self,
        round: u32,
        day: i32,
    ) -> Result<BTreeMap<i64, ConversionObservation>> {
        let path = self.observations_path(round, day);
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read observations {}", path.display()))?;
        parse_observations(&raw)
            .with_context(|| format!("failed to parse observations {}", path.display()))
    }

    pub fn read_day(&self, round: u32, day: i32) -> Result<DayData> {
        Ok(DayData {
            round,
            day,
            prices: self.read_prices(round, day)?,
            trades: self.read_trades(round, day)?,
            observations: self.read_observations(round, day)?,
        })
    }
}

/// Header-indexed view over a delimited text file.
struct Table<'a> {
    columns: HashMap<&'a str, usize>,
    rows: Vec<Vec<&'a str>>,
}

impl<'a> Table<'a> {
    fn parse(raw: &'a str) -> Result<Self> {
        let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
        let header = lines.next().ok_or_else(|| anyhow!("file is empty"))?;
        let separator = if header.contains(';') { ';' } else { ',' };

        let columns = header
            .split(separator)
            .enumerate()
            .map(|(index, name)| (name.trim(), index))
            .collect();
        let rows = lines
            .map(|line| line.split(separator).map(str::trim).collect())
            .collect();

        Ok(Self { columns, rows })
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("missing column {name}"))
    }

    fn cell<'r>(row: &'r [&'a str], index: usize) -> &'a str {
        row.get(index).copied().unwrap_or("")
    }
}

fn parse_number(cell: &str, column: &str) -> Result<f64> {
    cell.parse::<f64>()
        .with_context(|| format!("invalid {column} value {cell:?}"))
}

fn parse_integer(cell: &str, column: &str) -> Result<i64> {
    Ok(parse_number(cell, column)?.round() as i64)
}

fn parse_optional_integer(cell: &str, column: &str) -> Result<Option<i64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    parse_integer(cell, column).map(Some)
}

fn parse_levels(table: &Table, row: &[&str], side: &str) -> Result<Vec<(Price, Quantity)>> {
    let mut levels = Vec::new();
    for level in 1..=3 {
        let price_column = format!("{side}_price_{level}");
        let volume_column = format!("{side}_volume_{level}");
        let (Ok(price_index), Ok(volume_index)) =
            (table.index(&price_column), table.index(&volume_column))
        else {
            break;
        };

        let price = parse_optional_integer(Table::cell(row, price_index), &price_column)?;
        let volume = parse_optional_integer(Table::cell(row, volume_index), &volume_column)?;
        if let (Some(price), Some(volume)) = (price, volume) {
            levels.push((price, volume.abs()));
        }
    }
    Ok(levels)
}

pub fn parse_prices(raw: &str) -> Result<Vec<PriceRow>> {
    let table = Table::parse(raw)?;
    let day = table.index("day")?;
    let timestamp = table.index("timestamp")?;
    let product = table.index("product")?;
    let mid_price = table.index("mid_price")?;
    let profit_and_loss = table.index("profit_and_loss").ok();

    table
        .rows
        .iter()
        .map(|row| {
            Ok(PriceRow {
                day: parse_integer(Table::cell(row, day), "day")? as i32,
                timestamp: parse_integer(Table::cell(row, timestamp), "timestamp")?,
                product: Table::cell(row, product).to_string(),
                bids: parse_levels(&table, row, "bid")?,
                asks: parse_levels(&table, row, "ask")?,
                mid_price: parse_number(Table::cell(row, mid_price), "mid_price")?,
                profit_and_loss: match profit_and_loss {
                    Some(index) if !Table::cell(row, index).is_empty() => {
                        parse_number(Table::cell(row, index), "profit_and_loss")?
                    }
                    _ => 0.0,
                },
            })
        })
        .collect()
}

pub fn parse_trades(raw: &str) -> Result<Vec<Trade>> {
    let table = Table::parse(raw)?;
    let timestamp = table.index("timestamp")?;
    let buyer = table.index("buyer")?;
    let seller = table.index("seller")?;
    let symbol = table.index("symbol")?;
    let price = table.index("price")?;
    let quantity = table.index("quantity")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(Trade {
                symbol: Table::cell(row, symbol).to_string(),
                price: parse_integer(Table::cell(row, price), "price")?,
                quantity: parse_integer(Table::cell(row, quantity), "quantity")?,
                buyer: Table::cell(row, buyer).to_string(),
                seller: Table::cell(row, seller).to_string(),
                timestamp: parse_integer(Table::cell(row, timestamp), "timestamp")?,
            })
        })
        .collect()
}

pub fn parse_observations(raw: &str) -> Result<BTreeMap<i64, ConversionObservation>> {
    let table = Table::parse(raw)?;
    let column = |name: &str| table.index(name);
    let timestamp = column("timestamp")?;
    let bid_price = column("bidPrice")?;
    let ask_price = column("askPrice")?;
    let transport_fees = column("transportFees")?;
    let export_tariff = column("exportTariff")?;
    let import_tariff = column("importTariff")?;
    let sunlight = column("sunlight")?;
    let humidity = column("humidity")?;

    table
        .rows
        .iter()
        .map(|row| {
            let number = |index: usize, name: &str| parse_number(Table::cell(row, index), name);
            Ok((
                parse_integer(Table::cell(row, timestamp), "timestamp")?,
                ConversionObservation {
                    bid_price: number(bid_price, "bidPrice")?,
                    ask_price: number(ask_price, "askPrice")?,
                    transport_fees: number(transport_fees, "transportFees")?,
                    export_tariff: number(export_tariff, "exportTariff")?,
                    import_tariff: number(import_tariff, "importTariff")?,
                    sunlight: number(sunlight, "sunlight")?,
                    humidity: number(humidity, "humidity")?,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const PRICES: &str = "\
day;timestamp;product;bid_price_1;bid_volume_1;bid_price_2;bid_volume_2;bid_price_3;bid_volume_3;ask_price_1;ask_volume_1;ask_price_2;ask_volume_2;ask_price_3;ask_volume_3;mid_price;profit_and_loss
0;0;ROSES;14499;72;;;;;14501;72;;;;;14500.0;0.0
0;0;CHOCOLATE;7999;111;7998;20;;;8001;111;8002;3;;;8000.0;0.0
";

    const TRADES: &str = "\
timestamp;buyer;seller;symbol;currency;price;quantity
0;Vinnie;Rhianna;ROSES;SEASHELLS;14500.0;3
100;Remy;Vladimir;CHOCOLATE;SEASHELLS;8000.0;11
";

    fn write_round(dir: &TempDir, round: u32, files: &[(&str, &str)]) {
        let round_dir = dir.path().join(format!("round{round}"));
        fs::create_dir_all(&round_dir).unwrap();
        for (name, contents) in files {
            fs::write(round_dir.join(name), contents).unwrap();
        }
    }

    #[test]
    fn test_parse_prices_levels() {
        let rows = parse_prices(PRICES).unwrap();
        assert_eq!(rows.len(), 2);

        let chocolate = &rows[1];
        assert_eq!(chocolate.product, "CHOCOLATE");
        assert_eq!(chocolate.bids, vec![(7_999, 111), (7_998, 20)]);
        assert_eq!(chocolate.asks, vec![(8_001, 111), (8_002, 3)]);

        let depth = chocolate.order_depth();
        assert_eq!(depth.sell_orders.get(&8_002), Some(&-3));
        assert_eq!(depth.mid_price(), Some(8_000.0));
    }

    #[test]
    fn test_parse_trades() {
        let trades = parse_trades(TRADES).unwrap();
        assert_eq!(trades[0], Trade::new("ROSES", 14_500, 3, "Vinnie", "Rhianna", 0));
        assert_eq!(trades[1].timestamp, 100);
    }

    #[test]
    fn test_parse_observations_with_commas() {
        let raw = "timestamp,bidPrice,askPrice,transportFees,exportTariff,importTariff,sunlight,humidity\n\
                   0,1094.0,1095.5,0.9,9.5,-5.0,2500.0,79.0\n";
        let observations = parse_observations(raw).unwrap();
        assert!((observations[&0].import_cost() - 1_091.4).abs() < 1e-9);
    }

    #[test]
    fn test_trades_fall_back_to_anonymous_file() {
        let dir = TempDir::new().unwrap();
        write_round(
            &dir,
            3,
            &[
                ("prices_round_3_day_1.csv", PRICES),
                ("trades_round_3_day_1_nn.csv", TRADES),
            ],
        );
        let reader = DataReader::new(dir.path());

        let path = reader.trades_path(3, 1).unwrap();
        assert!(path.ends_with("trades_round_3_day_1_nn.csv"));

        let day = reader.read_day(3, 1).unwrap();
        assert_eq!(day.trades.len(), 2);
        assert!(day.observations.is_empty());
        assert_eq!(day.products(), vec!["CHOCOLATE".to_string(), "ROSES".to_string()]);
    }

    #[test]
    fn test_named_trades_preferred() {
        let dir = TempDir::new().unwrap();
        write_round(
            &dir,
            5,
            &[
                ("trades_round_5_day_2_wn.csv", TRADES),
                ("trades_round_5_day_2_nn.csv", ""),
            ],
        );
        let path = DataReader::new(dir.path()).trades_path(5, 2).unwrap();
        assert!(path.ends_with("trades_round_5_day_2_wn.csv"));
    }

    #[test]
    fn test_missing_files_are_errors() {
        let dir = TempDir::new().unwrap();
        let reader = DataReader::new(dir.path());

        let error = reader.read_trades(4, 3).unwrap_err();
        assert_eq!(error.to_string(), "Cannot find trades data for round 4 day 3");

        let error = reader.read_prices(4, 3).unwrap_err();
        assert!(format!("{error:#}").contains("prices_round_4_day_3.csv"));
    }
}
