use std::collections::BTreeMap;
use std::mem;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    backtest::data::{DayData, OBSERVED_PRODUCT, PriceRow},
    logger::tick_logger::TickLogger,
    scenario::scenario::Scenario,
    trader::Trader,
    types::{
        Price, Quantity, Symbol, order::Order, order_depth::OrderDepth, trade::Trade,
        trading_state::TradingState,
    },
};

/// Counterparty name our own fills are booked under.
pub const SUBMISSION: &str = "SUBMISSION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktestConfig {
    /// Let orders that miss the book fill against same-timestamp tape prints.
    pub match_trades: bool,
    /// Keep every rendered log line in the result.
    pub collect_logs: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            match_trades: true,
            collect_logs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub day: i32,
    pub timestamp: i64,
    pub product: Symbol,
    pub mid_price: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestResult {
    pub round: u32,
    pub day: i32,
    pub activity: Vec<ActivityRow>,
    pub fills: Vec<Trade>,
    pub log_lines: Vec<String>,
}

impl BacktestResult {
    fn pnls<'a>(&'a self, product: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.activity
            .iter()
            .filter(move |row| row.product == product)
            .map(|row| row.pnl)
    }

    pub fn products(&self) -> Vec<Symbol> {
        let mut products: Vec<Symbol> =
            self.activity.iter().map(|row| row.product.clone()).collect();
        products.sort();
        products.dedup();
        products
    }

    /// Last marked P&L of `product`, zero when it never traded.
    pub fn final_pnl(&self, product: &str) -> f64 {
        self.pnls(product).last().unwrap_or(0.0)
    }

    pub fn min_pnl(&self, product: &str) -> f64 {
        self.pnls(product).reduce(f64::min).unwrap_or(0.0)
    }

    pub fn max_pnl(&self, product: &str) -> f64 {
        self.pnls(product).reduce(f64::max).unwrap_or(0.0)
    }

    pub fn total_pnl(&self) -> f64 {
        self.products()
            .iter()
            .map(|product| self.final_pnl(product))
            .sum()
    }
}

/// Positions and cash per product.
#[derive(Debug, Clone, Default)]
struct Ledger {
    position: BTreeMap<Symbol, Quantity>,
    cash: BTreeMap<Symbol, f64>,
}

impl Ledger {
    fn position(&self, symbol: &str) -> Quantity {
        self.position.get(symbol).copied().unwrap_or(0)
    }

    fn fill(&mut self, symbol: &str, price: f64, quantity: Quantity) {
        *self.position.entry(symbol.to_string()).or_default() += quantity;
        *self.cash.entry(symbol.to_string()).or_default() -= price * quantity as f64;
    }

    fn mark(&self, symbol: &str, mid_price: f64) -> f64 {
        self.cash.get(symbol).copied().unwrap_or(0.0) + self.position(symbol) as f64 * mid_price
    }
}

/// Whether filling every order in full keeps the position inside the limit.
pub fn within_limit(position: Quantity, orders: &[Order], limit: Quantity) -> bool {
    let buys: Quantity = orders.iter().filter(|o| o.quantity > 0).map(|o| o.quantity).sum();
    let sells: Quantity = orders.iter().filter(|o| o.quantity < 0).map(|o| -o.quantity).sum();
    position + buys <= limit && position - sells >= -limit
}

/// Replays one recorded day through a fresh `Trader`.
pub struct Backtester<'a> {
    scenario: &'a Scenario,
    config: BacktestConfig,
}

impl<'a> Backtester<'a> {
    pub fn new(scenario: &'a Scenario, config: BacktestConfig) -> Self {
        Self { scenario, config }
    }

    pub fn run(&self, data: &DayData) -> Result<BacktestResult> {
        let mut rows_by_timestamp: BTreeMap<i64, Vec<&PriceRow>> = BTreeMap::new();
        for row in &data.prices {
            rows_by_timestamp.entry(row.timestamp).or_default().push(row);
        }
        let mut tape: BTreeMap<i64, Vec<Trade>> = BTreeMap::new();
        for trade in &data.trades {
            tape.entry(trade.timestamp).or_default().push(trade.clone());
        }

        let mut trader = Trader::new(self.scenario);
        let mut logger = TickLogger::default();
        let mut ledger = Ledger::default();
        let mut result = BacktestResult {
            round: data.round,
            day: data.day,
            ..Default::default()
        };

        let mut trader_data = String::new();
        let mut own_trades: BTreeMap<Symbol, Vec<Trade>> = BTreeMap::new();
        let mut previous_timestamp = None;

        for (&timestamp, rows) in &rows_by_timestamp {
            let mut state =
                TradingState::new(timestamp).with_trader_data(mem::take(&mut trader_data));
            for row in rows {
                state = state.with_order_depth(&row.product, row.order_depth());
            }
            state.own_trades = mem::take(&mut own_trades);
            if let Some(previous) = previous_timestamp.and_then(|ts| tape.get(&ts)) {
                for trade in previous {
                    state
                        .market_trades
                        .entry(trade.symbol.clone())
                        .or_default()
                        .push(trade.clone());
                }
            }
            state.position = ledger.position.clone();
            if let Some(observation) = data.observations.get(&timestamp) {
                state
                    .observations
                    .conversion_observations
                    .insert(OBSERVED_PRODUCT.to_string(), *observation);
            }

            let output = trader.run(&state, &mut logger);
            let line = logger.flush(
                &state,
                &output.orders,
                output.conversions,
                &output.trader_data,
            );
            if self.config.collect_logs {
                result.log_lines.push(line);
            }

            // Conversions settle before the book is crossed.
            self.convert(&state, output.conversions, &mut ledger);

            let mut same_tick_tape = tape.get(&timestamp).cloned().unwrap_or_default();
            for (symbol, orders) in &output.orders {
                let fills = self.execute(&state, symbol, orders, &mut same_tick_tape, &mut ledger);
                if !fills.is_empty() {
                    result.fills.extend(fills.iter().cloned());
                    own_trades.insert(symbol.clone(), fills);
                }
            }

            for row in rows {
                result.activity.push(ActivityRow {
                    day: row.day,
                    timestamp,
                    product: row.product.clone(),
                    mid_price: row.mid_price,
                    pnl: ledger.mark(&row.product, row.mid_price),
                });
            }

            trader_data = output.trader_data;
            previous_timestamp = Some(timestamp);
        }

        debug!(
            round = data.round,
            day = data.day,
            ticks = rows_by_timestamp.len(),
            fills = result.fills.len(),
            "backtest finished"
        );

        Ok(result)
    }

    fn execute(
        &self,
        state: &TradingState,
        symbol: &str,
        orders: &[Order],
        tape: &mut [Trade],
        ledger: &mut Ledger,
    ) -> Vec<Trade> {
        let limit = self.scenario.limit(symbol).unwrap_or(0);
        let position = ledger.position(symbol);
        if !within_limit(position, orders, limit) {
            warn!(
                %symbol,
                position,
                limit,
                "orders would breach the position limit, rejecting all"
            );
            return Vec::new();
        }

        let mut book = state.order_depth(symbol).cloned().unwrap_or_default();
        let mut fills = Vec::new();

        for order in orders {
            let mut remaining = order.quantity.abs();
            let buying = order.quantity > 0;

            for (price, available) in crossing_levels(&book, order) {
                let quantity = remaining.min(available);
                take_level(&mut book, buying, price, quantity);
                let fill = self.book_fill(state.timestamp, symbol, price, quantity, buying, ledger);
                fills.push(fill);
                remaining -= quantity;
                if remaining == 0 {
                    break;
                }
            }

            if !self.config.match_trades {
                continue;
            }

            for trade in tape.iter_mut() {
                if remaining == 0 {
                    break;
                }
                let crosses = if buying {
                    trade.price <= order.price
                } else {
                    trade.price >= order.price
                };
                if trade.symbol != symbol || trade.quantity <= 0 || !crosses {
                    continue;
                }

                let quantity = remaining.min(trade.quantity);
                trade.quantity -= quantity;
                remaining -= quantity;

                let signed = if buying { quantity } else { -quantity };
                ledger.fill(symbol, order.price as f64, signed);
                let (buyer, seller) = if buying {
                    (SUBMISSION, trade.seller.as_str())
                } else {
                    (trade.buyer.as_str(), SUBMISSION)
                };
                fills.push(Trade::new(
                    symbol,
                    order.price,
                    quantity,
                    buyer,
                    seller,
                    state.timestamp,
                ));
            }
        }

        fills
    }

    fn book_fill(
        &self,
        timestamp: i64,
        symbol: &str,
        price: Price,
        quantity: Quantity,
        buying: bool,
        ledger: &mut Ledger,
    ) -> Trade {
        if buying {
            ledger.fill(symbol, price as f64, quantity);
            Trade::new(symbol, price, quantity, SUBMISSION, "", timestamp)
        } else {
            ledger.fill(symbol, price as f64, -quantity);
            Trade::new(symbol, price, quantity, "", SUBMISSION, timestamp)
        }
    }

    /// Conversions only ever move an observed product towards flat.
    fn convert(&self, state: &TradingState, conversions: i64, ledger: &mut Ledger) {
        if conversions == 0 {
            return;
        }
        let Some((symbol, observation)) = state.observations.conversion_observations.iter().next()
        else {
            warn!(conversions, "conversion requested without an observation");
            return;
        };

        let position = ledger.position(symbol);
        if position == 0
            || conversions.signum() == position.signum()
            || conversions.abs() > position.abs()
        {
            warn!(%symbol, position, conversions, "conversion rejected");
            return;
        }

        let price = if conversions > 0 {
            observation.import_cost()
        } else {
            observation.export_proceeds()
        };
        ledger.fill(symbol, price, conversions);
    }
}

/// Opposite-side levels an order crosses, best first, with unsigned volume.
fn crossing_levels(book: &OrderDepth, order: &Order) -> Vec<(Price, Quantity)> {
    if order.quantity > 0 {
        book.asks()
            .take_while(|(price, _)| *price <= order.price)
            .map(|(price, volume)| (price, -volume))
            .collect()
    } else {
        book.bids()
            .take_while(|(price, _)| *price >= order.price)
            .collect()
    }
}

fn take_level(book: &mut OrderDepth, buying: bool, price: Price, quantity: Quantity) {
    let side = if buying { &mut book.sell_orders } else { &mut book.buy_orders };
    if let Some(volume) = side.get_mut(&price) {
        *volume -= volume.signum() * quantity;
        if *volume == 0 {
            side.remove(&price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        scenario::{scenario::ScenarioEntry, strategies::StrategyKind},
        trader::BookRequirement,
    };

    fn make_scenario() -> Scenario {
        Scenario::new(
            "amethysts",
            vec![ScenarioEntry::new(
                "AMETHYSTS",
                20,
                StrategyKind::FixedMarketMaker { true_value: 10_000 },
            )],
            BookRequirement::TwoSided,
        )
    }

    fn make_row(timestamp: i64) -> PriceRow {
        PriceRow {
            day: 0,
            timestamp,
            product: "AMETHYSTS".to_string(),
            bids: vec![(9_996, 10)],
            asks: vec![(9_998, 5), (10_004, 10)],
            mid_price: 10_000.0,
            profit_and_loss: 0.0,
        }
    }

    fn make_day(trades: Vec<Trade>) -> DayData {
        DayData {
            round: 1,
            day: 0,
            prices: vec![make_row(0)],
            trades,
            observations: BTreeMap::new(),
        }
    }

    #[test]
    fn test_book_fills_mark_to_mid() {
        let scenario = make_scenario();
        let config = BacktestConfig { match_trades: false, collect_logs: true };

        let result = Backtester::new(&scenario, config).run(&make_day(vec![])).unwrap();

        assert_eq!(result.fills, vec![Trade::new("AMETHYSTS", 9_998, 5, SUBMISSION, "", 0)]);
        assert_eq!(result.final_pnl("AMETHYSTS"), 10.0);
        assert_eq!(result.log_lines.len(), 1);
    }

    #[test]
    fn test_tape_fills_at_order_price() {
        let scenario = make_scenario();
        let tape = vec![Trade::new("AMETHYSTS", 9_997, 4, "Remy", "Vinnie", 0)];

        let result = Backtester::new(&scenario, BacktestConfig::default())
            .run(&make_day(tape))
            .unwrap();

        // 5 @ 9998 from the book, 4 @ 9997 from the tape
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.fills[1], Trade::new("AMETHYSTS", 9_997, 4, SUBMISSION, "Vinnie", 0));
        assert_eq!(result.final_pnl("AMETHYSTS"), 22.0);
    }

    #[test]
    fn test_positions_carry_across_ticks() {
        let scenario = make_scenario();
        let mut day = make_day(vec![]);
        day.prices.push(make_row(100));

        let result = Backtester::new(&scenario, BacktestConfig::default()).run(&day).unwrap();

        // Second tick buys the refreshed 5 lot again.
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.activity.len(), 2);
        assert_eq!(result.min_pnl("AMETHYSTS"), 10.0);
        assert_eq!(result.max_pnl("AMETHYSTS"), 20.0);
        assert_eq!(result.total_pnl(), 20.0);
    }

    #[test]
    fn test_conversions_flatten_before_orders() {
        let scenario = Scenario::new(
            "orchids",
            vec![ScenarioEntry::new("ORCHIDS", 100, StrategyKind::ConversionArbitrage)],
            BookRequirement::Present,
        );
        let observation = crate::types::observation::ConversionObservation {
            bid_price: 1_100.0,
            ask_price: 1_101.5,
            transport_fees: 0.9,
            export_tariff: 9.5,
            import_tariff: -5.0,
            sunlight: 2_500.0,
            humidity: 79.0,
        };
        let row = |timestamp| PriceRow {
            day: 0,
            timestamp,
            product: "ORCHIDS".to_string(),
            bids: vec![(1_100, 30)],
            asks: vec![(1_104, 30)],
            mid_price: 1_102.0,
            profit_and_loss: 0.0,
        };
        let day = DayData {
            round: 2,
            day: 0,
            prices: vec![row(0), row(100)],
            trades: vec![],
            observations: BTreeMap::from([(0, observation), (100, observation)]),
        };

        let result = Backtester::new(&scenario, BacktestConfig::default()).run(&day).unwrap();

        // Each tick sells 30 into the 1100 bid; the second also buys the first 30 back abroad.
        assert_eq!(result.fills.len(), 2);
        let expected = 2.0 * 30.0 * 1_100.0 - 30.0 * 1_097.4 - 30.0 * 1_102.0;
        assert!((result.final_pnl("ORCHIDS") - expected).abs() < 1e-6);
    }

    #[test]
    fn test_within_limit() {
        let orders = vec![Order::new("ROSES", 100, 30), Order::new("ROSES", 101, -50)];
        assert!(within_limit(20, &orders, 60));
        assert!(!within_limit(31, &orders, 60));
        assert!(!within_limit(-11, &orders, 60));
    }

    #[test]
    fn test_missing_product_reports_zero() {
        let result = BacktestResult::default();
        assert_eq!(result.final_pnl("ROSES"), 0.0);
        assert_eq!(result.min_pnl("ROSES"), 0.0);
    }
}
