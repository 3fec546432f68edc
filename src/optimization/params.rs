use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use serde_json::{Map, Value};

use crate::{
    scenario::scenario::{BASKET_PRODUCTS, POSITION_LIMITS, Scenario},
    strategy::strategies::counterparty::TradePattern,
};

/// (buyer, seller) pairings seen on the named tape.
pub const OBSERVED_PAIRS: &[(&str, &str)] = &[
    ("Adam", "Remy"),
    ("Adam", "Rhianna"),
    ("Adam", "Ruby"),
    ("Adam", "Valentina"),
    ("Adam", "Vinnie"),
    ("Adam", "Vladimir"),
    ("Amelia", "Adam"),
    ("Amelia", "Remy"),
    ("Amelia", "Rhianna"),
    ("Amelia", "Ruby"),
    ("Amelia", "Valentina"),
    ("Amelia", "Vinnie"),
    ("Amelia", "Vladimir"),
    ("Raj", "Vinnie"),
    ("Remy", "Adam"),
    ("Remy", "Amelia"),
    ("Remy", "Remy"),
    ("Remy", "Rhianna"),
    ("Remy", "Ruby"),
    ("Remy", "Valentina"),
    ("Remy", "Vinnie"),
    ("Remy", "Vladimir"),
    ("Rhianna", "Adam"),
    ("Rhianna", "Amelia"),
    ("Rhianna", "Remy"),
    ("Rhianna", "Ruby"),
    ("Rhianna", "Valentina"),
    ("Rhianna", "Vinnie"),
    ("Rhianna", "Vladimir"),
    ("Ruby", "Adam"),
    ("Ruby", "Amelia"),
    ("Ruby", "Remy"),
    ("Ruby", "Rhianna"),
    ("Ruby", "Valentina"),
    ("Ruby", "Vinnie"),
    ("Ruby", "Vladimir"),
    ("Valentina", "Adam"),
    ("Valentina", "Amelia"),
    ("Valentina", "Remy"),
    ("Valentina", "Rhianna"),
    ("Valentina", "Ruby"),
    ("Valentina", "Valentina"),
    ("Valentina", "Vinnie"),
    ("Valentina", "Vladimir"),
    ("Vinnie", "Adam"),
    ("Vinnie", "Amelia"),
    ("Vinnie", "Raj"),
    ("Vinnie", "Remy"),
    ("Vinnie", "Rhianna"),
    ("Vinnie", "Ruby"),
    ("Vinnie", "Valentina"),
    ("Vinnie", "Vinnie"),
    ("Vinnie", "Vladimir"),
    ("Vladimir", "Adam"),
    ("Vladimir", "Amelia"),
    ("Vladimir", "Remy"),
    ("Vladimir", "Rhianna"),
    ("Vladimir", "Ruby"),
    ("Vladimir", "Valentina"),
    ("Vladimir", "Vinnie"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepKind {
    #[clap(name = "basket-thresholds")]
    BasketThresholds,
    #[clap(name = "counterparty-pairs")]
    CounterpartyPairs,
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BasketThresholds => write!(f, "basket-thresholds"),
            Self::CounterpartyPairs => write!(f, "counterparty-pairs"),
        }
    }
}

impl FromStr for SweepKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basket-thresholds" | "basket" => Ok(Self::BasketThresholds),
            "counterparty-pairs" | "counterparty" => Ok(Self::CounterpartyPairs),
            other => Err(anyhow!("unknown sweep kind: {other}")),
        }
    }
}

impl SweepKind {
    /// Every parameter combination, in output order.
    pub fn grid(self) -> Vec<SweepParams> {
        match self {
            Self::BasketThresholds => (100..=600)
                .step_by(5)
                .flat_map(|long| {
                    (long + 5..=600)
                        .step_by(5)
                        .map(move |short| SweepParams::BasketThresholds { long, short })
                })
                .collect(),
            Self::CounterpartyPairs => OBSERVED_PAIRS
                .iter()
                .flat_map(|(buyer1, seller1)| {
                    OBSERVED_PAIRS.iter().map(move |(buyer2, seller2)| {
                        SweepParams::CounterpartyPairs {
                            buyer1: buyer1.to_string(),
                            seller1: seller1.to_string(),
                            buyer2: buyer2.to_string(),
                            seller2: seller2.to_string(),
                        }
                    })
                })
                .collect(),
        }
    }

    /// Rounds and days each combination is backtested on.
    pub fn days(self) -> Vec<(u32, Vec<i32>)> {
        match self {
            Self::BasketThresholds => vec![(3, vec![0, 1, 2])],
            Self::CounterpartyPairs => {
                vec![(1, vec![-2, -1, 0]), (3, vec![0, 1, 2]), (4, vec![1, 2, 3])]
            }
        }
    }

    /// Products summarised in each record.
    pub fn products(self) -> Vec<&'static str> {
        match self {
            Self::BasketThresholds => BASKET_PRODUCTS.to_vec(),
            Self::CounterpartyPairs => POSITION_LIMITS.iter().map(|(symbol, _)| *symbol).collect(),
        }
    }

    /// Record key prefix of one backtested day.
    pub fn day_key(self, round: u32, day: i32) -> String {
        if self.days().len() > 1 {
            format!("round{round}_day{day}")
        } else {
            format!("day{day}")
        }
    }
}

/// One point of a sweep grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepParams {
    BasketThresholds {
        long: i64,
        short: i64,
    },
    CounterpartyPairs {
        buyer1: String,
        seller1: String,
        buyer2: String,
        seller2: String,
    },
}

impl SweepParams {
    pub fn scenario(&self) -> Scenario {
        match self {
            Self::BasketThresholds { long, short } => {
                Scenario::basket_thresholds(*long as f64, *short as f64)
            }
            Self::CounterpartyPairs {
                buyer1,
                seller1,
                buyer2,
                seller2,
            } => Scenario::counterparty_pairs(
                TradePattern::exact(buyer1, seller1),
                TradePattern::exact(buyer2, seller2),
            ),
        }
    }

    /// Parameter values as they lead each output record.
    pub fn record_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::BasketThresholds { long, short } => {
                fields.insert("long_threshold".into(), Value::from(*long));
                fields.insert("short_threshold".into(), Value::from(*short));
            }
            Self::CounterpartyPairs {
                buyer1,
                seller1,
                buyer2,
                seller2,
            } => {
                fields.insert("buyer1".into(), Value::from(buyer1.as_str()));
                fields.insert("seller1".into(), Value::from(seller1.as_str()));
                fields.insert("buyer2".into(), Value::from(buyer2.as_str()));
                fields.insert("seller2".into(), Value::from(seller2.as_str()));
            }
        }
        fields
    }
}
