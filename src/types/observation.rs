use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Symbol;

/// External-market quote used when converting inventory off-book.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionObservation {
    pub bid_price: f64,
    pub ask_price: f64,
    pub transport_fees: f64,
    pub export_tariff: f64,
    pub import_tariff: f64,
    pub sunlight: f64,
    pub humidity: f64,
}

impl ConversionObservation {
    /// All-in cost of acquiring one unit on the external market.
    pub fn import_cost(&self) -> f64 {
        self.ask_price + self.transport_fees + self.import_tariff
    }

    /// All-in proceeds of selling one unit on the external market.
    pub fn export_proceeds(&self) -> f64 {
        self.bid_price - self.transport_fees - self.export_tariff
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub plain_value_observations: BTreeMap<Symbol, i64>,
    pub conversion_observations: BTreeMap<Symbol, ConversionObservation>,
}

impl Observation {
    pub fn conversion(&self, symbol: &str) -> Option<&ConversionObservation> {
        self.conversion_observations.get(symbol)
    }
}
