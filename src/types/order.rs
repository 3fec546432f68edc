use serde::{Deserialize, Serialize};

use crate::types::{Price, Quantity, Symbol};

/// Limit order as submitted to the exchange. Sign of `quantity` carries the side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
}

impl Order {
    pub fn new(symbol: &str, price: Price, quantity: Quantity) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            quantity,
        }
    }
}
