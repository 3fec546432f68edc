use serde::{Deserialize, Serialize};

use crate::types::{Price, Quantity, Symbol};

/// A print on the tape. Counterparty names are empty when the feed is anonymised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    pub buyer: String,
    pub seller: String,
    pub timestamp: i64,
}

impl Trade {
    pub fn new(
        symbol: &str,
        price: Price,
        quantity: Quantity,
        buyer: &str,
        seller: &str,
        timestamp: i64,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            quantity,
            buyer: buyer.to_string(),
            seller: seller.to_string(),
            timestamp,
        }
    }
}
