use serde::{Deserialize, Serialize};

use crate::types::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub symbol: Symbol,
    pub product: String,
    pub denomination: String,
}

impl Listing {
    pub fn seashells(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            product: symbol.to_string(),
            denomination: "SEASHELLS".to_string(),
        }
    }
}
