use crate::types::{Quantity, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductContext {
    pub symbol: Symbol,
    /// Absolute position cap enforced by the exchange.
    pub limit: Quantity,
}

impl ProductContext {
    pub fn new(symbol: &str, limit: Quantity) -> Self {
        Self {
            symbol: symbol.to_string(),
            limit,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn limit(&self) -> Quantity {
        self.limit
    }
}

pub trait WithContext {
    fn ctx(&self) -> &ProductContext;
}
