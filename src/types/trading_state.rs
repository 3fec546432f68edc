use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    Quantity, Symbol, listing::Listing, observation::Observation, order_depth::OrderDepth,
    trade::Trade,
};

/// Everything the exchange tells us at the start of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingState {
    /// Opaque blob returned by the trader on the previous tick.
    pub trader_data: String,
    pub timestamp: i64,
    pub listings: BTreeMap<Symbol, Listing>,
    pub order_depths: BTreeMap<Symbol, OrderDepth>,
    /// Our own fills since the previous tick.
    pub own_trades: BTreeMap<Symbol, Vec<Trade>>,
    /// Third-party prints since the previous tick.
    pub market_trades: BTreeMap<Symbol, Vec<Trade>>,
    pub position: BTreeMap<Symbol, Quantity>,
    pub observations: Observation,
}

impl TradingState {
    /// Exchange clock advance between consecutive ticks.
    pub const TIMESTAMP_STEP: i64 = 100;

    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn position(&self, symbol: &str) -> Quantity {
        self.position.get(symbol).copied().unwrap_or(0)
    }

    pub fn order_depth(&self, symbol: &str) -> Option<&OrderDepth> {
        self.order_depths.get(symbol)
    }

    pub fn market_trades(&self, symbol: &str) -> &[Trade] {
        self.market_trades
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Tape prints for `symbol` stamped with the previous tick's timestamp.
    pub fn previous_tick_trades<'a>(&'a self, symbol: &str) -> impl Iterator<Item = &'a Trade> {
        let previous = self.timestamp - Self::TIMESTAMP_STEP;
        self.market_trades(symbol)
            .iter()
            .filter(move |trade| trade.timestamp == previous)
    }

    /// Popular-level mid price of `symbol`, if its book exists and has both sides.
    pub fn mid_price(&self, symbol: &str) -> Option<f64> {
        self.order_depth(symbol)?.mid_price()
    }

    pub fn with_trader_data(mut self, trader_data: impl Into<String>) -> Self {
        self.trader_data = trader_data.into();
        self
    }

    pub fn with_order_depth(mut self, symbol: &str, depth: OrderDepth) -> Self {
        self.listings
            .insert(symbol.to_string(), Listing::seashells(symbol));
        self.order_depths.insert(symbol.to_string(), depth);
        self
    }

    pub fn with_position(mut self, symbol: &str, position: Quantity) -> Self {
        self.position.insert(symbol.to_string(), position);
        self
    }

    pub fn with_market_trade(mut self, trade: Trade) -> Self {
        self.market_trades
            .entry(trade.symbol.clone())
            .or_default()
            .push(trade);
        self
    }
}
