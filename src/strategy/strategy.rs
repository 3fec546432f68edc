use std::fmt;

use anyhow::Result;
use serde_json::Value;

use crate::{
    strategy::product_context::WithContext,
    types::{Price, Quantity, Symbol, order::Order, trading_state::TradingState},
};

/// Why a strategy sat out a tick. Not an error: the next tick may well trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingBook(Symbol),
    OneSidedBook(Symbol),
    MissingTopOfBook,
    MissingFairValue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBook(symbol) => write!(f, "no order book for {symbol}"),
            Self::OneSidedBook(symbol) => write!(f, "one-sided order book for {symbol}"),
            Self::MissingTopOfBook => write!(f, "missing top of book"),
            Self::MissingFairValue => write!(f, "fair value unavailable"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyOutput {
    pub orders: Vec<Order>,
    pub conversions: i64,
}

/// Per-tick accumulator a strategy writes its decisions into.
#[derive(Debug, Clone)]
pub struct OrderSink {
    symbol: Symbol,
    orders: Vec<Order>,
    conversions: i64,
}

impl OrderSink {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            orders: Vec::new(),
            conversions: 0,
        }
    }

    pub fn buy(&mut self, price: Price, quantity: Quantity) {
        self.push(price, quantity);
    }

    pub fn sell(&mut self, price: Price, quantity: Quantity) {
        self.push(price, -quantity);
    }

    pub fn convert(&mut self, amount: i64) {
        self.conversions += amount;
    }

    pub fn into_output(self) -> StrategyOutput {
        StrategyOutput {
            orders: self.orders,
            conversions: self.conversions,
        }
    }

    fn push(&mut self, price: Price, quantity: Quantity) {
        /* NOTE: the exchange rejects empty orders, so they never leave the sink */
        if quantity == 0 {
            return;
        }
        self.orders.push(Order::new(&self.symbol, price, quantity));
    }
}

pub trait Strategy: WithContext {
    fn act(&mut self, state: &TradingState, sink: &mut OrderSink) -> Result<(), SkipReason>;

    /// Runs one tick against fresh accumulators. A skipped tick emits nothing.
    fn run(&mut self, state: &TradingState) -> Result<StrategyOutput, SkipReason> {
        let mut sink = OrderSink::new(self.ctx().symbol());
        self.act(state, &mut sink)?;
        Ok(sink.into_output())
    }

    fn save(&self) -> Value {
        Value::Null
    }

    fn load(&mut self, _state: Value) -> Result<()> {
        Ok(())
    }
}
