pub mod market_making;
pub mod product_context;
pub mod signal_strategy;
pub mod strategies;
pub mod strategy;
pub mod strategy_helpers;

pub use strategy::{OrderSink, SkipReason, Strategy, StrategyOutput};
