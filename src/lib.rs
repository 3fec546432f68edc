pub mod backtest;
pub mod logger;
pub mod optimization;
pub mod scenario;
pub mod signals;
pub mod strategy;
pub mod trader;
pub mod types;
