pub mod basket_spread;
pub mod conversion_arbitrage;
pub mod counterparty;
pub mod option_mispricing;
pub mod price_threshold;
pub mod repeat_counterparty;
