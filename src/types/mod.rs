pub mod listing;
pub mod observation;
pub mod order;
pub mod order_depth;
pub mod trade;
pub mod trading_state;

/// Exchange product symbol, e.g. `AMETHYSTS`.
pub type Symbol = String;

/// Integer exchange price tick.
pub type Price = i64;

/// Signed quantity. Positive buys, negative sells.
pub type Quantity = i64;
