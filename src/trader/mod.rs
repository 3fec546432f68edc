pub mod trader;

pub use trader::{BookRequirement, Trader, TraderOutput};
