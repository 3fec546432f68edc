pub mod black_scholes;
pub mod liquidation_window;
