pub mod params;
pub mod sweep;
pub mod sweep_config;
