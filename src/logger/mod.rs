pub mod tick_logger;
