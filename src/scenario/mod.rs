pub mod rounds;
pub mod scenario;
pub mod strategies;
