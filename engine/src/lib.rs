// Engine library root
// Price table reconciliation, RSI computation and the batch jobs that tie them to a
// market data source and a reporting sink.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod services;
pub mod sink;
pub mod sources;

pub use error::EngineError;
