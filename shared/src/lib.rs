pub mod models;
pub mod utils;

// Plain data types and sheet formatting helpers used by the engine crate.
// Nothing in here performs I/O.
