pub mod config;
pub mod error;
pub mod telemetry;
pub mod transactions;
pub mod types;
pub mod units;
