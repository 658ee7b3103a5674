//! CLI command implementations.

pub mod config;
pub mod curves;
pub mod latency;
pub mod process;
