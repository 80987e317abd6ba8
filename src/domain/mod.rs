//! Core domain types and pipeline stages.

pub mod ohlc;
pub mod ewm;
pub mod params;
pub mod volatility;
pub mod forecast;
pub mod mean_reversion;
pub mod regime;
pub mod sizing;
pub mod breaker;
pub mod buffer;
pub mod backtest;
pub mod pipeline;
pub mod metrics;
pub mod config_validation;
pub mod error;
