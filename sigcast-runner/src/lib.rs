//! sigcast runner — orchestration on top of `sigcast-core`.
//!
//! This crate provides:
//! - CSV loading for bar and forecast series
//! - Named, content-addressed run configurations (TOML)
//! - Single-run execution with derived metrics
//! - Parallel parameter sweeps
//! - Text summaries and trade-log CSV export

pub mod loader;
pub mod metrics;
pub mod report;
pub mod run_config;
pub mod runner;
pub mod sweep;

pub use loader::{load_bars, load_forecast, LoadError};
pub use metrics::RunMetrics;
pub use report::{text_summary, write_trade_log};
pub use run_config::{RunConfig, RunConfigError, RunId};
pub use runner::{run_single, RunError, RunOutcome};
pub use sweep::{run_sweep, run_sweep_serial, ParamGrid};
