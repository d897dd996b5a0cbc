//! sigcast core — forecast-gated signal backtest engine.
//!
//! This crate contains the heart of the engine:
//! - Domain types (bars with indicator snapshots, forecast windows, trade
//!   records)
//! - Signal gate (regime/volatility pass-fail classifier)
//! - Directional trigger (forecast scoring + oscillator confirmation)
//! - Single-position lifecycle state machine with pluggable exit policies
//! - Replay driver and run statistics
//!
//! The replay is strictly forward: a decision at bar `i` reads only bars up
//! to `i` and the forecast window rooted at `i`.

pub mod domain;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod replay;
pub mod stats;
pub mod trigger;

pub use domain::{Bar, ForecastSource, ForecastWindow, IndicatorSet, SeriesForecast, Side, TradeKind, TradeRecord};
pub use error::ConfigError;
pub use gate::{GateDecision, GatePolicy};
pub use lifecycle::{ClosedTrade, ExitCheck, ExitPolicy, Position, PositionBook};
pub use replay::{run, BacktestConfig};
pub use stats::{BacktestResult, StatsAggregator};
pub use trigger::{ConfirmationConfig, Trigger, TriggerAction, TriggerDecision};
