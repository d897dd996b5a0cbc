//! Configuration and input validation errors.

use thiserror::Error;

/// Rejections raised by [`crate::replay::BacktestConfig::validate`] and by
/// the replay driver's input checks before the first bar is processed.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("holding period must be at least 1 bar")]
    ZeroHoldingPeriod,

    #[error("forecast horizon {0} is shorter than 2 (need adjacent pairs to score)")]
    ShortForecastHorizon(usize),

    #[error("{name} must be positive, got {value}")]
    NonPositiveThreshold { name: &'static str, value: f64 },

    #[error("take-profit lookback must be at least 1 bar")]
    ZeroLookback,

    #[error("oscillator exit bands inverted: overbought must exceed oversold")]
    InvertedOscillatorBands,

    #[error("bar series is empty")]
    EmptyBars,

    #[error("bar series not contiguous: expected index {position}, found {index}")]
    NonContiguousBars { position: usize, index: usize },
}
