//! Domain types for sigcast.

pub mod bar;
pub mod forecast;
pub mod trade;

pub use bar::{Bar, IndicatorSet};
pub use forecast::{ForecastSource, ForecastWindow, SeriesForecast};
pub use trade::{Side, TradeKind, TradeRecord};
