//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed set of per-bar technical indicator values.
///
/// The indicator provider computes these ahead of the run; the engine only
/// reads them. A `NaN` value marks a per-bar gap (e.g. not enough history at
/// the start of the series) — never a silent zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_20: f64,
    pub sma_50: f64,
    pub rsi_14: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub atr_14: f64,
    pub adx_14: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub psar: f64,
}

impl IndicatorSet {
    /// All fields unavailable. Used for bars inside an indicator's warmup.
    pub fn empty() -> Self {
        Self {
            sma_20: f64::NAN,
            sma_50: f64::NAN,
            rsi_14: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
            atr_14: f64::NAN,
            adx_14: f64::NAN,
            plus_di: f64::NAN,
            minus_di: f64::NAN,
            psar: f64::NAN,
        }
    }

    /// MACD histogram: MACD minus its signal line.
    pub fn macd_diff(&self) -> f64 {
        self.macd - self.macd_signal
    }
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// OHLCV bar plus indicator values for one historical tick.
///
/// `index` is the bar's position in the series — a gapless total order the
/// replay driver relies on. Bars are immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub index: usize,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub indicators: IndicatorSet,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, range brackets open and close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
    }
}
