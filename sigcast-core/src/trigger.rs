//! Directional trigger — classifies forecast + indicators into a trade
//! decision.
//!
//! Runs only after the gate passes. Scores the forecast window for
//! directional agreement, falls back to the SMA-20 slope on a flat forecast,
//! and optionally demands oscillator confirmation. Every decision carries a
//! reason naming the sub-condition that drove it — the audit trail must be
//! able to explain why a period produced no trades.

use crate::domain::{Bar, ForecastWindow, Side};
use serde::{Deserialize, Serialize};

/// What the trigger wants to do at this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerAction {
    Buy,
    Sell,
    NoTrade,
}

impl TriggerAction {
    pub fn side(&self) -> Option<Side> {
        match self {
            TriggerAction::Buy => Some(Side::Buy),
            TriggerAction::Sell => Some(Side::Sell),
            TriggerAction::NoTrade => None,
        }
    }
}

/// Outcome of a trigger evaluation. Derived purely from the forecast window
/// and bar indicators; no hidden state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDecision {
    pub action: TriggerAction,
    pub reason: String,
}

impl TriggerDecision {
    fn no_trade(reason: impl Into<String>) -> Self {
        Self {
            action: TriggerAction::NoTrade,
            reason: reason.into(),
        }
    }
}

/// Oscillator confirmation settings.
///
/// Thresholds are configuration, not hard-coded rules, so strict and relaxed
/// variants can coexist. The defaults mirror the classic midline split:
/// a Buy wants RSI below 50 with MACD above its signal line, a Sell the
/// mirror image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    pub enabled: bool,
    /// Buy requires rsi_14 strictly below this bound.
    pub rsi_buy_max: f64,
    /// Sell requires rsi_14 strictly above this bound.
    pub rsi_sell_min: f64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rsi_buy_max: 50.0,
            rsi_sell_min: 50.0,
        }
    }
}

/// The directional trigger.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    pub confirmation: ConfirmationConfig,
}

impl Trigger {
    pub fn new(confirmation: ConfirmationConfig) -> Self {
        Self { confirmation }
    }

    /// Evaluate the trigger at `bars[index]` with the forecast window rooted
    /// there. Only bars up to `index` may be read.
    pub fn evaluate(
        &self,
        forecast: &ForecastWindow,
        bars: &[Bar],
        index: usize,
    ) -> TriggerDecision {
        if forecast.len() < 2 || !forecast.is_complete() {
            return TriggerDecision::no_trade("insufficient forecast");
        }

        let predicted = forecast.values();
        let up_score = predicted.windows(2).filter(|p| p[1] > p[0]).count();
        let down_score = predicted.windows(2).filter(|p| p[1] < p[0]).count();

        let (action, reason) = if up_score == 0 && down_score == 0 {
            match self.sma_fallback(bars, index) {
                Some(decision) => decision,
                None => return TriggerDecision::no_trade("flat forecast and flat SMA"),
            }
        } else if up_score > down_score {
            (
                TriggerAction::Buy,
                format!("forecast majority up ({up_score} vs {down_score})"),
            )
        } else if down_score > up_score {
            (
                TriggerAction::Sell,
                format!("forecast majority down ({down_score} vs {up_score})"),
            )
        } else {
            return TriggerDecision::no_trade(format!(
                "forecast direction tied ({up_score} vs {down_score})"
            ));
        };

        if self.confirmation.enabled {
            if let Some(veto) = self.confirm(action, bars, index) {
                return veto;
            }
        }

        TriggerDecision { action, reason }
    }

    /// Flat-forecast fallback: sign of the SMA-20 move over the last 5 bars.
    fn sma_fallback(&self, bars: &[Bar], index: usize) -> Option<(TriggerAction, String)> {
        if index < 5 {
            return None;
        }
        let today = bars[index].indicators.sma_20;
        let back5 = bars[index - 5].indicators.sma_20;
        if today.is_nan() || back5.is_nan() {
            return None;
        }
        let slope = today - back5;
        if slope > 0.0 {
            Some((TriggerAction::Buy, "flat forecast, sma-20 slope up".into()))
        } else if slope < 0.0 {
            Some((TriggerAction::Sell, "flat forecast, sma-20 slope down".into()))
        } else {
            None
        }
    }

    /// Oscillator confirmation. Returns a veto decision when the candidate
    /// direction fails it, `None` when confirmed.
    ///
    /// The MACD histogram is averaged over the current and previous bar to
    /// damp single-bar noise.
    fn confirm(&self, action: TriggerAction, bars: &[Bar], index: usize) -> Option<TriggerDecision> {
        let ind = &bars[index].indicators;
        let rsi = ind.rsi_14;
        let macd_diff = if index >= 1 {
            let prev = bars[index - 1].indicators.macd_diff();
            (ind.macd_diff() + prev) / 2.0
        } else {
            ind.macd_diff()
        };

        if rsi.is_nan() || macd_diff.is_nan() {
            return Some(TriggerDecision::no_trade(
                "confirmation indicators unavailable",
            ));
        }

        match action {
            TriggerAction::Buy => {
                if rsi >= self.confirmation.rsi_buy_max {
                    Some(TriggerDecision::no_trade(format!(
                        "buy vetoed: rsi {rsi:.1} not below {:.1}",
                        self.confirmation.rsi_buy_max
                    )))
                } else if macd_diff <= 0.0 {
                    Some(TriggerDecision::no_trade("buy vetoed: macd below signal"))
                } else {
                    None
                }
            }
            TriggerAction::Sell => {
                if rsi <= self.confirmation.rsi_sell_min {
                    Some(TriggerDecision::no_trade(format!(
                        "sell vetoed: rsi {rsi:.1} not above {:.1}",
                        self.confirmation.rsi_sell_min
                    )))
                } else if macd_diff >= 0.0 {
                    Some(TriggerDecision::no_trade("sell vetoed: macd above signal"))
                } else {
                    None
                }
            }
            TriggerAction::NoTrade => None,
        }
    }
}
