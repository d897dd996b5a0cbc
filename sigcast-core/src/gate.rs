//! Signal gate — pass/fail classifier over a bar window.
//!
//! The gate decides whether market conditions (trend regime, volatility
//! level) allow the directional trigger to run at all. Two interchangeable
//! policies, selected by configuration. Pure function of the window; an
//! unavailable indicator yields a failed decision with a diagnostic reason,
//! never a panic.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Outcome of a gate evaluation. Produced fresh per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub passed: bool,
    pub reason: String,
}

impl GateDecision {
    fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
        }
    }
}

/// Gate policy, selected by configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatePolicy {
    /// Passes when the SMA-50 is rising bar-over-bar and ATR-14 exceeds a
    /// fixed threshold.
    Level { atr_threshold: f64 },

    /// Passes when the 5-bar SMA-20 move exceeds a dynamic threshold of
    /// `max(floor, atr_14 * atr_ratio)` in either direction.
    Slope { floor: f64, atr_ratio: f64 },
}

impl GatePolicy {
    /// Minimum window length this policy can evaluate.
    pub fn min_bars(&self) -> usize {
        match self {
            GatePolicy::Level { .. } => 2,
            GatePolicy::Slope { .. } => 6,
        }
    }

    /// Evaluate the gate over `window`, where the last bar is the decision
    /// bar. The window must only contain bars up to the decision index.
    pub fn evaluate(&self, window: &[Bar]) -> GateDecision {
        if window.len() < self.min_bars() {
            return GateDecision::fail("insufficient history");
        }

        match self {
            GatePolicy::Level { atr_threshold } => {
                let today = &window[window.len() - 1].indicators;
                let yesterday = &window[window.len() - 2].indicators;

                if today.sma_50.is_nan() || yesterday.sma_50.is_nan() {
                    return GateDecision::fail("sma-50 unavailable");
                }
                if today.atr_14.is_nan() {
                    return GateDecision::fail("atr-14 unavailable");
                }

                let trend_up = today.sma_50 > yesterday.sma_50;
                let vol_active = today.atr_14 > *atr_threshold;

                match (trend_up, vol_active) {
                    (true, true) => GateDecision::pass("sma-50 rising and atr above threshold"),
                    (false, _) => GateDecision::fail("sma-50 slope not rising"),
                    (true, false) => GateDecision::fail("atr below threshold"),
                }
            }
            GatePolicy::Slope { floor, atr_ratio } => {
                let today = &window[window.len() - 1].indicators;
                let back5 = &window[window.len() - 6].indicators;

                if today.sma_20.is_nan() || back5.sma_20.is_nan() {
                    return GateDecision::fail("sma-20 unavailable");
                }
                if today.atr_14.is_nan() {
                    return GateDecision::fail("atr-14 unavailable");
                }

                let sma_diff = today.sma_20 - back5.sma_20;
                let threshold = floor.max(today.atr_14 * atr_ratio);

                if sma_diff.abs() > threshold {
                    GateDecision::pass("sma-20 slope exceeds dynamic threshold")
                } else {
                    GateDecision::fail("sma-20 slope within dynamic threshold")
                }
            }
        }
    }
}
