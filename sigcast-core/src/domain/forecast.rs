//! Forecast window — externally supplied multi-step close predictions.
//!
//! The forecast oracle (a trained model, out of scope here) produces an
//! ordered sequence of predicted future closes for any origin bar. The
//! engine consumes the window as a value and discards it per decision.

use serde::{Deserialize, Serialize};

/// Predicted future closes rooted at an origin bar index.
///
/// Entries are `None` where the oracle had insufficient history at forecast
/// time. Gaps are explicit — a missing prediction is never encoded as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub origin: usize,
    pub predicted: Vec<Option<f64>>,
}

impl ForecastWindow {
    pub fn new(origin: usize, predicted: Vec<Option<f64>>) -> Self {
        Self { origin, predicted }
    }

    pub fn len(&self) -> usize {
        self.predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }

    /// True when every entry is present.
    pub fn is_complete(&self) -> bool {
        self.predicted.iter().all(|p| p.is_some())
    }

    /// The window as plain values. Only valid when `is_complete()`.
    pub fn values(&self) -> Vec<f64> {
        self.predicted.iter().filter_map(|p| *p).collect()
    }
}

/// Accessor for forecast windows at arbitrary origin indices.
pub trait ForecastSource {
    /// Return the window of up to `horizon` predictions rooted at `origin`.
    ///
    /// A window shorter than `horizon` (e.g. near the end of the series) is
    /// returned as-is; the trigger treats it as insufficient.
    fn window(&self, origin: usize, horizon: usize) -> ForecastWindow;
}

/// Forecast source backed by a per-bar prediction series aligned to the bar
/// series: the window at origin `i` is entries `i..i+horizon`.
#[derive(Debug, Clone, Default)]
pub struct SeriesForecast {
    values: Vec<Option<f64>>,
}

impl SeriesForecast {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Build from a gapless value series.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ForecastSource for SeriesForecast {
    fn window(&self, origin: usize, horizon: usize) -> ForecastWindow {
        let end = (origin + horizon).min(self.values.len());
        let predicted = if origin < self.values.len() {
            self.values[origin..end].to_vec()
        } else {
            Vec::new()
        };
        ForecastWindow::new(origin, predicted)
    }
}
