//! Parameter sweep utilities for grid search over engine configs.

use rayon::prelude::*;
use sigcast_core::{Bar, ExitPolicy, GatePolicy, SeriesForecast};

use crate::run_config::RunConfig;
use crate::runner::{run_single, RunError, RunOutcome};

/// Parameter grid specification for the take-profit strategy family.
///
/// The cross product of all axes is swept; each combination becomes one
/// named [`RunConfig`] derived from the base config.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    /// Holding periods to test.
    pub holding_periods: Vec<usize>,
    /// Take-profit thresholds to test.
    pub tp_thresholds: Vec<f64>,
    /// Gate ATR thresholds to test.
    pub atr_thresholds: Vec<f64>,
}

impl ParamGrid {
    /// A small default grid around the stock parameters.
    pub fn default_grid() -> Self {
        Self {
            holding_periods: vec![3, 5, 10],
            tp_thresholds: vec![0.1, 0.5, 1.0],
            atr_thresholds: vec![0.3, 0.5, 1.0],
        }
    }

    /// Total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.holding_periods.len() * self.tp_thresholds.len() * self.atr_thresholds.len()
    }

    /// Generate all configurations, labelled by their parameters.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let lookback = match base.engine.exit {
            ExitPolicy::FixedLookbackTp { lookback, .. } => lookback,
            _ => 3,
        };

        let mut configs = Vec::with_capacity(self.size());
        for &holding_period in &self.holding_periods {
            for &threshold in &self.tp_thresholds {
                for &atr_threshold in &self.atr_thresholds {
                    let mut config = base.clone();
                    config.name = format!(
                        "{}/hp{holding_period}-tp{threshold}-atr{atr_threshold}",
                        base.name
                    );
                    config.engine.holding_period = holding_period;
                    config.engine.gate = GatePolicy::Level { atr_threshold };
                    config.engine.exit = ExitPolicy::FixedLookbackTp {
                        lookback,
                        threshold,
                        threshold_atr_mult: None,
                    };
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Run every configuration in parallel. Results come back in config order.
///
/// Each run reads only the shared immutable bar/forecast slices and owns its
/// own engine state, so runs are independent.
pub fn run_sweep(
    configs: &[RunConfig],
    bars: &[Bar],
    forecast: &SeriesForecast,
) -> Result<Vec<RunOutcome>, RunError> {
    configs
        .par_iter()
        .map(|config| run_single(config, bars, forecast))
        .collect()
}

/// Serial reference implementation, used to cross-check the parallel path.
pub fn run_sweep_serial(
    configs: &[RunConfig],
    bars: &[Bar],
    forecast: &SeriesForecast,
) -> Result<Vec<RunOutcome>, RunError> {
    configs
        .iter()
        .map(|config| run_single(config, bars, forecast))
        .collect()
}
