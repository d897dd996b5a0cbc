//! Single-run orchestration: engine run plus derived metrics.

use serde::{Deserialize, Serialize};
use sigcast_core::{run, BacktestResult, Bar, ConfigError, SeriesForecast};
use thiserror::Error;

use crate::metrics::RunMetrics;
use crate::run_config::{RunConfig, RunId};

/// Errors from executing a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A completed run: config identity, engine result, derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub config: RunConfig,
    pub result: BacktestResult,
    pub metrics: RunMetrics,
}

/// Execute one configured run over in-memory data.
pub fn run_single(
    config: &RunConfig,
    bars: &[Bar],
    forecast: &SeriesForecast,
) -> Result<RunOutcome, RunError> {
    let result = run(bars, forecast, &config.engine)?;
    let metrics = RunMetrics::compute(&result);
    Ok(RunOutcome {
        run_id: config.run_id(),
        config: config.clone(),
        result,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sigcast_core::IndicatorSet;

    fn make_bars(n: usize) -> Vec<Bar> {
        let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin();
                let mut indicators = IndicatorSet::empty();
                indicators.sma_20 = close;
                indicators.sma_50 = 100.0 + 0.05 * i as f64;
                indicators.atr_14 = 1.0;
                indicators.rsi_14 = 40.0;
                indicators.macd = 1.0;
                indicators.macd_signal = 0.5;
                Bar {
                    index: i,
                    date: base_date + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                    volume: 1000,
                    indicators,
                }
            })
            .collect()
    }

    #[test]
    fn run_single_produces_consistent_outcome() {
        let bars = make_bars(60);
        let forecast = SeriesForecast::from_values(bars.iter().map(|b| b.close * 1.001).collect());
        let config = RunConfig::default();

        let outcome = run_single(&config, &bars, &forecast).unwrap();
        assert_eq!(outcome.run_id, config.run_id());
        assert_eq!(
            outcome.result.total_trades,
            outcome.result.win_trades + outcome.result.loss_trades + outcome.result.flat_trades
        );
        assert!(outcome.metrics.exposure >= 0.0 && outcome.metrics.exposure <= 1.0);
    }

    #[test]
    fn invalid_config_is_reported() {
        let bars = make_bars(10);
        let forecast = SeriesForecast::from_values(vec![100.0; 10]);
        let mut config = RunConfig::default();
        config.engine.holding_period = 0;
        let err = run_single(&config, &bars, &forecast).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::ZeroHoldingPeriod)));
    }
}
