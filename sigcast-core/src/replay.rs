//! Replay driver — walks the bar series once, strictly forward.
//!
//! One decision per bar: while flat, gate then trigger; while a position is
//! open, only the exit policy runs. The loop never revisits an index, and a
//! decision at bar `i` reads only `bars[..=i]` and the forecast window
//! rooted at `i`. Entries stop once fewer than `holding_period` bars remain,
//! but an already-open position still settles at its deadline.

use crate::domain::{Bar, ForecastSource, TradeKind, TradeRecord};
use crate::error::ConfigError;
use crate::gate::GatePolicy;
use crate::lifecycle::{ExitCheck, ExitPolicy, PositionBook};
use crate::stats::{BacktestResult, StatsAggregator};
use crate::trigger::{ConfirmationConfig, Trigger};
use serde::{Deserialize, Serialize};

/// Full parameterization of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub gate: GatePolicy,
    pub confirmation: ConfirmationConfig,
    pub exit: ExitPolicy,
    /// Maximum bars a position may stay open before the forced close.
    pub holding_period: usize,
    /// Bars of forecast requested from the source at each decision.
    pub forecast_horizon: usize,
    /// Cooperative early termination: stop after visiting this many bars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_after: Option<usize>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            gate: GatePolicy::Level { atr_threshold: 0.5 },
            confirmation: ConfirmationConfig::default(),
            exit: ExitPolicy::FixedLookbackTp {
                lookback: 3,
                threshold: 0.1,
                threshold_atr_mult: None,
            },
            holding_period: 3,
            forecast_horizon: 5,
            stop_after: None,
        }
    }
}

impl BacktestConfig {
    /// Reject unusable parameter combinations before any bar is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.holding_period == 0 {
            return Err(ConfigError::ZeroHoldingPeriod);
        }
        if self.forecast_horizon < 2 {
            return Err(ConfigError::ShortForecastHorizon(self.forecast_horizon));
        }
        match &self.gate {
            GatePolicy::Level { atr_threshold } => {
                Self::positive("atr_threshold", *atr_threshold)?;
            }
            GatePolicy::Slope { floor, atr_ratio } => {
                Self::positive("slope floor", *floor)?;
                Self::positive("atr_ratio", *atr_ratio)?;
            }
        }
        match &self.exit {
            ExitPolicy::FixedLookbackTp {
                lookback,
                threshold,
                threshold_atr_mult,
            } => {
                if *lookback == 0 {
                    return Err(ConfigError::ZeroLookback);
                }
                match threshold_atr_mult {
                    Some(mult) => Self::positive("threshold_atr_mult", *mult)?,
                    None => Self::positive("take-profit threshold", *threshold)?,
                }
            }
            ExitPolicy::TrailingStop { trail_atr_mult } => {
                Self::positive("trail_atr_mult", *trail_atr_mult)?;
            }
            ExitPolicy::OscillatorExit {
                overbought,
                oversold,
            } => {
                if overbought <= oversold {
                    return Err(ConfigError::InvertedOscillatorBands);
                }
            }
        }
        Ok(())
    }

    fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NonPositiveThreshold { name, value })
        }
    }
}

/// Run one backtest over `bars` with forecasts drawn from `forecast`.
pub fn run(
    bars: &[Bar],
    forecast: &dyn ForecastSource,
    config: &BacktestConfig,
) -> Result<BacktestResult, ConfigError> {
    config.validate()?;
    if bars.is_empty() {
        return Err(ConfigError::EmptyBars);
    }
    for (position, bar) in bars.iter().enumerate() {
        if bar.index != position {
            return Err(ConfigError::NonContiguousBars {
                position,
                index: bar.index,
            });
        }
    }

    let n = bars.len();
    // Past this index a fresh entry could not reach its deadline in-series.
    let entry_cutoff = n.saturating_sub(config.holding_period);
    let trigger = Trigger::new(config.confirmation.clone());
    let mut book = PositionBook::new();
    let mut stats = StatsAggregator::new();
    let mut records: Vec<TradeRecord> = Vec::new();
    let mut bars_processed = 0usize;

    for i in 0..n {
        if let Some(stop) = config.stop_after {
            if bars_processed >= stop {
                break;
            }
        }
        let bar = &bars[i];

        if book.is_open() {
            bars_processed += 1;
            match book.evaluate_exit(bars, i, &config.exit) {
                ExitCheck::Hold => {}
                ExitCheck::Deferred(reason) => {
                    records.push(skip(bar, reason));
                }
                ExitCheck::Closed(trade) => {
                    stats.record(&trade);
                    records.push(TradeRecord {
                        bar_index: i,
                        date: bar.date,
                        kind: TradeKind::Exit,
                        side: Some(trade.side),
                        price: trade.exit_price,
                        profit: Some(trade.profit),
                        reason: trade.reason,
                    });
                }
            }
            continue;
        }

        if i >= entry_cutoff {
            break;
        }
        bars_processed += 1;

        let gate_decision = config.gate.evaluate(&bars[..=i]);
        if !gate_decision.passed {
            records.push(skip(bar, gate_decision.reason));
            continue;
        }

        let window = forecast.window(i, config.forecast_horizon);
        let decision = trigger.evaluate(&window, bars, i);
        match decision.action.side() {
            None => records.push(skip(bar, decision.reason)),
            // Both gate policies fail a bar whose ATR-14 is NaN, so
            // `atr_at_entry` is always valid here.
            Some(side) => {
                book.open_position(side, bar, config.holding_period);
                records.push(TradeRecord {
                    bar_index: i,
                    date: bar.date,
                    kind: TradeKind::Entry,
                    side: Some(side),
                    price: bar.close,
                    profit: None,
                    reason: decision.reason,
                });
            }
        }
    }

    Ok(stats.finalize(bars_processed, records))
}

fn skip(bar: &Bar, reason: String) -> TradeRecord {
    TradeRecord {
        bar_index: bar.index,
        date: bar.date,
        kind: TradeKind::Skip,
        side: None,
        price: bar.close,
        profit: None,
        reason,
    }
}
