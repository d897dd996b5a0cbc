//! Run metrics — pure functions over a finished backtest result.
//!
//! Everything here is derived from the audit trail and the headline stats;
//! no dependency on the loader or the runner.

use serde::{Deserialize, Serialize};
use sigcast_core::{BacktestResult, TradeRecord};

/// Derived metrics for one run, computed after the replay finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Sum of realized trade P&Ls.
    pub net_profit: f64,
    /// Longest run of consecutive winning trades.
    pub max_consecutive_wins: usize,
    /// Longest run of consecutive losing trades.
    pub max_consecutive_losses: usize,
    /// Fraction of trades closed by the exit policy rather than the
    /// deadline. Zero when there were no trades.
    pub tp_hit_rate: f64,
    /// Fraction of processed bars spent with a position open.
    pub exposure: f64,
}

impl RunMetrics {
    pub fn compute(result: &BacktestResult) -> Self {
        Self {
            net_profit: result.gross_profit - result.gross_loss,
            max_consecutive_wins: max_streak(&result.records, |p| p > 0.0),
            max_consecutive_losses: max_streak(&result.records, |p| p < 0.0),
            tp_hit_rate: if result.total_trades > 0 {
                result.tp_hit_count as f64 / result.total_trades as f64
            } else {
                0.0
            },
            exposure: exposure(&result.records, result.bars_processed),
        }
    }
}

/// Longest run of consecutive exits whose profit satisfies `keep`.
fn max_streak(records: &[TradeRecord], keep: impl Fn(f64) -> bool) -> usize {
    let mut best = 0usize;
    let mut current = 0usize;
    for record in records.iter().filter(|r| r.is_exit()) {
        let profit = record.profit.unwrap_or(0.0);
        if keep(profit) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Bars spent in a position as a fraction of bars processed.
///
/// A trade entered at bar e and exited at bar x occupies bars e+1..=x (the
/// entry bar itself is a decision bar, not a holding bar).
fn exposure(records: &[TradeRecord], bars_processed: usize) -> f64 {
    if bars_processed == 0 {
        return 0.0;
    }
    let mut held = 0usize;
    let mut entry: Option<usize> = None;
    for record in records {
        if record.is_entry() {
            entry = Some(record.bar_index);
        } else if record.is_exit() {
            if let Some(e) = entry.take() {
                held += record.bar_index - e;
            }
        }
    }
    held as f64 / bars_processed as f64
}
