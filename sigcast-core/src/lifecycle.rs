//! Position lifecycle — the single-position state machine.
//!
//! `PositionBook` owns the one open-position slot for a run. The replay
//! driver opens positions through it and asks it to evaluate the active exit
//! policy bar-by-bar; nothing else mutates a position. Competing exit
//! policies are configuration-selected variants of one enum, mutually
//! exclusive per run. At one bar the policy exit is checked before the
//! holding deadline.

use crate::domain::{Bar, Side};
use serde::{Deserialize, Serialize};

/// Exit policy, selected by configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitPolicy {
    /// Take-profit on the best close over the last `lookback` closes since
    /// entry (max for Buy, min for Sell). Fires when profit-from-entry
    /// reaches `threshold`, or `atr_at_entry * threshold_atr_mult` when the
    /// ATR-scaled variant is set.
    FixedLookbackTp {
        lookback: usize,
        threshold: f64,
        threshold_atr_mult: Option<f64>,
    },

    /// Fires when the close retraces from the best close since entry by at
    /// least `atr_at_entry * trail_atr_mult`.
    TrailingStop { trail_atr_mult: f64 },

    /// Fires when RSI-14 reaches the overbought level (Buy) or the oversold
    /// level (Sell).
    OscillatorExit { overbought: f64, oversold: f64 },
}

/// The one mutable entity with a real lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_index: usize,
    pub entry_price: f64,
    /// Bar index of the forced close if no policy fires first.
    pub deadline_index: usize,
    /// Best close seen since entry (max for Buy, min for Sell).
    pub trailing_extremum: f64,
    /// ATR-14 at entry, for ATR-scaled policies. The gate rejects decision
    /// bars with a NaN ATR-14, so this is always a real value.
    pub atr_at_entry: f64,
    /// Running maximum adverse excursion in price units, floored at zero.
    pub max_adverse: f64,
}

/// A completed round trip, reported when the position closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub side: Side,
    pub entry_index: usize,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_price: f64,
    pub profit: f64,
    /// Maximum adverse excursion observed between entry and exit.
    pub mae: f64,
    pub reason: String,
    /// True when the configured exit policy fired; false for the forced
    /// deadline close.
    pub policy_exit: bool,
}

/// Outcome of one per-bar exit evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitCheck {
    Hold,
    /// Required indicator missing this bar; decision deferred to deadline.
    Deferred(String),
    Closed(ClosedTrade),
}

/// Owner of the single open-position slot.
///
/// Each backtest run owns its own book, so independent runs (a parameter
/// sweep) share no mutable state.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    open: Option<Position>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn position(&self) -> Option<&Position> {
        self.open.as_ref()
    }

    /// Open a position at the bar's close.
    ///
    /// The replay driver only calls this while flat; the structure of its
    /// loop makes a double open impossible, so this is a debug assertion
    /// rather than a runtime guard.
    pub fn open_position(&mut self, side: Side, bar: &Bar, holding_period: usize) -> &Position {
        debug_assert!(self.open.is_none(), "position opened while one is active");
        self.open.insert(Position {
            side,
            entry_index: bar.index,
            entry_price: bar.close,
            deadline_index: bar.index + holding_period,
            trailing_extremum: bar.close,
            atr_at_entry: bar.indicators.atr_14,
            max_adverse: 0.0,
        })
    }

    /// Evaluate the active exit policy at `bars[index]`.
    ///
    /// Updates the trailing extremum and adverse excursion, checks the
    /// policy, then the deadline. On close, the slot is emptied and the
    /// completed trade returned; the book can open a new position from the
    /// next decision onward.
    pub fn evaluate_exit(&mut self, bars: &[Bar], index: usize, policy: &ExitPolicy) -> ExitCheck {
        let pos = match self.open.as_mut() {
            Some(p) => p,
            None => return ExitCheck::Hold,
        };
        let bar = &bars[index];
        let close = bar.close;
        let sign = pos.side.sign();

        let adverse = sign * (pos.entry_price - close);
        if adverse > pos.max_adverse {
            pos.max_adverse = adverse;
        }

        let improved = match pos.side {
            Side::Buy => close > pos.trailing_extremum,
            Side::Sell => close < pos.trailing_extremum,
        };
        if improved {
            pos.trailing_extremum = close;
        }

        let mut deferred: Option<String> = None;
        let fired: Option<(f64, String)> = match policy {
            ExitPolicy::FixedLookbackTp {
                lookback,
                threshold,
                threshold_atr_mult,
            } => {
                let window: Vec<f64> = bars[pos.entry_index..=index].iter().map(|b| b.close).collect();
                if window.len() >= *lookback {
                    let tail = &window[window.len() - lookback..];
                    let best = match pos.side {
                        Side::Buy => tail.iter().copied().fold(f64::MIN, f64::max),
                        Side::Sell => tail.iter().copied().fold(f64::MAX, f64::min),
                    };
                    let profit = sign * (best - pos.entry_price);
                    let effective = match threshold_atr_mult {
                        Some(mult) => pos.atr_at_entry * mult,
                        None => *threshold,
                    };
                    if profit >= effective {
                        Some((profit, format!("take-profit reached (+{profit:.4})")))
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
            ExitPolicy::TrailingStop { trail_atr_mult } => {
                let distance = pos.atr_at_entry * trail_atr_mult;
                let retrace = sign * (pos.trailing_extremum - close);
                if retrace >= distance {
                    let profit = sign * (close - pos.entry_price);
                    Some((
                        profit,
                        format!("trailing stop: retraced {retrace:.4} from extremum"),
                    ))
                } else {
                    None
                }
            }
            ExitPolicy::OscillatorExit {
                overbought,
                oversold,
            } => {
                let rsi = bar.indicators.rsi_14;
                if rsi.is_nan() {
                    deferred = Some("rsi unavailable, exit check deferred".into());
                    None
                } else {
                    let crossed = match pos.side {
                        Side::Buy => rsi >= *overbought,
                        Side::Sell => rsi <= *oversold,
                    };
                    if crossed {
                        let profit = sign * (close - pos.entry_price);
                        Some((profit, format!("rsi {rsi:.1} crossed exit level")))
                    } else {
                        None
                    }
                }
            }
        };

        if let Some((profit, reason)) = fired {
            let closed = Self::close(pos, index, close, profit, reason, true);
            self.open = None;
            return ExitCheck::Closed(closed);
        }

        if index >= pos.deadline_index {
            let profit = sign * (close - pos.entry_price);
            let closed = Self::close(pos, index, close, profit, "holding period expired".into(), false);
            self.open = None;
            return ExitCheck::Closed(closed);
        }

        match deferred {
            Some(reason) => ExitCheck::Deferred(reason),
            None => ExitCheck::Hold,
        }
    }

    fn close(
        pos: &Position,
        exit_index: usize,
        exit_price: f64,
        profit: f64,
        reason: String,
        policy_exit: bool,
    ) -> ClosedTrade {
        ClosedTrade {
            side: pos.side,
            entry_index: pos.entry_index,
            entry_price: pos.entry_price,
            exit_index,
            exit_price,
            profit,
            mae: pos.max_adverse,
            reason,
            policy_exit,
        }
    }
}
