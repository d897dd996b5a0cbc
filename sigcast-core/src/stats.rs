//! Run statistics — incremental aggregation over closed trades.

use crate::domain::TradeRecord;
use crate::lifecycle::ClosedTrade;
use serde::{Deserialize, Serialize};

/// Final report for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_trades: usize,
    pub win_trades: usize,
    pub loss_trades: usize,
    /// Trades that closed at exactly zero P&L. Counted in `total_trades`
    /// but in neither gross sum.
    pub flat_trades: usize,
    /// Percentage of winning trades over all trades. Zero when no trades.
    pub win_rate: f64,
    /// Mean realized P&L per trade, in price units. Zero when no trades.
    pub average_profit: f64,
    /// Sum of positive trade P&Ls.
    pub gross_profit: f64,
    /// Sum of absolute values of negative trade P&Ls.
    pub gross_loss: f64,
    /// `gross_profit / gross_loss`. Positive infinity when there are wins
    /// but no losses; zero when there are no wins.
    pub profit_factor: f64,
    /// Worst per-trade adverse excursion seen across the run.
    pub max_drawdown: f64,
    /// Closes where the configured exit policy fired (vs. forced deadline).
    pub tp_hit_count: usize,
    /// Bars the replay driver actually visited.
    pub bars_processed: usize,
    /// Full audit trail, in emission order.
    pub records: Vec<TradeRecord>,
}

/// Accumulates closed trades and finalizes into a [`BacktestResult`].
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    total_trades: usize,
    win_trades: usize,
    loss_trades: usize,
    flat_trades: usize,
    net_profit: f64,
    gross_profit: f64,
    gross_loss: f64,
    max_drawdown: f64,
    tp_hit_count: usize,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one closed trade into the tallies.
    pub fn record(&mut self, trade: &ClosedTrade) {
        self.total_trades += 1;
        self.net_profit += trade.profit;
        if trade.profit > 0.0 {
            self.win_trades += 1;
            self.gross_profit += trade.profit;
        } else if trade.profit < 0.0 {
            self.loss_trades += 1;
            self.gross_loss += -trade.profit;
        } else {
            self.flat_trades += 1;
        }
        if trade.mae > self.max_drawdown {
            self.max_drawdown = trade.mae;
        }
        if trade.policy_exit {
            self.tp_hit_count += 1;
        }
    }

    pub fn finalize(self, bars_processed: usize, records: Vec<TradeRecord>) -> BacktestResult {
        let win_rate = if self.total_trades > 0 {
            self.win_trades as f64 / self.total_trades as f64 * 100.0
        } else {
            0.0
        };
        let average_profit = if self.total_trades > 0 {
            self.net_profit / self.total_trades as f64
        } else {
            0.0
        };
        let profit_factor = if self.gross_loss > 0.0 {
            self.gross_profit / self.gross_loss
        } else if self.gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        BacktestResult {
            total_trades: self.total_trades,
            win_trades: self.win_trades,
            loss_trades: self.loss_trades,
            flat_trades: self.flat_trades,
            win_rate,
            average_profit,
            gross_profit: self.gross_profit,
            gross_loss: self.gross_loss,
            profit_factor,
            max_drawdown: self.max_drawdown,
            tp_hit_count: self.tp_hit_count,
            bars_processed,
            records,
        }
    }
}
