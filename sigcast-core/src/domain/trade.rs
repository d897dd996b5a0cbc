//! TradeRecord — append-only audit trail entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1.0 for Buy, -1.0 for Sell. Favorable price movement for a position
    /// is `sign() * (price - entry_price)`.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

/// What kind of event a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeKind {
    Entry,
    Exit,
    Skip,
}

/// One entry in the audit trail.
///
/// Immutable once appended. The full sequence is the sole input to the
/// charting/notification collaborators and must explain every bar where no
/// trade happened (Skip records carry the gate or trigger reason).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub kind: TradeKind,
    pub side: Option<Side>,
    pub price: f64,
    /// Realized P&L in price units. Exit records only.
    pub profit: Option<f64>,
    pub reason: String,
}

impl TradeRecord {
    pub fn is_entry(&self) -> bool {
        self.kind == TradeKind::Entry
    }

    pub fn is_exit(&self) -> bool {
        self.kind == TradeKind::Exit
    }
}
