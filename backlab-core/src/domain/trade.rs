//! RoundTrip: a closed position from first buy to the sell that flattens it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,

    // ── Size ──
    /// Total shares bought while the position was open.
    pub quantity: u64,

    // ── Cash ──
    /// Cash spent on buys, costs included.
    pub invested: f64,
    /// Cash received from sells, net of costs.
    pub proceeds: f64,
    pub costs: f64,

    pub bars_held: usize,
}

impl RoundTrip {
    pub fn net_pnl(&self) -> f64 {
        self.proceeds - self.invested
    }

    /// Return on the cash invested.
    pub fn return_pct(&self) -> f64 {
        if self.invested <= 0.0 {
            return 0.0;
        }
        self.net_pnl() / self.invested
    }

    pub fn is_winner(&self) -> bool {
        self.net_pnl() > 0.0
    }
}
