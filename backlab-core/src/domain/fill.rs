use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// An executed trade on a single bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub side: TradeSide,
    pub quantity: u64,
    /// Execution price after slippage.
    pub price: f64,
    /// Transaction cost charged on this fill.
    pub cost: f64,
}

impl Fill {
    /// Traded notional at the execution price, before costs.
    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    /// Signed cash impact: negative for buys, positive for sells.
    pub fn cash_flow(&self) -> f64 {
        match self.side {
            TradeSide::Buy => -(self.notional() + self.cost),
            TradeSide::Sell => self.notional() - self.cost,
        }
    }
}
