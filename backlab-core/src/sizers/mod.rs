//! Position Sizers: determine trade quantity
//!
//! Sizers translate available cash or a held position into a whole-share
//! quantity. They never decide whether to trade (that's the signal's job)
//! and never touch account state.

pub mod fixed;
pub mod full;
pub mod percent;

pub use fixed::FixedSizer;
pub use full::FullSizer;
pub use percent::PercentSizer;

use crate::engine::cost_model::CostModel;
use serde::{Deserialize, Serialize};

/// Position sizing policy.
///
/// # Contract
/// - `buy_quantity` is whole shares, never negative.
/// - `sell_quantity` is whole shares, never more than `held`.
pub trait Sizer: Send + Sync {
    /// Shares to buy given the cash on hand at `price`.
    fn buy_quantity(&self, available_cash: f64, price: f64, costs: &CostModel) -> u64;

    /// Shares to sell out of `held`.
    fn sell_quantity(&self, held: u64) -> u64;

    /// Sizer name for manifest/logging
    fn name(&self) -> &str;
}

/// Trade-logic mode selected for a run, with its parameter.
///
/// Deserializes from a table tagged by `logic`, e.g.
/// `{ logic = "fixed", quantity = 100 }`. A missing parameter is not an
/// error; the sizer simply never trades.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "logic", rename_all = "snake_case")]
pub enum TradeLogic {
    /// Spend all cash on buys, liquidate everything on sells.
    #[default]
    Full,
    /// Trade a fixed number of shares.
    Fixed {
        #[serde(default)]
        quantity: Option<i64>,
    },
    /// Trade a fraction of cash (buys) or of the position (sells).
    Percent {
        #[serde(default)]
        percent: Option<f64>,
    },
}

impl TradeLogic {
    pub fn fixed(quantity: i64) -> Self {
        Self::Fixed {
            quantity: Some(quantity),
        }
    }

    pub fn percent(percent: f64) -> Self {
        Self::Percent {
            percent: Some(percent),
        }
    }

    /// Resolve the mode into its sizer. Called once per run.
    pub fn sizer(&self) -> Box<dyn Sizer> {
        match self {
            Self::Full => Box::new(FullSizer),
            Self::Fixed { quantity } => Box::new(FixedSizer::new(*quantity)),
            Self::Percent { percent } => Box::new(PercentSizer::new(*percent)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Fixed { .. } => "fixed",
            Self::Percent { .. } => "percent",
        }
    }
}

/// Whole shares `cash` can buy at `price` once slippage and transaction
/// cost are added to each share.
pub fn affordable_shares(cash: f64, price: f64, costs: &CostModel) -> u64 {
    let unit_cost = costs.unit_buy_cost(price);
    if !(unit_cost > 0.0) || !(cash > 0.0) {
        return 0;
    }
    let shares = (cash / unit_cost).floor();
    if shares.is_finite() {
        shares as u64
    } else {
        0
    }
}
