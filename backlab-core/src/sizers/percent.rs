//! Percent sizer: a fraction of cash on buys, a fraction of the position on sells.

use crate::engine::cost_model::CostModel;
use crate::sizers::{affordable_shares, Sizer};

#[derive(Debug, Clone, Copy)]
pub struct PercentSizer {
    /// `None` when the parameter is missing or outside [0, 1].
    percent: Option<f64>,
}

impl PercentSizer {
    pub fn new(percent: Option<f64>) -> Self {
        Self {
            percent: percent.filter(|p| (0.0..=1.0).contains(p)),
        }
    }
}

impl Sizer for PercentSizer {
    fn buy_quantity(&self, available_cash: f64, price: f64, costs: &CostModel) -> u64 {
        match self.percent {
            Some(p) => affordable_shares(available_cash * p, price, costs),
            None => 0,
        }
    }

    fn sell_quantity(&self, held: u64) -> u64 {
        match self.percent {
            Some(p) => ((held as f64 * p).floor() as u64).min(held),
            None => 0,
        }
    }

    fn name(&self) -> &str {
        "percent"
    }
}
