//! Full sizer: all-in on buys, all-out on sells.

use crate::engine::cost_model::CostModel;
use crate::sizers::{affordable_shares, Sizer};

#[derive(Debug, Clone, Copy, Default)]
pub struct FullSizer;

impl Sizer for FullSizer {
    fn buy_quantity(&self, available_cash: f64, price: f64, costs: &CostModel) -> u64 {
        affordable_shares(available_cash, price, costs)
    }

    fn sell_quantity(&self, held: u64) -> u64 {
        held
    }

    fn name(&self) -> &str {
        "full"
    }
}
