//! Fixed Position Sizer
//!
//! Trades a caller-supplied share count. Buys are not checked against
//! available cash, so a fixed buy can take cash below zero; sells are
//! clamped to the held position.

use crate::engine::cost_model::CostModel;
use crate::sizers::Sizer;

#[derive(Debug, Clone, Copy)]
pub struct FixedSizer {
    quantity: u64,
}

impl FixedSizer {
    /// A missing or negative quantity becomes 0, which disables trading.
    pub fn new(quantity: Option<i64>) -> Self {
        Self {
            quantity: quantity.map_or(0, |q| q.max(0) as u64),
        }
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }
}

impl Sizer for FixedSizer {
    fn buy_quantity(&self, _available_cash: f64, _price: f64, _costs: &CostModel) -> u64 {
        self.quantity
    }

    fn sell_quantity(&self, held: u64) -> u64 {
        self.quantity.min(held)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buys_fixed_quantity_regardless_of_cash() {
        let sizer = FixedSizer::new(Some(10));
        let costs = CostModel::frictionless();
        assert_eq!(sizer.buy_quantity(1_000_000.0, 100.0, &costs), 10);
        // Only 5 shares affordable; still asks for 10.
        assert_eq!(sizer.buy_quantity(500.0, 100.0, &costs), 10);
    }

    #[test]
    fn sell_is_clamped_to_held() {
        let sizer = FixedSizer::new(Some(10));
        assert_eq!(sizer.sell_quantity(25), 10);
        assert_eq!(sizer.sell_quantity(4), 4);
        assert_eq!(sizer.sell_quantity(0), 0);
    }

    #[test]
    fn missing_quantity_never_trades() {
        let sizer = FixedSizer::new(None);
        assert_eq!(sizer.buy_quantity(10_000.0, 10.0, &CostModel::frictionless()), 0);
        assert_eq!(sizer.sell_quantity(100), 0);
    }

    #[test]
    fn negative_quantity_clamps_to_zero() {
        assert_eq!(FixedSizer::new(Some(-3)).quantity(), 0);
    }
}
