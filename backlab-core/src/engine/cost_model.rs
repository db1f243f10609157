//! Cost model: slippage and transaction cost calculation.
//!
//! Slippage is directional: buyers pay more (higher price), sellers receive less (lower price).
//! Transaction cost is a symmetric fraction of the executed notional.

use crate::domain::TradeSide;

/// Execution friction as plain fractions (0.0005 = 0.05%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub slippage: f64,
    pub transaction_cost: f64,
}

impl CostModel {
    pub fn new(slippage: f64, transaction_cost: f64) -> Self {
        Self {
            slippage,
            transaction_cost,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn buy_price(&self, price: f64) -> f64 {
        price * (1.0 + self.slippage)
    }

    pub fn sell_price(&self, price: f64) -> f64 {
        price * (1.0 - self.slippage)
    }

    pub fn execution_price(&self, price: f64, side: TradeSide) -> f64 {
        match side {
            TradeSide::Buy => self.buy_price(price),
            TradeSide::Sell => self.sell_price(price),
        }
    }

    /// Transaction cost on a traded notional.
    pub fn cost(&self, notional: f64) -> f64 {
        notional * self.transaction_cost
    }

    /// All-in cash needed per share bought at `price`.
    pub fn unit_buy_cost(&self, price: f64) -> f64 {
        self.buy_price(price) * (1.0 + self.transaction_cost)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(0.0005, 0.001)
    }
}
