//! AccountState: one cash/position snapshot per bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Account snapshot at a bar's close.
///
/// A run produces one of these per bar, in bar order. `position_value` and
/// `total_capital` are always the mark-to-market of `position_quantity` and
/// `available_cash` at `price`; use [`AccountState::marked`] rather than
/// setting them by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub bar_index: usize,
    pub date: NaiveDate,
    /// Price used for valuation on this bar.
    pub price: f64,
    pub position_quantity: u64,
    pub available_cash: f64,
    pub position_value: f64,
    pub total_capital: f64,
    /// Cost incurred on this bar only.
    pub transaction_cost_paid: f64,
}

impl AccountState {
    /// The seed state at bar 0: all cash, no position, no cost.
    pub fn seed(date: NaiveDate, price: f64, initial_capital: f64) -> Self {
        Self {
            bar_index: 0,
            date,
            price,
            position_quantity: 0,
            available_cash: initial_capital,
            position_value: 0.0,
            total_capital: initial_capital,
            transaction_cost_paid: 0.0,
        }
    }

    /// Build a state valued at `price`.
    pub fn marked(
        bar_index: usize,
        date: NaiveDate,
        price: f64,
        position_quantity: u64,
        available_cash: f64,
        transaction_cost_paid: f64,
    ) -> Self {
        let position_value = position_quantity as f64 * price;
        Self {
            bar_index,
            date,
            price,
            position_quantity,
            available_cash,
            position_value,
            total_capital: position_value + available_cash,
            transaction_cost_paid,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position_quantity == 0
    }
}
