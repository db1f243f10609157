//! Account simulator: the bar-by-bar cash/position recurrence.
//!
//! Each bar produces a fresh `AccountState` from the previous one:
//!
//! 1. Carry forward position and cash, reset the per-bar cost to zero.
//! 2. Mark to market at this bar's price (before any trade).
//! 3. On a buy signal with cash on hand, or a sell signal with a position,
//!    ask the sizer for a quantity and execute it, then mark again.
//!
//! Bar 0 is the seed state and never trades. States are never revisited.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{AccountState, Fill, Signal, TradeSide};
use crate::engine::cost_model::CostModel;
use crate::sizers::Sizer;

/// What the simulator sees of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarInput {
    pub date: NaiveDate,
    pub price: f64,
    pub signal: Signal,
}

/// Outcome of advancing one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: AccountState,
    pub fill: Option<Fill>,
}

/// Completed trajectory: one state per input bar, plus every execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Simulation {
    pub trajectory: Vec<AccountState>,
    pub fills: Vec<Fill>,
}

pub struct AccountSimulator<'a> {
    sizer: &'a dyn Sizer,
    costs: CostModel,
}

impl<'a> AccountSimulator<'a> {
    pub fn new(sizer: &'a dyn Sizer, costs: CostModel) -> Self {
        Self { sizer, costs }
    }

    /// Run the recurrence over all bars. Empty input yields an empty simulation.
    pub fn simulate(&self, inputs: &[BarInput], initial_capital: f64) -> Simulation {
        let Some(first) = inputs.first() else {
            return Simulation::default();
        };

        let mut trajectory = Vec::with_capacity(inputs.len());
        let mut fills = Vec::new();
        let mut state = AccountState::seed(first.date, first.price, initial_capital);

        for (i, input) in inputs.iter().enumerate().skip(1) {
            let step = self.step(&state, i, input);
            trajectory.push(std::mem::replace(&mut state, step.state));
            fills.extend(step.fill);
        }
        trajectory.push(state);

        Simulation { trajectory, fills }
    }

    /// Advance from `prev` to bar `bar_index`.
    pub fn step(&self, prev: &AccountState, bar_index: usize, input: &BarInput) -> Step {
        let carried = AccountState::marked(
            bar_index,
            input.date,
            input.price,
            prev.position_quantity,
            prev.available_cash,
            0.0,
        );

        match input.signal {
            Signal::Buy if carried.available_cash > 0.0 => self.buy(carried),
            Signal::Sell if carried.position_quantity > 0 => self.sell(carried),
            _ => Step {
                state: carried,
                fill: None,
            },
        }
    }

    fn buy(&self, state: AccountState) -> Step {
        let quantity = self
            .sizer
            .buy_quantity(state.available_cash, state.price, &self.costs);
        if quantity == 0 {
            return Step { state, fill: None };
        }

        let fill = self.execute(&state, TradeSide::Buy, quantity);
        let next = AccountState::marked(
            state.bar_index,
            state.date,
            state.price,
            state.position_quantity.saturating_add(quantity),
            state.available_cash + fill.cash_flow(),
            state.transaction_cost_paid + fill.cost,
        );
        debug!(
            bar = state.bar_index,
            quantity,
            price = fill.price,
            cost = fill.cost,
            cash = next.available_cash,
            "buy"
        );
        Step {
            state: next,
            fill: Some(fill),
        }
    }

    fn sell(&self, state: AccountState) -> Step {
        let quantity = self
            .sizer
            .sell_quantity(state.position_quantity)
            .min(state.position_quantity);
        if quantity == 0 {
            return Step { state, fill: None };
        }

        let fill = self.execute(&state, TradeSide::Sell, quantity);
        let next = AccountState::marked(
            state.bar_index,
            state.date,
            state.price,
            state.position_quantity - quantity,
            state.available_cash + fill.cash_flow(),
            state.transaction_cost_paid + fill.cost,
        );
        debug!(
            bar = state.bar_index,
            quantity,
            price = fill.price,
            cost = fill.cost,
            cash = next.available_cash,
            "sell"
        );
        Step {
            state: next,
            fill: Some(fill),
        }
    }

    fn execute(&self, state: &AccountState, side: TradeSide, quantity: u64) -> Fill {
        let price = self.costs.execution_price(state.price, side);
        let cost = self.costs.cost(quantity as f64 * price);
        Fill {
            bar_index: state.bar_index,
            date: state.date,
            side,
            quantity,
            price,
            cost,
        }
    }
}
