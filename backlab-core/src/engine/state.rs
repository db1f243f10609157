//! Engine configuration and run result types.

use serde::{Deserialize, Serialize};

use crate::domain::frame::{CLOSE, SIGNAL};
use crate::domain::{AccountState, Fill, RoundTrip};
use crate::engine::cost_model::CostModel;
use crate::metrics::{BacktestResult, PerformanceSeries, RoundTripStats};

/// Configuration for a backtest engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_capital: f64,
    /// Fraction of traded notional charged per fill (commission + stamp duty).
    pub transaction_cost: f64,
    /// Fractional adverse price adjustment on every fill.
    pub slippage: f64,
    /// Frame column holding the valuation/execution price.
    pub price_col: String,
    /// Frame column holding the signal values.
    pub signal_col: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            transaction_cost: 0.001,
            slippage: 0.0005,
            price_col: CLOSE.to_string(),
            signal_col: SIGNAL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..Self::default()
        }
    }

    /// Zero slippage and zero transaction cost.
    pub fn frictionless(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            transaction_cost: 0.0,
            slippage: 0.0,
            ..Self::default()
        }
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.slippage, self.transaction_cost)
    }
}

/// Everything a single run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRun {
    /// Name of the trade-logic mode used.
    pub trade_logic: String,
    pub result: BacktestResult,
    pub series: PerformanceSeries,
    /// One account state per bar.
    pub trajectory: Vec<AccountState>,
    pub fills: Vec<Fill>,
    /// Closed positions, for the round-trip statistics.
    pub round_trips: Vec<RoundTrip>,
    pub round_trip_stats: RoundTripStats,
}
