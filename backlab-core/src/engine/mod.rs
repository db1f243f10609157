//! Backtesting engine: bar-by-bar account simulation and orchestration.
//!
//! The engine consumes a `SeriesFrame` with a price column and a signal
//! column, then:
//!
//! 1. Seeds the account at bar 0 with all cash.
//! 2. Advances bar by bar: carry forward, mark to market, trade on signal.
//! 3. Computes the performance series and headline metrics.
//! 4. Pairs fills into round trips.

pub mod backtest;
pub mod cost_model;
pub mod simulator;
pub mod state;
pub mod trade_extraction;

pub use backtest::{BacktestEngine, ConfigurationError};
pub use cost_model::CostModel;
pub use simulator::{AccountSimulator, BarInput, Simulation, Step};
pub use state::{BacktestRun, EngineConfig};
pub use trade_extraction::extract_round_trips;
