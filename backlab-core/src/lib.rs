//! BackLab Core: single-asset, long-only, whole-share backtesting.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, signals, the input frame, account states, fills)
//! - Sizing policies (full, fixed quantity, percent)
//! - Account simulator: bar-by-bar carry, mark to market, trade on signal
//! - Backtest engine orchestrating simulation and metrics
//! - Metrics calculator (returns, drawdown, Sharpe, signal win rate)
//! - Indicators and signal producers

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod signals;
pub mod sizers;

pub use domain::{AccountState, Bar, Fill, SeriesFrame, Signal, SignalSeries};
pub use engine::{BacktestEngine, BacktestRun, ConfigurationError, EngineConfig};
pub use metrics::BacktestResult;
pub use sizers::TradeLogic;
