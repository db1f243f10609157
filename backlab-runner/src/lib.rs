//! Backlab Runner: backtest orchestration on top of `backlab-core`.
//!
//! This crate provides:
//! - TOML configuration and the strategy catalog
//! - Data loading with CSV provider / synthetic fallback
//! - Single and batch backtest runs
//! - Analytics series (monthly returns, rolling Sharpe)
//! - JSON / CSV / Parquet / Markdown exports

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use analytics::{monthly_returns, rolling_sharpe, Analytics, MonthlyReturn};
pub use catalog::{catalog, StrategyConfig, StrategyInfo};
pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{
    load_bars, CsvProvider, DataError, DataProvider, DataSource, LoadError, LoadOptions,
    LoadedData, SyntheticProvider,
};
pub use runner::{run_backtest_from_bars, run_batch, run_single_backtest, RunError, RunReport};
