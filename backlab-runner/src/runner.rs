//! Backtest runner: wires together data loading, signal production, the
//! engine, and analytics.
//!
//! Three entry points:
//! - `run_single_backtest()`: loads data through the provider chain, then runs. Used by CLI.
//! - `run_backtest_from_bars()`: takes pre-loaded bars, no I/O.
//! - `run_batch()`: independent configs in parallel on the rayon pool.

use backlab_core::domain::{Bar, FrameError, SeriesFrame, Signal};
use backlab_core::engine::{BacktestEngine, BacktestRun, ConfigurationError};
use backlab_core::sizers::TradeLogic;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::analytics::Analytics;
use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_bars, CsvProvider, DataProvider, LoadError, LoadOptions};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("engine configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub strategy: String,
    pub trade: TradeLogic,
    pub start_date: String,
    pub end_date: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub bar_count: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub run: BacktestRun,
    pub analytics: Analytics,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest from a BacktestConfig.
///
/// An explicit `provider` wins over `[data] csv_dir`; with neither, the
/// synthetic fallback (if enabled) supplies the bars.
pub fn run_single_backtest(
    config: &BacktestConfig,
    provider: Option<&dyn DataProvider>,
) -> Result<RunReport, RunError> {
    config.validate()?;

    let csv = config.data.csv_dir.as_ref().map(CsvProvider::new);
    let provider = provider.or(csv.as_ref().map(|p| p as &dyn DataProvider));

    let opts = LoadOptions {
        start: config.backtest.start_date,
        end: config.backtest.end_date,
        synthetic_fallback: config.data.synthetic_fallback,
    };
    let loaded = load_bars(&config.backtest.symbol, provider, &opts)?;

    run_backtest_from_bars(config, &loaded.bars, &loaded.dataset_hash, loaded.has_synthetic)
}

/// Run a backtest with pre-loaded bars. No I/O.
pub fn run_backtest_from_bars(
    config: &BacktestConfig,
    bars: &[Bar],
    dataset_hash: &str,
    has_synthetic: bool,
) -> Result<RunReport, RunError> {
    config.validate()?;

    let producer = config.strategy.producer();
    let signals = producer.produce(bars);
    let frame = SeriesFrame::from_bars(bars)?.with_signals(&signals);
    let engine = BacktestEngine::new(&frame, config.engine_config())?;

    let run = engine.run_detailed(&config.trade);
    let analytics = Analytics::compute(&run.trajectory, &run.series);

    let buy_signals = engine.signals().iter().filter(|s| **s == Signal::Buy).count();
    let sell_signals = engine.signals().iter().filter(|s| **s == Signal::Sell).count();

    // Dates of the data actually used, falling back to the requested range.
    let start_date = bars
        .first()
        .map_or(config.backtest.start_date, |b| b.date)
        .to_string();
    let end_date = bars
        .last()
        .map_or(config.backtest.end_date, |b| b.date)
        .to_string();

    info!(
        symbol = %config.backtest.symbol,
        strategy = producer.name(),
        logic = config.trade.name(),
        bars = bars.len(),
        buys = buy_signals,
        sells = sell_signals,
        final_capital = run.result.final_capital,
        "run complete"
    );

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id()?,
        symbol: config.backtest.symbol.clone(),
        strategy: producer.name().to_string(),
        trade: config.trade.clone(),
        start_date,
        end_date,
        dataset_hash: dataset_hash.to_string(),
        has_synthetic,
        bar_count: bars.len(),
        buy_signals,
        sell_signals,
        run,
        analytics,
    })
}

/// Run independent backtests in parallel. Results keep the input order.
pub fn run_batch(
    configs: &[BacktestConfig],
    provider: Option<&dyn DataProvider>,
) -> Vec<Result<RunReport, RunError>> {
    info!(runs = configs.len(), "starting batch");
    configs
        .par_iter()
        .map(|config| run_single_backtest(config, provider))
        .collect()
}
