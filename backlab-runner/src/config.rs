//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! symbol = "SPY"
//! start_date = "2024-01-02"
//! end_date = "2024-12-31"
//! initial_capital = 100000.0
//! transaction_cost = 0.001
//! slippage = 0.0005
//!
//! [trade]
//! logic = "percent"
//! percent = 0.5
//!
//! [strategy]
//! name = "rsi_reversal"
//! period = 14
//!
//! [data]
//! csv_dir = "data"
//! synthetic_fallback = true
//! ```
//!
//! Every table except `[backtest]` is optional; missing keys take the
//! engine defaults.

use std::path::{Path, PathBuf};

use backlab_core::engine::EngineConfig;
use backlab_core::sizers::TradeLogic;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::StrategyConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("initial_capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
    #[error("{name} must be in [0, 1), got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Complete, reproducible description of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub trade: TradeLogic,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub data: DataSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_transaction_cost")]
    pub transaction_cost: f64,
    #[serde(default = "default_slippage")]
    pub slippage: f64,
}

/// Where bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    /// Directory holding `<SYMBOL>.csv` files.
    #[serde(default)]
    pub csv_dir: Option<PathBuf>,
    /// Substitute a deterministic random walk when the provider fails.
    #[serde(default = "default_true")]
    pub synthetic_fallback: bool,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            csv_dir: None,
            synthetic_fallback: true,
        }
    }
}

fn default_initial_capital() -> f64 {
    EngineConfig::default().initial_capital
}

fn default_transaction_cost() -> f64 {
    EngineConfig::default().transaction_cost
}

fn default_slippage() -> f64 {
    EngineConfig::default().slippage
}

fn default_true() -> bool {
    true
}

impl BacktestConfig {
    /// Config with engine defaults for the given symbol and range.
    pub fn new(symbol: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.into(),
                start_date,
                end_date,
                initial_capital: default_initial_capital(),
                transaction_cost: default_transaction_cost(),
                slippage: default_slippage(),
            },
            trade: TradeLogic::default(),
            strategy: StrategyConfig::default(),
            data: DataSection::default(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backtest;
        if b.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if b.start_date > b.end_date {
            return Err(ConfigError::InvalidDateRange {
                start: b.start_date,
                end: b.end_date,
            });
        }
        if !(b.initial_capital.is_finite() && b.initial_capital > 0.0) {
            return Err(ConfigError::InvalidCapital(b.initial_capital));
        }
        for (name, value) in [
            ("transaction_cost", b.transaction_cost),
            ("slippage", b.slippage),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        self.strategy.check().map_err(ConfigError::InvalidStrategy)
    }

    /// Engine settings derived from `[backtest]`; column names stay default.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_capital: self.backtest.initial_capital,
            transaction_cost: self.backtest.transaction_cost,
            slippage: self.backtest.slippage,
            ..EngineConfig::default()
        }
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
