//! Bar loading and data resolution for the runner.
//!
//! Given a symbol, loads bars from a provider and implements the fallback
//! policy:
//! 1. If a provider is configured and the fetch succeeds → use it
//! 2. If it fails (or none is configured) and synthetic fallback is enabled
//!    → generate a deterministic random walk (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Either source yields the same `Bar` shape, so the engine is unaware of
//! which one was used. Results on synthetic data carry `has_synthetic`.

use std::path::{Path, PathBuf};

use backlab_core::domain::Bar;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no bars for '{symbol}' between {start} and {end}")]
    Empty {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data provider for '{symbol}' and synthetic fallback is disabled")]
    NoProvider { symbol: String },

    #[error("loading '{symbol}' failed: {source}")]
    FetchFailed {
        symbol: String,
        #[source]
        source: DataError,
    },
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Source of daily OHLCV bars.
///
/// Implementations return bars strictly ascending by date, restricted to
/// `[start, end]`.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError>;
}

// ─── CSV provider ───────────────────────────────────────────────────

/// Reads `<dir>/<SYMBOL>.csv` with header `date,open,high,low,close,volume`.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::Csv
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars = read_csv_bars(&path, start, end)?;
        if bars.is_empty() {
            return Err(DataError::Empty {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(bars)
    }
}

/// Parse, range-filter, sort, and de-duplicate bars from a CSV file.
///
/// Rows with a NaN price are dropped; duplicate dates keep the first row.
pub fn read_csv_bars(path: &Path, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    for row in reader.deserialize::<CsvRow>() {
        let row = row?;
        if row.date < start || row.date > end {
            continue;
        }
        let bar = Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: if row.volume.is_finite() && row.volume > 0.0 {
                row.volume as u64
            } else {
                0
            },
        };
        if bar.is_void() {
            dropped += 1;
            continue;
        }
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.date);
    let before = bars.len();
    bars.dedup_by_key(|b| b.date);

    if dropped > 0 || before != bars.len() {
        warn!(
            path = %path.display(),
            void_rows = dropped,
            duplicate_dates = before - bars.len(),
            "cleaned price data"
        );
    }
    Ok(bars)
}

// ─── Synthetic provider ─────────────────────────────────────────────

/// Deterministic random walk, seeded from the symbol name.
///
/// Weekdays only, starting at 100.0. Clearly fake; runs on it are tagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider;

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let bars = generate_synthetic_bars(symbol, start, end);
        if bars.is_empty() {
            return Err(DataError::Empty {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(bars)
    }
}

pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    bars
}

// ─── Loader ─────────────────────────────────────────────────────────

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Generate synthetic bars when the provider fails or is absent.
    pub synthetic_fallback: bool,
}

/// Result of loading bars, including data source provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub bars: Vec<Bar>,
    pub source: DataSource,
    /// BLAKE3 over all bar data, for fingerprinting.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Load bars for one symbol with provider → synthetic fallback.
pub fn load_bars(
    symbol: &str,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let failure = match provider {
        Some(p) => match p.fetch(symbol, opts.start, opts.end) {
            Ok(bars) => {
                info!(symbol, provider = p.name(), bars = bars.len(), "loaded bars");
                return Ok(loaded(symbol, bars, p.source()));
            }
            Err(e) => Some(e),
        },
        None => None,
    };

    if opts.synthetic_fallback {
        match &failure {
            Some(e) => warn!(symbol, error = %e, "provider failed; generating synthetic data"),
            None => warn!(symbol, "no data provider; generating synthetic data"),
        }
        let bars = SyntheticProvider
            .fetch(symbol, opts.start, opts.end)
            .map_err(|source| LoadError::FetchFailed {
                symbol: symbol.to_string(),
                source,
            })?;
        return Ok(loaded(symbol, bars, DataSource::Synthetic));
    }

    Err(match failure {
        Some(source) => LoadError::FetchFailed {
            symbol: symbol.to_string(),
            source,
        },
        None => LoadError::NoProvider {
            symbol: symbol.to_string(),
        },
    })
}

fn loaded(symbol: &str, bars: Vec<Bar>, source: DataSource) -> LoadedData {
    LoadedData {
        dataset_hash: compute_dataset_hash(symbol, &bars),
        has_synthetic: source == DataSource::Synthetic,
        bars,
        source,
    }
}

/// Deterministic BLAKE3 hash over the symbol and every bar field.
pub fn compute_dataset_hash(symbol: &str, bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
