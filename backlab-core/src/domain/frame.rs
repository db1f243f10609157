//! SeriesFrame: columnar, date-indexed input to the backtest engine.
//!
//! A frame holds strictly ascending dates and any number of named `f64`
//! columns of the same length. The engine reads a designated price column
//! and a designated signal column from it.

use super::bar::Bar;
use super::signal::SignalSeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";
pub const SIGNAL: &str = "signal";

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("dates must be strictly ascending (violated at row {row})")]
    UnorderedDates { row: usize },

    #[error("column '{name}' has {actual} rows, frame has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesFrame {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl SeriesFrame {
    /// Create an empty-columned frame over `dates`.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, FrameError> {
        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(FrameError::UnorderedDates { row: i + 1 });
        }
        Ok(Self {
            dates,
            columns: BTreeMap::new(),
        })
    }

    /// Build a frame with `open/high/low/close/volume` columns.
    pub fn from_bars(bars: &[Bar]) -> Result<Self, FrameError> {
        let mut frame = Self::new(bars.iter().map(|b| b.date).collect())?;
        frame.columns.insert(OPEN.into(), bars.iter().map(|b| b.open).collect());
        frame.columns.insert(HIGH.into(), bars.iter().map(|b| b.high).collect());
        frame.columns.insert(LOW.into(), bars.iter().map(|b| b.low).collect());
        frame.columns.insert(CLOSE.into(), bars.iter().map(|b| b.close).collect());
        frame
            .columns
            .insert(VOLUME.into(), bars.iter().map(|b| b.volume as f64).collect());
        Ok(frame)
    }

    /// Insert or replace a column.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(FrameError::LengthMismatch {
                name,
                expected: self.dates.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Attach a signal series as the `signal` column. Dates the series does
    /// not cover become 0 (hold).
    pub fn with_signals(mut self, signals: &SignalSeries) -> Self {
        let values = self
            .dates
            .iter()
            .map(|d| signals.get(*d).as_value())
            .collect();
        self.columns.insert(SIGNAL.into(), values);
        self
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
