//! Discrete trade signals and the per-date signal series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A per-bar trading instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    /// Decode a raw signal value.
    ///
    /// Only exactly `1.0` and `-1.0` carry meaning; anything else, NaN
    /// included, is a hold.
    pub fn from_value(value: f64) -> Self {
        if value == 1.0 {
            Signal::Buy
        } else if value == -1.0 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    pub fn as_value(self) -> f64 {
        match self {
            Signal::Buy => 1.0,
            Signal::Hold => 0.0,
            Signal::Sell => -1.0,
        }
    }

    pub fn is_active(self) -> bool {
        self != Signal::Hold
    }
}

/// Mapping from timestamp to signal, produced by a signal producer.
///
/// Lookups for dates that were never set return `Signal::Hold`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    signals: BTreeMap<NaiveDate, Signal>,
}

impl SignalSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series aligned 1:1 with `dates`.
    pub fn from_aligned(dates: &[NaiveDate], signals: &[Signal]) -> Self {
        Self {
            signals: dates.iter().copied().zip(signals.iter().copied()).collect(),
        }
    }

    pub fn set(&mut self, date: NaiveDate, signal: Signal) {
        self.signals.insert(date, signal);
    }

    pub fn get(&self, date: NaiveDate) -> Signal {
        self.signals.get(&date).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Signal)> + '_ {
        self.signals.iter().map(|(d, s)| (*d, *s))
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.signals.values().filter(|s| **s == signal).count()
    }
}
