//! Bollinger band re-entry.
//!
//! - Buy when the close moves from below the lower band back above it
//! - Sell when the close moves from above the upper band back below it

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, SignalSeries};
use crate::indicators::{Bollinger, Indicator};
use crate::signals::{all_hold, crossings, SignalProducer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerBreakout {
    pub window: usize,
    pub num_std: f64,
}

impl Default for BollingerBreakout {
    fn default() -> Self {
        Self {
            window: 20,
            num_std: 2.0,
        }
    }
}

impl BollingerBreakout {
    pub fn new(window: usize, num_std: f64) -> Self {
        assert!(window >= 2, "window must be >= 2");
        Self { window, num_std }
    }
}

impl SignalProducer for BollingerBreakout {
    fn name(&self) -> &str {
        "bollinger_breakout"
    }

    fn max_lookback(&self) -> usize {
        self.window
    }

    fn produce(&self, bars: &[Bar]) -> SignalSeries {
        if self.window < 2 {
            return all_hold(bars);
        }
        let upper = Bollinger::upper(self.window, self.num_std).compute(bars);
        let lower = Bollinger::lower(self.window, self.num_std).compute(bars);
        let close = |i: usize| bars[i].close;

        crossings(
            bars,
            |prev, now| close(prev) < lower[prev] && close(now) > lower[now],
            |prev, now| close(prev) > upper[prev] && close(now) < upper[now],
        )
    }
}
