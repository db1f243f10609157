//! RSI oversold/overbought reversal.
//!
//! - Buy when the previous RSI is below `oversold` and RSI turns up
//! - Sell when the previous RSI is above `overbought` and RSI turns down

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, SignalSeries};
use crate::indicators::{Indicator, Rsi};
use crate::signals::{all_hold, crossings, SignalProducer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiReversal {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiReversal {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl RsiReversal {
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        assert!(period > 0, "period must be > 0");
        Self {
            period,
            overbought,
            oversold,
        }
    }
}

impl SignalProducer for RsiReversal {
    fn name(&self) -> &str {
        "rsi_reversal"
    }

    fn max_lookback(&self) -> usize {
        self.period
    }

    fn produce(&self, bars: &[Bar]) -> SignalSeries {
        if self.period == 0 {
            return all_hold(bars);
        }
        let rsi = Rsi::new(self.period).compute(bars);
        crossings(
            bars,
            |prev, now| rsi[prev] < self.oversold && rsi[now] > rsi[prev],
            |prev, now| rsi[prev] > self.overbought && rsi[now] < rsi[prev],
        )
    }
}
