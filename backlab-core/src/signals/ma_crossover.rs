//! Moving average crossover.
//!
//! - Buy on the bar where SMA(short) - SMA(long) turns from negative to positive
//! - Sell on the bar where it turns from positive to negative
//! - Hold otherwise, including while either average is still warming up

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, SignalSeries};
use crate::indicators::{Indicator, Sma};
use crate::signals::{all_hold, crossings, SignalProducer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
        }
    }
}

impl MaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        assert!(short_window > 0, "short_window must be > 0");
        assert!(long_window > 0, "long_window must be > 0");
        Self {
            short_window,
            long_window,
        }
    }
}

impl SignalProducer for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn max_lookback(&self) -> usize {
        self.short_window.max(self.long_window)
    }

    fn produce(&self, bars: &[Bar]) -> SignalSeries {
        if self.short_window == 0 || self.long_window == 0 {
            return all_hold(bars);
        }
        let short = Sma::new(self.short_window).compute(bars);
        let long = Sma::new(self.long_window).compute(bars);
        let diff: Vec<f64> = short.iter().zip(&long).map(|(s, l)| s - l).collect();

        // NaN differences compare false on both sides
        crossings(
            bars,
            |prev, now| diff[prev] < 0.0 && diff[now] > 0.0,
            |prev, now| diff[prev] > 0.0 && diff[now] < 0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;
    use crate::indicators::make_bars;

    fn signals(p: &MaCrossover, closes: &[f64]) -> Vec<Signal> {
        let bars = make_bars(closes);
        let series = p.produce(&bars);
        bars.iter().map(|b| series.get(b.date)).collect()
    }

    #[test]
    fn golden_cross_buys() {
        // diff(2,4): idx3 -1, idx4 -1, idx5 -0.5, idx6 +0.5
        let got = signals(
            &MaCrossover::new(2, 4),
            &[10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0],
        );
        let buys: Vec<usize> = got
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Signal::Buy)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(buys, vec![6]);
        assert!(!got.contains(&Signal::Sell));
    }

    #[test]
    fn death_cross_sells() {
        let got = signals(
            &MaCrossover::new(2, 4),
            &[6.0, 7.0, 8.0, 9.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0],
        );
        assert_eq!(got[6], Signal::Sell);
        assert_eq!(got.iter().filter(|s| **s == Signal::Sell).count(), 1);
        assert!(!got.contains(&Signal::Buy));
    }

    #[test]
    fn short_history_is_all_hold() {
        let got = signals(&MaCrossover::default(), &[1.0, 2.0, 3.0]);
        assert!(got.iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn defaults_and_deserialize() {
        let p: MaCrossover = serde_json::from_str(r#"{"short_window": 5}"#).unwrap();
        assert_eq!(p, MaCrossover::new(5, 200));
        assert_eq!(MaCrossover::default().max_lookback(), 200);
    }

    #[test]
    fn zero_window_from_deserialize_holds() {
        let p: MaCrossover = serde_json::from_str(r#"{"short_window": 0}"#).unwrap();
        let got = signals(&p, &[1.0, 3.0, 2.0, 5.0, 1.0]);
        assert!(got.iter().all(|s| *s == Signal::Hold));
    }
}
