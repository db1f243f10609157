//! Signal producers: turn a bar history into buy/sell/hold instructions.
//!
//! Producers never see account state. They are deterministic functions of
//! the bar sequence, and the value at bar t only uses bars up to t.

pub mod bollinger_breakout;
pub mod ma_crossover;
pub mod rsi_reversal;

pub use bollinger_breakout::BollingerBreakout;
pub use ma_crossover::MaCrossover;
pub use rsi_reversal::RsiReversal;

use crate::domain::{Bar, Signal, SignalSeries};

pub trait SignalProducer: Send + Sync {
    /// Producer name for reports and logging.
    fn name(&self) -> &str;

    /// Bars needed before the first non-hold signal can appear.
    fn max_lookback(&self) -> usize;

    /// One signal per bar, keyed by bar date. Bars inside the lookback
    /// window are holds.
    fn produce(&self, bars: &[Bar]) -> SignalSeries;
}

/// Every bar a hold. Producers fall back to this when their parameters
/// cannot form an indicator window.
pub(crate) fn all_hold(bars: &[Bar]) -> SignalSeries {
    crossings(bars, |_, _| false, |_, _| false)
}

/// Detect threshold crossings between consecutive bars.
///
/// `enter(prev, now)` marks a buy, `exit(prev, now)` a sell. Bar 0 has no
/// predecessor and is always a hold. When both fire, the sell wins.
pub(crate) fn crossings<E, X>(bars: &[Bar], mut enter: E, mut exit: X) -> SignalSeries
where
    E: FnMut(usize, usize) -> bool,
    X: FnMut(usize, usize) -> bool,
{
    let mut series = SignalSeries::new();
    for (i, bar) in bars.iter().enumerate() {
        let signal = if i == 0 {
            Signal::Hold
        } else if exit(i - 1, i) {
            Signal::Sell
        } else if enter(i - 1, i) {
            Signal::Buy
        } else {
            Signal::Hold
        };
        series.set(bar.date, signal);
    }
    series
}
