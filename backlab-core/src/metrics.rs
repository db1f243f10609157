//! Performance metrics: pure functions over a completed trajectory.
//!
//! Every metric is a pure function: capital and/or return series in, scalar
//! out. Degenerate input (no bars, a single return, zero volatility, no
//! signal bars, no losses, annualization overflow) resolves to a neutral 0
//! rather than an error or a non-finite value; a run over no data reports no
//! performance.
//!
//! Per-bar returns are undefined at bar 0, and anywhere the previous value
//! is zero. Undefined entries are carried as `None` and skipped by every
//! aggregate, including the running peak used for drawdown.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountState, RoundTrip, Signal};

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

const ZERO_VOLATILITY: f64 = 1e-15;

/// Headline metrics of a single run. Field names are the fixed result keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Share of signal bars whose strategy return was positive.
    pub win_rate: f64,
    /// Sum of positive signal-bar returns over the absolute sum of negative ones.
    pub profit_factor: f64,
}

impl BacktestResult {
    /// Compute every headline metric.
    ///
    /// `signals` must be aligned with `trajectory`. Win rate and profit factor
    /// count each bar with an active signal as one trade outcome, using that
    /// bar's strategy return; they do not pair buys with sells (see
    /// [`RoundTripStats`] for that).
    pub fn compute(
        trajectory: &[AccountState],
        series: &PerformanceSeries,
        signals: &[Signal],
        initial_capital: f64,
    ) -> Self {
        let cumulative = last_defined(&series.cumulative_returns);
        let annualized = annualized_return(cumulative, trajectory.len());
        Self {
            initial_capital,
            final_capital: trajectory
                .last()
                .map_or(initial_capital, |s| s.total_capital),
            cumulative_return: cumulative,
            annualized_return: annualized,
            max_drawdown: max_drawdown(&series.drawdown),
            sharpe_ratio: sharpe_ratio(annualized, &series.strategy_returns),
            win_rate: signal_win_rate(&series.strategy_returns, signals),
            profit_factor: signal_profit_factor(&series.strategy_returns, signals),
        }
    }

    /// Metrics as `(key, value)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("initial_capital", self.initial_capital),
            ("final_capital", self.final_capital),
            ("cumulative_return", self.cumulative_return),
            ("annualized_return", self.annualized_return),
            ("max_drawdown", self.max_drawdown),
            ("sharpe_ratio", self.sharpe_ratio),
            ("win_rate", self.win_rate),
            ("profit_factor", self.profit_factor),
        ]
    }
}

/// Per-bar series for charting consumers. Every vector has one entry per bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
    pub strategy_returns: Vec<Option<f64>>,
    pub cumulative_returns: Vec<Option<f64>>,
    pub drawdown: Vec<Option<f64>>,
    /// Buy-and-hold returns of the price series; comparison only.
    pub benchmark_returns: Vec<Option<f64>>,
    pub benchmark_cumulative: Vec<Option<f64>>,
}

impl PerformanceSeries {
    pub fn compute(trajectory: &[AccountState], prices: &[f64]) -> Self {
        let capital: Vec<f64> = trajectory.iter().map(|s| s.total_capital).collect();
        let strategy_returns = per_bar_returns(&capital);
        let cumulative = cumulative_returns(&strategy_returns);
        let drawdown = drawdown_series(&cumulative);
        let benchmark_returns = per_bar_returns(prices);
        let benchmark_cumulative = cumulative_returns(&benchmark_returns);
        Self {
            strategy_returns,
            cumulative_returns: cumulative,
            drawdown,
            benchmark_returns,
            benchmark_cumulative,
        }
    }
}

/// Statistics over closed round trips. Reported alongside the signal-bar
/// metrics, never in place of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTripStats {
    pub count: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_return: f64,
}

impl RoundTripStats {
    pub fn compute(trips: &[RoundTrip]) -> Self {
        if trips.is_empty() {
            return Self::default();
        }
        let winners = trips.iter().filter(|t| t.is_winner()).count();
        let gross_profit: f64 = trips.iter().map(|t| t.net_pnl()).filter(|p| *p > 0.0).sum();
        let gross_loss: f64 = trips
            .iter()
            .map(|t| t.net_pnl())
            .filter(|p| *p < 0.0)
            .sum::<f64>()
            .abs();
        Self {
            count: trips.len(),
            win_rate: winners as f64 / trips.len() as f64,
            profit_factor: if gross_loss > 0.0 {
                gross_profit / gross_loss
            } else {
                0.0
            },
            avg_return: trips.iter().map(|t| t.return_pct()).sum::<f64>() / trips.len() as f64,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// `values[t] / values[t-1] - 1`; `None` at t = 0 and wherever the previous
/// value is zero or either value is not finite.
pub fn per_bar_returns(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| {
        let (prev, curr) = (w[0], w[1]);
        if prev == 0.0 || !prev.is_finite() || !curr.is_finite() {
            None
        } else {
            Some(curr / prev - 1.0)
        }
    }));
    out
}

/// Compounded return through each bar. Undefined returns stay undefined in
/// place and are skipped by later compounding.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            r.map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
        })
        .collect()
}

/// `(c - peak) / (1 + peak)` where `peak` is the running maximum of the
/// defined cumulative returns so far.
pub fn drawdown_series(cumulative: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut peak: Option<f64> = None;
    cumulative
        .iter()
        .map(|c| {
            let c = (*c)?;
            let p = peak.map_or(c, |p: f64| p.max(c));
            peak = Some(p);
            let base = 1.0 + p;
            if base > 0.0 {
                Some((c - p) / base)
            } else {
                None
            }
        })
        .collect()
}

/// Most negative drawdown; 0.0 when nothing is defined.
pub fn max_drawdown(drawdown: &[Option<f64>]) -> f64 {
    drawdown.iter().flatten().fold(0.0_f64, |m, d| m.min(*d))
}

/// `(1 + cumulative)^(252 / bars) - 1`.
///
/// 0.0 for zero bars. A cumulative return at or below -100% annualizes to -1.0.
/// Growth that overflows `f64` (large moves over very few bars) resolves to 0.0.
pub fn annualized_return(cumulative_return: f64, bars: usize) -> f64 {
    if bars == 0 {
        return 0.0;
    }
    let growth = 1.0 + cumulative_return;
    if growth <= 0.0 {
        return -1.0;
    }
    let annualized = growth.powf(TRADING_DAYS_PER_YEAR / bars as f64) - 1.0;
    if annualized.is_finite() {
        annualized
    } else {
        0.0
    }
}

/// Annualized return over annualized volatility, risk-free rate 0.
///
/// Volatility is the sample standard deviation of defined per-bar returns
/// scaled by √252. Returns 0.0 with fewer than two returns, zero volatility,
/// or a non-finite ratio.
pub fn sharpe_ratio(annualized_return: f64, returns: &[Option<f64>]) -> f64 {
    let defined: Vec<f64> = returns.iter().flatten().copied().collect();
    let Some(std) = sample_std_dev(&defined) else {
        return 0.0;
    };
    let volatility = std * TRADING_DAYS_PER_YEAR.sqrt();
    if !(volatility > ZERO_VOLATILITY) {
        return 0.0;
    }
    let sharpe = annualized_return / volatility;
    if sharpe.is_finite() {
        sharpe
    } else {
        0.0
    }
}

/// Fraction of active-signal bars with a positive strategy return.
pub fn signal_win_rate(returns: &[Option<f64>], signals: &[Signal]) -> f64 {
    let outcomes: Vec<Option<f64>> = signal_bar_returns(returns, signals).collect();
    if outcomes.is_empty() {
        return 0.0;
    }
    let wins = outcomes.iter().filter(|r| matches!(r, Some(r) if *r > 0.0)).count();
    wins as f64 / outcomes.len() as f64
}

/// Gross positive over gross negative active-signal-bar returns; 0.0 when
/// there are no losses.
pub fn signal_profit_factor(returns: &[Option<f64>], signals: &[Signal]) -> f64 {
    let (mut profit, mut loss) = (0.0, 0.0);
    for r in signal_bar_returns(returns, signals).flatten() {
        if r > 0.0 {
            profit += r;
        } else if r < 0.0 {
            loss += r;
        }
    }
    let loss = loss.abs();
    if loss > 0.0 {
        profit / loss
    } else {
        0.0
    }
}

fn signal_bar_returns<'a>(
    returns: &'a [Option<f64>],
    signals: &'a [Signal],
) -> impl Iterator<Item = Option<f64>> + 'a {
    returns
        .iter()
        .zip(signals)
        .filter(|(_, s)| s.is_active())
        .map(|(r, _)| *r)
}

/// Sample standard deviation (n - 1); `None` with fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

fn last_defined(values: &[Option<f64>]) -> f64 {
    values.iter().rev().flatten().next().copied().unwrap_or(0.0)
}
