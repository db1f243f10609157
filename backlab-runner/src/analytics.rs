//! Analytics series derived from a completed run.
//!
//! Data only: monthly return table (heatmap rows) and rolling Sharpe.
//! Rendering is left to consumers.

use std::collections::BTreeMap;

use backlab_core::domain::AccountState;
use backlab_core::metrics::{sample_std_dev, PerformanceSeries, TRADING_DAYS_PER_YEAR};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Default rolling Sharpe window: one trading year.
pub const ROLLING_SHARPE_WINDOW: usize = 252;

const ZERO_VOLATILITY: f64 = 1e-15;

/// Sum of strategy per-bar returns within one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub total_return: f64,
}

/// Everything the runner attaches to a report for charting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub monthly_returns: Vec<MonthlyReturn>,
    pub rolling_sharpe: Vec<Option<f64>>,
}

impl Analytics {
    pub fn compute(trajectory: &[AccountState], series: &PerformanceSeries) -> Self {
        Self {
            monthly_returns: monthly_returns(trajectory, series),
            rolling_sharpe: rolling_sharpe(&series.strategy_returns, ROLLING_SHARPE_WINDOW),
        }
    }
}

/// Per (year, month) sum of the defined strategy returns, in calendar order.
///
/// Months whose bars all have undefined returns still appear, with 0, as do
/// months with no bars between the first and last month of the run.
pub fn monthly_returns(trajectory: &[AccountState], series: &PerformanceSeries) -> Vec<MonthlyReturn> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    if let (Some(first), Some(last)) = (trajectory.first(), trajectory.last()) {
        let (mut year, mut month) = (first.date.year(), first.date.month());
        let end = (last.date.year(), last.date.month());
        while (year, month) <= end {
            months.insert((year, month), 0.0);
            (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        }
    }
    for (state, ret) in trajectory.iter().zip(&series.strategy_returns) {
        let slot = months
            .entry((state.date.year(), state.date.month()))
            .or_insert(0.0);
        if let Some(r) = ret {
            *slot += r;
        }
    }
    months
        .into_iter()
        .map(|((year, month), total_return)| MonthlyReturn {
            year,
            month,
            total_return,
        })
        .collect()
}

/// Annualized rolling Sharpe: rolling mean / rolling sample stdev × √252.
///
/// `None` until `window` bars have accumulated, whenever the window holds an
/// undefined return, and when the window's stdev is zero.
pub fn rolling_sharpe(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = returns.len();
    let mut out = vec![None; n];
    if window < 2 || n < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..n {
        buf.clear();
        buf.extend(returns[i + 1 - window..=i].iter().flatten().copied());
        if buf.len() < window {
            continue;
        }
        let mean = buf.iter().sum::<f64>() / window as f64;
        out[i] = match sample_std_dev(&buf) {
            Some(std) if std > ZERO_VOLATILITY => Some(mean / std * TRADING_DAYS_PER_YEAR.sqrt()),
            _ => None,
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn state(date: NaiveDate, capital: f64) -> AccountState {
        AccountState::seed(date, 1.0, capital)
    }

    #[test]
    fn monthly_returns_sum_per_calendar_month() {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        let trajectory = vec![
            state(d(1, 30), 100.0),
            state(d(1, 31), 110.0),
            state(d(2, 1), 99.0),
            state(d(2, 2), 99.0),
        ];
        let series = PerformanceSeries::compute(&trajectory, &[1.0, 1.0, 1.0, 1.0]);

        let months = monthly_returns(&trajectory, &series);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 1));
        assert!((months[0].total_return - 0.1).abs() < 1e-12);
        assert_eq!(months[1].month, 2);
        assert!((months[1].total_return - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn months_without_bars_are_filled_with_zero() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let trajectory = vec![
            state(d(2023, 11, 29), 100.0),
            state(d(2023, 11, 30), 100.0),
            state(d(2024, 2, 1), 120.0),
        ];
        let series = PerformanceSeries::compute(&trajectory, &[1.0, 1.0, 1.0]);

        let months = monthly_returns(&trajectory, &series);
        let keys: Vec<_> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
        assert_eq!(months[1].total_return, 0.0);
        assert_eq!(months[2].total_return, 0.0);
        assert!((months[3].total_return - 0.2).abs() < 1e-12);
    }

    #[test]
    fn rolling_sharpe_waits_for_a_full_window() {
        let returns = vec![None, Some(0.01), Some(0.03), Some(0.02), Some(0.04)];
        let rs = rolling_sharpe(&returns, 3);
        assert_eq!(rs.len(), 5);
        assert!(rs[..3].iter().all(Option::is_none));

        // Window [0.01, 0.03, 0.02]: mean 0.02, sample std 0.01
        let expected = 0.02 / 0.01 * 252f64.sqrt();
        assert!((rs[3].unwrap() - expected).abs() < 1e-9);
        assert!(rs[4].is_some());
    }

    #[test]
    fn rolling_sharpe_is_undefined_on_flat_returns() {
        let returns = vec![Some(0.01); 10];
        assert!(rolling_sharpe(&returns, 5).iter().all(Option::is_none));
    }

    #[test]
    fn rolling_sharpe_short_series_is_all_none() {
        let returns = vec![Some(0.01), Some(0.02)];
        assert_eq!(rolling_sharpe(&returns, 252), vec![None, None]);
    }
}
