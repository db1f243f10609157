//! Backtest engine: validates the input frame once, then drives the
//! simulator and metrics for each run.
//!
//! The engine holds a private, read-only copy of the price and signal
//! columns. `run` takes `&self` and allocates its own working state, so
//! repeated runs are independent and bit-identical, and one engine can be
//! shared across threads.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::domain::{SeriesFrame, Signal};
use crate::engine::simulator::{AccountSimulator, BarInput};
use crate::engine::state::{BacktestRun, EngineConfig};
use crate::engine::trade_extraction::extract_round_trips;
use crate::metrics::{BacktestResult, PerformanceSeries, RoundTripStats};
use crate::sizers::TradeLogic;

/// Raised at construction; no simulation is attempted.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: EngineConfig,
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
    signals: Vec<Signal>,
}

impl BacktestEngine {
    /// Check that `frame` carries the configured price and signal columns.
    pub fn new(frame: &SeriesFrame, config: EngineConfig) -> Result<Self, ConfigurationError> {
        let prices = frame
            .column(&config.price_col)
            .ok_or_else(|| ConfigurationError::MissingColumn(config.price_col.clone()))?
            .to_vec();
        let signals = frame
            .column(&config.signal_col)
            .ok_or_else(|| ConfigurationError::MissingColumn(config.signal_col.clone()))?
            .iter()
            .map(|v| Signal::from_value(*v))
            .collect();

        Ok(Self {
            dates: frame.dates().to_vec(),
            prices,
            signals,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bar_count(&self) -> usize {
        self.dates.len()
    }

    /// Decoded signals, one per bar.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Run and return only the headline metrics.
    pub fn run(&self, logic: &TradeLogic) -> BacktestResult {
        self.run_detailed(logic).result
    }

    /// Run and return the metrics together with the full trajectory.
    pub fn run_detailed(&self, logic: &TradeLogic) -> BacktestRun {
        let sizer = logic.sizer();
        let simulator = AccountSimulator::new(sizer.as_ref(), self.config.cost_model());
        let simulation = simulator.simulate(&self.inputs(), self.config.initial_capital);

        let series = PerformanceSeries::compute(&simulation.trajectory, &self.prices);
        let result = BacktestResult::compute(
            &simulation.trajectory,
            &series,
            &self.signals,
            self.config.initial_capital,
        );
        let round_trips = extract_round_trips(&simulation.fills);
        let round_trip_stats = RoundTripStats::compute(&round_trips);

        debug!(
            logic = logic.name(),
            bars = simulation.trajectory.len(),
            fills = simulation.fills.len(),
            final_capital = result.final_capital,
            "backtest complete"
        );

        BacktestRun {
            trade_logic: logic.name().to_string(),
            result,
            series,
            trajectory: simulation.trajectory,
            fills: simulation.fills,
            round_trips,
            round_trip_stats,
        }
    }

    fn inputs(&self) -> Vec<BarInput> {
        self.dates
            .iter()
            .zip(&self.prices)
            .zip(&self.signals)
            .map(|((date, price), signal)| BarInput {
                date: *date,
                price: *price,
                signal: *signal,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::{CLOSE, SIGNAL};

    fn frame(prices: &[f64], signals: &[f64]) -> SeriesFrame {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let dates = (0..prices.len())
            .map(|i| base + chrono::Duration::days(i as i64))
            .collect();
        let mut frame = SeriesFrame::new(dates).unwrap();
        frame.insert_column(CLOSE, prices.to_vec()).unwrap();
        frame.insert_column(SIGNAL, signals.to_vec()).unwrap();
        frame
    }

    #[test]
    fn missing_price_column_fails() {
        let mut f = SeriesFrame::new(vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()]).unwrap();
        f.insert_column(SIGNAL, vec![0.0]).unwrap();
        let err = BacktestEngine::new(&f, EngineConfig::default()).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingColumn("close".into()));
    }

    #[test]
    fn missing_signal_column_fails() {
        let mut f = SeriesFrame::new(vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()]).unwrap();
        f.insert_column(CLOSE, vec![10.0]).unwrap();
        let err = BacktestEngine::new(&f, EngineConfig::default()).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingColumn("signal".into()));
        assert_eq!(err.to_string(), "missing required column: signal");
    }

    #[test]
    fn custom_column_names() {
        let mut f = frame(&[10.0, 11.0], &[0.0, 1.0]);
        f.insert_column("adj", vec![20.0, 22.0]).unwrap();
        let config = EngineConfig {
            price_col: "adj".into(),
            ..EngineConfig::frictionless(1_000.0)
        };
        let engine = BacktestEngine::new(&f, config).unwrap();
        let run = engine.run_detailed(&TradeLogic::Full);
        assert_eq!(run.fills[0].quantity, 45);
    }

    #[test]
    fn empty_frame_runs_to_neutral_result() {
        let engine = BacktestEngine::new(&frame(&[], &[]), EngineConfig::new(5_000.0)).unwrap();
        let result = engine.run(&TradeLogic::Full);
        assert_eq!(result.initial_capital, 5_000.0);
        assert_eq!(result.final_capital, 5_000.0);
        assert_eq!(result.cumulative_return, 0.0);
        assert_eq!(result.annualized_return, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.sharpe_ratio, 0.0);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(result.profit_factor, 0.0);
    }

    #[test]
    fn malformed_signals_are_holds() {
        let engine = BacktestEngine::new(
            &frame(&[10.0, 10.0, 10.0], &[0.0, 2.0, f64::NAN]),
            EngineConfig::frictionless(1_000.0),
        )
        .unwrap();
        assert!(engine.signals().iter().all(|s| *s == Signal::Hold));
        assert!(engine.run_detailed(&TradeLogic::Full).fills.is_empty());
    }

    #[test]
    fn run_is_idempotent() {
        let engine = BacktestEngine::new(
            &frame(&[10.0, 10.5, 9.8, 11.2, 10.9], &[0.0, 1.0, 0.0, -1.0, 0.0]),
            EngineConfig::default(),
        )
        .unwrap();
        let a = engine.run_detailed(&TradeLogic::Full);
        let b = engine.run_detailed(&TradeLogic::Full);
        assert_eq!(a, b);
        assert_eq!(a.result.final_capital.to_bits(), b.result.final_capital.to_bits());
    }
}
