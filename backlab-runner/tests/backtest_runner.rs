//! Integration tests for the runner: config → data → signals → engine.

use std::path::Path;

use backlab_core::domain::{Bar, Signal};
use backlab_core::signals::RsiReversal;
use backlab_core::sizers::TradeLogic;
use backlab_runner::catalog::StrategyConfig;
use backlab_runner::config::BacktestConfig;
use backlab_runner::data_loader::{load_bars, CsvProvider, DataProvider, DataSource, LoadOptions};
use backlab_runner::runner::{run_batch, run_single_backtest, RunError};
use chrono::{Duration, NaiveDate};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// A drifting sine path, 400 consecutive days from 2023-01-02.
fn write_fixture(dir: &Path, symbol: &str) {
    let start = d(2023, 1, 2);
    let mut csv = String::from("date,open,high,low,close,volume\n");
    for i in 0..400 {
        let close = 100.0 + 20.0 * (i as f64 / 15.0).sin() + i as f64 * 0.02;
        csv.push_str(&format!(
            "{},{:.4},{:.4},{:.4},{:.4},{}\n",
            start + Duration::days(i),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1_000_000
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), csv).unwrap();
}

fn zig_config() -> BacktestConfig {
    BacktestConfig::new("ZIG", d(2023, 1, 1), d(2024, 12, 31))
}

fn config_toml(csv_dir: &Path, strategy: &str) -> String {
    format!(
        r#"
[backtest]
symbol = "ZIG"
start_date = "2023-01-01"
end_date = "2024-12-31"
initial_capital = 50000.0

[trade]
logic = "full"

[strategy]
name = "{strategy}"

[data]
csv_dir = "{}"
synthetic_fallback = false
"#,
        csv_dir.display().to_string().replace('\\', "/")
    )
}

#[test]
fn csv_backed_run_uses_real_data() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "ZIG");
    let config = BacktestConfig::from_toml(&config_toml(dir.path(), "rsi_reversal")).unwrap();

    let report = run_single_backtest(&config, None).unwrap();
    assert!(!report.has_synthetic);
    assert_eq!(report.bar_count, 400);
    assert_eq!(report.strategy, "rsi_reversal");
    assert!(report.buy_signals > 0);
    assert!(report.sell_signals > 0);
    assert!(!report.run.fills.is_empty());
    assert_eq!(report.run.result.initial_capital, 50_000.0);
    assert_eq!(report.analytics.rolling_sharpe.len(), 400);
}

#[test]
fn every_catalog_strategy_runs_under_every_logic() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "ZIG");
    let provider = CsvProvider::new(dir.path());

    for id in 1..=3 {
        for logic in [TradeLogic::Full, TradeLogic::fixed(10), TradeLogic::percent(0.5)] {
            let mut config = zig_config();
            config.strategy = StrategyConfig::from_id(id).unwrap();
            config.trade = logic;
            config.data.synthetic_fallback = false;

            let report = run_single_backtest(&config, Some(&provider)).unwrap();
            let last = report.run.trajectory.last().unwrap();
            assert!(
                (last.total_capital - report.run.result.final_capital).abs() < 1e-9,
                "strategy {id}"
            );
            assert!(report.run.result.max_drawdown <= 0.0);
        }
    }
}

#[test]
fn signal_counts_match_the_producer() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "ZIG");
    let provider = CsvProvider::new(dir.path());

    let mut config = zig_config();
    config.strategy = StrategyConfig::RsiReversal(RsiReversal::default());

    let report = run_single_backtest(&config, Some(&provider)).unwrap();
    let bars: Vec<Bar> = provider
        .fetch("ZIG", config.backtest.start_date, config.backtest.end_date)
        .unwrap();
    let signals = config.strategy.producer().produce(&bars);
    assert_eq!(report.buy_signals, signals.count(Signal::Buy));
    assert_eq!(report.sell_signals, signals.count(Signal::Sell));
}

#[test]
fn missing_csv_falls_back_to_synthetic_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let provider = CsvProvider::new(dir.path());
    let config = BacktestConfig::new("NOPE", d(2024, 1, 1), d(2024, 6, 30));

    let report = run_single_backtest(&config, Some(&provider)).unwrap();
    assert!(report.has_synthetic);
    assert!(report.bar_count > 100);
}

#[test]
fn missing_csv_without_fallback_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = BacktestConfig::from_toml(&config_toml(dir.path(), "ma_crossover")).unwrap();

    let err = run_single_backtest(&config, None).unwrap_err();
    assert!(matches!(err, RunError::Data(_)));
}

#[test]
fn identical_configs_produce_identical_reports() {
    let config = BacktestConfig::new("SPY", d(2020, 1, 1), d(2023, 12, 31));
    let a = run_single_backtest(&config, None).unwrap();
    let b = run_single_backtest(&config, None).unwrap();
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a, b);
}

#[test]
fn batch_matches_sequential_runs() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "ZIG");
    let provider = CsvProvider::new(dir.path());

    let configs: Vec<BacktestConfig> = (1..=3)
        .map(|id| {
            let mut c = zig_config();
            c.strategy = StrategyConfig::from_id(id).unwrap();
            c
        })
        .collect();

    let batch: Vec<_> = run_batch(&configs, Some(&provider))
        .into_iter()
        .map(Result::unwrap)
        .collect();
    for (config, report) in configs.iter().zip(&batch) {
        let single = run_single_backtest(config, Some(&provider)).unwrap();
        assert_eq!(&single, report);
    }
    assert_eq!(batch[0].strategy, "ma_crossover");
    assert_eq!(batch[2].strategy, "bollinger_breakout");
    assert!(batch.iter().all(|r| !r.has_synthetic));
}

#[test]
fn csv_loads_report_their_source() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "ZIG");
    let provider = CsvProvider::new(dir.path());
    let opts = LoadOptions {
        start: d(2023, 1, 1),
        end: d(2023, 1, 31),
        synthetic_fallback: false,
    };

    let loaded = load_bars("ZIG", Some(&provider), &opts).unwrap();
    assert_eq!(loaded.source, DataSource::Csv);
    assert_eq!(loaded.bars.len(), 30);
}
