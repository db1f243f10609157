//! Criterion benchmarks for BackLab hot paths.
//!
//! Benchmarks:
//! 1. Account simulator recurrence (per-bar carry, mark, trade)
//! 2. Full engine run (simulation + metrics + round trips)
//! 3. Signal producers (indicator precompute + crossing detection)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use backlab_core::domain::{Bar, SeriesFrame, Signal};
use backlab_core::engine::{AccountSimulator, BacktestEngine, BarInput, CostModel, EngineConfig};
use backlab_core::signals::{BollingerBreakout, MaCrossover, RsiReversal, SignalProducer};
use backlab_core::sizers::{FullSizer, TradeLogic};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

/// Alternating buy/sell every 10 bars so the trade path is exercised.
fn make_inputs(bars: &[Bar]) -> Vec<BarInput> {
    bars.iter()
        .enumerate()
        .map(|(i, b)| BarInput {
            date: b.date,
            price: b.close,
            signal: match i % 20 {
                5 => Signal::Buy,
                15 => Signal::Sell,
                _ => Signal::Hold,
            },
        })
        .collect()
}

// ── 1. Simulator ─────────────────────────────────────────────────────

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("account_simulator");

    for &bar_count in &[252, 2520, 10_000] {
        let inputs = make_inputs(&make_bars(bar_count));
        let simulator = AccountSimulator::new(&FullSizer, CostModel::default());

        group.bench_with_input(
            BenchmarkId::new("full_sizer", bar_count),
            &bar_count,
            |b, _| b.iter(|| simulator.simulate(black_box(&inputs), 100_000.0)),
        );
    }

    group.finish();
}

// ── 2. Engine Run ────────────────────────────────────────────────────

fn bench_engine_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");

    for &bar_count in &[252, 2520, 10_000] {
        let bars = make_bars(bar_count);
        let signals = MaCrossover::new(10, 30).produce(&bars);
        let frame = SeriesFrame::from_bars(&bars).unwrap().with_signals(&signals);
        let engine = BacktestEngine::new(&frame, EngineConfig::default()).unwrap();

        group.bench_with_input(
            BenchmarkId::new("ma_crossover_full", bar_count),
            &bar_count,
            |b, _| b.iter(|| engine.run_detailed(black_box(&TradeLogic::Full))),
        );
    }

    group.finish();
}

// ── 3. Signal Producers ──────────────────────────────────────────────

fn bench_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_producers");
    let bars = make_bars(2520);

    let producers: Vec<Box<dyn SignalProducer>> = vec![
        Box::new(MaCrossover::default()),
        Box::new(RsiReversal::default()),
        Box::new(BollingerBreakout::default()),
    ];
    for producer in &producers {
        group.bench_function(producer.name(), |b| {
            b.iter(|| producer.produce(black_box(&bars)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_simulator, bench_engine_run, bench_producers);
criterion_main!(benches);
