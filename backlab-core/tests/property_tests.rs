//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Cash non-negativity: full and percent buys never spend more than cash
//! 2. Position accounting: sells never exceed the held quantity
//! 3. Mark-to-market identity: total = cash + quantity × price at every bar
//! 4. No-signal invariance: without signals the account never moves
//! 5. Idempotence: repeated runs are bit-identical

use backlab_core::domain::frame::{CLOSE, SIGNAL};
use backlab_core::domain::{SeriesFrame, TradeSide};
use backlab_core::engine::{BacktestEngine, EngineConfig};
use backlab_core::sizers::TradeLogic;
use chrono::NaiveDate;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_prices(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), len)
}

fn arb_signals(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![Just(-1.0), Just(0.0), Just(1.0)], len)
}

fn arb_series() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..80).prop_flat_map(|n| (arb_prices(n), arb_signals(n)))
}

fn arb_config() -> impl Strategy<Value = EngineConfig> {
    (1_000.0..1_000_000.0_f64, 0.0..0.01_f64, 0.0..0.01_f64).prop_map(
        |(initial_capital, transaction_cost, slippage)| EngineConfig {
            initial_capital,
            transaction_cost,
            slippage,
            ..EngineConfig::default()
        },
    )
}

fn arb_self_limiting_logic() -> impl Strategy<Value = TradeLogic> {
    prop_oneof![
        Just(TradeLogic::Full),
        (0.0..=1.0_f64).prop_map(TradeLogic::percent),
    ]
}

fn arb_logic() -> impl Strategy<Value = TradeLogic> {
    prop_oneof![
        arb_self_limiting_logic(),
        (0i64..500).prop_map(TradeLogic::fixed),
    ]
}

fn build(prices: &[f64], signals: &[f64], config: EngineConfig) -> BacktestEngine {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let dates = (0..prices.len())
        .map(|i| base + chrono::Duration::days(i as i64))
        .collect();
    let mut frame = SeriesFrame::new(dates).unwrap();
    frame.insert_column(CLOSE, prices.to_vec()).unwrap();
    frame.insert_column(SIGNAL, signals.to_vec()).unwrap();
    BacktestEngine::new(&frame, config).unwrap()
}

proptest! {
    /// Full and percent buys are sized from cash, so cash never goes negative
    /// beyond floating-point rounding.
    #[test]
    fn cash_never_negative(
        (prices, signals) in arb_series(),
        config in arb_config(),
        logic in arb_self_limiting_logic(),
    ) {
        let tolerance = config.initial_capital * 1e-9;
        let run = build(&prices, &signals, config).run_detailed(&logic);
        for s in &run.trajectory {
            prop_assert!(s.available_cash >= -tolerance, "cash {} at bar {}", s.available_cash, s.bar_index);
        }
    }

    /// Every sell is bounded by the position held going into the bar, and
    /// the final position equals bought minus sold.
    #[test]
    fn sells_never_exceed_position(
        (prices, signals) in arb_series(),
        config in arb_config(),
        logic in arb_logic(),
    ) {
        let run = build(&prices, &signals, config).run_detailed(&logic);
        let mut held: u64 = 0;
        for fill in &run.fills {
            match fill.side {
                TradeSide::Buy => held += fill.quantity,
                TradeSide::Sell => {
                    prop_assert!(fill.quantity <= held);
                    held -= fill.quantity;
                }
            }
            prop_assert_eq!(run.trajectory[fill.bar_index].position_quantity, held);
        }
        let last = run.trajectory.last().map_or(0, |s| s.position_quantity);
        prop_assert_eq!(last, held);
    }

    /// total_capital is recomputed from the bar's price on every bar.
    #[test]
    fn capital_is_marked_to_market(
        (prices, signals) in arb_series(),
        config in arb_config(),
        logic in arb_logic(),
    ) {
        let run = build(&prices, &signals, config).run_detailed(&logic);
        for (s, price) in run.trajectory.iter().zip(&prices) {
            let expected = s.available_cash + s.position_quantity as f64 * price;
            prop_assert!((s.total_capital - expected).abs() <= 1e-6 * expected.abs().max(1.0));
            prop_assert!(s.transaction_cost_paid >= 0.0);
        }
    }

    /// With no signals, cash stays at initial capital and there is no exposure.
    #[test]
    fn no_signals_no_exposure(
        prices in (2usize..80).prop_flat_map(arb_prices),
        config in arb_config(),
        logic in arb_logic(),
    ) {
        let initial = config.initial_capital;
        let signals = vec![0.0; prices.len()];
        let run = build(&prices, &signals, config).run_detailed(&logic);
        prop_assert!(run.fills.is_empty());
        for s in &run.trajectory {
            prop_assert_eq!(s.position_quantity, 0);
            prop_assert_eq!(s.available_cash, initial);
            prop_assert_eq!(s.total_capital, initial);
        }
        prop_assert_eq!(run.result.max_drawdown, 0.0);
        prop_assert_eq!(run.result.win_rate, 0.0);
    }

    /// The engine holds no run state: two runs agree bit for bit.
    #[test]
    fn runs_are_idempotent(
        (prices, signals) in arb_series(),
        config in arb_config(),
        logic in arb_logic(),
    ) {
        let engine = build(&prices, &signals, config);
        let a = engine.run(&logic);
        let b = engine.run(&logic);
        for ((key, x), (_, y)) in a.entries().iter().zip(b.entries().iter()) {
            prop_assert_eq!(x.to_bits(), y.to_bits(), "{} differs", key);
        }
    }
}
