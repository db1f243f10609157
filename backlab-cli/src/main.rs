//! Backlab CLI: run single or batch backtests and list strategies.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file or command-line flags
//! - `batch`: execute several config files in parallel
//! - `strategies`: list the strategy catalog
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use backlab_core::sizers::TradeLogic;
use backlab_runner::data_loader::{CsvProvider, DataProvider};
use backlab_runner::export::{generate_batch_summary, save_artifacts};
use backlab_runner::{catalog, run_batch, run_single_backtest, BacktestConfig, RunReport, StrategyConfig};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backlab", about = "Backlab CLI: single-asset equity backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Logic {
    Full,
    Fixed,
    Percent,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or from flags.
    Run {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbol (defaults to SPY without --config).
        #[arg(long)]
        symbol: Option<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Strategy id (1-3) or key, e.g. `rsi_reversal`.
        #[arg(long)]
        strategy: Option<String>,

        /// Trade logic mode.
        #[arg(long, value_enum)]
        logic: Option<Logic>,

        /// Share count for `--logic fixed`.
        #[arg(long)]
        quantity: Option<i64>,

        /// Fraction in [0, 1] for `--logic percent`.
        #[arg(long)]
        percent: Option<f64>,

        /// Starting cash.
        #[arg(long)]
        capital: Option<f64>,

        /// Directory of `<SYMBOL>.csv` files.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Fail instead of generating synthetic data when no CSV is found.
        #[arg(long, default_value_t = false)]
        no_synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Execute several TOML configs in parallel.
    Batch {
        /// Config files.
        #[arg(required = true)]
        configs: Vec<PathBuf>,

        /// Directory of `<SYMBOL>.csv` files, shared by every run.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// List available strategies and their default parameters.
    Strategies {
        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Flag overrides for `run`.
struct RunArgs {
    symbol: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    strategy: Option<String>,
    logic: Option<Logic>,
    quantity: Option<i64>,
    percent: Option<f64>,
    capital: Option<f64>,
    csv_dir: Option<PathBuf>,
    no_synthetic: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbol,
            start,
            end,
            strategy,
            logic,
            quantity,
            percent,
            capital,
            csv_dir,
            no_synthetic,
            output_dir,
            no_save,
        } => {
            let args = RunArgs {
                symbol,
                start,
                end,
                strategy,
                logic,
                quantity,
                percent,
                capital,
                csv_dir,
                no_synthetic,
            };
            run_cmd(config, args, output_dir, no_save)
        }
        Commands::Batch {
            configs,
            csv_dir,
            output_dir,
        } => batch_cmd(configs, csv_dir, output_dir),
        Commands::Strategies { json } => strategies_cmd(json),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    args: RunArgs,
    output_dir: PathBuf,
    no_save: bool,
) -> Result<()> {
    let config = build_config(config_path, args)?;
    let report = run_single_backtest(&config, None)
        .with_context(|| format!("backtest for {} failed", config.backtest.symbol))?;

    print_summary(&report);

    if !no_save {
        let run_dir = save_artifacts(&report, &output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn build_config(config_path: Option<PathBuf>, args: RunArgs) -> Result<BacktestConfig> {
    let mut config = match config_path {
        Some(path) => BacktestConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BacktestConfig::new(
            "SPY",
            NaiveDate::from_ymd_opt(2020, 1, 2).context("invalid default start date")?,
            NaiveDate::from_ymd_opt(2024, 12, 31).context("invalid default end date")?,
        ),
    };

    if let Some(symbol) = args.symbol {
        config.backtest.symbol = symbol;
    }
    if let Some(start) = args.start {
        config.backtest.start_date = start;
    }
    if let Some(end) = args.end {
        config.backtest.end_date = end;
    }
    if let Some(capital) = args.capital {
        config.backtest.initial_capital = capital;
    }
    if let Some(key) = args.strategy {
        config.strategy = match StrategyConfig::from_key(&key) {
            Some(s) => s,
            None => bail!("unknown strategy '{key}'. Run `backlab strategies` for the list"),
        };
    }
    config.trade = resolve_trade(config.trade, args.logic, args.quantity, args.percent)?;
    if args.csv_dir.is_some() {
        config.data.csv_dir = args.csv_dir;
    }
    if args.no_synthetic {
        config.data.synthetic_fallback = false;
    }

    config.validate()?;
    Ok(config)
}

/// Apply `--logic`, `--quantity` and `--percent` to the configured trade logic.
///
/// Without `--logic`, the parameter flags adjust the mode already selected;
/// a flag the resulting mode does not take is an error.
fn resolve_trade(
    current: TradeLogic,
    logic: Option<Logic>,
    quantity: Option<i64>,
    percent: Option<f64>,
) -> Result<TradeLogic> {
    let trade = match (logic, current) {
        (Some(Logic::Full), _) => TradeLogic::Full,
        (Some(Logic::Fixed) | None, TradeLogic::Fixed { quantity: q }) => TradeLogic::Fixed {
            quantity: quantity.or(q),
        },
        (Some(Logic::Fixed), _) => TradeLogic::Fixed { quantity },
        (Some(Logic::Percent) | None, TradeLogic::Percent { percent: p }) => TradeLogic::Percent {
            percent: percent.or(p),
        },
        (Some(Logic::Percent), _) => TradeLogic::Percent { percent },
        (None, TradeLogic::Full) => TradeLogic::Full,
    };

    match trade {
        TradeLogic::Full if quantity.is_some() || percent.is_some() => {
            bail!("--quantity/--percent need --logic fixed or --logic percent")
        }
        TradeLogic::Fixed { .. } if percent.is_some() => {
            bail!("--percent does not apply to fixed trade logic")
        }
        TradeLogic::Percent { .. } if quantity.is_some() => {
            bail!("--quantity does not apply to percent trade logic")
        }
        trade => Ok(trade),
    }
}

fn batch_cmd(paths: Vec<PathBuf>, csv_dir: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let configs = paths
        .iter()
        .map(|p| BacktestConfig::from_file(p).with_context(|| format!("loading {}", p.display())))
        .collect::<Result<Vec<_>>>()?;

    let csv = csv_dir.map(CsvProvider::new);
    let provider = csv.as_ref().map(|p| p as &dyn DataProvider);

    let mut reports: Vec<RunReport> = Vec::with_capacity(configs.len());
    let mut failures = 0usize;
    for (path, outcome) in paths.iter().zip(run_batch(&configs, provider)) {
        match outcome {
            Ok(report) => {
                let run_dir = save_artifacts(&report, &output_dir)?;
                info!(config = %path.display(), dir = %run_dir.display(), "saved artifacts");
                reports.push(report);
            }
            Err(e) => {
                error!(config = %path.display(), error = %e, "run failed");
                failures += 1;
            }
        }
    }

    println!("{}", generate_batch_summary(&reports));
    if failures > 0 {
        bail!("{failures} of {} runs failed", paths.len());
    }
    Ok(())
}

fn strategies_cmd(json: bool) -> Result<()> {
    let strategies = catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&strategies)?);
        return Ok(());
    }

    println!("{:<3} {:<20} {:<22} {}", "ID", "Key", "Name", "Defaults");
    println!("{}", "-".repeat(78));
    for s in &strategies {
        let params: Vec<String> = s.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        println!("{:<3} {:<20} {:<22} {}", s.id, s.key, s.name, params.join(", "));
        println!("    {}", s.description);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let r = &report.run.result;
    let rt = &report.run.round_trip_stats;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", report.symbol);
    println!("Period:         {} to {}", report.start_date, report.end_date);
    println!("Strategy:       {} ({})", report.strategy, report.trade.name());
    println!("Bars:           {}", report.bar_count);
    println!(
        "Signals:        {} buy / {} sell",
        report.buy_signals, report.sell_signals
    );
    println!("Fills:          {}", report.run.fills.len());
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", r.initial_capital);
    println!("Final:          {:.2}", r.final_capital);
    println!("Cum. Return:    {:.2}%", r.cumulative_return * 100.0);
    println!("Ann. Return:    {:.2}%", r.annualized_return * 100.0);
    println!("Sharpe:         {:.3}", r.sharpe_ratio);
    println!("Max Drawdown:   {:.2}%", r.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", r.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", r.profit_factor);
    println!();
    println!("--- Round Trips ---");
    println!("Closed:         {}", rt.count);
    println!("Win Rate:       {:.1}%", rt.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", rt.profit_factor);
    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
}
