//! Reporting and export: JSON, CSV, Parquet, and Markdown artifacts.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: per-bar trajectory, fill tape, and round trips
//! - **Parquet**: the per-bar trajectory, via polars
//! - **Markdown**: single-run reports and batch summaries
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use backlab_core::domain::{Fill, RoundTrip};
use polars::prelude::{Column, DataFrame, ParquetWriter};

use crate::runner::{RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.8}")).unwrap_or_default()
}

/// Export the per-bar account trajectory with its performance series.
///
/// Undefined returns are written as empty cells.
pub fn export_trajectory_csv(report: &RunReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "price",
        "position_quantity",
        "available_cash",
        "position_value",
        "total_capital",
        "transaction_cost_paid",
        "strategy_return",
        "cumulative_return",
        "drawdown",
        "benchmark_cumulative",
    ])?;

    let series = &report.run.series;
    for (i, s) in report.run.trajectory.iter().enumerate() {
        wtr.write_record([
            s.date.to_string(),
            format!("{:.6}", s.price),
            s.position_quantity.to_string(),
            format!("{:.2}", s.available_cash),
            format!("{:.2}", s.position_value),
            format!("{:.2}", s.total_capital),
            format!("{:.2}", s.transaction_cost_paid),
            opt(series.strategy_returns.get(i).copied().flatten()),
            opt(series.cumulative_returns.get(i).copied().flatten()),
            opt(series.drawdown.get(i).copied().flatten()),
            opt(series.benchmark_cumulative.get(i).copied().flatten()),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the fill tape.
pub fn export_fills_csv(fills: &[Fill]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "date", "side", "quantity", "price", "cost"])?;
    for f in fills {
        wtr.write_record([
            f.bar_index.to_string(),
            f.date.to_string(),
            format!("{:?}", f.side),
            f.quantity.to_string(),
            format!("{:.6}", f.price),
            format!("{:.2}", f.cost),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export closed round trips.
pub fn export_round_trips_csv(trips: &[RoundTrip]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_bar",
        "entry_date",
        "exit_bar",
        "exit_date",
        "quantity",
        "invested",
        "proceeds",
        "costs",
        "net_pnl",
        "return_pct",
        "bars_held",
    ])?;
    for t in trips {
        wtr.write_record([
            t.entry_bar.to_string(),
            t.entry_date.to_string(),
            t.exit_bar.to_string(),
            t.exit_date.to_string(),
            t.quantity.to_string(),
            format!("{:.2}", t.invested),
            format!("{:.2}", t.proceeds),
            format!("{:.2}", t.costs),
            format!("{:.2}", t.net_pnl()),
            format!("{:.6}", t.return_pct()),
            t.bars_held.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Parquet export ─────────────────────────────────────────────────

/// Build the per-bar trajectory as a polars DataFrame.
pub fn trajectory_frame(report: &RunReport) -> Result<DataFrame> {
    let t = &report.run.trajectory;
    let series = &report.run.series;

    let dates: Vec<String> = t.iter().map(|s| s.date.to_string()).collect();
    let prices: Vec<f64> = t.iter().map(|s| s.price).collect();
    let quantity: Vec<u64> = t.iter().map(|s| s.position_quantity).collect();
    let cash: Vec<f64> = t.iter().map(|s| s.available_cash).collect();
    let position_value: Vec<f64> = t.iter().map(|s| s.position_value).collect();
    let capital: Vec<f64> = t.iter().map(|s| s.total_capital).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("price".into(), prices),
        Column::new("position_quantity".into(), quantity),
        Column::new("available_cash".into(), cash),
        Column::new("position_value".into(), position_value),
        Column::new("total_capital".into(), capital),
        Column::new("strategy_return".into(), series.strategy_returns.clone()),
        Column::new("cumulative_return".into(), series.cumulative_returns.clone()),
        Column::new("drawdown".into(), series.drawdown.clone()),
    ])
    .context("failed to build trajectory dataframe")
}

pub fn write_trajectory_parquet(path: &Path, report: &RunReport) -> Result<()> {
    let mut df = trajectory_frame(report)?;
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trajectory parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("failed to write trajectory parquet")?;
    Ok(())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{strategy}_{run_id prefix}/` under
/// `output_dir` containing:
/// - `manifest.json`: the full `RunReport`
/// - `trajectory.csv` / `trajectory.parquet`: bar-by-bar account state
/// - `fills.csv`: executed trades
/// - `round_trips.csv`: closed positions
/// - `report.md`: human-readable summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let id = report.run_id.get(..12).unwrap_or(report.run_id.as_str());
    let name = format!("{}_{}_{id}", report.symbol, report.strategy);
    let run_dir = output_dir.join(artifact_dir_name(&name));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("manifest.json"), &export_json(report)?)?;
    write_file(&run_dir.join("trajectory.csv"), &export_trajectory_csv(report)?)?;
    write_file(&run_dir.join("fills.csv"), &export_fills_csv(&report.run.fills)?)?;
    write_file(
        &run_dir.join("round_trips.csv"),
        &export_round_trips_csv(&report.run.round_trips)?,
    )?;
    write_file(&run_dir.join("report.md"), &generate_report(report))?;
    write_trajectory_parquet(&run_dir.join("trajectory.parquet"), report)?;

    Ok(run_dir)
}

/// Keep `[A-Za-z0-9._-]` and map everything else to `_`, so the name is a
/// single path component under the output directory.
fn artifact_dir_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    if name.chars().all(|c| c == '.') {
        name.replace('.', "_")
    } else {
        name
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `RunReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(report: &RunReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", report.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.start_date, report.end_date
    ));
    md.push_str(&format!("| Strategy | {} |\n", report.strategy));
    md.push_str(&format!("| Trade Logic | {} |\n", report.trade.name()));
    md.push_str(&format!("| Bars | {} |\n", report.bar_count));
    md.push_str(&format!(
        "| Signals | {} buy / {} sell |\n",
        report.buy_signals, report.sell_signals
    ));
    md.push_str(&format!("| Run ID | {} |\n", report.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if report.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    let r = &report.run.result;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Initial Capital | {:.2} |\n", r.initial_capital));
    md.push_str(&format!("| Final Capital | {:.2} |\n", r.final_capital));
    md.push_str(&format!(
        "| Cumulative Return | {:.2}% |\n",
        r.cumulative_return * 100.0
    ));
    md.push_str(&format!(
        "| Annualized Return | {:.2}% |\n",
        r.annualized_return * 100.0
    ));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", r.max_drawdown * 100.0));
    md.push_str(&format!("| Sharpe | {:.3} |\n", r.sharpe_ratio));
    md.push_str(&format!("| Win Rate (signal bars) | {:.1}% |\n", r.win_rate * 100.0));
    md.push_str(&format!("| Profit Factor (signal bars) | {:.2} |\n", r.profit_factor));
    md.push('\n');

    let rt = &report.run.round_trip_stats;
    md.push_str("## Round Trips\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Closed | {} |\n", rt.count));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", rt.win_rate * 100.0));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", rt.profit_factor));
    md.push_str(&format!("| Avg Return | {:.2}% |\n", rt.avg_return * 100.0));
    md.push('\n');

    if !report.analytics.monthly_returns.is_empty() {
        md.push_str("## Monthly Returns\n\n");
        md.push_str("| Month | Return |\n");
        md.push_str("| --- | ---: |\n");
        for m in &report.analytics.monthly_returns {
            md.push_str(&format!(
                "| {}-{:02} | {:.2}% |\n",
                m.year,
                m.month,
                m.total_return * 100.0
            ));
        }
        md.push('\n');
    }

    md
}

/// One Markdown table row per run, for batch output.
pub fn generate_batch_summary(reports: &[RunReport]) -> String {
    let mut md = String::with_capacity(256 + reports.len() * 128);
    md.push_str("# Batch Summary\n\n");
    md.push_str("| Symbol | Strategy | Logic | Final Capital | Return | Max DD | Sharpe | Data |\n");
    md.push_str("| --- | --- | --- | ---: | ---: | ---: | ---: | --- |\n");
    for report in reports {
        let r = &report.run.result;
        md.push_str(&format!(
            "| {} | {} | {} | {:.2} | {:.2}% | {:.2}% | {:.3} | {} |\n",
            report.symbol,
            report.strategy,
            report.trade.name(),
            r.final_capital,
            r.cumulative_return * 100.0,
            r.max_drawdown * 100.0,
            r.sharpe_ratio,
            if report.has_synthetic { "synthetic" } else { "csv" },
        ));
    }
    md
}
