//! sigcast CLI — run backtests and parameter sweeps over CSV data.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config and print a summary
//! - `sweep` — grid-search engine parameters and rank runs by net profit

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sigcast_runner::{
    load_bars, load_forecast, run_single, run_sweep, text_summary, write_trade_log, ParamGrid,
    RunConfig, RunOutcome,
};

#[derive(Parser)]
#[command(name = "sigcast", about = "sigcast — forecast-gated signal backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one backtest from a TOML config file.
    Run {
        /// Path to a TOML run config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bar CSV (OHLCV + indicator columns).
        #[arg(long)]
        bars: PathBuf,

        /// Forecast CSV aligned to the bar file.
        #[arg(long)]
        forecast: PathBuf,

        /// Output directory for result JSON and the trade log.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid-search holding period, take-profit, and gate thresholds.
    Sweep {
        /// Base TOML run config the grid is derived from.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bar CSV (OHLCV + indicator columns).
        #[arg(long)]
        bars: PathBuf,

        /// Forecast CSV aligned to the bar file.
        #[arg(long)]
        forecast: PathBuf,

        /// Show only the top N runs.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            bars,
            forecast,
            output_dir,
        } => cmd_run(config.as_deref(), &bars, &forecast, &output_dir),
        Commands::Sweep {
            config,
            bars,
            forecast,
            top,
        } => cmd_sweep(config.as_deref(), &bars, &forecast, top),
    }
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_toml_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn load_data(
    bars_path: &Path,
    forecast_path: &Path,
) -> Result<(Vec<sigcast_core::Bar>, sigcast_core::SeriesForecast)> {
    let bars =
        load_bars(bars_path).with_context(|| format!("loading bars {}", bars_path.display()))?;
    let forecast = load_forecast(forecast_path)
        .with_context(|| format!("loading forecast {}", forecast_path.display()))?;
    if forecast.len() != bars.len() {
        eprintln!(
            "warning: forecast has {} entries for {} bars",
            forecast.len(),
            bars.len()
        );
    }
    Ok((bars, forecast))
}

fn cmd_run(
    config_path: Option<&Path>,
    bars_path: &Path,
    forecast_path: &Path,
    output_dir: &Path,
) -> Result<()> {
    let config = load_config(config_path)?;
    let (bars, forecast) = load_data(bars_path, forecast_path)?;

    let outcome = run_single(&config, &bars, &forecast)?;
    print!("{}", text_summary(&outcome));

    save_artifacts(&outcome, output_dir)?;
    Ok(())
}

fn cmd_sweep(
    config_path: Option<&Path>,
    bars_path: &Path,
    forecast_path: &Path,
    top: usize,
) -> Result<()> {
    let base = load_config(config_path)?;
    let (bars, forecast) = load_data(bars_path, forecast_path)?;

    let grid = ParamGrid::default_grid();
    let configs = grid.generate_configs(&base);
    println!("sweeping {} configurations...", configs.len());

    let mut outcomes = run_sweep(&configs, &bars, &forecast)?;
    outcomes.sort_by(|a, b| {
        b.metrics
            .net_profit
            .partial_cmp(&a.metrics.net_profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!();
    println!(
        "{:<40} {:>7} {:>10} {:>9} {:>9}",
        "run", "trades", "net", "win rate", "tp rate"
    );
    for outcome in outcomes.iter().take(top) {
        println!(
            "{:<40} {:>7} {:>+10.4} {:>8.1}% {:>8.0}%",
            outcome.config.name,
            outcome.result.total_trades,
            outcome.metrics.net_profit,
            outcome.result.win_rate,
            outcome.metrics.tp_hit_rate * 100.0
        );
    }
    Ok(())
}

fn save_artifacts(outcome: &RunOutcome, output_dir: &Path) -> Result<()> {
    let run_dir = output_dir.join(&outcome.run_id[..12]);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating {}", run_dir.display()))?;

    let result_path = run_dir.join("result.json");
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(&result_path, json)
        .with_context(|| format!("writing {}", result_path.display()))?;

    let log_path = run_dir.join("trades.csv");
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("writing {}", log_path.display()))?;
    write_trade_log(&outcome.result.records, file)?;

    println!("artifacts saved to: {}", run_dir.display());
    Ok(())
}
