//! Crestline command line.
//!
//! `crestline run` drives a backtest from a TOML config over a CSV data
//! directory; `crestline demo` runs against a seeded synthetic universe.
//! The report prints as JSON; `--out` additionally writes the artifact set.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crestline_runner::{execute, synthetic_store, BacktestConfig, BacktestReport, CsvStore};

#[derive(Parser)]
#[command(name = "crestline", about = "Multi-timeframe signal engine and backtester")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a backtest from a config file over a CSV data directory.
    Run {
        /// TOML run configuration.
        #[arg(long)]
        config: PathBuf,

        /// Directory of per-symbol CSV files.
        #[arg(long)]
        data: PathBuf,

        /// Symbol (CSV stem) to use as the relative-strength benchmark.
        #[arg(long)]
        benchmark: Option<String>,

        /// Directory for report.json / trades.csv / equity.csv.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Record the per-date signal evaluation trace in the report.
        #[arg(long)]
        trace_signals: bool,

        /// Print the full report instead of the summary block.
        #[arg(long)]
        full: bool,
    },

    /// Run against a seeded synthetic universe (no data files needed).
    Demo {
        #[arg(long, default_value_t = 8)]
        symbols: usize,

        #[arg(long, default_value_t = 504)]
        sessions: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    match Cli::parse().command {
        Command::Run {
            config,
            data,
            benchmark,
            out,
            trace_signals,
            full,
        } => {
            let mut config = BacktestConfig::load(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            if trace_signals {
                config.trace_signals = true;
            }

            let mut store = CsvStore::open(&data);
            if let Some(symbol) = benchmark {
                store = store.with_benchmark(&symbol);
            }

            let report = execute(&config, &store)?;
            emit(&report, out.as_deref(), full)?;
        }

        Command::Demo {
            symbols,
            sessions,
            seed,
            out,
        } => {
            let store = synthetic_store(symbols, sessions, seed);
            let config = BacktestConfig::from_toml_str("initial_cash = 100000.0")
                .context("building demo config")?;
            let report = execute(&config, &store)?;
            emit(&report, out.as_deref(), false)?;
        }
    }

    Ok(())
}

fn emit(report: &BacktestReport, out: Option<&std::path::Path>, full: bool) -> anyhow::Result<()> {
    if let Some(dir) = out {
        report
            .write_artifacts(dir)
            .with_context(|| format!("writing artifacts to {}", dir.display()))?;
    }

    if full {
        println!("{}", report.to_json_pretty()?);
    } else {
        let summary = serde_json::json!({
            "name": report.name,
            "run_id": report.run_id,
            "sessions": report.session_count,
            "symbols": report.symbol_count,
            "metrics": report.metrics,
            "final_equity": report.final_equity,
            "warnings": report.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
