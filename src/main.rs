use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prosperity_trader::{
    backtest::{
        data::DataReader,
        runner::{BacktestConfig, Backtester},
    },
    optimization::{params::SweepKind, sweep::run_sweep, sweep_config::SweepConfig},
    scenario::{rounds::ScenarioKind, scenario::Scenario},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "prosperity-trader", about = "Replay and tune the Prosperity trading strategies")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Replay recorded days through a submission scenario.
    Backtest {
        #[arg(long, value_enum, default_value = "round5")]
        scenario: ScenarioKind,

        #[arg(long)]
        round: u32,

        /// Day to replay, repeatable.
        #[arg(long = "day", required = true, allow_negative_numbers = true)]
        days: Vec<i32>,

        /// Only fill against the visible book.
        #[arg(long)]
        no_trade_matching: bool,

        /// Print the compressed per-tick log lines to stdout.
        #[arg(long)]
        print_logs: bool,
    },

    /// Backtest a parameter grid in parallel and write the records as JSON.
    Sweep {
        #[arg(long, value_enum)]
        kind: SweepKind,

        #[arg(long)]
        output: Option<PathBuf>,

        /// Overrides `workers` from sweep.yml.
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("prosperity_trader=info".parse()?)
                .add_directive("prosperity_trader::optimization=debug".parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let config = SweepConfig::load()?;
    let reader = config.data_reader();

    match args.command {
        Command::Backtest {
            scenario,
            round,
            days,
            no_trade_matching,
            print_logs,
        } => backtest(&reader, scenario, round, &days, !no_trade_matching, print_logs),
        Command::Sweep {
            kind,
            output,
            workers,
        } => {
            let workers = workers.unwrap_or(config.workers);
            let backtest_config = BacktestConfig {
                match_trades: config.match_trades,
                collect_logs: false,
            };

            let records = run_sweep(kind, kind.grid(), reader, backtest_config, workers).await?;

            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!("{kind}-{}.json", Utc::now().format("%Y%m%d-%H%M%S")))
            });
            fs::write(&output, serde_json::to_string(&records)?)
                .with_context(|| format!("failed to write sweep output {}", output.display()))?;
            info!(path = %output.display(), records = records.len(), "sweep written");

            Ok(())
        }
    }
}

fn backtest(
    reader: &DataReader,
    kind: ScenarioKind,
    round: u32,
    days: &[i32],
    match_trades: bool,
    print_logs: bool,
) -> Result<()> {
    let scenario = Scenario::from_kind(kind);
    let config = BacktestConfig {
        match_trades,
        collect_logs: print_logs,
    };

    let mut total = 0.0;
    for &day in days {
        let data = reader.read_day(round, day)?;
        let result = Backtester::new(&scenario, config).run(&data)?;

        for line in &result.log_lines {
            println!("{line}");
        }
        for product in result.products() {
            info!(
                round,
                day,
                %product,
                pnl = result.final_pnl(&product),
                min = result.min_pnl(&product),
                max = result.max_pnl(&product),
                "product result"
            );
        }

        let day_total = result.total_pnl();
        info!(round, day, pnl = day_total, "day result");
        total += day_total;
    }

    info!(scenario = %kind, round, pnl = total, "backtest finished");
    Ok(())
}
