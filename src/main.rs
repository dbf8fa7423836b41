use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feargrid::prelude::*;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feargrid")]
#[command(about = "Parameter sweep backtester for fear index driven strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run every parameter combination and rank the results
    Run {
        //path to the sweep configuration json
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        //only use the last n days of aligned data
        #[arg(long)]
        days: Option<u32>,

        //worker threads, 0 uses every cpu
        #[arg(long, default_value = "0")]
        threads: usize,

        //write the trade log and the monthly report of the best run
        #[arg(long)]
        log: bool,

        //output options
        //trade log path (with --log)
        #[arg(long, default_value = "trade_log.txt")]
        trade_log: PathBuf,

        //number of results shown in the table
        #[arg(long, default_value = "20")]
        top: usize,

        //full json report path
        #[arg(long, default_value = "full_report.json")]
        report: PathBuf,

        //monthly report path (with --log)
        #[arg(long, default_value = "monthly_performance.txt")]
        monthly: PathBuf,

        //trades csv of the best run (with --log)
        #[arg(long)]
        trades_csv: Option<PathBuf>,
    },

    //expand the configuration into its parameter grid
    Grid {
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        //where to write the expanded grid
        #[arg(long, default_value = "grid.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            days,
            threads,
            log,
            trade_log,
            top,
            report,
            monthly,
            trades_csv,
        } => {
            let outputs = RunOutputs {
                trade_log: log.then_some(trade_log),
                report,
                monthly,
                trades_csv,
                top,
            };
            run_sweep(&config, days, threads, &outputs)?;
        }
        Commands::Grid { config, output } => {
            write_grid(&config, &output)?;
        }
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}

struct RunOutputs {
    //set only when trade logging was requested
    trade_log: Option<PathBuf>,
    report: PathBuf,
    monthly: PathBuf,
    trades_csv: Option<PathBuf>,
    top: usize,
}

fn run_sweep(config_path: &Path, days: Option<u32>, threads: usize, outputs: &RunOutputs) -> Result<()> {
    println!("Fear Grid Sweep Backtester");
    println!("==========================\n");

    let config = SweepConfig::from_json_file(config_path)
        .context(format!("Failed to load configuration from {:?}", config_path))?;

    //load data
    println!("Loading reference candles from {:?}...", config.reference_candles);
    let reference = load_candles(&config.reference_candles)?;
    println!("Loading asset candles from {:?}...", config.asset_candles);
    let asset = load_candles(&config.asset_candles)?;
    let fear = match &config.fear_index {
        Some(path) => {
            println!("Loading fear index from {:?}...", path);
            load_fear_index(path)?
        }
        None => Vec::new(),
    };

    let mut series = align(&reference, &asset, &fear);
    if let Some(days) = days {
        series = series.last_days(days);
    }
    if series.is_empty() {
        anyhow::bail!("Reference and asset series have no minutes in common");
    }
    println!("Aligned {} one-minute rows\n", series.len());

    let combinations = config.combinations();
    println!("Running {} parameter combinations...\n", combinations.len());

    let mut runner = SweepRunner::new(threads);
    if let Some(path) = &outputs.trade_log {
        //each run starts a fresh log
        if path.exists() {
            std::fs::remove_file(path)
                .context(format!("Failed to remove old trade log {:?}", path))?;
        }
        runner = runner.with_trade_log(TradeLogWriter::open(path)?);
    }

    let outcome = runner.run(&series, &combinations)?;
    if !outcome.failures.is_empty() {
        println!("{} combination(s) skipped, see log for details", outcome.failures.len());
    }

    let mut reports: Vec<BacktestReport> =
        outcome.records.into_iter().map(|record| record.report).collect();
    if reports.is_empty() {
        anyhow::bail!("No combination produced a result");
    }
    rank_by_final_balance(&mut reports);

    //display results
    println!("Top {} Combinations", outputs.top.min(reports.len()));
    println!("==================\n");
    print_top_table(&reports, outputs.top);

    write_json_report(&outputs.report, &reports)?;
    println!("\nFull report saved to {:?}", outputs.report);

    if let Some(trade_log) = &outputs.trade_log {
        println!("Trade log saved to {:?}", trade_log);
        write_best_run(&reports[0], &series, &combinations, outputs)?;
    }

    Ok(())
}

//the kernel is pure, so replaying the best combination reproduces its trades
fn write_best_run(
    best: &BacktestReport,
    series: &PriceSeries,
    combinations: &[ParameterCombination],
    outputs: &RunOutputs,
) -> Result<()> {
    let combination = combinations
        .get(best.test_id - 1)
        .ok_or_else(|| anyhow::anyhow!("Unknown test id {}", best.test_id))?;
    let params = combination.resolve()?;
    let output = simulate(series, &params, true);

    let monthly = MonthlyPerformance::build(&output.trades, series, params.initial_balance);
    monthly.write_to(&outputs.monthly)?;
    println!("Monthly performance of test {} saved to {:?}", best.test_id, outputs.monthly);

    if let Some(path) = &outputs.trades_csv {
        write_trades_csv(path, &output.trades)?;
        println!("Trades saved to {:?}", path);
    }

    Ok(())
}

fn write_grid(config_path: &Path, output: &Path) -> Result<()> {
    let config = SweepConfig::from_json_file(config_path)
        .context(format!("Failed to load configuration from {:?}", config_path))?;

    println!("Total combinations: {}", config.combination_count());
    let written = write_grid_file(output, &config)?;
    println!("{} combinations written to {:?}", written, output);

    Ok(())
}
