//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_progress_adapter::LogProgressAdapter;
use crate::domain::config_validation::validate_simulation_config;
use crate::domain::error::LevsimError;
use crate::domain::pricing_strategy::StrategyKind;
use crate::domain::simulation::{self as sim, Simulation, SimulationConfig};
use crate::domain::statistics::{summarize, SimulationSummary, TrackStatistics};
use crate::domain::trial::{SimulationResult, Track};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_source_port::PriceSourcePort;
use crate::ports::progress_port::ProgressPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_TARGET_ANNUAL_RETURN: f64 = 15.0;

#[derive(Parser, Debug)]
#[command(name = "levsim", about = "Monte Carlo simulator for leveraged ETF returns")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Historical daily changes CSV
    #[arg(short, long)]
    pub prices: Option<PathBuf>,
    /// Per-trial results CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub simulations: Option<u64>,
    #[arg(long)]
    pub workers: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// sampling or alternating
    #[arg(long)]
    pub strategy: Option<StrategyKind>,
}

/// Where the input comes from and what to do with the output.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub prices_path: PathBuf,
    pub prices_column: usize,
    pub prices_has_headers: bool,
    pub output_path: Option<PathBuf>,
    pub target_annual_return: f64,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            overrides,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_simulate(&config, &overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        tracing::error!("{err}");
        ExitCode::from(&err)
    })
}

fn load_and_validate(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    tracing::info!("loading config from {}", path.display());
    let adapter = load_config(path)?;
    if let Err(e) = validate_simulation_config(&adapter) {
        tracing::error!("{e}");
        return Err((&e).into());
    }
    Ok(adapter)
}

fn run_simulate(config_path: &Path, overrides: &Overrides) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match load_and_validate(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Resolve settings
    let (sim_config, settings) = match build_simulation_config(&adapter, overrides)
        .and_then(|c| build_run_settings(&adapter, overrides).map(|s| (c, s)))
    {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    // Stage 3: Load prices, run, summarize, report
    let source = CsvPriceAdapter::new(settings.prices_path.clone())
        .with_column(settings.prices_column)
        .with_headers(settings.prices_has_headers);
    let mut progress = LogProgressAdapter;

    let results = match run_simulation_pipeline(&sim_config, &source, &mut progress) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    match summarize(
        &results,
        sim_config.years as f64,
        settings.target_annual_return,
    ) {
        Some(summary) => print_summary(&sim_config, &settings, &summary),
        None => eprintln!("No simulations were run."),
    }

    if let Some(output) = &settings.output_path {
        if let Err(e) = CsvReportAdapter.write(&results, output) {
            tracing::error!("{e}");
            return (&e).into();
        }
        eprintln!("\nResults written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

/// Load the option pool, prepare every worker, and run to completion on a
/// dedicated multi-thread runtime. Must not be called from inside a runtime.
pub fn run_simulation_pipeline(
    config: &SimulationConfig,
    source: &dyn PriceSourcePort,
    progress: &mut dyn ProgressPort,
) -> Result<Vec<SimulationResult>, LevsimError> {
    let options = source.load_daily_changes()?;
    let simulation = Simulation::new(config, &options)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(simulation.run(progress))
}

/// Merge file values and overrides, then bound-check the result.
/// Overrides are only checked here.
pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<SimulationConfig, LevsimError> {
    let count = |key: &str, default: u64| -> Result<u64, LevsimError> {
        match adapter.get_string("simulation", key) {
            Some(raw) => raw.parse().map_err(|_| LevsimError::ConfigInvalid {
                section: "simulation".into(),
                key: key.into(),
                reason: format!("{key} must be a non-negative integer"),
            }),
            None => Ok(default),
        }
    };

    let workers: usize = match overrides.workers {
        Some(w) => w,
        None => narrow("workers", count("workers", sim::DEFAULT_WORKERS as u64)?)?,
    };
    let default_capacity = (workers as u64).saturating_mul(10);
    let simulations = match overrides.simulations {
        Some(n) => n,
        None => count("simulations", sim::DEFAULT_SIMULATIONS)?,
    };

    let strategy = overrides.strategy.unwrap_or_else(|| {
        adapter
            .get_string("simulation", "strategy")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    });
    let seed = overrides.seed.or_else(|| {
        adapter
            .get_string("simulation", "seed")
            .and_then(|s| s.parse().ok())
    });

    let config = SimulationConfig {
        trading_days_per_year: narrow(
            "trading_days_per_year",
            count(
                "trading_days_per_year",
                sim::DEFAULT_TRADING_DAYS_PER_YEAR as u64,
            )?,
        )?,
        years: narrow("years", count("years", sim::DEFAULT_YEARS as u64)?)?,
        simulations,
        workers,
        queue_capacity: narrow("queue_capacity", count("queue_capacity", default_capacity)?)?,
        progress_interval: count("progress_interval", sim::DEFAULT_PROGRESS_INTERVAL)?,
        leverage: adapter.get_double("leveraged", "leverage", sim::DEFAULT_LEVERAGE),
        baseline_expense_ratio: adapter.get_double(
            "baseline",
            "expense_ratio",
            sim::DEFAULT_BASELINE_EXPENSE_RATIO,
        ),
        leveraged_expense_ratio: adapter.get_double(
            "leveraged",
            "expense_ratio",
            sim::DEFAULT_LEVERAGED_EXPENSE_RATIO,
        ),
        strategy,
        seed,
    };
    config.validate()?;
    Ok(config)
}

fn narrow<T: TryFrom<u64>>(key: &str, value: u64) -> Result<T, LevsimError> {
    T::try_from(value).map_err(|_| LevsimError::ConfigInvalid {
        section: "simulation".into(),
        key: key.into(),
        reason: format!("{key} value {value} is out of range"),
    })
}

pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<RunSettings, LevsimError> {
    let prices_path = match &overrides.prices {
        Some(p) => p.clone(),
        None => adapter
            .get_string("simulation", "prices_path")
            .map(PathBuf::from)
            .ok_or_else(|| LevsimError::ConfigMissing {
                section: "simulation".into(),
                key: "prices_path".into(),
            })?,
    };

    let output_path = overrides
        .output
        .clone()
        .or_else(|| adapter.get_string("report", "output_path").map(PathBuf::from));

    Ok(RunSettings {
        prices_path,
        prices_column: adapter.get_int("simulation", "prices_column", 0).max(0) as usize,
        prices_has_headers: adapter.get_bool("simulation", "prices_has_headers", false),
        output_path,
        target_annual_return: adapter.get_double(
            "report",
            "target_annual_return",
            DEFAULT_TARGET_ANNUAL_RETURN,
        ),
    })
}

pub fn run_dry_run(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let adapter = match load_and_validate(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");

    let (config, settings) = match build_simulation_config(&adapter, overrides)
        .and_then(|c| build_run_settings(&adapter, overrides).map(|s| (c, s)))
    {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    eprintln!("\nSimulation:");
    eprintln!("  prices:        {}", settings.prices_path.display());
    eprintln!("  strategy:      {}", config.strategy);
    eprintln!(
        "  horizon:       {} years x {} days = {} days",
        config.years,
        config.trading_days_per_year,
        config.horizon_days()
    );
    eprintln!("  simulations:   {}", config.simulations);
    eprintln!(
        "  workers:       {} (queue capacity {})",
        config.workers, config.queue_capacity
    );
    match config.seed {
        Some(seed) => eprintln!("  seed:          {}", seed),
        None => eprintln!("  seed:          entropy"),
    }
    eprintln!("\nTracks:");
    eprintln!(
        "  baseline:      1.0x, {:.3}% annual expense",
        config.baseline_expense_ratio
    );
    eprintln!(
        "  leveraged:     {:.1}x, {:.3}% annual expense",
        config.leverage, config.leveraged_expense_ratio
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    match load_and_validate(config_path) {
        Ok(_) => {
            eprintln!("Simulation configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn print_summary(config: &SimulationConfig, settings: &RunSettings, summary: &SimulationSummary) {
    eprintln!(
        "\n=== {} simulations over {} years ===",
        summary.baseline.count, config.years
    );
    for track in Track::ALL {
        let label = match track {
            Track::Baseline => "1.0x".to_string(),
            Track::Leveraged => format!("{:.1}x", config.leverage),
        };
        eprintln!("\n--- {} ({}) ---", track, label);
        print_track(summary.track(track), settings.target_annual_return);
    }
}

fn print_track(stats: &TrackStatistics, target: f64) {
    eprintln!("Mean Return:      {}", stats.mean);
    eprintln!("Median Return:    {}", stats.median);
    eprintln!("Annualized Mean:  {}", stats.annualized_mean);
    eprintln!("Annualized Med.:  {}", stats.annualized_median);
    eprintln!("Std Dev:          {}", stats.stdev);
    eprintln!("Min / Max:        {} / {}", stats.min, stats.max);
    eprintln!(
        "P5 / P25 / P75 / P95: {} / {} / {} / {}",
        stats.p05, stats.p25, stats.p75, stats.p95
    );
    eprintln!("IQR:              {}", stats.inner_quartile_range);
    eprintln!("Loss Rate:        {:.1}%", stats.loss_ratio * 100.0);
    eprintln!(
        "Annual >= {:.1}%:  {:.1}%",
        target,
        stats.target_ratio * 100.0
    );
}
