//! Monte Carlo orchestrator.
//!
//! One dispatcher task emits trial indices onto a bounded work queue. A fixed
//! pool of blocking workers, each owning its own `PricingManager`, pulls
//! indices, evaluates a trial and pushes the result onto a bounded result
//! queue. The caller's task collects exactly `simulations` results. Results
//! arrive in completion order, which has no relation to trial index.
//!
//! Run states: `NotStarted -> Dispatching -> Collecting -> Done`.

use crate::domain::error::LevsimError;
use crate::domain::price::Price;
use crate::domain::pricing_manager::PricingManager;
use crate::domain::pricing_strategy::StrategyKind;
use crate::domain::trial::{SimulationResult, Trial};
use crate::ports::progress_port::ProgressPort;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 253;
pub const DEFAULT_YEARS: u32 = 30;
pub const DEFAULT_SIMULATIONS: u64 = 100_000;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000;
pub const DEFAULT_LEVERAGE: f64 = 2.0;
pub const DEFAULT_BASELINE_EXPENSE_RATIO: f64 = 0.03;
pub const DEFAULT_LEVERAGED_EXPENSE_RATIO: f64 = 0.91;

pub const MAX_TRADING_DAYS_PER_YEAR: u64 = 366;
pub const MAX_YEARS: u64 = 1_000;
pub const MAX_SIMULATIONS: u64 = 100_000_000;
pub const MAX_WORKERS: u64 = 1_024;
pub const MAX_QUEUE_CAPACITY: u64 = 1 << 20;
pub const MAX_PROGRESS_INTERVAL: u64 = u64::MAX;

/// Inclusive upper bound for each `[simulation]` count, all of which must be at least 1.
pub const COUNT_LIMITS: [(&str, u64); 6] = [
    ("trading_days_per_year", MAX_TRADING_DAYS_PER_YEAR),
    ("years", MAX_YEARS),
    ("simulations", MAX_SIMULATIONS),
    ("workers", MAX_WORKERS),
    ("queue_capacity", MAX_QUEUE_CAPACITY),
    ("progress_interval", MAX_PROGRESS_INTERVAL),
];

/// `Ok(value)` when `value` is within `1..=max`.
pub fn check_count(key: &str, value: u64, max: u64) -> Result<u64, LevsimError> {
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(LevsimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be between 1 and {max}, got {value}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub trading_days_per_year: u32,
    pub years: u32,
    pub simulations: u64,
    pub workers: usize,
    pub queue_capacity: usize,
    pub progress_interval: u64,
    pub leverage: f64,
    /// Annual, percent.
    pub baseline_expense_ratio: f64,
    /// Annual, percent.
    pub leveraged_expense_ratio: f64,
    pub strategy: StrategyKind,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            years: DEFAULT_YEARS,
            simulations: DEFAULT_SIMULATIONS,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_WORKERS * 10,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            leverage: DEFAULT_LEVERAGE,
            baseline_expense_ratio: DEFAULT_BASELINE_EXPENSE_RATIO,
            leveraged_expense_ratio: DEFAULT_LEVERAGED_EXPENSE_RATIO,
            strategy: StrategyKind::Sampling,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn trial(&self) -> Trial {
        Trial::new(
            self.trading_days_per_year,
            self.years,
            self.leverage,
            self.baseline_expense_ratio,
            self.leveraged_expense_ratio,
        )
    }

    pub fn horizon_days(&self) -> u64 {
        self.trading_days_per_year as u64 * self.years as u64
    }

    /// Every count must sit inside its `COUNT_LIMITS` range.
    pub fn validate(&self) -> Result<(), LevsimError> {
        let values = [
            self.trading_days_per_year as u64,
            self.years as u64,
            self.simulations,
            self.workers as u64,
            self.queue_capacity as u64,
            self.progress_interval,
        ];
        for ((key, max), value) in COUNT_LIMITS.into_iter().zip(values) {
            check_count(key, value, max)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Dispatching,
    Collecting,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::NotStarted => "not started",
            RunState::Dispatching => "dispatching",
            RunState::Collecting => "collecting",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// A prepared run. Every worker's strategy is built up front, so an empty
/// option pool fails here rather than inside a worker.
pub struct Simulation {
    trial: Trial,
    simulations: u64,
    queue_capacity: usize,
    progress_interval: u64,
    managers: Vec<PricingManager>,
}

impl Simulation {
    pub fn new(config: &SimulationConfig, options: &[Price]) -> Result<Self, LevsimError> {
        let workers = config.workers.max(1);
        let managers = (0..workers)
            .map(|worker_id| {
                let seed = config.seed.map(|s| s.wrapping_add(worker_id as u64));
                config
                    .strategy
                    .build(options, seed)
                    .map(PricingManager::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_managers(config, managers))
    }

    /// One worker per manager. `config.workers` and `config.strategy` are ignored.
    pub fn with_managers(config: &SimulationConfig, managers: Vec<PricingManager>) -> Self {
        Self {
            trial: config.trial(),
            simulations: config.simulations,
            queue_capacity: config.queue_capacity.clamp(1, MAX_QUEUE_CAPACITY as usize),
            progress_interval: config.progress_interval.max(1),
            managers,
        }
    }

    pub fn workers(&self) -> usize {
        self.managers.len()
    }

    /// Run every trial and return the results in arrival order.
    pub async fn run(
        self,
        progress: &mut dyn ProgressPort,
    ) -> Result<Vec<SimulationResult>, LevsimError> {
        let total = self.simulations;
        progress.on_state(RunState::NotStarted);

        let (work_tx, work_rx) = mpsc::channel::<u64>(self.queue_capacity);
        let (result_tx, mut result_rx) = mpsc::channel::<SimulationResult>(self.queue_capacity);
        let work_rx = Arc::new(Mutex::new(work_rx));

        tracing::info!(
            simulations = total,
            workers = self.managers.len(),
            horizon_days = self.trial.horizon_days,
            "dispatching trials"
        );
        progress.on_state(RunState::Dispatching);
        let dispatcher = tokio::spawn(dispatch(work_tx, total));

        let mut workers = Vec::with_capacity(self.managers.len());
        for (worker_id, manager) in self.managers.into_iter().enumerate() {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let trial = self.trial;
            workers.push(tokio::task::spawn_blocking(move || {
                run_worker(worker_id, manager, trial, work_rx, result_tx)
            }));
        }
        // Workers now hold the only queue handles.
        drop(work_rx);
        drop(result_tx);

        progress.on_state(RunState::Collecting);
        let mut results = Vec::with_capacity(total.min(MAX_SIMULATIONS) as usize);
        while (results.len() as u64) < total {
            let Some(result) = result_rx.recv().await else {
                return Err(LevsimError::Worker {
                    reason: format!(
                        "result queue closed after {} of {} results",
                        results.len(),
                        total
                    ),
                });
            };
            results.push(result);

            let completed = results.len() as u64;
            if completed % self.progress_interval == 0 && completed < total {
                progress.on_progress(completed, total);
            }
        }
        progress.on_progress(total, total);

        let dispatched = dispatcher.await.map_err(|e| LevsimError::Worker {
            reason: format!("dispatcher task failed: {e}"),
        })?;
        for worker in workers {
            worker.await.map_err(|e| LevsimError::Worker {
                reason: format!("worker task failed: {e}"),
            })?;
        }

        tracing::info!(dispatched, collected = results.len(), "simulation complete");
        progress.on_state(RunState::Done);
        Ok(results)
    }
}

/// Emit `total` trial indices, then close the work queue by dropping `tx`.
async fn dispatch(tx: mpsc::Sender<u64>, total: u64) -> u64 {
    for trial_index in 0..total {
        if tx.send(trial_index).await.is_err() {
            tracing::warn!(trial_index, "work queue closed early");
            return trial_index;
        }
    }
    total
}

fn run_worker(
    worker_id: usize,
    mut manager: PricingManager,
    trial: Trial,
    work_rx: Arc<Mutex<mpsc::Receiver<u64>>>,
    result_tx: mpsc::Sender<SimulationResult>,
) -> u64 {
    let mut completed = 0u64;
    loop {
        let next = match work_rx.lock() {
            Ok(mut rx) => rx.blocking_recv(),
            Err(_) => None,
        };
        if next.is_none() {
            break;
        }

        let result = trial.run(&mut manager);
        if result_tx.blocking_send(result).is_err() {
            break;
        }
        completed += 1;
    }
    tracing::debug!(worker_id, completed, "worker finished");
    completed
}
