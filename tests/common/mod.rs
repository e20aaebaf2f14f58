#![allow(dead_code)]

use levsim::domain::error::LevsimError;
use levsim::domain::price::Price;
use levsim::domain::pricing_strategy::StrategyKind;
use levsim::domain::simulation::{RunState, SimulationConfig};
use levsim::domain::trial::SimulationResult;
use levsim::ports::price_source_port::PriceSourcePort;
use levsim::ports::progress_port::ProgressPort;
use std::io::Write;

pub struct MockPriceSource {
    pub prices: Vec<Price>,
    pub error: Option<String>,
}

impl MockPriceSource {
    pub fn new(deltas: &[f64]) -> Self {
        Self {
            prices: prices(deltas),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            prices: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PriceSourcePort for MockPriceSource {
    fn load_daily_changes(&self) -> Result<Vec<Price>, LevsimError> {
        if let Some(reason) = &self.error {
            return Err(LevsimError::PriceParse {
                line: 1,
                value: String::new(),
                reason: reason.clone(),
            });
        }
        Ok(self.prices.clone())
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub states: Vec<RunState>,
    pub progress: Vec<(u64, u64)>,
}

impl ProgressPort for RecordingProgress {
    fn on_state(&mut self, state: RunState) {
        self.states.push(state);
    }

    fn on_progress(&mut self, completed: u64, total: u64) {
        self.progress.push((completed, total));
    }
}

pub fn prices(deltas: &[f64]) -> Vec<Price> {
    deltas.iter().copied().map(Price::new).collect()
}

/// One-year alternating run with no fees: deterministic for every worker.
pub fn deterministic_config(simulations: u64, workers: usize) -> SimulationConfig {
    SimulationConfig {
        trading_days_per_year: 253,
        years: 1,
        simulations,
        workers,
        queue_capacity: workers * 10,
        progress_interval: 1_000,
        leverage: 2.0,
        baseline_expense_ratio: 0.0,
        leveraged_expense_ratio: 0.0,
        strategy: StrategyKind::Alternating,
        seed: None,
    }
}

/// Results sorted by (baseline, leveraged) so runs can be compared as multisets.
pub fn sorted(mut results: Vec<SimulationResult>) -> Vec<SimulationResult> {
    results.sort_by(|a, b| {
        a.baseline()
            .percent_delta()
            .total_cmp(&b.baseline().percent_delta())
            .then(
                a.leveraged()
                    .percent_delta()
                    .total_cmp(&b.leveraged().percent_delta()),
            )
    });
    results
}

pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
