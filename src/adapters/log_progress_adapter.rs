//! Progress observer that logs through `tracing`.

use crate::domain::simulation::RunState;
use crate::ports::progress_port::ProgressPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressAdapter;

impl ProgressPort for LogProgressAdapter {
    fn on_state(&mut self, state: RunState) {
        tracing::debug!(%state, "simulation state");
    }

    fn on_progress(&mut self, completed: u64, total: u64) {
        let pct = percent_complete(completed, total);
        tracing::info!("progress: {}/{} ({:.0}%)", completed, total, pct);
    }
}

fn percent_complete(completed: u64, total: u64) -> f64 {
    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        100.0
    }
}
