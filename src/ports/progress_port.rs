//! Progress observer port trait.

use crate::domain::simulation::RunState;

/// Observer notified by the collector while a simulation runs.
pub trait ProgressPort: Send {
    fn on_state(&mut self, state: RunState);

    /// Called every `progress_interval` results and once at completion.
    fn on_progress(&mut self, completed: u64, total: u64);
}

/// Discards all notifications.
pub struct NoProgress;

impl ProgressPort for NoProgress {
    fn on_state(&mut self, _state: RunState) {}

    fn on_progress(&mut self, _completed: u64, _total: u64) {}
}
