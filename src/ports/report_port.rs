//! Result report port trait.

use crate::domain::error::LevsimError;
use crate::domain::trial::SimulationResult;
use std::path::Path;

/// Port for persisting per-trial results.
pub trait ReportPort {
    fn write(&self, results: &[SimulationResult], output_path: &Path) -> Result<(), LevsimError>;
}
