//! Per-trial result CSV writer.

use crate::domain::error::LevsimError;
use crate::domain::trial::SimulationResult;
use crate::ports::report_port::ReportPort;
use std::path::Path;

const HEADER: [&str; 3] = ["result", "baseline_pct", "leveraged_pct"];

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    /// Rows follow arrival order; `result` is the row number, not a trial index.
    fn write(&self, results: &[SimulationResult], output_path: &Path) -> Result<(), LevsimError> {
        let report_err = |e: csv::Error| LevsimError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };

        let mut wtr = csv::Writer::from_path(output_path).map_err(report_err)?;
        wtr.write_record(HEADER).map_err(report_err)?;

        for (i, result) in results.iter().enumerate() {
            wtr.write_record([
                i.to_string(),
                format!("{:.6}", result.baseline().percent_delta()),
                format!("{:.6}", result.leveraged().percent_delta()),
            ])
            .map_err(report_err)?;
        }

        wtr.flush().map_err(|e| LevsimError::Report {
            reason: format!("failed to flush {}: {}", output_path.display(), e),
        })?;
        tracing::info!(path = %output_path.display(), rows = results.len(), "wrote results");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::Price;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let results = vec![
            SimulationResult::new(Price::new(1.5), Price::new(-3.25)),
            SimulationResult::new(Price::new(0.0), Price::new(12.0)),
        ];

        CsvReportAdapter.write(&results, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "result,baseline_pct,leveraged_pct");
        assert_eq!(lines[1], "0,1.500000,-3.250000");
        assert_eq!(lines[2], "1,0.000000,12.000000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let result = CsvReportAdapter.write(&[], Path::new("/nonexistent/dir/results.csv"));
        assert!(matches!(result, Err(LevsimError::Report { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_flush_is_report_error() {
        // /dev/full accepts the open but fails every write with ENOSPC.
        let results = vec![SimulationResult::new(Price::new(1.0), Price::new(2.0))];
        let result = CsvReportAdapter.write(&results, Path::new("/dev/full"));
        assert!(matches!(result, Err(LevsimError::Report { .. })));
    }
}
