//! Per-track aggregation over completed trials.
//!
//! All statistics are order-insensitive, so the arrival order of results
//! from the worker pool does not matter.

use crate::domain::price::Price;
use crate::domain::trial::{SimulationResult, Track};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackStatistics {
    pub count: usize,
    pub mean: Price,
    pub median: Price,
    pub min: Price,
    pub max: Price,
    /// Population standard deviation of the cumulative returns.
    pub stdev: Price,
    pub p05: Price,
    pub p25: Price,
    pub p75: Price,
    pub p95: Price,
    pub inner_quartile_range: Price,
    pub annualized_mean: Price,
    pub annualized_median: Price,
    /// Share of trials that ended below 0%.
    pub loss_ratio: f64,
    /// Share of trials whose annualized return met the target.
    pub target_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub baseline: TrackStatistics,
    pub leveraged: TrackStatistics,
}

impl SimulationSummary {
    pub fn track(&self, track: Track) -> &TrackStatistics {
        match track {
            Track::Baseline => &self.baseline,
            Track::Leveraged => &self.leveraged,
        }
    }
}

/// Summarize both tracks. `None` when there are no results.
pub fn summarize(
    results: &[SimulationResult],
    years: f64,
    target_annual_return: f64,
) -> Option<SimulationSummary> {
    let baseline = track_statistics(results, Track::Baseline, years, target_annual_return)?;
    let leveraged = track_statistics(results, Track::Leveraged, years, target_annual_return)?;
    Some(SimulationSummary {
        baseline,
        leveraged,
    })
}

pub fn track_statistics(
    results: &[SimulationResult],
    track: Track,
    years: f64,
    target_annual_return: f64,
) -> Option<TrackStatistics> {
    if results.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = results
        .iter()
        .map(|r| r.track(track).percent_delta())
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let median = median(&values);
    let p25 = percentile(&values, 0.25);
    let p75 = percentile(&values, 0.75);

    let losses = values.iter().filter(|&&v| v < 0.0).count();
    let hits = values
        .iter()
        .filter(|&&v| annualize(Price::new(v), years).percent_delta() >= target_annual_return)
        .count();

    Some(TrackStatistics {
        count,
        mean: Price::new(mean),
        median: Price::new(median),
        min: Price::new(values[0]),
        max: Price::new(values[count - 1]),
        stdev: Price::new(variance.sqrt()),
        p05: Price::new(percentile(&values, 0.05)),
        p25: Price::new(p25),
        p75: Price::new(p75),
        p95: Price::new(percentile(&values, 0.95)),
        inner_quartile_range: Price::new(p75 - p25),
        annualized_mean: annualize(Price::new(mean), years),
        annualized_median: annualize(Price::new(median), years),
        loss_ratio: losses as f64 / n,
        target_ratio: hits as f64 / n,
    })
}

/// Geometric annual rate equivalent to `total` over `years`.
/// Anything at or below a total loss annualizes to -100%.
pub fn annualize(total: Price, years: f64) -> Price {
    let multiplier = total.as_multiplier();
    if multiplier <= 0.0 {
        return Price::new(-100.0);
    }
    if years <= 0.0 {
        return total;
    }
    Price::from_multiplier(multiplier.powf(1.0 / years))
}

fn median(sorted: &[f64]) -> f64 {
    let half = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[half]
    } else {
        (sorted[half - 1] + sorted[half]) / 2.0
    }
}

/// Nearest-rank-below: `sorted[floor(p * n)]`, clamped to the last element.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let index = (p * sorted.len() as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}
