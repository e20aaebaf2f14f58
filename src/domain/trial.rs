//! Single-trial evaluation: one raw history, two tracks.
//!
//! The baseline track applies only its expense drag. The leveraged track
//! scales each day by the leverage factor, then applies its own (higher)
//! expense drag. Both are derived from the same raw history so they answer
//! the same question about the same sequence of market days.

use crate::domain::price::Price;
use crate::domain::pricing_manager::PricingManager;
use crate::domain::reducer::reduce;
use crate::domain::transform::{daily_rate, expense_ratio, leverage};
use std::fmt;

pub const TRACK_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Baseline,
    Leveraged,
}

impl Track {
    pub const ALL: [Track; TRACK_COUNT] = [Track::Baseline, Track::Leveraged];

    fn index(self) -> usize {
        match self {
            Track::Baseline => 0,
            Track::Leveraged => 1,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Baseline => write!(f, "baseline"),
            Track::Leveraged => write!(f, "leveraged"),
        }
    }
}

/// Final cumulative return of one trial, per track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    returns: [Price; TRACK_COUNT],
}

impl SimulationResult {
    pub fn new(baseline: Price, leveraged: Price) -> Self {
        Self {
            returns: [baseline, leveraged],
        }
    }

    pub fn baseline(&self) -> Price {
        self.returns[Track::Baseline.index()]
    }

    pub fn leveraged(&self) -> Price {
        self.returns[Track::Leveraged.index()]
    }

    pub fn track(&self, track: Track) -> Price {
        self.returns[track.index()]
    }

    pub fn returns(&self) -> [Price; TRACK_COUNT] {
        self.returns
    }
}

/// Per-trial parameters, with expense rates already converted to daily.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub horizon_days: u64,
    pub leverage: f64,
    pub baseline_daily_expense: f64,
    pub leveraged_daily_expense: f64,
}

impl Trial {
    /// `*_expense_ratio` are annual percentages.
    pub fn new(
        trading_days_per_year: u32,
        years: u32,
        leverage: f64,
        baseline_expense_ratio: f64,
        leveraged_expense_ratio: f64,
    ) -> Self {
        Self {
            horizon_days: trading_days_per_year as u64 * years as u64,
            leverage,
            baseline_daily_expense: daily_rate(baseline_expense_ratio, trading_days_per_year),
            leveraged_daily_expense: daily_rate(leveraged_expense_ratio, trading_days_per_year),
        }
    }

    pub fn evaluate(&self, history: &[Price]) -> SimulationResult {
        let baseline = expense_ratio(history, self.baseline_daily_expense);
        let leveraged = expense_ratio(
            &leverage(history, self.leverage),
            self.leveraged_daily_expense,
        );
        SimulationResult::new(reduce(&baseline), reduce(&leveraged))
    }

    /// Build a fresh history over the horizon and evaluate it.
    pub fn run(&self, manager: &mut PricingManager) -> SimulationResult {
        let history = manager.calculate_prices(0, self.horizon_days);
        self.evaluate(&history)
    }
}
