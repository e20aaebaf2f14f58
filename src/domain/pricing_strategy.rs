//! Per-day pricing policies.
//!
//! - `SamplingStrategy`: uniform draw with replacement from the option pool
//! - `AlternatingStrategy`: deterministic round-robin over the option pool
//!
//! Each strategy owns a private copy of its options, and the sampling variant
//! owns its own generator, so an instance can be moved into a worker without
//! any synchronization.

use crate::domain::error::LevsimError;
use crate::domain::price::Price;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

pub trait PricingStrategy: Send {
    /// Next day's return for `period`, given the history built so far.
    fn calculate_price(&mut self, period: u64, history: &[Price]) -> Price;
}

#[derive(Debug, Clone)]
pub struct SamplingStrategy {
    options: Vec<Price>,
    rng: StdRng,
}

impl SamplingStrategy {
    /// Seeded from OS entropy.
    pub fn new(options: &[Price]) -> Result<Self, LevsimError> {
        Self::with_rng(options, StdRng::from_entropy())
    }

    pub fn with_seed(options: &[Price], seed: u64) -> Result<Self, LevsimError> {
        Self::with_rng(options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: &[Price], rng: StdRng) -> Result<Self, LevsimError> {
        if options.is_empty() {
            return Err(LevsimError::EmptyPriceOptions);
        }
        Ok(Self {
            options: options.to_vec(),
            rng,
        })
    }
}

impl PricingStrategy for SamplingStrategy {
    fn calculate_price(&mut self, _period: u64, _history: &[Price]) -> Price {
        let choice = self.rng.gen_range(0..self.options.len());
        self.options[choice]
    }
}

#[derive(Debug, Clone)]
pub struct AlternatingStrategy {
    options: Vec<Price>,
}

impl AlternatingStrategy {
    pub fn new(options: &[Price]) -> Result<Self, LevsimError> {
        if options.is_empty() {
            return Err(LevsimError::EmptyPriceOptions);
        }
        Ok(Self {
            options: options.to_vec(),
        })
    }
}

impl PricingStrategy for AlternatingStrategy {
    fn calculate_price(&mut self, period: u64, _history: &[Price]) -> Price {
        let choice = (period % self.options.len() as u64) as usize;
        self.options[choice]
    }
}

/// Which strategy each worker builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    Sampling,
    Alternating,
}

impl StrategyKind {
    /// Build a fresh strategy instance. `seed` only affects `Sampling`.
    pub fn build(
        &self,
        options: &[Price],
        seed: Option<u64>,
    ) -> Result<Box<dyn PricingStrategy>, LevsimError> {
        match self {
            StrategyKind::Sampling => {
                let strategy = match seed {
                    Some(seed) => SamplingStrategy::with_seed(options, seed)?,
                    None => SamplingStrategy::new(options)?,
                };
                Ok(Box::new(strategy))
            }
            StrategyKind::Alternating => Ok(Box::new(AlternatingStrategy::new(options)?)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Sampling => write!(f, "sampling"),
            StrategyKind::Alternating => write!(f, "alternating"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sampling" => Ok(StrategyKind::Sampling),
            "alternating" => Ok(StrategyKind::Alternating),
            other => Err(format!(
                "unknown strategy '{other}' (expected sampling or alternating)"
            )),
        }
    }
}
