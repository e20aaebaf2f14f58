//! Daily percentage return value.
//!
//! A `Price` is one day's percent delta: `1.23` means +1.23%. It is a plain
//! value type; every operation returns a new `Price`.

use std::fmt;

/// Ordered sequence of daily returns, index = trading-day offset.
pub type PriceHistory = Vec<Price>;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Price {
    percent_delta: f64,
}

impl Price {
    pub const fn new(percent_delta: f64) -> Self {
        Self { percent_delta }
    }

    /// 0%, the identity for compounding.
    pub const fn zero() -> Self {
        Self::new(0.0)
    }

    /// Build from a decimal fraction (`0.0123` -> `1.23%`).
    pub fn from_decimal(decimal: f64) -> Self {
        Self::new(decimal * 100.0)
    }

    /// Build from a growth multiplier (`1.0123` -> `1.23%`).
    pub fn from_multiplier(multiplier: f64) -> Self {
        Self::new((multiplier - 1.0) * 100.0)
    }

    pub fn percent_delta(&self) -> f64 {
        self.percent_delta
    }

    pub fn as_decimal(&self) -> f64 {
        self.percent_delta / 100.0
    }

    pub fn as_multiplier(&self) -> f64 {
        self.as_decimal() + 1.0
    }

    pub fn with_delta(&self, percent_delta: f64) -> Self {
        Self::new(percent_delta)
    }

    /// Sum of the two deltas. Not compounding; see [`crate::domain::reducer::compose`].
    pub fn add(&self, other: Price) -> Self {
        Self::new(self.percent_delta + other.percent_delta)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.3}%", self.percent_delta)
    }
}

impl From<f64> for Price {
    fn from(percent_delta: f64) -> Self {
        Self::new(percent_delta)
    }
}
