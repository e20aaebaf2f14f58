//! Historical price source port trait.

use crate::domain::error::LevsimError;
use crate::domain::price::Price;

/// Supplies the pool of historical daily changes that strategies draw from.
pub trait PriceSourcePort {
    fn load_daily_changes(&self) -> Result<Vec<Price>, LevsimError>;
}
