//! Drives a pricing strategy across a day range.

use crate::domain::price::{Price, PriceHistory};
use crate::domain::pricing_strategy::PricingStrategy;

pub struct PricingManager {
    strategy: Box<dyn PricingStrategy>,
}

impl PricingManager {
    pub fn new(strategy: Box<dyn PricingStrategy>) -> Self {
        Self { strategy }
    }

    /// Prices for periods `[from_period, to_period)` in increasing order.
    /// An empty or inverted range yields an empty history.
    pub fn calculate_prices(&mut self, from_period: u64, to_period: u64) -> PriceHistory {
        let capacity = to_period.saturating_sub(from_period) as usize;
        let mut history: Vec<Price> = Vec::with_capacity(capacity);
        for period in from_period..to_period {
            let price = self.strategy.calculate_price(period, &history);
            history.push(price);
        }
        history
    }
}
