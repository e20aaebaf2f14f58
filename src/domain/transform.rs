//! Element-wise price-history transforms.

use crate::domain::price::Price;

/// Scale every day's return by `factor`.
pub fn leverage(history: &[Price], factor: f64) -> Vec<Price> {
    history
        .iter()
        .map(|p| p.with_delta(p.percent_delta() * factor))
        .collect()
}

/// Apply a per-day fee of `rate_percent` as `delta * (1 - rate/100)`.
pub fn expense_ratio(history: &[Price], rate_percent: f64) -> Vec<Price> {
    let keep = 1.0 - rate_percent / 100.0;
    history
        .iter()
        .map(|p| p.with_delta(p.percent_delta() * keep))
        .collect()
}

/// Spread an annual rate evenly over the trading days of a year.
pub fn daily_rate(annual_rate_percent: f64, trading_days_per_year: u32) -> f64 {
    annual_rate_percent / trading_days_per_year as f64
}
