//! Geometric compounding of daily returns.

use crate::domain::price::Price;

/// Compound two returns: `(1 + a)(1 + b) - 1` in percent space.
pub fn compose(a: Price, b: Price) -> Price {
    Price::from_multiplier(a.as_multiplier() * b.as_multiplier())
}

/// Cumulative return of an ordered history. Empty history -> 0%.
pub fn reduce(history: &[Price]) -> Price {
    history.iter().copied().fold(Price::zero(), compose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn prices(deltas: &[f64]) -> Vec<Price> {
        deltas.iter().copied().map(Price::new).collect()
    }

    #[test]
    fn empty_history_is_identity() {
        assert_eq!(reduce(&[]), Price::zero());
    }

    #[test]
    fn compounds_rather_than_sums() {
        // 1.10 * 0.90 = 0.99
        assert_relative_eq!(reduce(&prices(&[10.0, -10.0])).percent_delta(), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn leveraged_swing_loses_four_percent() {
        let leveraged = crate::domain::transform::leverage(&prices(&[10.0, -10.0]), 2.0);
        // 1.20 * 0.80 = 0.96
        assert_relative_eq!(reduce(&leveraged).percent_delta(), -4.0, epsilon = 1e-9);
    }

    #[test]
    fn total_loss_stays_at_minus_hundred() {
        let out = reduce(&prices(&[5.0, -100.0, 20.0]));
        assert_relative_eq!(out.percent_delta(), -100.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn single_day_compounds_to_itself(delta in -99.0f64..200.0) {
            let out = reduce(&[Price::new(delta)]);
            prop_assert!((out.percent_delta() - delta).abs() < 1e-9);
        }

        #[test]
        fn concatenation_multiplies(
            a in prop::collection::vec(-20.0f64..20.0, 0..40),
            b in prop::collection::vec(-20.0f64..20.0, 0..40),
        ) {
            let h1 = prices(&a);
            let h2 = prices(&b);
            let joined: Vec<Price> = h1.iter().chain(h2.iter()).copied().collect();
            let whole = reduce(&joined).as_multiplier();
            let parts = reduce(&h1).as_multiplier() * reduce(&h2).as_multiplier();
            prop_assert!((whole - parts).abs() <= 1e-9 * parts.abs().max(1.0));
        }
    }
}
