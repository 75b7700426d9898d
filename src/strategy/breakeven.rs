//! Breakeven solver over the sampled payoff curve.

use crate::strategy::payoff::PayoffPoint;

/// Zero-crossing prices of the sampled payoff curve.
///
/// Scans consecutive point pairs for a sign change (the payoff crosses or
/// touches zero), linearly interpolates the crossing price, rounds to cents
/// and de-duplicates. Accuracy is bounded by the curve's sampling density:
/// crossings narrower than one sample interval can be missed.
pub fn breakevens(curve: &[PayoffPoint]) -> Vec<f64> {
    let mut found: Vec<f64> = Vec::new();

    for pair in curve.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let crosses = (a.pl <= 0.0 && b.pl >= 0.0) || (a.pl >= 0.0 && b.pl <= 0.0);
        if !crosses {
            continue;
        }

        let dy = b.pl - a.pl;
        let x = if dy == 0.0 {
            // flat interval touching zero: no interpolation possible
            a.price
        } else {
            a.price + (b.price - a.price) * (0.0 - a.pl) / dy
        };

        let rounded = (x * 100.0).round() / 100.0;
        // values are rounded to cents, so exact comparison is well-defined
        if !found.iter().any(|&v| v == rounded) {
            found.push(rounded);
        }
    }

    found
}
