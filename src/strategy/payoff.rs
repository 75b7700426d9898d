//! Payoff engine: realized payoff-at-expiry across a price range, and
//! mark-to-market P/L across the time axis. Two different curves answering
//! two different questions -- they are never conflated.

use crate::models::black_scholes::{self, DAYS_PER_YEAR, RISK_FREE_RATE};
use crate::models::norm::{floor_finite, MIN_PRICE};
use crate::state::Leg;

/// Sample intervals for the payoff curve (curve has `CURVE_STEPS + 1` points).
pub const CURVE_STEPS: usize = 180;

/// Sample intervals for the time-decay curve.
pub const DECAY_STEPS: usize = 30;

/// Bounds for the price-range fraction around spot.
pub const RANGE_PCT_MIN: f64 = 0.10;
pub const RANGE_PCT_MAX: f64 = 0.80;

/// One sample of the expiry payoff curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub pl: f64,
}

/// One sample of the time-decay curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DecayPoint {
    pub days_passed: f64,
    pub pl: f64,
}

/// Realized P/L of one leg if held to expiry with the stock at `stock_price`:
/// intrinsic minus entry premium, signed by side, scaled by quantity.
/// Independent of the current mark.
#[inline]
pub fn leg_payoff(leg: &Leg, stock_price: f64) -> f64 {
    let intrinsic = leg.kind.intrinsic(stock_price, leg.strike);
    leg.side.sign() * leg.quantity as f64 * (intrinsic - leg.entry_premium)
}

/// Sum of [`leg_payoff`] over all legs. Pure, O(legs).
pub fn aggregate_payoff(legs: &[Leg], stock_price: f64) -> f64 {
    legs.iter().map(|leg| leg_payoff(leg, stock_price)).sum()
}

/// Sample the aggregate expiry payoff over `[spot*(1-p), spot*(1+p)]`,
/// with `p` clamped to `[0.10, 0.80]` and the lower bound floored at 0.01.
///
/// The returned sequence is the single source for plotting, breakeven
/// detection, and max-profit/max-loss estimation.
pub fn payoff_curve(legs: &[Leg], spot: f64, range_percent: f64) -> Vec<PayoffPoint> {
    let spot = floor_finite(spot, MIN_PRICE);
    let pct = floor_finite(range_percent, RANGE_PCT_MIN).min(RANGE_PCT_MAX);
    let min = (spot * (1.0 - pct)).max(MIN_PRICE);
    let max = spot * (1.0 + pct);

    let mut points = Vec::with_capacity(CURVE_STEPS + 1);
    for i in 0..=CURVE_STEPS {
        let price = min + (max - min) * i as f64 / CURVE_STEPS as f64;
        points.push(PayoffPoint {
            price,
            pl: aggregate_payoff(legs, price),
        });
    }
    points
}

/// Mark-to-market P/L of the whole position: model value minus entry
/// premium per leg, signed and scaled, aggregated.
pub fn mark_to_market(legs: &[Leg], spot: f64, t_years: f64, r: f64, sigma: f64) -> f64 {
    legs.iter()
        .map(|leg| {
            let mark = black_scholes::price(spot, leg.strike, t_years, r, sigma, leg.kind);
            leg.side.sign() * leg.quantity as f64 * (mark - leg.entry_premium)
        })
        .sum()
}

/// Sample mark-to-market P/L at a fixed spot and volatility over
/// `DECAY_STEPS` even intervals between now and expiry.
pub fn time_decay_curve(
    legs: &[Leg],
    spot: f64,
    days_to_expiry: f64,
    volatility: f64,
) -> Vec<DecayPoint> {
    let days = floor_finite(days_to_expiry, 0.0);

    let mut points = Vec::with_capacity(DECAY_STEPS + 1);
    for i in 0..=DECAY_STEPS {
        let days_passed = days * i as f64 / DECAY_STEPS as f64;
        let t_years = (days - days_passed) / DAYS_PER_YEAR;
        points.push(DecayPoint {
            days_passed,
            pl: mark_to_market(legs, spot, t_years, RISK_FREE_RATE, volatility),
        });
    }
    points
}
