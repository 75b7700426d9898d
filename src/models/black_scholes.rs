use crate::models::norm::{norm_cdf, norm_pdf, sanitize_inputs};
use crate::models::Greeks;
use crate::state::OptionKind;

/// Constant risk-free rate used across the engine.
pub const RISK_FREE_RATE: f64 = 0.05;

/// Calendar days per year, for per-day theta and the days/years conversion.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// d1 and d2 of the closed-form solution. Callers must sanitize first and
/// guarantee `t > 0`.
#[inline]
fn d_terms(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> (f64, f64) {
    let sig_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Black-Scholes value of a European option.
///
/// At `t == 0` returns intrinsic value exactly -- the terminal case of the
/// formula, handled explicitly so `d1` never divides by zero. Never panics:
/// inputs are floored to numerically safe values first.
pub fn price(s: f64, k: f64, t: f64, r: f64, sigma: f64, kind: OptionKind) -> f64 {
    let (s, k, t, sigma) = sanitize_inputs(s, k, t, sigma);
    if t == 0.0 {
        return kind.intrinsic(s, k);
    }
    let (d1, d2) = d_terms(s, k, t, r, sigma);
    let disc_k = k * (-r * t).exp();
    match kind {
        OptionKind::Call => s * norm_cdf(d1) - disc_k * norm_cdf(d2),
        OptionKind::Put => disc_k * norm_cdf(-d2) - s * norm_cdf(-d1),
    }
}

/// Sensitivity to spot. At expiry this degenerates to a step function on
/// moneyness: 1/0 for calls, -1/0 for puts (0 exactly at the strike).
pub fn delta(s: f64, k: f64, t: f64, r: f64, sigma: f64, kind: OptionKind) -> f64 {
    let (s, k, t, sigma) = sanitize_inputs(s, k, t, sigma);
    if t == 0.0 {
        return match kind {
            OptionKind::Call => {
                if s > k {
                    1.0
                } else {
                    0.0
                }
            }
            OptionKind::Put => {
                if s < k {
                    -1.0
                } else {
                    0.0
                }
            }
        };
    }
    let (d1, _) = d_terms(s, k, t, r, sigma);
    match kind {
        OptionKind::Call => norm_cdf(d1),
        OptionKind::Put => norm_cdf(d1) - 1.0,
    }
}

/// Per-calendar-day time decay (annual theta / 365). Zero at expiry.
pub fn theta(s: f64, k: f64, t: f64, r: f64, sigma: f64, kind: OptionKind) -> f64 {
    let (s, k, t, sigma) = sanitize_inputs(s, k, t, sigma);
    if t == 0.0 {
        return 0.0;
    }
    let (d1, d2) = d_terms(s, k, t, r, sigma);
    let decay = -s * norm_pdf(d1) * sigma / (2.0 * t.sqrt());
    let disc_k = k * (-r * t).exp();
    let annual = match kind {
        OptionKind::Call => decay - r * disc_k * norm_cdf(d2),
        OptionKind::Put => decay + r * disc_k * norm_cdf(-d2),
    };
    annual / DAYS_PER_YEAR
}

/// Sensitivity to a one-percentage-point change in volatility (annual
/// vega / 100). Zero at expiry. Identical for calls and puts.
pub fn vega(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    let (s, k, t, sigma) = sanitize_inputs(s, k, t, sigma);
    if t == 0.0 {
        return 0.0;
    }
    let (d1, _) = d_terms(s, k, t, r, sigma);
    s * norm_pdf(d1) * t.sqrt() / 100.0
}

/// All three sensitivities in one bundle.
pub fn greeks(s: f64, k: f64, t: f64, r: f64, sigma: f64, kind: OptionKind) -> Greeks {
    Greeks {
        delta: delta(s, k, t, r, sigma, kind),
        theta: theta(s, k, t, r, sigma, kind),
        vega: vega(s, k, t, r, sigma),
    }
}
