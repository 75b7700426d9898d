//! Numeric primitives: the safe-input sanitizer and the closed-form normal
//! CDF approximation every pricing path goes through.

/// Floor for spot and strike inputs. Keeps `ln(S/K)` defined.
pub const MIN_PRICE: f64 = 0.01;

/// Floor for premiums on legs. Avoids degenerate zero-cost positions.
pub const MIN_PREMIUM: f64 = 0.01;

/// Floor for volatility. Keeps `d1` free of division by zero.
pub const MIN_SIGMA: f64 = 1e-4;

/// 1 / sqrt(2*pi)
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

// Abramowitz & Stegun 26.2.17 coefficients; max error ~7.5e-8
const P: f64 = 0.231_641_9;
const B1: f64 = 0.319_381_530;
const B2: f64 = -0.356_563_782;
const B3: f64 = 1.781_477_937;
const B4: f64 = -1.821_255_978;
const B5: f64 = 1.330_274_429;

/// Clamp a value to a floor; non-finite input falls back to the floor itself.
#[inline]
pub fn floor_finite(v: f64, floor: f64) -> f64 {
    if v.is_finite() {
        v.max(floor)
    } else {
        floor
    }
}

/// Clamp pricing inputs to numerically safe values.
///
/// Returns `(spot, strike, t_years, sigma)` with spot/strike floored at
/// [`MIN_PRICE`], time at 0, and sigma at [`MIN_SIGMA`]. The pricer never
/// rejects input -- the host may feed transient garbage while a field is
/// being edited, and pricing must keep returning finite numbers.
#[inline]
pub fn sanitize_inputs(s: f64, k: f64, t: f64, sigma: f64) -> (f64, f64, f64, f64) {
    (
        floor_finite(s, MIN_PRICE),
        floor_finite(k, MIN_PRICE),
        floor_finite(t, 0.0),
        floor_finite(sigma, MIN_SIGMA),
    )
}

/// Standard normal density.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF via the Abramowitz-Stegun rational polynomial.
///
/// Branches on the sign of `x` using the symmetry `Phi(-x) = 1 - Phi(x)`;
/// `Phi(0)` is exactly 0.5. Deterministic, ~1e-7 accurate over common ranges.
pub fn norm_cdf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.5;
    }
    if x < 0.0 {
        return 1.0 - norm_cdf(-x);
    }
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    1.0 - norm_pdf(x) * poly
}
