pub mod black_scholes;
pub mod norm;

/// First-order sensitivities of an option price: to spot (delta), to one
/// calendar day of decay (theta), and to one volatility point (vega).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub theta: f64,
    pub vega: f64,
}

impl Greeks {
    pub const ZERO: Greeks = Greeks {
        delta: 0.0,
        theta: 0.0,
        vega: 0.0,
    };

    /// Scale all sensitivities, e.g. by signed quantity for a position leg.
    #[inline]
    pub fn scaled(self, factor: f64) -> Greeks {
        Greeks {
            delta: self.delta * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
        }
    }
}

impl std::ops::Add for Greeks {
    type Output = Greeks;

    fn add(self, rhs: Greeks) -> Greeks {
        Greeks {
            delta: self.delta + rhs.delta,
            theta: self.theta + rhs.theta,
            vega: self.vega + rhs.vega,
        }
    }
}
