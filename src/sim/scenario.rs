//! Market scenario catalog. Immutable entries; the selected scenario seeds
//! the engine's volatility and drives the simulator's random walk.

/// A market regime for the simulator: per-tick expected return plus the
/// annualized volatility seeded into the engine on start.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Scenario {
    pub id: &'static str,
    pub label: &'static str,
    /// Expected return per tick.
    pub drift: f64,
    /// Annualized standard deviation.
    pub volatility: f64,
    pub description: &'static str,
}

pub const DEFAULT_SCENARIO: &str = "sideways_chop";

pub static SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "sideways_chop",
        label: "Sideways Chop",
        drift: 0.0,
        volatility: 0.14,
        description: "Rangebound tape with modest day-to-day noise.",
    },
    Scenario {
        id: "steady_grind",
        label: "Steady Grind Up",
        drift: 0.0009,
        volatility: 0.18,
        description: "Slow bullish drift with ordinary volatility.",
    },
    Scenario {
        id: "slow_bleed",
        label: "Slow Bleed",
        drift: -0.0011,
        volatility: 0.22,
        description: "Grinding decline that punishes long-delta positions.",
    },
    Scenario {
        id: "melt_up",
        label: "Melt-Up",
        drift: 0.0025,
        volatility: 0.32,
        description: "Fast rally with elevated volatility on the way up.",
    },
    Scenario {
        id: "panic_slide",
        label: "Panic Slide",
        drift: -0.003,
        volatility: 0.48,
        description: "Sharp selloff with volatility expansion.",
    },
];

/// Look up a scenario by id.
pub fn find(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.id == id)
}
