//! Strategy preset catalog. Immutable templates the host instantiates;
//! the trader then churns legs from there.

use crate::state::{Leg, OptionKind, Side};
use smallvec::SmallVec;

/// One leg template inside a preset.
#[derive(Debug, Clone, Copy)]
pub struct PresetLeg {
    pub side: Side,
    pub kind: OptionKind,
    pub strike: f64,
    pub premium: f64,
    pub quantity: u32,
}

/// A named strategy template.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub key: &'static str,
    pub label: &'static str,
    pub spot: f64,
    pub legs: &'static [PresetLeg],
    pub note: &'static str,
}

impl Preset {
    /// Materialize the template's legs, invariants enforced.
    pub fn instantiate(&self) -> SmallVec<[Leg; 4]> {
        self.legs
            .iter()
            .map(|leg| Leg::new(leg.side, leg.kind, leg.strike, leg.premium, leg.quantity))
            .collect()
    }
}

const fn leg(side: Side, kind: OptionKind, strike: f64, premium: f64) -> PresetLeg {
    PresetLeg {
        side,
        kind,
        strike,
        premium,
        quantity: 1,
    }
}

pub const DEFAULT_PRESET: &str = "long_straddle";

pub static PRESETS: &[Preset] = &[
    Preset {
        key: "long_call",
        label: "Long Call",
        spot: 100.0,
        legs: &[leg(Side::Buy, OptionKind::Call, 100.0, 5.0)],
        note: "Directional bullish trade with limited downside and unlimited upside.",
    },
    Preset {
        key: "long_put",
        label: "Long Put",
        spot: 100.0,
        legs: &[leg(Side::Buy, OptionKind::Put, 100.0, 4.5)],
        note: "Directional bearish trade with limited downside and large downside participation.",
    },
    Preset {
        key: "bull_call_spread",
        label: "Bull Call Spread",
        spot: 100.0,
        legs: &[
            leg(Side::Buy, OptionKind::Call, 95.0, 8.0),
            leg(Side::Sell, OptionKind::Call, 105.0, 3.8),
        ],
        note: "Defined-risk bullish strategy with capped upside and lower cost than naked long call.",
    },
    Preset {
        key: "bear_put_spread",
        label: "Bear Put Spread",
        spot: 100.0,
        legs: &[
            leg(Side::Buy, OptionKind::Put, 105.0, 7.5),
            leg(Side::Sell, OptionKind::Put, 95.0, 3.2),
        ],
        note: "Defined-risk bearish structure that lowers premium outlay versus long put.",
    },
    Preset {
        key: "long_straddle",
        label: "Long Straddle",
        spot: 100.0,
        legs: &[
            leg(Side::Buy, OptionKind::Call, 100.0, 6.2),
            leg(Side::Buy, OptionKind::Put, 100.0, 5.8),
        ],
        note: "Long-volatility strategy that benefits from large move in either direction.",
    },
    Preset {
        key: "long_strangle",
        label: "Long Strangle",
        spot: 100.0,
        legs: &[
            leg(Side::Buy, OptionKind::Call, 106.0, 3.7),
            leg(Side::Buy, OptionKind::Put, 94.0, 3.4),
        ],
        note: "Cheaper than straddle but needs larger move to reach break-even.",
    },
    Preset {
        key: "iron_condor",
        label: "Iron Condor",
        spot: 100.0,
        legs: &[
            leg(Side::Buy, OptionKind::Put, 90.0, 1.0),
            leg(Side::Sell, OptionKind::Put, 95.0, 2.1),
            leg(Side::Sell, OptionKind::Call, 105.0, 2.0),
            leg(Side::Buy, OptionKind::Call, 110.0, 0.9),
        ],
        note: "Defined-risk short-volatility setup with a broad profitable middle range.",
    },
    Preset {
        key: "iron_butterfly",
        label: "Iron Butterfly",
        spot: 100.0,
        legs: &[
            leg(Side::Buy, OptionKind::Put, 92.0, 1.1),
            leg(Side::Sell, OptionKind::Put, 100.0, 4.5),
            leg(Side::Sell, OptionKind::Call, 100.0, 4.6),
            leg(Side::Buy, OptionKind::Call, 108.0, 1.2),
        ],
        note: "High-credit defined-risk short-volatility trade with tighter profit zone than condor.",
    },
];

/// Look up a preset by key.
pub fn find(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_exists() {
        assert!(find(DEFAULT_PRESET).is_some());
    }

    #[test]
    fn test_unknown_key_is_none() {
        assert!(find("covered_wagon").is_none());
    }

    #[test]
    fn test_keys_unique() {
        for (i, a) in PRESETS.iter().enumerate() {
            for b in &PRESETS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_all_presets_instantiate_with_valid_invariants() {
        for preset in PRESETS {
            let legs = preset.instantiate();
            assert!(!legs.is_empty(), "{} has no legs", preset.key);
            for leg in &legs {
                assert!(leg.strike > 0.0);
                assert!(leg.entry_premium > 0.0);
                assert_eq!(leg.mark_premium, leg.entry_premium);
                assert!(leg.quantity >= 1);
            }
        }
    }
}
