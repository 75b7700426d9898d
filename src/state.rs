use crate::models::norm::{floor_finite, MIN_PREMIUM, MIN_PRICE};
use crate::models::Greeks;
use crate::strategy::payoff::{DecayPoint, PayoffPoint};
use portable_atomic::{AtomicU64, Ordering};
use uuid::Uuid;

// ── Simulator State Machine ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimState {
    Idle,
    Running,
}

impl std::fmt::Display for SimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Why a simulation run left the `Running` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Explicit stop command from the host.
    Command,
    /// Fixed tick budget exhausted.
    TickBudget,
    /// Days-to-expiry reached zero.
    Expired,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => write!(f, "stop command"),
            Self::TickBudget => write!(f, "tick budget"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Simulation clock. Created on start, mutated every tick, reset on stop.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SimClock {
    pub days_to_expiry: f64,
    pub ticks_elapsed: u64,
}

// ── Leg / Strategy Types ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Payoff sign: +1 for bought legs, -1 for sold legs.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Payoff if exercised immediately at `spot`.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

/// One option position within a strategy.
///
/// `entry_premium` is the cost basis and the input to payoff/breakeven math;
/// `mark_premium` is the current theoretical value, rewritten by the
/// simulator each tick and never used for realized payoff.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Leg {
    pub side: Side,
    pub kind: OptionKind,
    pub strike: f64,
    pub entry_premium: f64,
    pub mark_premium: f64,
    pub quantity: u32,
}

impl Leg {
    /// Build a leg with invariants enforced: strike and premium floored at
    /// 0.01, quantity at 1. Non-finite numerics fall back to the floors.
    pub fn new(side: Side, kind: OptionKind, strike: f64, premium: f64, quantity: u32) -> Self {
        let premium = floor_finite(premium, MIN_PREMIUM);
        Self {
            side,
            kind,
            strike: floor_finite(strike, MIN_PRICE),
            entry_premium: premium,
            mark_premium: premium,
            quantity: quantity.max(1),
        }
    }

    /// The neutral leg seeded when a strategy would otherwise be empty:
    /// a single bought call struck at the current spot.
    pub fn default_at(spot: f64) -> Self {
        Self::new(Side::Buy, OptionKind::Call, spot, 1.0, 1)
    }

    /// Apply a field-level edit, clamping each updated field independently.
    /// Editing the entry premium resets the mark to the new basis.
    pub fn apply(&mut self, edit: &LegEdit) {
        if let Some(side) = edit.side {
            self.side = side;
        }
        if let Some(kind) = edit.kind {
            self.kind = kind;
        }
        if let Some(strike) = edit.strike {
            self.strike = floor_finite(strike, MIN_PRICE);
        }
        if let Some(premium) = edit.entry_premium {
            self.entry_premium = floor_finite(premium, MIN_PREMIUM);
            self.mark_premium = self.entry_premium;
        }
        if let Some(quantity) = edit.quantity {
            self.quantity = quantity.max(1);
        }
    }
}

/// Partial leg update. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct LegEdit {
    pub side: Option<Side>,
    pub kind: Option<OptionKind>,
    pub strike: Option<f64>,
    pub entry_premium: Option<f64>,
    pub quantity: Option<u32>,
}

// ── Messages INTO the engine task (host binary) ──

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Tick,
    Shutdown,
}

// ── Engine snapshot (derived state returned by every command) ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineSnapshot {
    pub sim_state: SimState,
    pub run_id: Option<Uuid>,
    pub timestamp: String,
    pub spot: f64,
    pub range_percent: f64,
    pub days_to_expiry: f64,
    pub volatility: f64,
    pub ticks_elapsed: u64,
    pub note: String,
    pub legs: Vec<Leg>,
    pub payoff_curve: Vec<PayoffPoint>,
    pub time_decay: Vec<DecayPoint>,
    pub breakevens: Vec<f64>,
    /// Realized P/L at the current spot if held to expiry.
    pub spot_pl: f64,
    /// Current mark-to-market P/L (model value minus basis).
    pub mark_pl: f64,
    /// Max/min of the sampled payoff curve -- an approximation, not an
    /// analytic bound; unbounded legs report the sampled boundary value.
    pub max_profit: f64,
    pub max_loss: f64,
    pub position_greeks: Greeks,
    pub counters: CounterSnapshot,
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub commands_applied: AtomicU64,
    pub ticks_processed: AtomicU64,
    pub snapshots_built: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            commands_applied: AtomicU64::new(0),
            ticks_processed: AtomicU64::new(0),
            snapshots_built: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            commands_applied: self.commands_applied.load(Ordering::Relaxed),
            ticks_processed: self.ticks_processed.load(Ordering::Relaxed),
            snapshots_built: self.snapshots_built.load(Ordering::Relaxed),
        }
    }
}

impl Default for PerfCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CounterSnapshot {
    pub commands_applied: u64,
    pub ticks_processed: u64,
    pub snapshots_built: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_invariants_clamped() {
        let leg = Leg::new(Side::Buy, OptionKind::Call, -10.0, 0.0, 0);
        assert_eq!(leg.strike, MIN_PRICE);
        assert_eq!(leg.entry_premium, MIN_PREMIUM);
        assert_eq!(leg.mark_premium, MIN_PREMIUM);
        assert_eq!(leg.quantity, 1);
    }

    #[test]
    fn test_leg_non_finite_falls_to_floors() {
        let leg = Leg::new(Side::Sell, OptionKind::Put, f64::NAN, f64::INFINITY, 3);
        assert_eq!(leg.strike, MIN_PRICE);
        assert_eq!(leg.entry_premium, MIN_PREMIUM);
        assert_eq!(leg.quantity, 3);
    }

    #[test]
    fn test_edit_clamps_per_field() {
        let mut leg = Leg::new(Side::Buy, OptionKind::Call, 100.0, 5.0, 1);
        leg.apply(&LegEdit {
            strike: Some(f64::NAN),
            quantity: Some(0),
            ..LegEdit::default()
        });
        assert_eq!(leg.strike, MIN_PRICE);
        assert_eq!(leg.quantity, 1);
        // untouched fields survive
        assert_eq!(leg.entry_premium, 5.0);
        assert_eq!(leg.side, Side::Buy);
    }

    #[test]
    fn test_edit_premium_resets_mark() {
        let mut leg = Leg::new(Side::Buy, OptionKind::Call, 100.0, 5.0, 1);
        leg.mark_premium = 7.5;
        leg.apply(&LegEdit {
            entry_premium: Some(4.0),
            ..LegEdit::default()
        });
        assert_eq!(leg.entry_premium, 4.0);
        assert_eq!(leg.mark_premium, 4.0);
    }

    #[test]
    fn test_intrinsic() {
        assert_eq!(OptionKind::Call.intrinsic(110.0, 100.0), 10.0);
        assert_eq!(OptionKind::Call.intrinsic(90.0, 100.0), 0.0);
        assert_eq!(OptionKind::Put.intrinsic(90.0, 100.0), 10.0);
        assert_eq!(OptionKind::Put.intrinsic(110.0, 100.0), 0.0);
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Buy.sign(), 1.0);
        assert_eq!(Side::Sell.sign(), -1.0);
    }
}
