//! Time-stepped stochastic price-path simulator.
//!
//! Two states, `Idle` and `Running`. Each tick advances the spot along a
//! discrete random walk, burns half a calendar day, re-marks every leg, and
//! then checks the terminal conditions: stop command, tick budget, expiry.

use crate::models::black_scholes::{self, DAYS_PER_YEAR, RISK_FREE_RATE};
use crate::models::norm::{floor_finite, MIN_PREMIUM, MIN_PRICE};
use crate::sim::scenario::Scenario;
use crate::state::{Leg, SimClock, SimState, StopReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Hard cap on ticks per simulation run.
pub const TICK_BUDGET: u64 = 60;

/// Calendar days consumed per tick.
pub const DAY_STEP: f64 = 0.5;

/// Trading days per year, scales annualized volatility to one step.
const TRADING_DAYS: f64 = 252.0;

/// What one tick did to the world.
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    pub spot: f64,
    pub days_to_expiry: f64,
    pub ticks_elapsed: u64,
    /// Set when this tick was terminal.
    pub stopped: Option<StopReason>,
}

pub struct Simulator {
    state: SimState,
    clock: SimClock,
    scenario: Option<&'static Scenario>,
    run_id: Option<Uuid>,
    rng: StdRng,
}

impl Simulator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic simulator for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            state: SimState::Idle,
            clock: SimClock {
                days_to_expiry: 0.0,
                ticks_elapsed: 0,
            },
            scenario: None,
            run_id: None,
            rng,
        }
    }

    #[inline]
    pub fn state(&self) -> SimState {
        self.state
    }

    #[inline]
    pub fn clock(&self) -> SimClock {
        self.clock
    }

    #[inline]
    pub fn scenario(&self) -> Option<&'static Scenario> {
        self.scenario
    }

    #[inline]
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Idle -> Running. Resets the tick counter and arms the clock.
    /// Starting while already running restarts the run.
    pub fn start(&mut self, scenario: &'static Scenario, days_to_expiry: f64) -> Uuid {
        self.state = SimState::Running;
        self.clock = SimClock {
            days_to_expiry: floor_finite(days_to_expiry, 0.0),
            ticks_elapsed: 0,
        };
        self.scenario = Some(scenario);
        let run_id = Uuid::new_v4();
        self.run_id = Some(run_id);
        run_id
    }

    /// Explicit stop command. Returns the reason if a run was terminated,
    /// `None` if already idle.
    pub fn stop(&mut self) -> Option<StopReason> {
        if self.state != SimState::Running {
            return None;
        }
        self.halt();
        Some(StopReason::Command)
    }

    /// Advance one tick. `None` when idle (ticks after termination are
    /// no-ops and mutate nothing).
    ///
    /// The spot step is `spot * (1 + drift + volatility * sqrt(1/252) * shock)`
    /// with the shock drawn uniformly from [-1, 1], a coarse stand-in for a
    /// standard normal draw.
    pub fn advance(&mut self, spot: f64, volatility: f64, legs: &mut [Leg]) -> Option<TickOutcome> {
        if self.state != SimState::Running {
            return None;
        }
        let scenario = self.scenario?;

        let shock: f64 = self.rng.random_range(-1.0..=1.0);
        let step = scenario.drift + volatility * (1.0 / TRADING_DAYS).sqrt() * shock;
        let spot = (spot * (1.0 + step)).max(MIN_PRICE);

        self.clock.days_to_expiry = (self.clock.days_to_expiry - DAY_STEP).max(0.0);
        self.clock.ticks_elapsed += 1;

        // re-mark every leg at the new spot and remaining time
        let t_years = self.clock.days_to_expiry / DAYS_PER_YEAR;
        for leg in legs.iter_mut() {
            let mark =
                black_scholes::price(spot, leg.strike, t_years, RISK_FREE_RATE, volatility, leg.kind);
            leg.mark_premium = mark.max(MIN_PREMIUM);
        }

        // terminal conditions, checked after this tick's mutation
        let stopped = if self.clock.ticks_elapsed >= TICK_BUDGET {
            Some(StopReason::TickBudget)
        } else if self.clock.days_to_expiry <= 0.0 {
            Some(StopReason::Expired)
        } else {
            None
        };

        let outcome = TickOutcome {
            spot,
            days_to_expiry: self.clock.days_to_expiry,
            ticks_elapsed: self.clock.ticks_elapsed,
            stopped,
        };

        if stopped.is_some() {
            self.halt();
        }
        Some(outcome)
    }

    fn halt(&mut self) {
        self.state = SimState::Idle;
        self.scenario = None;
        self.run_id = None;
        self.clock = SimClock {
            days_to_expiry: 0.0,
            ticks_elapsed: 0,
        };
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scenario;
    use crate::state::{OptionKind, Side};

    fn straddle() -> Vec<Leg> {
        vec![
            Leg::new(Side::Buy, OptionKind::Call, 100.0, 6.2, 1),
            Leg::new(Side::Buy, OptionKind::Put, 100.0, 5.8, 1),
        ]
    }

    #[test]
    fn test_starts_idle_and_tick_is_noop() {
        let mut sim = Simulator::with_seed(7);
        assert_eq!(sim.state(), SimState::Idle);
        let mut legs = straddle();
        let before = legs[0].mark_premium;
        assert!(sim.advance(100.0, 0.2, &mut legs).is_none());
        assert_eq!(legs[0].mark_premium, before);
    }

    #[test]
    fn test_start_arms_clock_and_run_id() {
        let mut sim = Simulator::with_seed(7);
        let scenario = scenario::find("sideways_chop").unwrap();
        let run_id = sim.start(scenario, 30.0);
        assert_eq!(sim.state(), SimState::Running);
        assert_eq!(sim.clock().ticks_elapsed, 0);
        assert_eq!(sim.clock().days_to_expiry, 30.0);
        assert_eq!(sim.run_id(), Some(run_id));
    }

    #[test]
    fn test_tick_mutates_marks_but_never_entries() {
        let mut sim = Simulator::with_seed(42);
        let scenario = scenario::find("panic_slide").unwrap();
        sim.start(scenario, 30.0);

        let mut legs = straddle();
        let entries: Vec<f64> = legs.iter().map(|l| l.entry_premium).collect();
        let out = sim.advance(100.0, scenario.volatility, &mut legs).unwrap();

        assert!(out.spot > 0.0);
        assert_eq!(out.days_to_expiry, 29.5);
        assert_eq!(out.ticks_elapsed, 1);
        for (leg, entry) in legs.iter().zip(&entries) {
            assert_eq!(leg.entry_premium, *entry, "entry premium must not move");
            assert!(leg.mark_premium >= MIN_PREMIUM);
        }
    }

    #[test]
    fn test_run_terminates_within_budget_and_goes_idle() {
        let mut sim = Simulator::with_seed(1);
        let scenario = scenario::find("sideways_chop").unwrap();
        sim.start(scenario, 30.0);

        let mut legs = straddle();
        let mut spot = 100.0;
        let mut last = None;
        for _ in 0..TICK_BUDGET {
            match sim.advance(spot, scenario.volatility, &mut legs) {
                Some(out) => {
                    spot = out.spot;
                    last = Some(out);
                    if out.stopped.is_some() {
                        break;
                    }
                }
                None => break,
            }
        }

        let last = last.expect("at least one tick ran");
        assert!(last.stopped.is_some(), "run must hit a terminal condition");
        assert_eq!(sim.state(), SimState::Idle);
        // 30 days at 0.5/tick exhausts exactly at the 60-tick budget
        assert_eq!(last.stopped, Some(StopReason::TickBudget));
        assert_eq!(last.days_to_expiry, 0.0);

        // no further mutation after the terminal tick
        let marks: Vec<f64> = legs.iter().map(|l| l.mark_premium).collect();
        assert!(sim.advance(spot, scenario.volatility, &mut legs).is_none());
        let marks_after: Vec<f64> = legs.iter().map(|l| l.mark_premium).collect();
        assert_eq!(marks, marks_after);
    }

    #[test]
    fn test_short_expiry_ends_with_expired() {
        let mut sim = Simulator::with_seed(3);
        let scenario = scenario::find("steady_grind").unwrap();
        sim.start(scenario, 2.0);

        let mut legs = straddle();
        let mut spot = 100.0;
        let mut reason = None;
        for _ in 0..TICK_BUDGET {
            let out = sim.advance(spot, scenario.volatility, &mut legs).unwrap();
            spot = out.spot;
            if let Some(r) = out.stopped {
                reason = Some((r, out.ticks_elapsed));
                break;
            }
        }
        // 2 days at 0.5/tick -> expired on tick 4, well under budget
        assert_eq!(reason, Some((StopReason::Expired, 4)));
        assert_eq!(sim.state(), SimState::Idle);
    }

    #[test]
    fn test_stop_command_is_terminal() {
        let mut sim = Simulator::with_seed(9);
        let scenario = scenario::find("slow_bleed").unwrap();
        sim.start(scenario, 30.0);
        let mut legs = straddle();
        sim.advance(100.0, scenario.volatility, &mut legs).unwrap();

        assert_eq!(sim.stop(), Some(StopReason::Command));
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.stop(), None, "second stop is a no-op");
        assert!(sim.advance(100.0, scenario.volatility, &mut legs).is_none());
    }

    #[test]
    fn test_spot_floored_under_violent_drift() {
        let mut sim = Simulator::with_seed(11);
        let scenario = scenario::find("panic_slide").unwrap();
        sim.start(scenario, 30.0);
        let mut legs = straddle();
        // pathological starting spot still yields a positive price
        let out = sim.advance(1e-9, scenario.volatility, &mut legs).unwrap();
        assert!(out.spot >= MIN_PRICE);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let scenario = scenario::find("sideways_chop").unwrap();
        let run = |seed: u64| {
            let mut sim = Simulator::with_seed(seed);
            sim.start(scenario, 30.0);
            let mut legs = straddle();
            let mut spot = 100.0;
            for _ in 0..10 {
                spot = sim.advance(spot, scenario.volatility, &mut legs).unwrap().spot;
            }
            spot
        };
        assert_eq!(run(5), run(5));
        assert_ne!(run(5), run(6));
    }
}
