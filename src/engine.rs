//! The strategy engine session: the single owner of the leg list, spot and
//! simulation clock. Every command mutates, clamps, and hands back the full
//! derived state -- the host never reaches into shared globals.

use crate::config::AppConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::black_scholes::{self, DAYS_PER_YEAR, RISK_FREE_RATE};
use crate::models::norm::{floor_finite, MIN_PRICE, MIN_SIGMA};
use crate::models::Greeks;
use crate::sim::scenario;
use crate::sim::simulator::Simulator;
use crate::state::{EngineSnapshot, Leg, LegEdit, PerfCounters, SimState};
use crate::strategy::payoff::{self, RANGE_PCT_MAX, RANGE_PCT_MIN};
use crate::strategy::{breakeven, presets};
use portable_atomic::Ordering;
use smallvec::SmallVec;

pub struct StrategyEngine {
    legs: SmallVec<[Leg; 4]>,
    spot: f64,
    range_percent: f64,
    days_to_expiry: f64,
    volatility: f64,
    note: String,
    sim: Simulator,
    counters: PerfCounters,
}

impl StrategyEngine {
    /// Build an engine from host config: preset applied, clock armed,
    /// simulator seeded if the config asks for reproducibility.
    pub fn new(config: &AppConfig) -> EngineResult<Self> {
        let sim = match config.sim_seed {
            Some(seed) => Simulator::with_seed(seed),
            None => Simulator::new(),
        };

        let mut engine = Self {
            legs: SmallVec::new(),
            spot: 100.0,
            range_percent: clamp_range(config.range_percent),
            days_to_expiry: floor_finite(config.days_to_expiry, 0.0),
            volatility: floor_finite(config.volatility, MIN_SIGMA),
            note: String::new(),
            sim,
            counters: PerfCounters::new(),
        };
        engine.apply_preset(&config.preset)?;
        Ok(engine)
    }

    /// Convenience constructor with default config values.
    pub fn from_preset(key: &str) -> EngineResult<Self> {
        let config = AppConfig {
            preset: key.to_string(),
            ..AppConfig::default()
        };
        Self::new(&config)
    }

    // ── accessors ──

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn days_to_expiry(&self) -> f64 {
        self.days_to_expiry
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn sim_state(&self) -> SimState {
        self.sim.state()
    }

    // ── strategy commands ──

    /// Replace the current strategy with a preset: its legs, spot and note.
    /// Range, clock and volatility inputs are left as-is.
    pub fn apply_preset(&mut self, key: &str) -> EngineResult<EngineSnapshot> {
        let preset =
            presets::find(key).ok_or_else(|| EngineError::UnknownPreset(key.to_string()))?;
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.legs = preset.instantiate();
        self.spot = preset.spot;
        self.note = preset.note.to_string();
        tracing::info!(preset = preset.key, legs = self.legs.len(), "preset applied");
        Ok(self.snapshot())
    }

    pub fn add_leg(&mut self, leg: Leg) -> EngineSnapshot {
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.legs.push(leg);
        self.snapshot()
    }

    /// Add the default neutral leg: a bought call struck at current spot.
    pub fn add_default_leg(&mut self) -> EngineSnapshot {
        self.add_leg(Leg::default_at(self.spot))
    }

    pub fn edit_leg(&mut self, index: usize, edit: LegEdit) -> EngineResult<EngineSnapshot> {
        let len = self.legs.len();
        let leg = self
            .legs
            .get_mut(index)
            .ok_or(EngineError::LegIndex { index, len })?;
        leg.apply(&edit);
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        Ok(self.snapshot())
    }

    /// Remove a leg. A strategy is never left empty: removing the last leg
    /// re-seeds the default neutral leg.
    pub fn remove_leg(&mut self, index: usize) -> EngineResult<EngineSnapshot> {
        let len = self.legs.len();
        if index >= len {
            return Err(EngineError::LegIndex { index, len });
        }
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.legs.remove(index);
        if self.legs.is_empty() {
            self.legs.push(Leg::default_at(self.spot));
        }
        Ok(self.snapshot())
    }

    // ── input commands (clamped, never rejected) ──

    pub fn set_spot(&mut self, spot: f64) -> EngineSnapshot {
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.spot = floor_finite(spot, MIN_PRICE);
        self.snapshot()
    }

    pub fn set_range_percent(&mut self, fraction: f64) -> EngineSnapshot {
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.range_percent = clamp_range(fraction);
        self.snapshot()
    }

    pub fn set_days_to_expiry(&mut self, days: f64) -> EngineSnapshot {
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.days_to_expiry = floor_finite(days, 0.0);
        self.snapshot()
    }

    pub fn set_volatility(&mut self, sigma: f64) -> EngineSnapshot {
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.volatility = floor_finite(sigma, MIN_SIGMA);
        self.snapshot()
    }

    // ── simulation commands ──

    /// Start (or restart) a simulation run. Seeds the engine volatility
    /// from the scenario and arms the clock with the current days-to-expiry.
    pub fn start_simulation(&mut self, scenario_id: &str) -> EngineResult<EngineSnapshot> {
        let scenario = scenario::find(scenario_id)
            .ok_or_else(|| EngineError::UnknownScenario(scenario_id.to_string()))?;
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        self.volatility = scenario.volatility;
        let run_id = self.sim.start(scenario, self.days_to_expiry);
        tracing::info!(
            scenario = scenario.id,
            run_id = %run_id,
            days = self.days_to_expiry,
            volatility = self.volatility,
            "simulation started"
        );
        Ok(self.snapshot())
    }

    pub fn stop_simulation(&mut self) -> EngineSnapshot {
        self.counters.commands_applied.fetch_add(1, Ordering::Relaxed);
        if let Some(reason) = self.sim.stop() {
            tracing::info!(%reason, "simulation stopped");
        }
        self.snapshot()
    }

    /// Advance the simulation one tick. A no-op while idle.
    pub fn tick(&mut self) -> EngineSnapshot {
        self.counters.ticks_processed.fetch_add(1, Ordering::Relaxed);
        if let Some(out) = self.sim.advance(self.spot, self.volatility, &mut self.legs) {
            self.spot = out.spot;
            self.days_to_expiry = out.days_to_expiry;
            tracing::debug!(
                tick = out.ticks_elapsed,
                spot = out.spot,
                days = out.days_to_expiry,
                "tick applied"
            );
            if let Some(reason) = out.stopped {
                tracing::info!(%reason, ticks = out.ticks_elapsed, spot = out.spot, "simulation finished");
            }
        }
        self.snapshot()
    }

    // ── derived state ──

    /// Compute the full derived state: both curves, breakevens, summary
    /// values and position Greeks. Pure with respect to engine inputs.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.counters.snapshots_built.fetch_add(1, Ordering::Relaxed);

        let payoff_curve = payoff::payoff_curve(&self.legs, self.spot, self.range_percent);
        let time_decay =
            payoff::time_decay_curve(&self.legs, self.spot, self.days_to_expiry, self.volatility);
        let breakevens = breakeven::breakevens(&payoff_curve);

        let mut max_profit = f64::NEG_INFINITY;
        let mut max_loss = f64::INFINITY;
        for point in &payoff_curve {
            max_profit = max_profit.max(point.pl);
            max_loss = max_loss.min(point.pl);
        }

        let t_years = self.days_to_expiry / DAYS_PER_YEAR;
        let mut position_greeks = Greeks::ZERO;
        for leg in &self.legs {
            let g = black_scholes::greeks(
                self.spot,
                leg.strike,
                t_years,
                RISK_FREE_RATE,
                self.volatility,
                leg.kind,
            );
            position_greeks = position_greeks + g.scaled(leg.side.sign() * leg.quantity as f64);
        }

        EngineSnapshot {
            sim_state: self.sim.state(),
            run_id: self.sim.run_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            spot: self.spot,
            range_percent: self.range_percent,
            days_to_expiry: self.days_to_expiry,
            volatility: self.volatility,
            ticks_elapsed: self.sim.clock().ticks_elapsed,
            note: self.note.clone(),
            legs: self.legs.to_vec(),
            spot_pl: payoff::aggregate_payoff(&self.legs, self.spot),
            mark_pl: payoff::mark_to_market(
                &self.legs,
                self.spot,
                t_years,
                RISK_FREE_RATE,
                self.volatility,
            ),
            payoff_curve,
            time_decay,
            breakevens,
            max_profit,
            max_loss,
            position_greeks,
            counters: self.counters.snapshot(),
        }
    }
}

fn clamp_range(fraction: f64) -> f64 {
    floor_finite(fraction, RANGE_PCT_MIN).min(RANGE_PCT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{OptionKind, Side};

    fn seeded(preset: &str) -> StrategyEngine {
        let config = AppConfig {
            preset: preset.to_string(),
            sim_seed: Some(42),
            ..AppConfig::default()
        };
        StrategyEngine::new(&config).unwrap()
    }

    #[test]
    fn test_unknown_preset_and_scenario_error() {
        assert!(matches!(
            StrategyEngine::from_preset("covered_wagon"),
            Err(EngineError::UnknownPreset(_))
        ));
        let mut engine = seeded("long_call");
        assert!(matches!(
            engine.start_simulation("black_swan_tuesday"),
            Err(EngineError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_long_call_snapshot_derives_breakeven() {
        let engine = seeded("long_call");
        let snap = engine.snapshot();
        assert_eq!(snap.breakevens, vec![105.0]);
        assert_eq!(snap.spot_pl, -5.0);
        assert_eq!(snap.payoff_curve.len(), payoff::CURVE_STEPS + 1);
        assert_eq!(snap.time_decay.len(), payoff::DECAY_STEPS + 1);
        assert!(snap.position_greeks.delta > 0.0, "long call is long delta");
    }

    #[test]
    fn test_iron_condor_plateau_summary() {
        let engine = seeded("iron_condor");
        let snap = engine.snapshot();
        assert_eq!(snap.breakevens, vec![92.8, 107.2]);
        assert!((snap.max_profit - 2.2).abs() < 1e-9);
        assert!((snap.max_loss - (-2.8)).abs() < 1e-9);
    }

    #[test]
    fn test_edit_leg_rebuilds_derived_state() {
        let mut engine = seeded("long_call");
        let snap = engine
            .edit_leg(
                0,
                LegEdit {
                    entry_premium: Some(10.0),
                    ..LegEdit::default()
                },
            )
            .unwrap();
        assert_eq!(snap.breakevens, vec![110.0]);
    }

    #[test]
    fn test_edit_leg_bad_index_errors() {
        let mut engine = seeded("long_call");
        assert!(matches!(
            engine.edit_leg(5, LegEdit::default()),
            Err(EngineError::LegIndex { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_remove_last_leg_reseeds_default() {
        let mut engine = seeded("long_call");
        let snap = engine.remove_leg(0).unwrap();
        assert_eq!(snap.legs.len(), 1);
        let leg = snap.legs[0];
        assert_eq!(leg.side, Side::Buy);
        assert_eq!(leg.kind, OptionKind::Call);
        assert_eq!(leg.strike, 100.0);
        assert_eq!(leg.entry_premium, 1.0);
    }

    #[test]
    fn test_input_commands_clamp() {
        let mut engine = seeded("long_call");
        assert_eq!(engine.set_spot(f64::NAN).spot, MIN_PRICE);
        assert_eq!(engine.set_range_percent(9.0).range_percent, RANGE_PCT_MAX);
        assert_eq!(engine.set_days_to_expiry(-4.0).days_to_expiry, 0.0);
        assert_eq!(engine.set_volatility(0.0).volatility, MIN_SIGMA);
        // accessors mirror the clamped state
        assert_eq!(engine.spot(), MIN_PRICE);
        assert_eq!(engine.days_to_expiry(), 0.0);
        assert_eq!(engine.volatility(), MIN_SIGMA);
        assert_eq!(engine.sim_state(), SimState::Idle);
    }

    #[test]
    fn test_add_default_leg_strikes_at_spot() {
        let mut engine = seeded("long_put");
        engine.set_spot(120.0);
        let snap = engine.add_default_leg();
        assert_eq!(snap.legs.len(), 2);
        let added = snap.legs[1];
        assert_eq!(added.side, Side::Buy);
        assert_eq!(added.kind, OptionKind::Call);
        assert_eq!(added.strike, 120.0);
        assert_eq!(added.entry_premium, 1.0);
        assert_eq!(added.quantity, 1);
    }

    #[test]
    fn test_simulation_lifecycle_terminates_and_freezes() {
        let mut engine = seeded("long_straddle");
        let snap = engine.start_simulation("sideways_chop").unwrap();
        assert_eq!(snap.sim_state, SimState::Running);
        assert!(snap.run_id.is_some());
        assert_eq!(snap.volatility, 0.14);

        let mut last = snap;
        for _ in 0..crate::sim::simulator::TICK_BUDGET + 5 {
            last = engine.tick();
        }
        assert_eq!(last.sim_state, SimState::Idle);
        assert_eq!(last.run_id, None);

        // once idle, further ticks leave the spot alone
        let frozen = engine.tick();
        assert_eq!(frozen.spot, last.spot);
        assert_eq!(frozen.days_to_expiry, last.days_to_expiry);
    }

    #[test]
    fn test_simulation_marks_move_entries_do_not() {
        let mut engine = seeded("long_straddle");
        let before: Vec<(f64, f64)> = engine
            .legs()
            .iter()
            .map(|l| (l.entry_premium, l.mark_premium))
            .collect();

        engine.start_simulation("panic_slide").unwrap();
        let snap = engine.tick();

        for (leg, (entry, _)) in snap.legs.iter().zip(&before) {
            assert_eq!(leg.entry_premium, *entry);
        }
        // ATM straddle marks under 48-vol pricing will not sit at the
        // preset's entry premiums
        let moved = snap
            .legs
            .iter()
            .zip(&before)
            .any(|(leg, (_, mark))| leg.mark_premium != *mark);
        assert!(moved, "simulation tick should re-mark the legs");
    }

    #[test]
    fn test_stop_simulation_mid_run() {
        let mut engine = seeded("long_straddle");
        engine.start_simulation("steady_grind").unwrap();
        engine.tick();
        let snap = engine.stop_simulation();
        assert_eq!(snap.sim_state, SimState::Idle);
        assert_eq!(snap.ticks_elapsed, 0, "clock resets on stop");
    }

    #[test]
    fn test_counters_accumulate() {
        let mut engine = seeded("long_call");
        engine.set_spot(101.0);
        engine.tick();
        let snap = engine.snapshot();
        assert!(snap.counters.commands_applied >= 2);
        assert_eq!(snap.counters.ticks_processed, 1);
        assert!(snap.counters.snapshots_built >= 2);
    }
}
