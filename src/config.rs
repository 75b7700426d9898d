use crate::errors::{EngineError, EngineResult};
use crate::sim::scenario::DEFAULT_SCENARIO;
use crate::strategy::presets::DEFAULT_PRESET;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Strategy preset applied at startup.
    pub preset: String,
    /// Scenario the host runs on startup.
    pub scenario: String,
    /// Tick cadence of the host timer.
    pub tick_interval_ms: u64,
    /// Price-range fraction around spot for the payoff curve.
    pub range_percent: f64,
    /// Calendar days until expiry at startup.
    pub days_to_expiry: f64,
    /// Volatility used for curves before a scenario seeds its own.
    pub volatility: f64,
    /// Fixed RNG seed for reproducible simulation runs.
    pub sim_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let tick_interval_ms = env_var_or("TICK_INTERVAL_MS", "300")
            .parse::<u64>()
            .map_err(|e| EngineError::Config(format!("TICK_INTERVAL_MS: {e}")))?;

        // percent units in the environment, fraction internally
        let range_percent = env_var_or("RANGE_PCT", "35")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("RANGE_PCT: {e}")))?
            / 100.0;

        let days_to_expiry = env_var_or("DAYS_TO_EXPIRY", "30")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("DAYS_TO_EXPIRY: {e}")))?;

        let volatility = env_var_or("VOLATILITY", "0.2")
            .parse::<f64>()
            .map_err(|e| EngineError::Config(format!("VOLATILITY: {e}")))?;

        let sim_seed = match std::env::var("SIM_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|e| EngineError::Config(format!("SIM_SEED: {e}")))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            preset: env_var_or("PRESET", DEFAULT_PRESET),
            scenario: env_var_or("SCENARIO", DEFAULT_SCENARIO),
            tick_interval_ms,
            range_percent,
            days_to_expiry,
            volatility,
            sim_seed,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET.to_string(),
            scenario: DEFAULT_SCENARIO.to_string(),
            tick_interval_ms: 300,
            range_percent: 0.35,
            days_to_expiry: 30.0,
            volatility: 0.2,
            sim_seed: None,
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
