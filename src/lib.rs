//! Options-strategy analytics engine.
//!
//! Black-Scholes valuation and Greeks, multi-leg payoff and breakeven math,
//! and a scenario-driven, time-stepped simulation of how a strategy's
//! mark-to-market P/L evolves. The engine is pull-model and pure at the
//! edges: a host (UI, CLI, test harness) owns a [`engine::StrategyEngine`]
//! session, issues commands, and renders the returned snapshots.

pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod sim;
pub mod state;
pub mod strategy;

pub use config::AppConfig;
pub use engine::StrategyEngine;
pub use errors::{EngineError, EngineResult};
