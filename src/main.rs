use payoff_lab::config::AppConfig;
use payoff_lab::engine::StrategyEngine;
use payoff_lab::state::{EngineEvent, EngineSnapshot, SimState};
use tokio::sync::{mpsc, watch};

#[tokio::main]
async fn main() {
    // Structured logging (stderr, env-filterable)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("payoff_lab host starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let engine = match StrategyEngine::new(&cfg) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("engine init error: {e}");
            std::process::exit(1);
        }
    };

    let (engine_tx, engine_rx) = mpsc::channel::<EngineEvent>(64);
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

    // ── Spawn tasks ──

    // 1. Tick generator on the configured cadence
    let tick_tx = engine_tx.clone();
    let interval_ms = cfg.tick_interval_ms;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tick_tx.send(EngineEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // 2. Ctrl-C -> cooperative shutdown
    let shutdown_tx = engine_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received");
            let _ = shutdown_tx.send(EngineEvent::Shutdown).await;
        }
    });

    drop(engine_tx);

    // 3. Engine loop (this task exclusively owns the session)
    run_engine(engine, &cfg, engine_rx, snapshot_tx).await;

    report_final(&snapshot_rx.borrow());
}

/// Core engine loop. Starts the configured scenario, applies ticks as the
/// timer delivers them, publishes every snapshot, exits when the run ends.
async fn run_engine(
    mut engine: StrategyEngine,
    cfg: &AppConfig,
    mut rx: mpsc::Receiver<EngineEvent>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
) {
    tracing::info!("engine task started");

    match engine.start_simulation(&cfg.scenario) {
        Ok(snapshot) => {
            let _ = snapshot_tx.send(snapshot);
        }
        Err(e) => {
            tracing::error!("cannot start simulation: {e}");
            return;
        }
    }

    while let Some(event) = rx.recv().await {
        match event {
            EngineEvent::Tick => {
                let snapshot = engine.tick();
                let finished = snapshot.sim_state == SimState::Idle;
                tracing::info!(
                    tick = snapshot.ticks_elapsed,
                    spot = snapshot.spot,
                    days = snapshot.days_to_expiry,
                    mark_pl = %format_money(snapshot.mark_pl),
                    "tick"
                );
                let _ = snapshot_tx.send(snapshot);
                if finished {
                    break;
                }
            }
            EngineEvent::Shutdown => {
                let snapshot = engine.stop_simulation();
                let _ = snapshot_tx.send(snapshot);
                break;
            }
        }
    }

    tracing::info!("engine task shutting down");
}

/// Log the closing summary the way the on-screen panel renders it.
fn report_final(snapshot: &EngineSnapshot) {
    let breakevens = if snapshot.breakevens.is_empty() {
        "none in current range".to_string()
    } else {
        snapshot
            .breakevens
            .iter()
            .map(|b| format!("{b:.2}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    tracing::info!(
        spot = snapshot.spot,
        spot_pl = %format_money(snapshot.spot_pl),
        max_profit = %format_money(snapshot.max_profit),
        max_loss = %format_money(snapshot.max_loss),
        breakevens = %breakevens,
        note = %snapshot.note,
        "final summary"
    );

    match serde_json::to_string(snapshot) {
        Ok(json) => tracing::debug!(snapshot = %json, "final snapshot"),
        Err(e) => tracing::warn!("snapshot serialization failed: {e}"),
    }
}

/// Signed money string: +$1.25 / -$0.40.
fn format_money(value: f64) -> String {
    let sign = if value >= 0.0 { '+' } else { '-' };
    format!("{sign}${:.2}", value.abs())
}
