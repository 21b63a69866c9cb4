//! ShiftHub agent entry point.
//!
//! Wires configuration, logging, the in-memory stores, and the checklist
//! services together, selects the shift active at startup, and logs
//! checklist progress as store pushes arrive, until shutdown.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use shifthub_core::config::AppConfig;
use shifthub_core::error::AppError;
use shifthub_core::types::{Actor, ShiftName};
use shifthub_service::{
    AuditLog, ChecklistService, EngineState, SessionRepository, ShiftClock, StaticTemplates,
    SyncEngine,
};
use shifthub_store::memory::{MemoryAuditStore, MemorySessionStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SHIFTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main agent run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShiftHub v{}", env!("CARGO_PKG_VERSION"));

    let clock = ShiftClock::new(config.shifts.clone());

    let session_store = MemorySessionStore::new();
    let audit_store = Arc::new(MemoryAuditStore::new());
    let audit = Arc::new(AuditLog::new(audit_store, config.audit.clone()));
    let templates = Arc::new(StaticTemplates::new(config.templates.clone()));

    let repository = SessionRepository::new(Arc::new(session_store), templates, clock.clone());
    let engine = Arc::new(SyncEngine::new(repository));
    let checklist = ChecklistService::new(Arc::clone(&engine), audit);

    let now = chrono::Local::now().naive_local();
    let shift = active_shift(&clock, now).ok_or_else(|| {
        AppError::configuration("No configured shift window covers the current time")
    })?;

    let selection = checklist.select_shift(&shift, &Actor::system(), now).await?;
    tracing::info!(
        session_key = %selection.session_key,
        shift = %shift,
        created = selection.created,
        degraded = selection.degraded,
        "Shift session active"
    );

    let mut view = engine.subscribe_view();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = view.borrow().clone();
                let completed = snapshot.tasks.iter().filter(|t| t.completed).count();
                tracing::info!(
                    completed,
                    total = snapshot.tasks.len(),
                    degraded = matches!(snapshot.state, EngineState::Ready { degraded: true }),
                    "Checklist updated"
                );
            }
        }
    }

    tracing::info!("ShiftHub shut down gracefully");
    Ok(())
}

/// Pick the configured shift whose window covers `now`.
///
/// Overlapping windows resolve alphabetically for determinism.
fn active_shift(clock: &ShiftClock, now: chrono::NaiveDateTime) -> Option<ShiftName> {
    let mut names = clock.schedule().shift_names();
    names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    names
        .into_iter()
        .find(|shift| clock.is_within_shift(shift, now))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
