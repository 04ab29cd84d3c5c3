// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `saltio serve` command implementation.
//!
//! Starts the Saltio service: SQLite store, the session lifecycle
//! controller, and the reconciliation loop that sweeps open sessions for
//! expiry. Supports graceful shutdown via signal handlers; the in-flight
//! sweep completes and the WAL is checkpointed before exit.

use std::sync::Arc;
use std::time::Duration;

use saltio_config::model::SaltioConfig;
use saltio_core::error::SaltioError;
use saltio_core::{EntityLocks, NotifierAdapter, StoreAdapter};
use saltio_reconcile::ReconcileRunner;
use saltio_session::{SessionLifecycleController, SuppressionSet};
use saltio_storage::SqliteStore;
use tracing::info;

use crate::notifier::LogNotifier;
use crate::shutdown;

/// Runs the `saltio serve` command.
pub async fn run_serve(config: SaltioConfig) -> Result<(), SaltioError> {
    // Initialize tracing subscriber.
    init_tracing(&config.service.log_level);

    info!("starting saltio serve");

    // Initialize storage.
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let store: Arc<dyn StoreAdapter + Send + Sync> = Arc::new(store);

    // Report what survived the last run (crash recovery). Session math is
    // anchored to absolute instants, so open sessions simply keep accruing;
    // nothing needs fixing up.
    report_recovered_state(store.as_ref(), &config.facility.company_id).await?;

    let locks = EntityLocks::new();
    let suppression = SuppressionSet::new(Duration::from_secs(
        config.reconcile.suppression_ttl_secs,
    ));
    let sessions = Arc::new(SessionLifecycleController::new(
        store.clone(),
        locks.clone(),
        suppression.clone(),
    ));

    let notifier: Arc<dyn NotifierAdapter + Send + Sync> = Arc::new(LogNotifier);
    let runner = ReconcileRunner::new(
        config.reconcile.clone(),
        config.facility.company_id.clone(),
        store.clone(),
        notifier,
        sessions,
        suppression,
    );

    // Install signal handler and run the reconciliation loop until a
    // shutdown signal arrives.
    let cancel = shutdown::install_signal_handler();
    runner.run(cancel).await;

    // Flush the WAL before exit.
    store.close().await?;
    info!("saltio serve shutdown complete");
    Ok(())
}

/// Logs the open tills and unfinished sessions found at startup.
async fn report_recovered_state(
    store: &(dyn StoreAdapter + Send + Sync),
    company_id: &str,
) -> Result<(), SaltioError> {
    let sessions = store.list_active_sessions(company_id, None).await?;
    if sessions.is_empty() {
        info!(company_id, "no unfinished sessions at startup");
        return Ok(());
    }

    let paused = sessions.iter().filter(|s| s.is_paused()).count();
    info!(
        company_id,
        unfinished = sessions.len(),
        paused,
        running = sessions.len() - paused,
        "recovered unfinished sessions at startup"
    );
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("saltio={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
