// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic reconciliation of open sessions against the clock.
//!
//! The [`ReconcileRunner`] re-evaluates every unfinished session on a fixed
//! cadence, notifies the first time a session is found expired, and
//! auto-finishes untracked sessions (tab-billed sessions are owned by their
//! tab and only ever notified). The suppression set keeps a session that
//! straddles two ticks from notifying twice; a separate, slower cleanup
//! tick purges aged-out suppression entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use saltio_config::model::ReconcileConfig;
use saltio_core::error::SaltioError;
use saltio_core::traits::{NotifierAdapter, StoreAdapter};
use saltio_core::types::{SessionBilling, SessionStatus};
use saltio_session::clock::SessionClock;
use saltio_session::{classify, SessionLifecycleController, SuppressionSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counters from one expiry sweep, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sessions evaluated this tick.
    pub evaluated: usize,
    /// Sessions found expired for the first time (notified).
    pub newly_expired: usize,
    /// Untracked sessions finished by this tick.
    pub auto_finished: usize,
}

/// Owns the periodic reconciliation loop.
pub struct ReconcileRunner {
    config: ReconcileConfig,
    company_id: String,
    store: Arc<dyn StoreAdapter + Send + Sync>,
    notifier: Arc<dyn NotifierAdapter + Send + Sync>,
    sessions: Arc<SessionLifecycleController>,
    suppression: SuppressionSet,
}

impl ReconcileRunner {
    pub fn new(
        config: ReconcileConfig,
        company_id: String,
        store: Arc<dyn StoreAdapter + Send + Sync>,
        notifier: Arc<dyn NotifierAdapter + Send + Sync>,
        sessions: Arc<SessionLifecycleController>,
        suppression: SuppressionSet,
    ) -> Self {
        Self {
            config,
            company_id,
            store,
            notifier,
            sessions,
            suppression,
        }
    }

    /// One expiry sweep as of `now`.
    ///
    /// Read-heavy: writes happen only for transitions (first-seen expiry,
    /// auto-finish). Each transition is applied atomically per entity by
    /// the lifecycle controller.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, SaltioError> {
        let sessions = self
            .store
            .list_active_sessions(&self.company_id, None)
            .await?;

        let mut report = SweepReport {
            evaluated: sessions.len(),
            ..SweepReport::default()
        };

        for session in &sessions {
            if classify(session, now) != SessionStatus::Expired {
                continue;
            }
            if self.suppression.is_suppressed(&session.id, now) {
                continue;
            }

            self.suppression.mark(&session.id, now);
            report.newly_expired += 1;

            let overtime_ms = -SessionClock::new(session).remaining_signed(now);
            if let Err(e) = self.notifier.session_expired(session, overtime_ms).await {
                warn!(session_id = %session.id, error = %e, "expiry notification failed");
            }

            match &session.billing {
                SessionBilling::Untracked => {
                    self.sessions.finish(&session.id, None, now).await?;
                    report.auto_finished += 1;
                }
                SessionBilling::BilledVia { tab_id } => {
                    // The tab owns this session's lifecycle; notify only.
                    debug!(
                        session_id = %session.id,
                        tab_id = %tab_id,
                        "expired session left running (billed via tab)"
                    );
                }
            }
        }

        if report.newly_expired > 0 {
            info!(
                evaluated = report.evaluated,
                newly_expired = report.newly_expired,
                auto_finished = report.auto_finished,
                "expiry sweep"
            );
        } else {
            debug!(evaluated = report.evaluated, "expiry sweep: nothing expired");
        }
        Ok(report)
    }

    /// Runs sweeps until the token fires. The in-flight tick completes
    /// before the loop stops; a failed sweep logs and the loop continues.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut sweep_interval = tokio::time::interval(std::time::Duration::from_secs(
            self.config.sweep_interval_secs,
        ));
        let mut cleanup_interval = tokio::time::interval(std::time::Duration::from_secs(
            self.config.cleanup_interval_secs,
        ));
        // Skip the first immediate tick of each interval.
        sweep_interval.tick().await;
        cleanup_interval.tick().await;

        info!(
            sweep_interval_secs = self.config.sweep_interval_secs,
            cleanup_interval_secs = self.config.cleanup_interval_secs,
            "reconciliation loop started"
        );

        loop {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    if let Err(e) = self.sweep(Utc::now()).await {
                        warn!(error = %e, "expiry sweep failed (non-fatal)");
                    }
                }
                _ = cleanup_interval.tick() => {
                    let purged = self.suppression.purge_expired(Utc::now());
                    if purged > 0 {
                        debug!(purged, "suppression entries purged");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("reconciliation loop shutting down");
                    break;
                }
            }
        }
    }
}
