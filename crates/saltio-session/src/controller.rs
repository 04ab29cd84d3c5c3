// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle controller for sessions: start, pause, resume, extend, finish.
//!
//! Every mutation acquires the session's entity lock before the
//! check-then-write, persists through the store port, and clears the
//! scheduler suppression entry on transitions that should let a fresh
//! expiry re-notify.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use saltio_core::error::SaltioError;
use saltio_core::locks::EntityLocks;
use saltio_core::traits::StoreAdapter;
use saltio_core::types::{
    ItemKind, OperatorContext, OrderItem, Session, SessionBilling, Tab, TabStatus,
    TillStatus,
};
use tracing::{debug, info};

use crate::clock::{self, SessionClock, SessionReadModel};
use crate::suppression::SuppressionSet;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// How a new session should be billed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingIntent {
    /// No tab; the scheduler may auto-finish the session on expiry.
    Untracked,
    /// Open a fresh tab billing this session.
    NewTab,
    /// Attach to an already-open tab (several dependents on one card).
    ExistingTab(String),
}

/// Input to [`SessionLifecycleController::start`].
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub customer_id: String,
    pub customer_name: String,
    pub dependent_id: Option<String>,
    pub dependent_name: Option<String>,
    pub till_id: String,
    pub contracted_ms: i64,
    /// Hourly price for the contracted-time item on the tab.
    pub unit_price: f64,
    pub billing: BillingIntent,
}

/// Result of an extension grant.
#[derive(Debug, Clone)]
pub struct ExtendOutcome {
    pub session: Session,
    /// Whether a closed tab had to be implicitly reopened to bill the
    /// extra time.
    pub tab_reopened: bool,
}

/// Owns the valid state transitions for sessions.
pub struct SessionLifecycleController {
    store: Arc<dyn StoreAdapter + Send + Sync>,
    locks: EntityLocks,
    suppression: SuppressionSet,
}

impl SessionLifecycleController {
    pub fn new(
        store: Arc<dyn StoreAdapter + Send + Sync>,
        locks: EntityLocks,
        suppression: SuppressionSet,
    ) -> Self {
        Self {
            store,
            locks,
            suppression,
        }
    }

    /// Creates a session bound to an open till, itemizing the contracted
    /// time on a tab when the billing intent asks for one.
    pub async fn start(
        &self,
        ctx: &OperatorContext,
        request: StartRequest,
        now: DateTime<Utc>,
    ) -> Result<Session, SaltioError> {
        if request.contracted_ms <= 0 {
            return Err(SaltioError::Validation(
                "contracted duration must be positive".into(),
            ));
        }
        if request.customer_name.trim().is_empty() {
            return Err(SaltioError::Validation("customer name is required".into()));
        }

        let till = self
            .store
            .get_till(&request.till_id)
            .await?
            .ok_or_else(|| SaltioError::NotFound {
                entity: "till",
                id: request.till_id.clone(),
            })?;
        if till.status != TillStatus::Open {
            return Err(SaltioError::Validation(format!(
                "till {} is not open",
                till.id
            )));
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        let billing = match &request.billing {
            BillingIntent::Untracked => SessionBilling::Untracked,
            BillingIntent::NewTab => {
                let tab_id = uuid::Uuid::new_v4().to_string();
                let tab = Tab {
                    id: tab_id.clone(),
                    company_id: ctx.company_id.clone(),
                    till_id: request.till_id.clone(),
                    session_ids: vec![session_id.clone()],
                    status: TabStatus::Open,
                    items: vec![time_base_item(&session_id, &request)],
                    created_at: stamp(now),
                    updated_at: stamp(now),
                };
                self.store.upsert_tab(&tab).await?;
                SessionBilling::BilledVia { tab_id }
            }
            BillingIntent::ExistingTab(tab_id) => {
                let _tab_guard = self.locks.acquire(tab_id).await;
                let mut tab = self.store.get_tab(tab_id).await?.ok_or_else(|| {
                    SaltioError::NotFound {
                        entity: "tab",
                        id: tab_id.clone(),
                    }
                })?;
                if tab.status != TabStatus::Open {
                    return Err(SaltioError::InvalidState(format!(
                        "tab {} is closed",
                        tab.id
                    )));
                }
                tab.session_ids.push(session_id.clone());
                tab.items.push(time_base_item(&session_id, &request));
                tab.updated_at = stamp(now);
                self.store.upsert_tab(&tab).await?;
                SessionBilling::BilledVia {
                    tab_id: tab_id.clone(),
                }
            }
        };

        let session = Session {
            id: session_id,
            customer_id: request.customer_id,
            customer_name: request.customer_name,
            dependent_id: request.dependent_id,
            dependent_name: request.dependent_name,
            till_id: request.till_id,
            company_id: ctx.company_id.clone(),
            billing,
            start_time: now,
            contracted_ms: request.contracted_ms,
            paused_at: None,
            total_paused_ms: 0,
            time_extension_at: None,
            time_extension_granted_at: None,
            end_time: None,
            created_at: stamp(now),
            updated_at: stamp(now),
        };
        self.store.upsert_session(&session).await?;

        info!(
            session_id = %session.id,
            customer = %session.display_name(),
            contracted_ms = session.contracted_ms,
            operator = %ctx.operator_id,
            "session started"
        );
        Ok(session)
    }

    /// Freezes the session's clock at `now`.
    pub async fn pause(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, SaltioError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;

        if session.is_finished() {
            return Err(SaltioError::InvalidState(
                "cannot pause a finished session".into(),
            ));
        }
        if session.is_paused() {
            return Err(SaltioError::InvalidState("session is already paused".into()));
        }

        session.paused_at = Some(now);
        session.updated_at = stamp(now);
        self.store.upsert_session(&session).await?;
        self.suppression.clear(session_id);

        debug!(session_id = %session.id, "session paused");
        Ok(session)
    }

    /// Unfreezes the clock, crediting the paused interval back to the
    /// customer.
    pub async fn resume(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, SaltioError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;

        let Some(paused_at) = session.paused_at else {
            return Err(SaltioError::InvalidState("session is not paused".into()));
        };

        let paused_for = (now - paused_at).num_milliseconds().max(0);
        session.total_paused_ms += paused_for;
        session.paused_at = None;
        session.updated_at = stamp(now);
        self.store.upsert_session(&session).await?;
        self.suppression.clear(session_id);

        debug!(
            session_id = %session.id,
            paused_for_ms = paused_for,
            total_paused_ms = session.total_paused_ms,
            "session resumed"
        );
        Ok(session)
    }

    /// Grants extra time. The start time never moves; for an
    /// already-expired session the new authoritative deadline becomes
    /// `now + extra`. The extra time is itemized on the bound tab,
    /// reopening it if it was already closed.
    pub async fn extend(
        &self,
        session_id: &str,
        extra_ms: i64,
        unit_price: f64,
        now: DateTime<Utc>,
    ) -> Result<ExtendOutcome, SaltioError> {
        if extra_ms <= 0 {
            return Err(SaltioError::Validation(
                "extension duration must be positive".into(),
            ));
        }

        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;

        if session.is_finished() {
            return Err(SaltioError::InvalidState(
                "cannot extend a finished session".into(),
            ));
        }

        let was_expired = SessionClock::new(&session).remaining_signed(now) <= 0;
        session.contracted_ms += extra_ms;
        if was_expired {
            session.time_extension_at = Some(now + Duration::milliseconds(extra_ms));
            session.time_extension_granted_at = Some(now);
        }
        session.updated_at = stamp(now);

        let mut tab_reopened = false;
        if let SessionBilling::BilledVia { tab_id } = &session.billing {
            // Session lock is already held; tab lock second, so the tab's
            // read-modify-write cannot interleave with the tab controller.
            let _tab_guard = self.locks.acquire(tab_id).await;
            let mut tab = self.store.get_tab(tab_id).await?.ok_or_else(|| {
                SaltioError::NotFound {
                    entity: "tab",
                    id: tab_id.clone(),
                }
            })?;
            if tab.status == TabStatus::Closed {
                tab.status = TabStatus::Open;
                tab_reopened = true;
            }
            tab.items.push(OrderItem {
                id: uuid::Uuid::new_v4().to_string(),
                kind: ItemKind::AdditionalTime,
                description: format!(
                    "Additional time {} for {}",
                    saltio_core::duration::format(extra_ms),
                    session.display_name()
                ),
                quantity: extra_ms as f64 / MS_PER_HOUR,
                unit_price,
                subtotal: extra_ms as f64 / MS_PER_HOUR * unit_price,
                paid: false,
                session_id: Some(session.id.clone()),
            });
            tab.updated_at = stamp(now);
            self.store.upsert_tab(&tab).await?;
        }

        self.store.upsert_session(&session).await?;
        self.suppression.clear(session_id);

        info!(
            session_id = %session.id,
            extra_ms,
            was_expired,
            tab_reopened,
            "session extended"
        );
        Ok(ExtendOutcome {
            session,
            tab_reopened,
        })
    }

    /// Ends the session. Manual for tab-billed sessions; the scheduler
    /// calls it for untracked ones at expiry.
    pub async fn finish(
        &self,
        session_id: &str,
        end_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Session, SaltioError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load(session_id).await?;

        if session.is_finished() {
            return Err(SaltioError::InvalidState(
                "session is already finished".into(),
            ));
        }

        session.end_time = Some(end_time.unwrap_or(now));
        // A finished session is never paused.
        session.paused_at = None;
        session.updated_at = stamp(now);
        self.store.upsert_session(&session).await?;

        info!(session_id = %session.id, "session finished");
        Ok(session)
    }

    /// Live `(elapsed, remaining, status)` for a session. Pure; derived,
    /// not stored.
    pub fn status(&self, session: &Session, now: DateTime<Utc>) -> SessionReadModel {
        clock::read_model(session, now)
    }

    async fn load(&self, session_id: &str) -> Result<Session, SaltioError> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| SaltioError::NotFound {
                entity: "session",
                id: session_id.to_string(),
            })
    }
}

fn time_base_item(session_id: &str, request: &StartRequest) -> OrderItem {
    let hours = request.contracted_ms as f64 / MS_PER_HOUR;
    OrderItem {
        id: uuid::Uuid::new_v4().to_string(),
        kind: ItemKind::TimeBase,
        description: format!(
            "Session time {} for {}",
            saltio_core::duration::format(request.contracted_ms),
            request
                .dependent_name
                .as_deref()
                .unwrap_or(&request.customer_name)
        ),
        quantity: hours,
        unit_price: request.unit_price,
        subtotal: hours * request.unit_price,
        paid: false,
        session_id: Some(session_id.to_string()),
    }
}

/// Millisecond-precision row timestamp.
fn stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
