// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full facility stack: a temp SQLite store,
//! the session/till/tab controllers sharing one lock map, a mock notifier,
//! and a reconciliation runner, all wired the way the service wires them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use saltio_config::model::{ReconcileConfig, StorageConfig};
use saltio_core::types::{OperatorContext, Session, Till};
use saltio_core::{EntityLocks, NotifierAdapter, SaltioError, StoreAdapter};
use saltio_reconcile::ReconcileRunner;
use saltio_session::{
    BillingIntent, SessionLifecycleController, StartRequest, SuppressionSet,
};
use saltio_storage::SqliteStore;
use saltio_tab::TabController;
use saltio_till::TillController;

use crate::mock_notifier::MockNotifier;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    company_id: String,
    operator_id: String,
    suppression_ttl: Duration,
    reconcile: ReconcileConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            company_id: "test-park".to_string(),
            operator_id: "test-operator".to_string(),
            suppression_ttl: saltio_session::DEFAULT_TTL,
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Set the company the harness operates under.
    pub fn with_company(mut self, company_id: &str) -> Self {
        self.company_id = company_id.to_string();
        self
    }

    /// Set the default operator id used by [`TestHarness::ctx`].
    pub fn with_operator(mut self, operator_id: &str) -> Self {
        self.operator_id = operator_id.to_string();
        self
    }

    /// Set the notification suppression TTL.
    pub fn with_suppression_ttl(mut self, ttl: Duration) -> Self {
        self.suppression_ttl = ttl;
        self
    }

    /// Override the reconciliation scheduler config.
    pub fn with_reconcile_config(mut self, config: ReconcileConfig) -> Self {
        self.reconcile = config;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, SaltioError> {
        // Temp directory for SQLite, cleaned up on drop.
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SaltioError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let store = SqliteStore::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        store.initialize().await?;
        let store: Arc<dyn StoreAdapter + Send + Sync> = Arc::new(store);

        let locks = EntityLocks::new();
        let suppression = SuppressionSet::new(self.suppression_ttl);

        let sessions = Arc::new(SessionLifecycleController::new(
            store.clone(),
            locks.clone(),
            suppression.clone(),
        ));
        let till = Arc::new(TillController::new(store.clone(), locks.clone()));
        let tabs = Arc::new(TabController::new(
            store.clone(),
            till.clone(),
            locks.clone(),
        ));

        let notifier = Arc::new(MockNotifier::new());
        let reconciler = ReconcileRunner::new(
            self.reconcile,
            self.company_id.clone(),
            store.clone(),
            notifier.clone() as Arc<dyn NotifierAdapter + Send + Sync>,
            sessions.clone(),
            suppression.clone(),
        );

        Ok(TestHarness {
            company_id: self.company_id,
            operator_id: self.operator_id,
            store,
            sessions,
            till,
            tabs,
            notifier,
            suppression,
            locks,
            reconciler,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over a temp SQLite database.
pub struct TestHarness {
    company_id: String,
    operator_id: String,
    /// SQLite store adapter (temp DB, cleaned up on drop).
    pub store: Arc<dyn StoreAdapter + Send + Sync>,
    /// Session lifecycle controller.
    pub sessions: Arc<SessionLifecycleController>,
    /// Till controller.
    pub till: Arc<TillController>,
    /// Tab controller.
    pub tabs: Arc<TabController>,
    /// The mock notifier capturing expiry notifications.
    pub notifier: Arc<MockNotifier>,
    /// Shared suppression set (same instance the controllers clear).
    pub suppression: SuppressionSet,
    /// The per-entity lock map all controllers serialize on.
    pub locks: EntityLocks,
    /// Reconciliation runner wired against the mock notifier.
    pub reconciler: ReconcileRunner,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The default operator context for this harness.
    pub fn ctx(&self) -> OperatorContext {
        OperatorContext::new(&self.operator_id, &self.company_id)
    }

    /// An operator context for a second operator in the same company.
    pub fn ctx_for(&self, operator_id: &str) -> OperatorContext {
        OperatorContext::new(operator_id, &self.company_id)
    }

    /// Open a till for the default operator.
    pub async fn open_till(
        &self,
        opening_amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Till, SaltioError> {
        self.till.open(&self.ctx(), opening_amount, "", now).await
    }

    /// Start a session on the given till with the given billing intent.
    pub async fn start_session(
        &self,
        till_id: &str,
        customer_name: &str,
        contracted_ms: i64,
        billing: BillingIntent,
        now: DateTime<Utc>,
    ) -> Result<Session, SaltioError> {
        self.sessions
            .start(
                &self.ctx(),
                StartRequest {
                    customer_id: uuid::Uuid::new_v4().to_string(),
                    customer_name: customer_name.to_string(),
                    dependent_id: None,
                    dependent_name: None,
                    till_id: till_id.to_string(),
                    contracted_ms,
                    unit_price: 40.0,
                    billing,
                },
                now,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 10, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let sessions = harness
            .store
            .list_active_sessions("test-park", None)
            .await
            .unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn open_till_and_start_session() {
        let harness = TestHarness::builder().build().await.unwrap();
        let till = harness.open_till(100.0, at(0)).await.unwrap();

        let session = harness
            .start_session(&till.id, "Ada", 3_600_000, BillingIntent::Untracked, at(0))
            .await
            .unwrap();
        assert_eq!(session.till_id, till.id);

        let active = harness
            .store
            .list_active_sessions("test-park", None)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        let till = h1.open_till(50.0, at(0)).await.unwrap();
        h1.start_session(&till.id, "Ada", 3_600_000, BillingIntent::Untracked, at(0))
            .await
            .unwrap();

        let s1 = h1.store.list_active_sessions("test-park", None).await.unwrap();
        let s2 = h2.store.list_active_sessions("test-park", None).await.unwrap();
        assert_eq!(s1.len(), 1);
        assert_eq!(s2.len(), 0);
    }

    #[tokio::test]
    async fn sweep_notifies_through_the_mock_notifier() {
        let harness = TestHarness::builder().build().await.unwrap();
        let till = harness.open_till(100.0, at(0)).await.unwrap();
        harness
            .start_session(&till.id, "Ada", 60_000, BillingIntent::Untracked, at(0))
            .await
            .unwrap();

        let report = harness.reconciler.sweep(at(5)).await.unwrap();
        assert_eq!(report.newly_expired, 1);
        assert_eq!(report.auto_finished, 1);
        assert_eq!(harness.notifier.notice_count().await, 1);
    }
}
