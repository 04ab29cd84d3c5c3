// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StoreAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use saltio_config::model::StorageConfig;
use saltio_core::types::{Session, Settlement, Tab, TabStatus, Till, TransferSummary};
use saltio_core::{AdapterType, HealthStatus, SaltioError, ServiceAdapter, StoreAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StoreAdapter::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`StoreAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, SaltioError> {
        self.db.get().ok_or_else(|| SaltioError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ServiceAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, SaltioError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SaltioError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for SqliteStore {
    async fn initialize(&self) -> Result<(), SaltioError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SaltioError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SaltioError> {
        let db = self.db()?;
        // Checkpoint WAL before close.
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Till operations ---

    async fn find_open_till(
        &self,
        operator_id: &str,
        company_id: &str,
    ) -> Result<Option<Till>, SaltioError> {
        queries::tills::find_open_till(self.db()?, operator_id, company_id).await
    }

    async fn get_till(&self, id: &str) -> Result<Option<Till>, SaltioError> {
        queries::tills::get_till(self.db()?, id).await
    }

    async fn upsert_till(&self, till: &Till) -> Result<(), SaltioError> {
        queries::tills::upsert_till(self.db()?, till).await
    }

    async fn transfer_ownership(
        &self,
        from_till_id: &str,
        to_till_id: &str,
    ) -> Result<TransferSummary, SaltioError> {
        queries::tills::transfer_ownership(self.db()?, from_till_id, to_till_id).await
    }

    // --- Session operations ---

    async fn get_session(&self, id: &str) -> Result<Option<Session>, SaltioError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn list_active_sessions(
        &self,
        company_id: &str,
        till_id: Option<&str>,
    ) -> Result<Vec<Session>, SaltioError> {
        queries::sessions::list_active_sessions(self.db()?, company_id, till_id).await
    }

    async fn upsert_session(&self, session: &Session) -> Result<(), SaltioError> {
        queries::sessions::upsert_session(self.db()?, session).await
    }

    // --- Tab operations ---

    async fn get_tab(&self, id: &str) -> Result<Option<Tab>, SaltioError> {
        queries::tabs::get_tab(self.db()?, id).await
    }

    async fn list_tabs(
        &self,
        company_id: &str,
        till_id: Option<&str>,
        status: TabStatus,
    ) -> Result<Vec<Tab>, SaltioError> {
        queries::tabs::list_tabs(self.db()?, company_id, till_id, status).await
    }

    async fn upsert_tab(&self, tab: &Tab) -> Result<(), SaltioError> {
        queries::tabs::upsert_tab(self.db()?, tab).await
    }

    // --- Settlement operations ---

    async fn record_settlement(&self, settlement: &Settlement) -> Result<(), SaltioError> {
        queries::settlements::record_settlement(self.db()?, settlement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use saltio_core::types::{SessionBilling, TillStatus};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_service_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Store);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let result = store.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let status = store.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        let result = store.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn full_shift_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        let till = Till {
            id: "till-1".to_string(),
            operator_id: "op-1".to_string(),
            company_id: "park".to_string(),
            status: TillStatus::Open,
            opening_amount: 150.0,
            opening_notes: String::new(),
            opened_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
            closing_amount: None,
            closing_notes: None,
            closed_at: None,
            total_sales: 0.0,
            total_orders: 0,
            withdrawals: Vec::new(),
            created_at: "2026-01-01T09:00:00.000Z".to_string(),
            updated_at: "2026-01-01T09:00:00.000Z".to_string(),
        };
        store.upsert_till(&till).await.unwrap();

        let session = Session {
            id: "s-1".to_string(),
            customer_id: "cust-1".to_string(),
            customer_name: "Ada".to_string(),
            dependent_id: None,
            dependent_name: None,
            till_id: "till-1".to_string(),
            company_id: "park".to_string(),
            billing: SessionBilling::Untracked,
            start_time: Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(),
            contracted_ms: 3_600_000,
            paused_at: None,
            total_paused_ms: 0,
            time_extension_at: None,
            time_extension_granted_at: None,
            end_time: None,
            created_at: "2026-01-01T10:00:00.000Z".to_string(),
            updated_at: "2026-01-01T10:00:00.000Z".to_string(),
        };
        store.upsert_session(&session).await.unwrap();

        let open = store.find_open_till("op-1", "park").await.unwrap();
        assert!(open.is_some());

        let active = store.list_active_sessions("park", None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "s-1");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_before_initialize_is_a_no_op() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("noinit_shutdown.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.shutdown().await.unwrap();
    }
}
