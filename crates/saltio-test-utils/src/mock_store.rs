// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store adapter for deterministic testing.
//!
//! `MockStore` implements `StoreAdapter` over plain hash maps, with a
//! failure switch for exercising error paths without a broken database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use saltio_core::types::{
    AdapterType, HealthStatus, Session, Settlement, Tab, TabStatus, Till, TillStatus,
    TransferSummary,
};
use saltio_core::{SaltioError, ServiceAdapter, StoreAdapter};

#[derive(Default)]
struct MockState {
    tills: HashMap<String, Till>,
    sessions: HashMap<String, Session>,
    tabs: HashMap<String, Tab>,
    settlements: Vec<Settlement>,
}

/// An in-memory store for testing.
///
/// Entities live in hash maps guarded by one mutex; `set_failing(true)`
/// makes every subsequent operation return a storage error.
pub struct MockStore {
    state: Arc<Mutex<MockState>>,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Recorded settlements, oldest first.
    pub async fn settlements(&self) -> Vec<Settlement> {
        self.state.lock().await.settlements.clone()
    }

    /// Number of recorded settlements.
    pub async fn settlement_count(&self) -> usize {
        self.state.lock().await.settlements.len()
    }

    fn check(&self) -> Result<(), SaltioError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SaltioError::Storage {
                source: "mock store failure injected".into(),
            });
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, SaltioError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("failure injected".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SaltioError> {
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for MockStore {
    async fn initialize(&self) -> Result<(), SaltioError> {
        self.check()
    }

    async fn close(&self) -> Result<(), SaltioError> {
        self.check()
    }

    async fn find_open_till(
        &self,
        operator_id: &str,
        company_id: &str,
    ) -> Result<Option<Till>, SaltioError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .tills
            .values()
            .find(|t| {
                t.operator_id == operator_id
                    && t.company_id == company_id
                    && t.status == TillStatus::Open
            })
            .cloned())
    }

    async fn get_till(&self, id: &str) -> Result<Option<Till>, SaltioError> {
        self.check()?;
        Ok(self.state.lock().await.tills.get(id).cloned())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, SaltioError> {
        self.check()?;
        Ok(self.state.lock().await.sessions.get(id).cloned())
    }

    async fn get_tab(&self, id: &str) -> Result<Option<Tab>, SaltioError> {
        self.check()?;
        Ok(self.state.lock().await.tabs.get(id).cloned())
    }

    async fn list_active_sessions(
        &self,
        company_id: &str,
        till_id: Option<&str>,
    ) -> Result<Vec<Session>, SaltioError> {
        self.check()?;
        let state = self.state.lock().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| {
                s.company_id == company_id
                    && s.end_time.is_none()
                    && till_id.is_none_or(|t| s.till_id == t)
            })
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(sessions)
    }

    async fn list_tabs(
        &self,
        company_id: &str,
        till_id: Option<&str>,
        status: TabStatus,
    ) -> Result<Vec<Tab>, SaltioError> {
        self.check()?;
        let state = self.state.lock().await;
        let mut tabs: Vec<Tab> = state
            .tabs
            .values()
            .filter(|t| {
                t.company_id == company_id
                    && t.status == status
                    && till_id.is_none_or(|id| t.till_id == id)
            })
            .cloned()
            .collect();
        tabs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tabs)
    }

    async fn upsert_session(&self, session: &Session) -> Result<(), SaltioError> {
        self.check()?;
        self.state
            .lock()
            .await
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn upsert_till(&self, till: &Till) -> Result<(), SaltioError> {
        self.check()?;
        let mut state = self.state.lock().await;
        // Mirror the real store's one-open-till-per-operator constraint.
        if till.status == TillStatus::Open
            && state.tills.values().any(|t| {
                t.id != till.id
                    && t.operator_id == till.operator_id
                    && t.company_id == till.company_id
                    && t.status == TillStatus::Open
            })
        {
            return Err(SaltioError::Conflict(
                "operator already has an open till".to_string(),
            ));
        }
        state.tills.insert(till.id.clone(), till.clone());
        Ok(())
    }

    async fn upsert_tab(&self, tab: &Tab) -> Result<(), SaltioError> {
        self.check()?;
        self.state
            .lock()
            .await
            .tabs
            .insert(tab.id.clone(), tab.clone());
        Ok(())
    }

    async fn transfer_ownership(
        &self,
        from_till_id: &str,
        to_till_id: &str,
    ) -> Result<TransferSummary, SaltioError> {
        self.check()?;
        let mut state = self.state.lock().await;
        let mut summary = TransferSummary {
            tabs_moved: 0,
            sessions_moved: 0,
        };
        for tab in state.tabs.values_mut() {
            if tab.till_id == from_till_id && tab.status == TabStatus::Open {
                tab.till_id = to_till_id.to_string();
                summary.tabs_moved += 1;
            }
        }
        for session in state.sessions.values_mut() {
            if session.till_id == from_till_id && session.end_time.is_none() {
                session.till_id = to_till_id.to_string();
                summary.sessions_moved += 1;
            }
        }
        Ok(summary)
    }

    async fn record_settlement(&self, settlement: &Settlement) -> Result<(), SaltioError> {
        self.check()?;
        self.state.lock().await.settlements.push(settlement.clone());
        Ok(())
    }
}
