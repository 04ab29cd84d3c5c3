// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence/billing port for sessions, tills, tabs, and settlements.

use async_trait::async_trait;

use crate::error::SaltioError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{Session, Settlement, Tab, TabStatus, Till, TransferSummary};

/// Adapter for the persistence and billing backend.
///
/// Controllers mutate entities exclusively through this port; the
/// reconciliation scheduler reads through it. Implementations must keep
/// `transfer_ownership` atomic — a till close that transfers pending items
/// must never leave half of them behind.
#[async_trait]
pub trait StoreAdapter: ServiceAdapter {
    /// Initializes the backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), SaltioError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), SaltioError>;

    /// Returns the operator's currently open till for the company, if any.
    async fn find_open_till(
        &self,
        operator_id: &str,
        company_id: &str,
    ) -> Result<Option<Till>, SaltioError>;

    async fn get_till(&self, id: &str) -> Result<Option<Till>, SaltioError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, SaltioError>;

    async fn get_tab(&self, id: &str) -> Result<Option<Tab>, SaltioError>;

    /// Lists unfinished sessions for a company, optionally scoped to a till.
    async fn list_active_sessions(
        &self,
        company_id: &str,
        till_id: Option<&str>,
    ) -> Result<Vec<Session>, SaltioError>;

    /// Lists tabs for a company in the given status, optionally scoped to a till.
    async fn list_tabs(
        &self,
        company_id: &str,
        till_id: Option<&str>,
        status: TabStatus,
    ) -> Result<Vec<Tab>, SaltioError>;

    async fn upsert_session(&self, session: &Session) -> Result<(), SaltioError>;

    async fn upsert_till(&self, till: &Till) -> Result<(), SaltioError>;

    async fn upsert_tab(&self, tab: &Tab) -> Result<(), SaltioError>;

    /// Reassigns all open tabs and unfinished sessions from one till to
    /// another, atomically. Returns how many of each moved.
    async fn transfer_ownership(
        &self,
        from_till_id: &str,
        to_till_id: &str,
    ) -> Result<TransferSummary, SaltioError>;

    /// Records a settlement (receipt payload for the fiscal collaborator).
    /// Append-only.
    async fn record_settlement(&self, settlement: &Settlement) -> Result<(), SaltioError>;
}
