// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification port consumed by the reconciliation scheduler.

use async_trait::async_trait;

use crate::error::SaltioError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::Session;

/// Adapter for operator-facing expiry notifications.
///
/// The shipped implementation logs through `tracing`; the external
/// messaging integration is out of scope and lives behind this port.
#[async_trait]
pub trait NotifierAdapter: ServiceAdapter {
    /// Notifies that a session's time has run out.
    ///
    /// `overtime_ms` is how far past its deadline the session is at the
    /// moment of detection (zero when caught exactly at expiry).
    async fn session_expired(
        &self,
        session: &Session,
        overtime_ms: i64,
    ) -> Result<(), SaltioError>;
}
