// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log-based expiry notifier.
//!
//! The external messaging integration lives behind the notifier port; the
//! shipped implementation surfaces expirations through structured logs so
//! the service is useful without it.

use async_trait::async_trait;
use tracing::warn;

use saltio_core::types::{AdapterType, HealthStatus, Session};
use saltio_core::{NotifierAdapter, SaltioError, ServiceAdapter};

/// Notifier that logs expirations at `warn` level.
pub struct LogNotifier;

#[async_trait]
impl ServiceAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, SaltioError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SaltioError> {
        Ok(())
    }
}

#[async_trait]
impl NotifierAdapter for LogNotifier {
    async fn session_expired(
        &self,
        session: &Session,
        overtime_ms: i64,
    ) -> Result<(), SaltioError> {
        warn!(
            session_id = %session.id,
            customer = %session.display_name(),
            overtime = %saltio_core::duration::format(overtime_ms),
            "session time expired"
        );
        Ok(())
    }
}
