// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier adapter that captures expiry notifications for assertions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use saltio_core::types::{AdapterType, HealthStatus, Session};
use saltio_core::{NotifierAdapter, SaltioError, ServiceAdapter};

/// One captured expiry notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryNotice {
    pub session_id: String,
    pub display_name: String,
    pub overtime_ms: i64,
}

/// A notifier that records every notification instead of delivering it.
///
/// `set_failing(true)` makes `session_expired` return an error, for
/// verifying that the scheduler treats notification failure as non-fatal.
pub struct MockNotifier {
    notices: Arc<Mutex<Vec<ExpiryNotice>>>,
    failing: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            notices: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// Make subsequent notifications fail (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All captured notifications, oldest first.
    pub async fn notices(&self) -> Vec<ExpiryNotice> {
        self.notices.lock().await.clone()
    }

    /// Number of captured notifications.
    pub async fn notice_count(&self) -> usize {
        self.notices.lock().await.len()
    }

    /// Drop all captured notifications.
    pub async fn clear(&self) {
        self.notices.lock().await.clear();
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
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
impl NotifierAdapter for MockNotifier {
    async fn session_expired(
        &self,
        session: &Session,
        overtime_ms: i64,
    ) -> Result<(), SaltioError> {
        // Record before the failure check so tests can assert the attempt.
        self.notices.lock().await.push(ExpiryNotice {
            session_id: session.id.clone(),
            display_name: session.display_name().to_string(),
            overtime_ms,
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(SaltioError::Internal(
                "mock notifier failure injected".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use saltio_core::types::SessionBilling;

    fn make_session() -> Session {
        Session {
            id: "s-1".to_string(),
            customer_id: "cust".to_string(),
            customer_name: "Ada".to_string(),
            dependent_id: Some("dep-1".to_string()),
            dependent_name: Some("Billie".to_string()),
            till_id: "t-1".to_string(),
            company_id: "park".to_string(),
            billing: SessionBilling::Untracked,
            start_time: Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(),
            contracted_ms: 3_600_000,
            paused_at: None,
            total_paused_ms: 0,
            time_extension_at: None,
            time_extension_granted_at: None,
            end_time: None,
            created_at: "c".to_string(),
            updated_at: "u".to_string(),
        }
    }

    #[tokio::test]
    async fn captures_notifications_with_display_name() {
        let notifier = MockNotifier::new();
        notifier
            .session_expired(&make_session(), 12_000)
            .await
            .unwrap();

        let notices = notifier.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].session_id, "s-1");
        assert_eq!(notices[0].display_name, "Billie");
        assert_eq!(notices[0].overtime_ms, 12_000);
    }

    #[tokio::test]
    async fn failure_injection_still_records_the_attempt() {
        let notifier = MockNotifier::new();
        notifier.set_failing(true);
        assert!(notifier.session_expired(&make_session(), 0).await.is_err());
        assert_eq!(notifier.notice_count().await, 1);
    }
}
