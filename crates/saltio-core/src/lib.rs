// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Saltio facility management system.
//!
//! This crate provides the foundational trait definitions, error types,
//! entity types, the duration codec, and the per-entity lock map used
//! throughout the Saltio workspace. All adapter implementations implement
//! traits defined here.

pub mod duration;
pub mod error;
pub mod locks;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SaltioError;
pub use locks::EntityLocks;
pub use types::{
    AdapterType, HealthStatus, ItemKind, OperatorContext, OrderItem, PaymentDetail,
    PaymentKind, Session, SessionBilling, SessionStatus, Settlement, Tab, TabStatus, Till,
    TillStatus, TimeAdjustment, TransferSummary, Withdrawal,
};

// Re-export all adapter traits at crate root.
pub use traits::{NotifierAdapter, ServiceAdapter, StoreAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saltio_error_has_all_variants() {
        // Verify all 9 error variants exist and can be constructed.
        let _validation = SaltioError::Validation("test".into());
        let _invalid_state = SaltioError::InvalidState("test".into());
        let _conflict = SaltioError::Conflict("test".into());
        let _pending = SaltioError::PendingItems {
            open_orders: 1,
            active_sessions: 2,
        };
        let _malformed = SaltioError::MalformedDuration {
            text: "soon".into(),
        };
        let _not_found = SaltioError::NotFound {
            entity: "till",
            id: "test".into(),
        };
        let _config = SaltioError::Config("test".into());
        let _storage = SaltioError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = SaltioError::Internal("test".into());
    }

    #[test]
    fn pending_items_message_carries_counts() {
        let err = SaltioError::PendingItems {
            open_orders: 1,
            active_sessions: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("1 open order"), "got: {msg}");
        assert!(msg.contains("3 active session"), "got: {msg}");
    }

    #[test]
    fn status_enums_round_trip() {
        use std::str::FromStr;

        for status in [
            SessionStatus::Active,
            SessionStatus::Warning,
            SessionStatus::Expired,
            SessionStatus::Paused,
            SessionStatus::Finished,
        ] {
            let s = status.to_string();
            assert_eq!(SessionStatus::from_str(&s).unwrap(), status);
        }

        assert_eq!(TillStatus::from_str("open").unwrap(), TillStatus::Open);
        assert_eq!(TabStatus::from_str("closed").unwrap(), TabStatus::Closed);
        assert_eq!(
            ItemKind::from_str("additionalTime").unwrap(),
            ItemKind::AdditionalTime
        );
    }

    #[test]
    fn item_kind_serialization_is_camel_case() {
        let json = serde_json::to_string(&ItemKind::TimeBase).unwrap();
        assert_eq!(json, "\"timeBase\"");
        let parsed: ItemKind = serde_json::from_str("\"additionalTime\"").unwrap();
        assert_eq!(parsed, ItemKind::AdditionalTime);
    }

    #[test]
    fn session_display_name_prefers_dependent() {
        let mut session = Session {
            id: "s1".into(),
            customer_id: "c1".into(),
            customer_name: "Ana Souza".into(),
            dependent_id: Some("d1".into()),
            dependent_name: Some("Pedro Souza".into()),
            till_id: "t1".into(),
            company_id: "co1".into(),
            billing: SessionBilling::Untracked,
            start_time: chrono::Utc::now(),
            contracted_ms: 3_600_000,
            paused_at: None,
            total_paused_ms: 0,
            time_extension_at: None,
            time_extension_granted_at: None,
            end_time: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(session.display_name(), "Pedro Souza");

        session.dependent_name = None;
        assert_eq!(session.display_name(), "Ana Souza");
    }

    #[test]
    fn billing_variant_exposes_tab_id() {
        let untracked = SessionBilling::Untracked;
        assert_eq!(untracked.tab_id(), None);

        let billed = SessionBilling::BilledVia {
            tab_id: "tab-9".into(),
        };
        assert_eq!(billed.tab_id(), Some("tab-9"));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Compile-time check that the adapter traits are accessible
        // through the public API.
        fn _assert_service_adapter<T: ServiceAdapter>() {}
        fn _assert_store_adapter<T: StoreAdapter>() {}
        fn _assert_notifier_adapter<T: NotifierAdapter>() {}
    }
}
