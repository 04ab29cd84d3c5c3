// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types shared across the Saltio workspace.
//!
//! Instants that participate in time math are `chrono::DateTime<Utc>`;
//! row-maintenance stamps (`created_at`/`updated_at`) are opaque RFC3339
//! text maintained by the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The explicit operator/company pair threaded through every controller
/// call in place of ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_id: String,
    pub company_id: String,
}

impl OperatorContext {
    pub fn new(operator_id: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            operator_id: operator_id.into(),
            company_id: company_id.into(),
        }
    }
}

/// Live status of a session as computed by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Warning,
    Expired,
    Paused,
    Finished,
}

/// Lifecycle status of a till (cash drawer shift).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TillStatus {
    Open,
    Closed,
}

/// Lifecycle status of a tab (order aggregate).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Open,
    Closed,
}

/// Kind of a billable order item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// The originally contracted session time, itemized at session start.
    TimeBase,
    /// Extra time purchased after the fact via an extension grant.
    AdditionalTime,
    /// Food, drink, and other consumables.
    Consumable,
    /// Rented equipment (socks, gear).
    Equipment,
}

/// Payment instrument category for a settlement split.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Cash,
    Card,
    Transfer,
    Voucher,
}

/// How a session is billed.
///
/// `BilledVia` sessions are owned by their tab: the scheduler never
/// auto-finishes them, only notifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionBilling {
    /// No tab attached; the scheduler may auto-finish on expiry.
    Untracked,
    /// Billed through the named tab; finished explicitly, never by expiry.
    BilledVia { tab_id: String },
}

impl SessionBilling {
    /// Returns the bound tab id, if any.
    pub fn tab_id(&self) -> Option<&str> {
        match self {
            SessionBilling::BilledVia { tab_id } => Some(tab_id),
            SessionBilling::Untracked => None,
        }
    }
}

/// A timed-use ("jump") session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub dependent_id: Option<String>,
    pub dependent_name: Option<String>,
    /// Till the session is attached to; reassigned on transfer.
    pub till_id: String,
    pub company_id: String,
    pub billing: SessionBilling,
    /// Set once at creation and never changed, even when time is added
    /// later, so elapsed/overtime accounting stays correct.
    pub start_time: DateTime<Utc>,
    /// Contracted duration in milliseconds; grows when extra time is purchased.
    pub contracted_ms: i64,
    /// Present only while paused; its presence is the paused flag.
    pub paused_at: Option<DateTime<Utc>>,
    /// Accumulated paused time; grows by the paused interval on each resume.
    pub total_paused_ms: i64,
    /// When set, overrides the scheduled end entirely (it already encodes
    /// pause and extension math).
    pub time_extension_at: Option<DateTime<Utc>>,
    /// The instant the extension was granted. Set together with
    /// `time_extension_at`; the span between them is the extra time
    /// granted, which the classifier judges progress against.
    pub time_extension_granted_at: Option<DateTime<Utc>>,
    /// Set on finish; its presence is the finished flag.
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: String,
    pub updated_at: String,
}

impl Session {
    /// Display name: the dependent if one is using the session, else the customer.
    pub fn display_name(&self) -> &str {
        self.dependent_name.as_deref().unwrap_or(&self.customer_name)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

/// A single cash withdrawal from an open till. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub amount: f64,
    pub notes: String,
    pub performed_by: String,
    pub performed_at: DateTime<Utc>,
}

/// A cash drawer bound to one operator for one shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Till {
    pub id: String,
    pub operator_id: String,
    pub company_id: String,
    pub status: TillStatus,
    pub opening_amount: f64,
    pub opening_notes: String,
    pub opened_at: DateTime<Utc>,
    pub closing_amount: Option<f64>,
    pub closing_notes: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Sum of cash-settled order amounts recorded while open.
    pub total_sales: f64,
    /// Count of orders settled while open.
    pub total_orders: u32,
    pub withdrawals: Vec<Withdrawal>,
    pub created_at: String,
    pub updated_at: String,
}

/// One billable line on a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub kind: ItemKind,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub paid: bool,
    /// Set for `TimeBase` and `AdditionalTime` items to link back to the
    /// session whose time they bill.
    pub session_id: Option<String>,
}

/// The running bill attached to one or more sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub company_id: String,
    /// Till the tab is attached to; reassigned on transfer.
    pub till_id: String,
    /// One tab may bill several sessions (e.g. multiple dependents on one card).
    pub session_ids: Vec<String>,
    pub status: TabStatus,
    pub items: Vec<OrderItem>,
    pub created_at: String,
    pub updated_at: String,
}

/// One leg of a settlement split across payment instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub payment_type_id: String,
    pub kind: PaymentKind,
    pub amount: f64,
}

/// Operator override of an already-billed `AdditionalTime` quantity,
/// applied only at tab close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAdjustment {
    pub new_quantity: f64,
    pub reason: String,
}

/// Itemized receipt data produced by a tab close, consumed by the external
/// fiscal/printing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub tab_id: String,
    pub items: Vec<OrderItem>,
    pub payments: Vec<PaymentDetail>,
    pub total: f64,
    pub closed_at: DateTime<Utc>,
}

/// Counts reported by a pending-item transfer between tills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSummary {
    pub tabs_moved: u32,
    pub sessions_moved: u32,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind the [`crate::traits::ServiceAdapter`] base trait.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Notifier,
}
