// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Till controller: open, record sales, withdraw, close.
//!
//! Close enforces the pending-item transfer protocol: a till with open tabs
//! or unfinished sessions cannot close until those are finished or moved to
//! another operator's open till. `PendingItems` is the expected, recoverable
//! signal for that — the caller presents a transfer choice and retries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use saltio_core::error::SaltioError;
use saltio_core::locks::EntityLocks;
use saltio_core::traits::StoreAdapter;
use saltio_core::types::{OperatorContext, TabStatus, Till, TillStatus, Withdrawal};
use tracing::{debug, info};

/// Absorbs floating rounding when comparing counted cash against the
/// expected balance. Not meant to mask real discrepancies.
pub const DISCREPANCY_TOLERANCE: f64 = 0.01;

/// Expected drawer contents: opening float plus cash sales minus
/// withdrawals. Pure; derived, never stored.
pub fn expected_closing(till: &Till) -> f64 {
    let withdrawn: f64 = till.withdrawals.iter().map(|w| w.amount).sum();
    till.opening_amount + till.total_sales - withdrawn
}

/// Owns the cash-drawer lifecycle.
pub struct TillController {
    store: Arc<dyn StoreAdapter + Send + Sync>,
    locks: EntityLocks,
}

impl TillController {
    pub fn new(store: Arc<dyn StoreAdapter + Send + Sync>, locks: EntityLocks) -> Self {
        Self { store, locks }
    }

    /// Opens a drawer for the operator. One open till per operator-company
    /// pair; a second open is a conflict.
    pub async fn open(
        &self,
        ctx: &OperatorContext,
        opening_amount: f64,
        opening_notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Till, SaltioError> {
        if opening_amount < 0.0 {
            return Err(SaltioError::Validation(
                "opening amount cannot be negative".into(),
            ));
        }

        if let Some(existing) = self
            .store
            .find_open_till(&ctx.operator_id, &ctx.company_id)
            .await?
        {
            return Err(SaltioError::Conflict(format!(
                "operator {} already has open till {}",
                ctx.operator_id, existing.id
            )));
        }

        let till = Till {
            id: uuid::Uuid::new_v4().to_string(),
            operator_id: ctx.operator_id.clone(),
            company_id: ctx.company_id.clone(),
            status: TillStatus::Open,
            opening_amount,
            opening_notes: opening_notes.to_string(),
            opened_at: now,
            closing_amount: None,
            closing_notes: None,
            closed_at: None,
            total_sales: 0.0,
            total_orders: 0,
            withdrawals: Vec::new(),
            created_at: stamp(now),
            updated_at: stamp(now),
        };
        self.store.upsert_till(&till).await?;

        info!(
            till_id = %till.id,
            operator = %ctx.operator_id,
            opening_amount,
            "till opened"
        );
        Ok(till)
    }

    /// Credits a cash-settled order to the drawer. Invoked by the tab
    /// close path with the cash portion of each settlement.
    pub async fn record_sale(
        &self,
        till_id: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Till, SaltioError> {
        let _guard = self.locks.acquire(till_id).await;
        let mut till = self.load_open(till_id).await?;

        till.total_sales += amount;
        till.total_orders += 1;
        till.updated_at = stamp(now);
        self.store.upsert_till(&till).await?;

        debug!(
            till_id = %till.id,
            amount,
            total_sales = till.total_sales,
            total_orders = till.total_orders,
            "sale recorded"
        );
        Ok(till)
    }

    /// Removes cash from the drawer. Cannot exceed what the drawer is
    /// believed to hold.
    pub async fn withdraw(
        &self,
        till_id: &str,
        amount: f64,
        notes: &str,
        performed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Till, SaltioError> {
        if amount <= 0.0 {
            return Err(SaltioError::Validation(
                "withdrawal amount must be positive".into(),
            ));
        }

        let _guard = self.locks.acquire(till_id).await;
        let mut till = self.load_open(till_id).await?;

        let available = expected_closing(&till);
        if amount > available {
            return Err(SaltioError::Validation(format!(
                "cannot withdraw {amount:.2}: drawer holds {available:.2}"
            )));
        }

        till.withdrawals.push(Withdrawal {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            notes: notes.to_string(),
            performed_by: performed_by.to_string(),
            performed_at: now,
        });
        till.updated_at = stamp(now);
        self.store.upsert_till(&till).await?;

        info!(
            till_id = %till.id,
            amount,
            performed_by,
            remaining = expected_closing(&till),
            "withdrawal recorded"
        );
        Ok(till)
    }

    /// Closes the drawer. One-way: a second close fails with
    /// `InvalidState`.
    ///
    /// A counted amount diverging from the expected balance by more than
    /// the tolerance requires closing notes. Pending items (open tabs,
    /// unfinished sessions) block the close unless `transfer_to_operator`
    /// names an operator with an open till to take them over.
    pub async fn close(
        &self,
        till_id: &str,
        closing_amount: f64,
        closing_notes: &str,
        transfer_to_operator: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Till, SaltioError> {
        let _guard = self.locks.acquire(till_id).await;
        let mut till = self
            .store
            .get_till(till_id)
            .await?
            .ok_or_else(|| SaltioError::NotFound {
                entity: "till",
                id: till_id.to_string(),
            })?;

        if till.status == TillStatus::Closed {
            return Err(SaltioError::InvalidState(format!(
                "till {} is already closed",
                till.id
            )));
        }

        let expected = expected_closing(&till);
        let diff = closing_amount - expected;
        if diff.abs() > DISCREPANCY_TOLERANCE && closing_notes.trim().is_empty() {
            return Err(SaltioError::Validation(format!(
                "closing notes required when the counted amount diverges \
                 (expected {expected:.2}, counted {closing_amount:.2})"
            )));
        }

        let open_tabs = self
            .store
            .list_tabs(&till.company_id, Some(till_id), TabStatus::Open)
            .await?;
        let active_sessions = self
            .store
            .list_active_sessions(&till.company_id, Some(till_id))
            .await?;

        if !open_tabs.is_empty() || !active_sessions.is_empty() {
            match transfer_to_operator {
                None => {
                    return Err(SaltioError::PendingItems {
                        open_orders: open_tabs.len() as u32,
                        active_sessions: active_sessions.len() as u32,
                    });
                }
                Some(target_operator) => {
                    let target_till = self
                        .store
                        .find_open_till(target_operator, &till.company_id)
                        .await?
                        .ok_or_else(|| {
                            SaltioError::Validation(format!(
                                "transfer target {target_operator} has no open till"
                            ))
                        })?;
                    let summary = self
                        .store
                        .transfer_ownership(till_id, &target_till.id)
                        .await?;
                    info!(
                        from_till = %till.id,
                        to_till = %target_till.id,
                        tabs_moved = summary.tabs_moved,
                        sessions_moved = summary.sessions_moved,
                        "pending items transferred"
                    );
                }
            }
        }

        till.status = TillStatus::Closed;
        till.closing_amount = Some(closing_amount);
        till.closing_notes = Some(closing_notes.to_string());
        till.closed_at = Some(now);
        till.updated_at = stamp(now);
        self.store.upsert_till(&till).await?;

        info!(
            till_id = %till.id,
            expected,
            counted = closing_amount,
            diff,
            "till closed"
        );
        Ok(till)
    }

    async fn load_open(&self, till_id: &str) -> Result<Till, SaltioError> {
        let till = self
            .store
            .get_till(till_id)
            .await?
            .ok_or_else(|| SaltioError::NotFound {
                entity: "till",
                id: till_id.to_string(),
            })?;
        if till.status != TillStatus::Open {
            return Err(SaltioError::InvalidState(format!(
                "till {} is not open",
                till.id
            )));
        }
        Ok(till)
    }
}

fn stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn till_with(opening: f64, sales: f64, withdrawals: &[f64]) -> Till {
        Till {
            id: "t1".into(),
            operator_id: "op1".into(),
            company_id: "co1".into(),
            status: TillStatus::Open,
            opening_amount: opening,
            opening_notes: String::new(),
            opened_at: Utc::now(),
            closing_amount: None,
            closing_notes: None,
            closed_at: None,
            total_sales: sales,
            total_orders: 0,
            withdrawals: withdrawals
                .iter()
                .map(|&amount| Withdrawal {
                    id: uuid::Uuid::new_v4().to_string(),
                    amount,
                    notes: String::new(),
                    performed_by: "op1".into(),
                    performed_at: Utc::now(),
                })
                .collect(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn expected_closing_is_opening_plus_sales_minus_withdrawals() {
        let till = till_with(100.0, 250.5, &[30.0, 20.5]);
        assert_eq!(expected_closing(&till), 300.0);
    }

    #[test]
    fn expected_closing_with_no_activity_is_the_float() {
        let till = till_with(150.0, 0.0, &[]);
        assert_eq!(expected_closing(&till), 150.0);
    }

    #[test]
    fn expected_closing_does_not_drift_with_operation_order() {
        // Same totals, different interleavings.
        let a = till_with(100.0, 75.0, &[10.0, 15.0, 25.0]);
        let b = till_with(100.0, 75.0, &[25.0, 10.0, 15.0]);
        assert_eq!(expected_closing(&a), expected_closing(&b));
    }
}
