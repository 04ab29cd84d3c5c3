// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tab controller: item maintenance and the payment-split close.
//!
//! Close recomputes the total through the same preview fold the UI uses,
//! reconciles the payment split against it, commits any time adjustments,
//! records the settlement for the fiscal collaborator, and credits the
//! cash portion to the owning till.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use saltio_core::error::SaltioError;
use saltio_core::locks::EntityLocks;
use saltio_core::traits::StoreAdapter;
use saltio_core::types::{
    ItemKind, OrderItem, PaymentDetail, PaymentKind, Settlement, Tab, TabStatus,
    TimeAdjustment,
};
use saltio_till::TillController;
use tracing::{debug, info};

use crate::aggregate;

/// Payment splits may diverge from the total due by at most this much.
const PAYMENT_TOLERANCE: f64 = 0.01;

/// Owns item maintenance and settlement for tabs.
pub struct TabController {
    store: Arc<dyn StoreAdapter + Send + Sync>,
    till: Arc<TillController>,
    locks: EntityLocks,
}

impl TabController {
    pub fn new(
        store: Arc<dyn StoreAdapter + Send + Sync>,
        till: Arc<TillController>,
        locks: EntityLocks,
    ) -> Self {
        Self { store, till, locks }
    }

    /// Appends a billable item to an open tab.
    pub async fn add_item(
        &self,
        tab_id: &str,
        kind: ItemKind,
        description: &str,
        quantity: f64,
        unit_price: f64,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Tab, SaltioError> {
        if quantity <= 0.0 {
            return Err(SaltioError::Validation("quantity must be positive".into()));
        }
        if unit_price < 0.0 {
            return Err(SaltioError::Validation(
                "unit price cannot be negative".into(),
            ));
        }

        let _guard = self.locks.acquire(tab_id).await;
        let mut tab = self.load_open(tab_id).await?;

        tab.items.push(OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            description: description.to_string(),
            quantity,
            unit_price,
            subtotal: quantity * unit_price,
            paid: false,
            session_id: session_id.map(str::to_string),
        });
        tab.updated_at = stamp(now);
        self.store.upsert_tab(&tab).await?;

        debug!(tab_id = %tab.id, kind = %kind, quantity, unit_price, "item added");
        Ok(tab)
    }

    /// Removes an item. The originally billed session time (`timeBase`
    /// without an extra/override marker) is protected.
    pub async fn remove_item(
        &self,
        tab_id: &str,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Tab, SaltioError> {
        let _guard = self.locks.acquire(tab_id).await;
        let mut tab = self.load_open(tab_id).await?;

        let index = tab
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| {
                SaltioError::Validation(format!("no item {item_id} on tab {tab_id}"))
            })?;
        if aggregate::is_protected(&tab.items[index]) {
            return Err(SaltioError::Validation(
                "the originally billed session time cannot be removed".into(),
            ));
        }

        let removed = tab.items.remove(index);
        tab.updated_at = stamp(now);
        self.store.upsert_tab(&tab).await?;

        debug!(tab_id = %tab.id, item_id = %removed.id, "item removed");
        Ok(tab)
    }

    /// Flips an item's paid flag; paid items drop out of the total due.
    pub async fn toggle_paid(
        &self,
        tab_id: &str,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Tab, SaltioError> {
        let _guard = self.locks.acquire(tab_id).await;
        let mut tab = self.load_open(tab_id).await?;

        let item = tab
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                SaltioError::Validation(format!("no item {item_id} on tab {tab_id}"))
            })?;
        item.paid = !item.paid;
        tab.updated_at = stamp(now);
        self.store.upsert_tab(&tab).await?;

        debug!(tab_id = %tab.id, item_id, "paid flag toggled");
        Ok(tab)
    }

    /// Total due after adjustments, without mutating anything.
    pub async fn preview_close(
        &self,
        tab_id: &str,
        adjustments: &HashMap<String, TimeAdjustment>,
    ) -> Result<f64, SaltioError> {
        let tab = self.load(tab_id).await?;
        aggregate::preview_close(&tab, adjustments)
    }

    /// Settles and closes the tab.
    ///
    /// The payment split must cover the (post-adjustment) total due within
    /// tolerance. On success the adjustments are committed into the item
    /// rows, all items are marked paid, the settlement is recorded, and
    /// the cash portion is credited to the owning till as one sale.
    pub async fn close(
        &self,
        tab_id: &str,
        payments: &[PaymentDetail],
        adjustments: &HashMap<String, TimeAdjustment>,
        now: DateTime<Utc>,
    ) -> Result<Settlement, SaltioError> {
        let _guard = self.locks.acquire(tab_id).await;
        let mut tab = self.load(tab_id).await?;

        if tab.status == TabStatus::Closed {
            return Err(SaltioError::InvalidState(format!(
                "tab {} is already closed",
                tab.id
            )));
        }

        let total = aggregate::preview_close(&tab, adjustments)?;
        if payments.is_empty() && total > 0.0 {
            return Err(SaltioError::Validation(format!(
                "payment details required: {total:.2} is due"
            )));
        }
        let paid: f64 = payments.iter().map(|p| p.amount).sum();
        if (paid - total).abs() > PAYMENT_TOLERANCE {
            return Err(SaltioError::Validation(format!(
                "payments sum to {paid:.2} but {total:.2} is due"
            )));
        }

        aggregate::commit_adjustments(&mut tab, adjustments);
        for item in &mut tab.items {
            item.paid = true;
        }
        tab.status = TabStatus::Closed;
        tab.updated_at = stamp(now);
        self.store.upsert_tab(&tab).await?;

        let settlement = Settlement {
            tab_id: tab.id.clone(),
            items: tab.items.clone(),
            payments: payments.to_vec(),
            total,
            closed_at: now,
        };
        self.store.record_settlement(&settlement).await?;

        let cash_portion: f64 = payments
            .iter()
            .filter(|p| p.kind == PaymentKind::Cash)
            .map(|p| p.amount)
            .sum();
        self.till.record_sale(&tab.till_id, cash_portion, now).await?;

        info!(
            tab_id = %tab.id,
            total,
            cash_portion,
            payment_legs = payments.len(),
            "tab closed"
        );
        Ok(settlement)
    }

    async fn load(&self, tab_id: &str) -> Result<Tab, SaltioError> {
        self.store
            .get_tab(tab_id)
            .await?
            .ok_or_else(|| SaltioError::NotFound {
                entity: "tab",
                id: tab_id.to_string(),
            })
    }

    async fn load_open(&self, tab_id: &str) -> Result<Tab, SaltioError> {
        let tab = self.load(tab_id).await?;
        if tab.status != TabStatus::Open {
            return Err(SaltioError::InvalidState(format!(
                "tab {} is closed",
                tab.id
            )));
        }
        Ok(tab)
    }
}

fn stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
