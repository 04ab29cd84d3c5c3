// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settlement row persistence. Append-only: settlements are the receipt
//! payloads handed to the fiscal collaborator and are never edited.

use rusqlite::params;
use saltio_core::types::Settlement;
use saltio_core::SaltioError;

use crate::database::{map_tr_err, Database};
use crate::queries::{stamp, to_json};

/// Record a settlement produced by a tab close.
pub async fn record_settlement(db: &Database, settlement: &Settlement) -> Result<(), SaltioError> {
    let settlement = settlement.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO settlements (id, tab_id, items, payments, total, closed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    settlement.tab_id,
                    to_json(&settlement.items)?,
                    to_json(&settlement.payments)?,
                    settlement.total,
                    settlement.closed_at.to_rfc3339(),
                    stamp(chrono::Utc::now()),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use saltio_core::types::{ItemKind, OrderItem, PaymentDetail, PaymentKind};
    use tempfile::tempdir;

    #[tokio::test]
    async fn settlements_append_per_close() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let settlement = Settlement {
            tab_id: "tab-1".to_string(),
            items: vec![OrderItem {
                id: "item-1".to_string(),
                kind: ItemKind::Consumable,
                description: "Water".to_string(),
                quantity: 2.0,
                unit_price: 1.5,
                subtotal: 3.0,
                paid: true,
                session_id: None,
            }],
            payments: vec![PaymentDetail {
                payment_type_id: "pt-cash".to_string(),
                kind: PaymentKind::Cash,
                amount: 3.0,
            }],
            total: 3.0,
            closed_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        };
        record_settlement(&db, &settlement).await.unwrap();
        record_settlement(&db, &settlement).await.unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM settlements WHERE tab_id = 'tab-1'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
