// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Till row persistence and the pending-item transfer transaction.
//!
//! The `withdrawals` column is a JSON array maintained as a whole on each
//! upsert; withdrawals are append-only at the controller level. A partial
//! unique index enforces at most one open till per operator-company pair.

use rusqlite::params;
use saltio_core::types::{Till, TillStatus, TransferSummary, Withdrawal};
use saltio_core::SaltioError;
use std::str::FromStr;

use crate::database::{map_tr_err, Database};
use crate::queries::{from_json, parse_instant, parse_opt_instant, stamp, to_json};

const TILL_COLUMNS: &str = "id, operator_id, company_id, status, opening_amount, opening_notes, \
     opened_at, closing_amount, closing_notes, closed_at, total_sales, total_orders, \
     withdrawals, created_at, updated_at";

fn till_from_row(row: &rusqlite::Row<'_>) -> Result<Till, rusqlite::Error> {
    let status: String = row.get(3)?;
    let opened_at: String = row.get(6)?;
    let closed_at: Option<String> = row.get(9)?;
    let withdrawals: String = row.get(12)?;
    Ok(Till {
        id: row.get(0)?,
        operator_id: row.get(1)?,
        company_id: row.get(2)?,
        status: TillStatus::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        opening_amount: row.get(4)?,
        opening_notes: row.get(5)?,
        opened_at: parse_instant(6, &opened_at)?,
        closing_amount: row.get(7)?,
        closing_notes: row.get(8)?,
        closed_at: parse_opt_instant(9, closed_at.as_deref())?,
        total_sales: row.get(10)?,
        total_orders: row.get(11)?,
        withdrawals: from_json::<Vec<Withdrawal>>(12, &withdrawals)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Insert or update a till row.
///
/// A second open till for the same operator-company pair violates the
/// partial unique index and surfaces as [`SaltioError::Conflict`].
pub async fn upsert_till(db: &Database, till: &Till) -> Result<(), SaltioError> {
    let till = till.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO tills (id, operator_id, company_id, status, opening_amount, \
                     opening_notes, opened_at, closing_amount, closing_notes, closed_at, \
                     total_sales, total_orders, withdrawals, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(id) DO UPDATE SET
                     status = excluded.status,
                     closing_amount = excluded.closing_amount,
                     closing_notes = excluded.closing_notes,
                     closed_at = excluded.closed_at,
                     total_sales = excluded.total_sales,
                     total_orders = excluded.total_orders,
                     withdrawals = excluded.withdrawals,
                     updated_at = excluded.updated_at",
                params![
                    till.id,
                    till.operator_id,
                    till.company_id,
                    till.status.to_string(),
                    till.opening_amount,
                    till.opening_notes,
                    till.opened_at.to_rfc3339(),
                    till.closing_amount,
                    till.closing_notes,
                    till.closed_at.map(|t| t.to_rfc3339()),
                    till.total_sales,
                    till.total_orders,
                    to_json(&till.withdrawals)?,
                    till.created_at,
                    till.updated_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;
    if !inserted {
        return Err(SaltioError::Conflict(
            "operator already has an open till".to_string(),
        ));
    }
    Ok(())
}

/// Get a till by ID.
pub async fn get_till(db: &Database, id: &str) -> Result<Option<Till>, SaltioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TILL_COLUMNS} FROM tills WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], till_from_row);
            match result {
                Ok(till) => Ok(Some(till)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Find the operator's currently open till for a company, if any.
pub async fn find_open_till(
    db: &Database,
    operator_id: &str,
    company_id: &str,
) -> Result<Option<Till>, SaltioError> {
    let operator_id = operator_id.to_string();
    let company_id = company_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TILL_COLUMNS} FROM tills
                 WHERE operator_id = ?1 AND company_id = ?2 AND status = 'open'"
            ))?;
            let result = stmt.query_row(params![operator_id, company_id], till_from_row);
            match result {
                Ok(till) => Ok(Some(till)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Reassign all open tabs and unfinished sessions from one till to another
/// in a single transaction.
pub async fn transfer_ownership(
    db: &Database,
    from_till_id: &str,
    to_till_id: &str,
) -> Result<TransferSummary, SaltioError> {
    let from = from_till_id.to_string();
    let to = to_till_id.to_string();
    db.connection()
        .call(move |conn| {
            let now = stamp(chrono::Utc::now());
            let tx = conn.transaction()?;
            let tabs_moved = tx.execute(
                "UPDATE tabs SET till_id = ?2, updated_at = ?3
                 WHERE till_id = ?1 AND status = 'open'",
                params![from, to, now],
            )?;
            let sessions_moved = tx.execute(
                "UPDATE sessions SET till_id = ?2, updated_at = ?3
                 WHERE till_id = ?1 AND end_time IS NULL",
                params![from, to, now],
            )?;
            tx.commit()?;
            Ok(TransferSummary {
                tabs_moved: tabs_moved as u32,
                sessions_moved: sessions_moved as u32,
            })
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_till(id: &str, operator_id: &str) -> Till {
        Till {
            id: id.to_string(),
            operator_id: operator_id.to_string(),
            company_id: "park".to_string(),
            status: TillStatus::Open,
            opening_amount: 100.0,
            opening_notes: String::new(),
            opened_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
            closing_amount: None,
            closing_notes: None,
            closed_at: None,
            total_sales: 0.0,
            total_orders: 0,
            withdrawals: Vec::new(),
            created_at: "2026-01-01T09:00:00.000Z".to_string(),
            updated_at: "2026-01-01T09:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_and_find_open_till() {
        let (db, _dir) = setup_db().await;
        let mut till = make_till("till-1", "op-1");
        till.withdrawals.push(Withdrawal {
            id: "w-1".to_string(),
            amount: 20.0,
            notes: "change run".to_string(),
            performed_by: "op-1".to_string(),
            performed_at: Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(),
        });
        upsert_till(&db, &till).await.unwrap();

        let found = find_open_till(&db, "op-1", "park").await.unwrap().unwrap();
        assert_eq!(found.id, "till-1");
        assert_eq!(found.withdrawals.len(), 1);
        assert_eq!(found.withdrawals[0].amount, 20.0);

        assert!(find_open_till(&db, "op-2", "park").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_open_till_for_operator_is_conflict() {
        let (db, _dir) = setup_db().await;
        upsert_till(&db, &make_till("till-1", "op-1")).await.unwrap();

        let err = upsert_till(&db, &make_till("till-2", "op-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SaltioError::Conflict(_)));
    }

    #[tokio::test]
    async fn closing_a_till_clears_the_open_slot() {
        let (db, _dir) = setup_db().await;
        let mut till = make_till("till-1", "op-1");
        upsert_till(&db, &till).await.unwrap();

        till.status = TillStatus::Closed;
        till.closing_amount = Some(120.0);
        till.closed_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 18, 0, 0).unwrap());
        upsert_till(&db, &till).await.unwrap();

        assert!(find_open_till(&db, "op-1", "park").await.unwrap().is_none());
        // slot free again for the next shift
        upsert_till(&db, &make_till("till-2", "op-1")).await.unwrap();
    }

    #[tokio::test]
    async fn transfer_moves_open_tabs_and_unfinished_sessions() {
        let (db, _dir) = setup_db().await;
        upsert_till(&db, &make_till("till-a", "op-1")).await.unwrap();
        upsert_till(&db, &make_till("till-b", "op-2")).await.unwrap();

        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(
                    "INSERT INTO tabs (id, company_id, till_id, status, created_at, updated_at)
                     VALUES ('tab-1', 'park', 'till-a', 'open', 'c', 'u'),
                            ('tab-2', 'park', 'till-a', 'closed', 'c', 'u');
                     INSERT INTO sessions (id, customer_id, customer_name, till_id, company_id,
                                           start_time, contracted_ms, created_at, updated_at)
                     VALUES ('s-1', 'c1', 'Ada', 'till-a', 'park',
                             '2026-01-01T10:00:00+00:00', 3600000, 'c', 'u');",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let summary = transfer_ownership(&db, "till-a", "till-b").await.unwrap();
        assert_eq!(summary.tabs_moved, 1);
        assert_eq!(summary.sessions_moved, 1);

        let moved = crate::queries::sessions::list_active_sessions(&db, "park", Some("till-b"))
            .await
            .unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, "s-1");
    }
}
