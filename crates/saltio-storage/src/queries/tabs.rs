// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tab row persistence.
//!
//! Items and bound session ids are JSON columns written whole on each
//! upsert; the aggregate logic that edits them lives in saltio-tab.

use rusqlite::params;
use saltio_core::types::{OrderItem, Tab, TabStatus};
use saltio_core::SaltioError;
use std::str::FromStr;

use crate::database::{map_tr_err, Database};
use crate::queries::{from_json, to_json};

const TAB_COLUMNS: &str = "id, company_id, till_id, session_ids, status, items, created_at, updated_at";

fn tab_from_row(row: &rusqlite::Row<'_>) -> Result<Tab, rusqlite::Error> {
    let session_ids: String = row.get(3)?;
    let status: String = row.get(4)?;
    let items: String = row.get(5)?;
    Ok(Tab {
        id: row.get(0)?,
        company_id: row.get(1)?,
        till_id: row.get(2)?,
        session_ids: from_json::<Vec<String>>(3, &session_ids)?,
        status: TabStatus::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        items: from_json::<Vec<OrderItem>>(5, &items)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert or update a tab row.
pub async fn upsert_tab(db: &Database, tab: &Tab) -> Result<(), SaltioError> {
    let tab = tab.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tabs (id, company_id, till_id, session_ids, status, items, \
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     till_id = excluded.till_id,
                     session_ids = excluded.session_ids,
                     status = excluded.status,
                     items = excluded.items,
                     updated_at = excluded.updated_at",
                params![
                    tab.id,
                    tab.company_id,
                    tab.till_id,
                    to_json(&tab.session_ids)?,
                    tab.status.to_string(),
                    to_json(&tab.items)?,
                    tab.created_at,
                    tab.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a tab by ID.
pub async fn get_tab(db: &Database, id: &str) -> Result<Option<Tab>, SaltioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TAB_COLUMNS} FROM tabs WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], tab_from_row);
            match result {
                Ok(tab) => Ok(Some(tab)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List tabs for a company in the given status, optionally scoped to a till.
pub async fn list_tabs(
    db: &Database,
    company_id: &str,
    till_id: Option<&str>,
    status: TabStatus,
) -> Result<Vec<Tab>, SaltioError> {
    let company_id = company_id.to_string();
    let till_id = till_id.map(|t| t.to_string());
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let mut tabs = Vec::new();
            match &till_id {
                Some(till) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {TAB_COLUMNS} FROM tabs
                         WHERE company_id = ?1 AND till_id = ?2 AND status = ?3
                         ORDER BY created_at"
                    ))?;
                    let rows = stmt.query_map(params![company_id, till, status], tab_from_row)?;
                    for row in rows {
                        tabs.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {TAB_COLUMNS} FROM tabs
                         WHERE company_id = ?1 AND status = ?2
                         ORDER BY created_at"
                    ))?;
                    let rows = stmt.query_map(params![company_id, status], tab_from_row)?;
                    for row in rows {
                        tabs.push(row?);
                    }
                }
            }
            Ok(tabs)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saltio_core::types::ItemKind;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_tab(id: &str) -> Tab {
        Tab {
            id: id.to_string(),
            company_id: "park".to_string(),
            till_id: "till-1".to_string(),
            session_ids: vec!["s-1".to_string()],
            status: TabStatus::Open,
            items: vec![OrderItem {
                id: "item-1".to_string(),
                kind: ItemKind::TimeBase,
                description: "Jump time 1h".to_string(),
                quantity: 1.0,
                unit_price: 40.0,
                subtotal: 40.0,
                paid: false,
                session_id: Some("s-1".to_string()),
            }],
            created_at: "2026-01-01T10:00:00.000Z".to_string(),
            updated_at: "2026-01-01T10:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_tab_roundtrips_items() {
        let (db, _dir) = setup_db().await;
        upsert_tab(&db, &make_tab("tab-1")).await.unwrap();

        let got = get_tab(&db, "tab-1").await.unwrap().unwrap();
        assert_eq!(got.session_ids, vec!["s-1"]);
        assert_eq!(got.items.len(), 1);
        assert_eq!(got.items[0].kind, ItemKind::TimeBase);
        assert!(!got.items[0].paid);
    }

    #[tokio::test]
    async fn get_nonexistent_tab_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_tab(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_tabs_filters_status_and_till() {
        let (db, _dir) = setup_db().await;
        let t1 = make_tab("tab-open");
        let mut t2 = make_tab("tab-closed");
        t2.status = TabStatus::Closed;
        let mut t3 = make_tab("tab-other-till");
        t3.till_id = "till-2".to_string();

        for t in [&t1, &t2, &t3] {
            upsert_tab(&db, t).await.unwrap();
        }

        let open = list_tabs(&db, "park", None, TabStatus::Open).await.unwrap();
        assert_eq!(open.len(), 2);

        let open_till1 = list_tabs(&db, "park", Some("till-1"), TabStatus::Open)
            .await
            .unwrap();
        assert_eq!(open_till1.len(), 1);
        assert_eq!(open_till1[0].id, "tab-open");

        let closed = list_tabs(&db, "park", None, TabStatus::Closed).await.unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, "tab-closed");
    }
}
