// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session row persistence.
//!
//! The `tab_id` column encodes the billing variant: NULL means untracked,
//! a value means the session is billed via that tab. `total_paused` is
//! normalized `HH:MM:SS` text; malformed legacy values read as zero.

use rusqlite::params;
use saltio_core::types::{Session, SessionBilling};
use saltio_core::{duration, SaltioError};

use crate::database::{map_tr_err, Database};
use crate::queries::{parse_instant, parse_opt_instant};

const SESSION_COLUMNS: &str = "id, customer_id, customer_name, dependent_id, dependent_name, \
     till_id, company_id, tab_id, start_time, contracted_ms, paused_at, total_paused, \
     time_extension_at, time_extension_granted_at, end_time, created_at, updated_at";

fn session_from_row(row: &rusqlite::Row<'_>) -> Result<Session, rusqlite::Error> {
    let tab_id: Option<String> = row.get(7)?;
    let start_time: String = row.get(8)?;
    let paused_at: Option<String> = row.get(10)?;
    let total_paused: String = row.get(11)?;
    let time_extension_at: Option<String> = row.get(12)?;
    let time_extension_granted_at: Option<String> = row.get(13)?;
    let end_time: Option<String> = row.get(14)?;
    Ok(Session {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        dependent_id: row.get(3)?,
        dependent_name: row.get(4)?,
        till_id: row.get(5)?,
        company_id: row.get(6)?,
        billing: match tab_id {
            Some(tab_id) => SessionBilling::BilledVia { tab_id },
            None => SessionBilling::Untracked,
        },
        start_time: parse_instant(8, &start_time)?,
        contracted_ms: row.get(9)?,
        paused_at: parse_opt_instant(10, paused_at.as_deref())?,
        total_paused_ms: duration::parse_or_zero(&total_paused),
        time_extension_at: parse_opt_instant(12, time_extension_at.as_deref())?,
        time_extension_granted_at: parse_opt_instant(
            13,
            time_extension_granted_at.as_deref(),
        )?,
        end_time: parse_opt_instant(14, end_time.as_deref())?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

/// Insert or update a session row.
pub async fn upsert_session(db: &Database, session: &Session) -> Result<(), SaltioError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, customer_id, customer_name, dependent_id, \
                     dependent_name, till_id, company_id, tab_id, start_time, contracted_ms, \
                     paused_at, total_paused, time_extension_at, time_extension_granted_at, \
                     end_time, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                     ?16, ?17)
                 ON CONFLICT(id) DO UPDATE SET
                     till_id = excluded.till_id,
                     tab_id = excluded.tab_id,
                     contracted_ms = excluded.contracted_ms,
                     paused_at = excluded.paused_at,
                     total_paused = excluded.total_paused,
                     time_extension_at = excluded.time_extension_at,
                     time_extension_granted_at = excluded.time_extension_granted_at,
                     end_time = excluded.end_time,
                     updated_at = excluded.updated_at",
                params![
                    session.id,
                    session.customer_id,
                    session.customer_name,
                    session.dependent_id,
                    session.dependent_name,
                    session.till_id,
                    session.company_id,
                    session.billing.tab_id(),
                    session.start_time.to_rfc3339(),
                    session.contracted_ms,
                    session.paused_at.map(|t| t.to_rfc3339()),
                    duration::format(session.total_paused_ms),
                    session.time_extension_at.map(|t| t.to_rfc3339()),
                    session.time_extension_granted_at.map(|t| t.to_rfc3339()),
                    session.end_time.map(|t| t.to_rfc3339()),
                    session.created_at,
                    session.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, SaltioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], session_from_row);
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List unfinished sessions for a company, optionally scoped to one till.
pub async fn list_active_sessions(
    db: &Database,
    company_id: &str,
    till_id: Option<&str>,
) -> Result<Vec<Session>, SaltioError> {
    let company_id = company_id.to_string();
    let till_id = till_id.map(|t| t.to_string());
    db.connection()
        .call(move |conn| {
            let mut sessions = Vec::new();
            match &till_id {
                Some(till) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions
                         WHERE company_id = ?1 AND till_id = ?2 AND end_time IS NULL
                         ORDER BY start_time"
                    ))?;
                    let rows = stmt.query_map(params![company_id, till], session_from_row)?;
                    for row in rows {
                        sessions.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions
                         WHERE company_id = ?1 AND end_time IS NULL
                         ORDER BY start_time"
                    ))?;
                    let rows = stmt.query_map(params![company_id], session_from_row)?;
                    for row in rows {
                        sessions.push(row?);
                    }
                }
            }
            Ok(sessions)
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

    fn make_session(id: &str) -> Session {
        Session {
            id: id.to_string(),
            customer_id: "cust-1".to_string(),
            customer_name: "Ada".to_string(),
            dependent_id: None,
            dependent_name: None,
            till_id: "till-1".to_string(),
            company_id: "park".to_string(),
            billing: SessionBilling::Untracked,
            start_time: Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(),
            contracted_ms: 3_600_000,
            paused_at: None,
            total_paused_ms: 0,
            time_extension_at: None,
            time_extension_granted_at: None,
            end_time: None,
            created_at: "2026-01-01T10:00:00.000Z".to_string(),
            updated_at: "2026-01-01T10:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_session_roundtrips() {
        let (db, _dir) = setup_db().await;
        let mut session = make_session("s-1");
        session.billing = SessionBilling::BilledVia {
            tab_id: "tab-9".to_string(),
        };
        session.total_paused_ms = 95_000;
        session.time_extension_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 11, 35, 0).unwrap());
        session.time_extension_granted_at =
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 11, 5, 0).unwrap());

        upsert_session(&db, &session).await.unwrap();
        let got = get_session(&db, "s-1").await.unwrap().unwrap();
        assert_eq!(got.billing.tab_id(), Some("tab-9"));
        assert_eq!(got.start_time, session.start_time);
        // 95s truncates to whole seconds on the HH:MM:SS round trip
        assert_eq!(got.total_paused_ms, 95_000);
        assert_eq!(got.time_extension_at, session.time_extension_at);
        assert_eq!(got.time_extension_granted_at, session.time_extension_granted_at);
        assert!(got.end_time.is_none());
    }

    #[tokio::test]
    async fn get_nonexistent_session_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_session(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_updates_existing_row() {
        let (db, _dir) = setup_db().await;
        let mut session = make_session("s-2");
        upsert_session(&db, &session).await.unwrap();

        session.contracted_ms = 7_200_000;
        session.end_time = Some(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap());
        upsert_session(&db, &session).await.unwrap();

        let got = get_session(&db, "s-2").await.unwrap().unwrap();
        assert_eq!(got.contracted_ms, 7_200_000);
        assert!(got.is_finished());
    }

    #[tokio::test]
    async fn list_active_excludes_finished_and_scopes_by_till() {
        let (db, _dir) = setup_db().await;
        let s1 = make_session("s-a");
        let mut s2 = make_session("s-b");
        s2.till_id = "till-2".to_string();
        let mut s3 = make_session("s-c");
        s3.end_time = Some(Utc.with_ymd_and_hms(2026, 1, 1, 11, 0, 0).unwrap());

        for s in [&s1, &s2, &s3] {
            upsert_session(&db, s).await.unwrap();
        }

        let all = list_active_sessions(&db, "park", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = list_active_sessions(&db, "park", Some("till-2")).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "s-b");
    }

    #[tokio::test]
    async fn malformed_total_paused_reads_as_zero() {
        let (db, _dir) = setup_db().await;
        let session = make_session("s-bad");
        upsert_session(&db, &session).await.unwrap();

        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE sessions SET total_paused = 'garbage' WHERE id = 's-bad'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let got = get_session(&db, "s-bad").await.unwrap().unwrap();
        assert_eq!(got.total_paused_ms, 0);
    }
}
