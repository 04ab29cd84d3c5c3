// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.
//!
//! Shared row-mapping helpers live here: instants are RFC3339 text in the
//! schema, list payloads (withdrawals, items, payments) are JSON columns.

pub mod sessions;
pub mod settlements;
pub mod tabs;
pub mod tills;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Row-maintenance stamp in the canonical stored form.
pub(crate) fn stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse an RFC3339 instant read from column `idx`.
pub(crate) fn parse_instant(idx: usize, text: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse an optional RFC3339 instant read from column `idx`.
pub(crate) fn parse_opt_instant(
    idx: usize,
    text: Option<&str>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    text.map(|t| parse_instant(idx, t)).transpose()
}

/// Deserialize a JSON payload column read from column `idx`.
pub(crate) fn from_json<T: DeserializeOwned>(
    idx: usize,
    text: &str,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Serialize a JSON payload column for writing.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
