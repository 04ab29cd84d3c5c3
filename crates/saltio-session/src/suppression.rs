// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived suppression set for expiry notifications.
//!
//! A session that triggers an expiry notification is marked here so the
//! next scheduler tick does not notify again. Entries age out after a TTL
//! (a still-expired session re-notifies on that cadence), and any fresh
//! pause/resume/extend on the session clears its entry immediately so a
//! new expiry can re-notify.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Set of session ids that already triggered a notification, with per-entry
/// expiry. Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct SuppressionSet {
    marked_at: std::sync::Arc<DashMap<String, DateTime<Utc>>>,
    ttl: chrono::Duration,
}

impl SuppressionSet {
    pub fn new(ttl: Duration) -> Self {
        Self {
            marked_at: std::sync::Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::seconds(60)),
        }
    }

    /// Marks a session as notified as of `now`.
    pub fn mark(&self, session_id: &str, now: DateTime<Utc>) {
        self.marked_at.insert(session_id.to_string(), now);
    }

    /// Whether the session's entry is present and not yet aged out.
    pub fn is_suppressed(&self, session_id: &str, now: DateTime<Utc>) -> bool {
        match self.marked_at.get(session_id) {
            Some(entry) => now - *entry < self.ttl,
            None => false,
        }
    }

    /// Removes a session's entry. Called by pause/resume/extend so the next
    /// expiry notifies immediately.
    pub fn clear(&self, session_id: &str) {
        self.marked_at.remove(session_id);
    }

    /// Drops all aged-out entries. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.marked_at.len();
        self.marked_at.retain(|_, marked| now - *marked < self.ttl);
        before - self.marked_at.len()
    }

    pub fn len(&self) -> usize {
        self.marked_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked_at.is_empty()
    }
}

impl Default for SuppressionSet {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
