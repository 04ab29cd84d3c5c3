// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-entity lock map for the single-writer-per-entity discipline.
//!
//! Each Session, Till, and Tab is mutated only while holding its entity
//! lock, so a state check and the write that follows it are never
//! interleaved with another mutation of the same entity. Locks are keyed
//! by entity id and created on first use.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async lock map. Cheap to clone; clones share the same locks.
#[derive(Clone, Default)]
pub struct EntityLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for the given entity id, creating it on first use.
    ///
    /// The guard is owned so it can be held across await points inside a
    /// controller method.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of entities that have ever been locked. Test visibility only.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_id_serializes() {
        let locks = EntityLocks::new();
        let guard = locks.acquire("till-1").await;

        // A second acquire on the same id must not complete while the first
        // guard is held.
        let locks2 = locks.clone();
        let pending = tokio::spawn(async move {
            let _g = locks2.acquire("till-1").await;
        });

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        drop(guard);
        pending.await.unwrap();
    }

    #[tokio::test]
    async fn different_ids_do_not_block() {
        let locks = EntityLocks::new();
        let _a = locks.acquire("session-1").await;
        let _b = locks.acquire("session-2").await;
        assert_eq!(locks.len(), 2);
    }
}
