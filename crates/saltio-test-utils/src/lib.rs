// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Saltio integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockStore`] - In-memory store adapter with failure injection
//! - [`MockNotifier`] - Notifier adapter capturing expiry notifications
//! - [`TestHarness`] - Full stack over a temp SQLite database

pub mod harness;
pub mod mock_notifier;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_notifier::{ExpiryNotice, MockNotifier};
pub use mock_store::MockStore;
