// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Saltio port architecture.
//!
//! All adapters extend the [`ServiceAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod notifier;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use adapter::ServiceAdapter;
pub use notifier::NotifierAdapter;
pub use store::StoreAdapter;
