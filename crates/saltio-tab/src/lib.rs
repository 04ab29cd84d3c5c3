// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tab (order) billing aggregate for the Saltio facility core.
//!
//! A tab is the running bill attached to one or more sessions. The pure
//! item math lives in [`aggregate`]; [`controller`] applies it against the
//! store and settles the bill across a payment split at close.

pub mod aggregate;
pub mod controller;

pub use aggregate::{commit_adjustments, is_protected, preview_close, total_due};
pub use controller::TabController;
