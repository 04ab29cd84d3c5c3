// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Till (cash drawer) lifecycle for the Saltio facility core.
//!
//! A till is one operator's drawer for one shift: opened with a counted
//! float, drained by withdrawals, credited by cash-settled orders, and
//! closed against an expected balance. Closing is blocked while open tabs
//! or unfinished sessions are still attached, unless they are transferred
//! to another operator's open till.

pub mod controller;

pub use controller::{expected_closing, TillController, DISCREPANCY_TOLERANCE};
