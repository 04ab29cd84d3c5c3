// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session time accounting for the Saltio facility core.
//!
//! - [`clock`] — pure elapsed/remaining/scheduled-end math and the status
//!   classifier, as of a caller-supplied now.
//! - [`controller`] — the lifecycle controller owning start, pause, resume,
//!   extend, and finish transitions.
//! - [`suppression`] — the short-lived set that deduplicates expiry
//!   notifications across scheduler ticks.

pub mod clock;
pub mod controller;
pub mod suppression;

pub use clock::{classify, read_model, SessionClock, SessionReadModel};
pub use controller::{
    BillingIntent, ExtendOutcome, SessionLifecycleController, StartRequest,
};
pub use suppression::{SuppressionSet, DEFAULT_TTL};
