// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure session time math and status classification.
//!
//! The clock is a pure function of the session's persisted fields and a
//! caller-supplied `now` — there is no hidden global clock, so every
//! computation is deterministic under test.
//!
//! Two schedule branches exist and must stay separate:
//! - No extension: scheduled end = start + contracted + accumulated pause
//!   time (paused time never counts against the customer).
//! - Extension set: `time_extension_at` IS the deadline, verbatim. The
//!   billing layer computed it as `grant instant + extra time`, which
//!   already absorbs any earlier pauses; adding the pause padding again
//!   would double-count it.

use chrono::{DateTime, Duration, Utc};
use saltio_core::types::{Session, SessionStatus};

/// Percentage-remaining threshold below which an active session is
/// reported as `warning`.
const WARNING_THRESHOLD_PERCENT: f64 = 50.0;

/// Read-only view over a session's time fields.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock<'a> {
    session: &'a Session,
}

impl<'a> SessionClock<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The instant the session is scheduled to end.
    ///
    /// An extension instant wins verbatim; otherwise start + contracted,
    /// with pause time added back.
    pub fn scheduled_end(&self) -> DateTime<Utc> {
        match self.session.time_extension_at {
            Some(extension) => extension,
            None => self.non_extension_scheduled_end(),
        }
    }

    /// The schedule the session would have without an extension override:
    /// start + contracted + accumulated pause time.
    pub fn non_extension_scheduled_end(&self) -> DateTime<Utc> {
        self.session.start_time
            + Duration::milliseconds(self.session.contracted_ms)
            + Duration::milliseconds(self.session.total_paused_ms)
    }

    /// While paused, time is frozen at the pause instant.
    fn effective_now(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.session.paused_at.unwrap_or(now)
    }

    /// Milliseconds of usage so far, net of pauses. Never negative.
    pub fn elapsed(&self, now: DateTime<Utc>) -> i64 {
        let raw = (self.effective_now(now) - self.session.start_time)
            .num_milliseconds()
            - self.session.total_paused_ms;
        raw.max(0)
    }

    /// Milliseconds until the scheduled end, clamped to zero at expiry.
    pub fn remaining(&self, now: DateTime<Utc>) -> i64 {
        self.remaining_signed(now).max(0)
    }

    /// Signed remaining time; negative once past the deadline. Used for
    /// "time exceeded" displays, formatted with a leading minus.
    pub fn remaining_signed(&self, now: DateTime<Utc>) -> i64 {
        (self.scheduled_end() - self.effective_now(now)).num_milliseconds()
    }
}

/// The window remaining-time percentages are judged against.
///
/// Without an extension this is the contracted duration. Once an extension
/// exists, progress is judged against the extra time granted — the span
/// from the grant instant to the new deadline — not the whole original
/// contract.
fn total_window_ms(clock: &SessionClock<'_>, session: &Session) -> i64 {
    let window = match session.time_extension_at {
        Some(extension) => {
            let granted_at = session
                .time_extension_granted_at
                .unwrap_or_else(|| clock.non_extension_scheduled_end());
            (extension - granted_at).num_milliseconds()
        }
        None => session.contracted_ms,
    };
    // Floor at 1 ms so the division stays defined on degenerate data.
    window.max(1)
}

/// Classifies a session's live status as of `now`.
pub fn classify(session: &Session, now: DateTime<Utc>) -> SessionStatus {
    if session.is_finished() {
        return SessionStatus::Finished;
    }
    if session.is_paused() {
        return SessionStatus::Paused;
    }

    let clock = SessionClock::new(session);
    let remaining = clock.remaining_signed(now);
    if remaining <= 0 {
        return SessionStatus::Expired;
    }

    let percent_remaining =
        remaining as f64 / total_window_ms(&clock, session) as f64 * 100.0;
    if percent_remaining < WARNING_THRESHOLD_PERCENT {
        SessionStatus::Warning
    } else {
        SessionStatus::Active
    }
}

/// The `(elapsed, remaining, status)` read model for a session, recomputed
/// on demand and never cached beyond a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReadModel {
    pub elapsed_ms: i64,
    pub remaining_ms: i64,
    pub status: SessionStatus,
}

pub fn read_model(session: &Session, now: DateTime<Utc>) -> SessionReadModel {
    let clock = SessionClock::new(session);
    SessionReadModel {
        elapsed_ms: clock.elapsed(now),
        remaining_ms: clock.remaining(now),
        status: classify(session, now),
    }
}
