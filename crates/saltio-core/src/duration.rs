// SPDX-FileCopyrightText: 2026 Saltio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing and formatting of accumulated-pause durations.
//!
//! Two textual grammars are accepted, matching what historical data
//! contains: a colon-delimited `H:MM:SS` (or `H:MM`) form, and a designator
//! form with hour/minute/second markers (`"1 hour 30 minutes"`, `"2h 15m"`,
//! `"90 min"`). Formatting always produces the normalized, zero-padded
//! `HH:MM:SS` form, with a leading minus sign for negative durations
//! ("time exceeded" displays).

use tracing::warn;

use crate::error::SaltioError;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Parse a duration text into milliseconds.
///
/// Unspecified components default to zero. Fails with
/// [`SaltioError::MalformedDuration`] only when the text matches neither
/// grammar; read paths that tolerate legacy data should use
/// [`parse_or_zero`] instead.
pub fn parse(text: &str) -> Result<i64, SaltioError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SaltioError::MalformedDuration {
            text: text.to_string(),
        });
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    let ms = if body.contains(':') {
        parse_colon(body)
    } else {
        parse_designators(body)
    }
    .ok_or_else(|| SaltioError::MalformedDuration {
        text: text.to_string(),
    })?;

    Ok(if negative { -ms } else { ms })
}

/// Tolerant read-path variant: malformed text becomes zero with a warning
/// log instead of failing the read. Empty text is an ordinary zero.
pub fn parse_or_zero(text: &str) -> i64 {
    if text.trim().is_empty() {
        return 0;
    }
    match parse(text) {
        Ok(ms) => ms,
        Err(_) => {
            warn!(text = %text, "malformed persisted duration, treating as zero");
            0
        }
    }
}

/// Format milliseconds as zero-padded `HH:MM:SS`.
///
/// Negative inputs render a leading minus sign followed by the absolute
/// magnitude. Sub-second precision is truncated.
pub fn format(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let total_seconds = ms.unsigned_abs() / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
}

/// `H:MM:SS` or `H:MM`. Fields are unsigned integers; hours are unbounded
/// and minute/second fields above 59 are tolerated (legacy data).
fn parse_colon(body: &str) -> Option<i64> {
    let fields: Vec<&str> = body.split(':').collect();
    if fields.len() != 2 && fields.len() != 3 {
        return None;
    }

    let mut parts = [0i64; 3];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        *slot = field.parse::<i64>().ok().filter(|v| *v >= 0)?;
    }

    Some(parts[0] * MS_PER_HOUR + parts[1] * MS_PER_MINUTE + parts[2] * MS_PER_SECOND)
}

/// Sequence of `<number> <unit>` pairs, e.g. `"1 hour 30 minutes"` or
/// `"2h15m"`. Numbers may be fractional; commas between pairs are tolerated.
fn parse_designators(body: &str) -> Option<i64> {
    let mut total = 0.0f64;
    let mut matched_any = false;
    let mut rest = body;

    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let value: f64 = rest[..num_end].parse().ok()?;

        rest = rest[num_end..].trim_start();
        let unit_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if unit_end == 0 {
            return None;
        }
        let unit_ms = match rest[..unit_end].to_ascii_lowercase().as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => MS_PER_HOUR,
            "m" | "min" | "mins" | "minute" | "minutes" => MS_PER_MINUTE,
            "s" | "sec" | "secs" | "second" | "seconds" => MS_PER_SECOND,
            _ => return None,
        };

        total += value * unit_ms as f64;
        matched_any = true;
        rest = rest[unit_end..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }

    if matched_any {
        Some(total.round() as i64)
    } else {
        None
    }
}
