// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `<n><unit>` duration grammar used for the scheduling interval.
//!
//! Accepted grammar: one or more decimal digits followed by one of `s|m|h`.
//! Parsed as `n * {1|60|3600}` seconds. Units other than `m`/`h` (including an
//! absent/unknown unit) are treated as seconds, matching the source script's
//! `intervalToSeconds` behavior.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration string")]
    Empty,
    #[error("duration '{0}' has no leading digits")]
    NoDigits(String),
    #[error("duration '{0}' has a value that overflows")]
    Overflow(String),
}

/// Parse a duration string of the form `<digits><unit>` into a [`Duration`].
///
/// `unit` is `s` (seconds, ×1), `m` (minutes, ×60), or `h` (hours, ×3600).
/// Any other trailing unit character (or none at all) is treated as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let digit_end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    if digit_end == 0 {
        return Err(DurationError::NoDigits(input.to_string()));
    }

    let n: u64 = input[..digit_end]
        .parse()
        .map_err(|_| DurationError::Overflow(input.to_string()))?;
    let multiplier = match input[digit_end..].chars().next() {
        Some('m') => 60,
        Some('h') => 3600,
        _ => 1,
    };

    let secs = n
        .checked_mul(multiplier)
        .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
    Ok(Duration::from_secs(secs))
}
