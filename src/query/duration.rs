//! Relative duration expressions
//!
//! Durations are always read as "that far in the past": `10m` and `-10m`
//! resolve to the same cutoff. Units follow `humantime` (`30s`, `2h30m`, `1d`).

use crate::error::{ExtractError, Result};
use chrono::{DateTime, TimeDelta, Utc};

/// Gap kept between "now" and the upper bound of a window, in milliseconds
///
/// Messages arriving while a request is being handled fall after the bound
/// and are excluded.
pub const JUST_NOW_EPSILON_MS: i64 = 1_000;

/// Resolve a duration expression to the timestamp that long before `now`
pub fn resolve_cutoff(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let trimmed = expression.trim();
    let magnitude = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);

    if magnitude.is_empty() {
        return Err(ExtractError::invalid_duration(expression, "empty duration"));
    }

    let duration = humantime::parse_duration(magnitude)
        .map_err(|e| ExtractError::invalid_duration(expression, e))?;
    let delta = TimeDelta::from_std(duration)
        .map_err(|e| ExtractError::invalid_duration(expression, e))?;

    now.checked_sub_signed(delta)
        .ok_or_else(|| ExtractError::invalid_duration(expression, "duration out of range"))
}

/// Upper bound for "everything up to just now"
pub fn just_now(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::milliseconds(JUST_NOW_EPSILON_MS)
}

/// Argument of an extraction request: a message count or a lookback duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractArg {
    /// Last `n` messages
    Count(usize),
    /// Everything after this cutoff
    Since(DateTime<Utc>),
}

impl ExtractArg {
    /// Parse `30` as a count, anything else as a duration relative to `now`
    pub fn parse(arg: &str, now: DateTime<Utc>) -> Result<Self> {
        let arg = arg.trim();
        if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
            return arg
                .parse::<usize>()
                .map(Self::Count)
                .map_err(|e| ExtractError::invalid_duration(arg, e));
        }
        resolve_cutoff(arg, now).map(Self::Since)
    }
}
