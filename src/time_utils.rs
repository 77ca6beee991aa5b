// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! All week-window and streak logic works on *local calendar days*: a
//! caller-supplied timezone offset (minutes east of UTC) shifts each
//! timestamp before truncating to a date. No offset means UTC boundaries.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// Length of one rule-engine window.
pub const DAYS_PER_WEEK: i64 = 7;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Truncate a timestamp to the local calendar day for the given offset.
///
/// Offsets outside the valid range (±24h), including ones large enough to
/// overflow the seconds conversion, fall back to UTC rather than failing
/// the whole computation.
pub fn local_day(ts: DateTime<Utc>, tz_offset_minutes: i32) -> NaiveDate {
    match tz_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
    {
        Some(offset) => ts.with_timezone(&offset).date_naive(),
        None => ts.date_naive(),
    }
}

/// Number of whole days from `start` to `end` (negative if `end` precedes).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Start day of the 7-day window with the given index, counted from `anchor`.
pub fn window_start(anchor: NaiveDate, index: i64) -> NaiveDate {
    anchor + Duration::days(index * DAYS_PER_WEEK)
}

/// Number of fully elapsed 7-day windows between `anchor` and `horizon`
/// (both local days). A window counts only once its final day has passed.
pub fn completed_windows(anchor: NaiveDate, horizon: NaiveDate) -> i64 {
    let days = days_between(anchor, horizon);
    if days <= 0 {
        0
    } else {
        days / DAYS_PER_WEEK
    }
}
