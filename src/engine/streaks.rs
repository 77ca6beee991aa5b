// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Consecutive-day streaks and weekly cadence.
//!
//! A "qualifying day" is any local calendar day with at least one workout.
//! A day without a workout only breaks the current streak once it is over,
//! so the current streak is the run ending today *or yesterday*.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::time_utils::{days_between, local_day};

/// Streak figures for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakStats {
    /// Consecutive qualifying days ending at or near "now"
    pub current_streak_days: u32,
    /// Longest consecutive-day run in the history
    pub longest_streak_days: u32,
}

/// Compute current and longest streaks from raw workout timestamps.
pub fn streaks(workout_times: &[DateTime<Utc>], now: DateTime<Utc>, tz_offset_minutes: i32) -> StreakStats {
    let mut days: Vec<NaiveDate> = workout_times
        .iter()
        .map(|t| local_day(*t, tz_offset_minutes))
        .collect();
    days.sort_unstable();
    days.dedup();

    if days.is_empty() {
        return StreakStats::default();
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in &days {
        run = match prev {
            Some(p) if days_between(p, *day) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*day);
    }

    let today = local_day(now, tz_offset_minutes);
    let last = *days.last().unwrap_or(&today);
    let current = if last >= today - Duration::days(1) {
        let mut count = 1u32;
        for pair in days.windows(2).rev() {
            if days_between(pair[0], pair[1]) == 1 {
                count += 1;
            } else {
                break;
            }
        }
        count
    } else {
        0
    };

    StreakStats {
        current_streak_days: current,
        longest_streak_days: longest,
    }
}

/// Average workouts per week over the elapsed portion of the season.
///
/// Uses elapsed days (minimum one) so a day-one read does not divide by
/// zero or report an absurd cadence.
pub fn avg_per_week(total_workouts: u32, anchor: DateTime<Utc>, horizon: DateTime<Utc>) -> f64 {
    let days = horizon.signed_duration_since(anchor).num_days().max(1);
    f64::from(total_workouts) * 7.0 / days as f64
}
