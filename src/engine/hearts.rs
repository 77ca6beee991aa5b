// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly hearts rule engine.
//!
//! Pure simulation of heart gain/loss over 7-day windows. The caller
//! passes the wall clock explicitly, so identical inputs always produce
//! identical outputs and the whole computation can be re-run on every
//! read without drift.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::{completed_windows, local_day, window_start, DAYS_PER_WEEK};

/// With no workouts at all and an anchor older than this, the anchor
/// soft-shifts to "now" so a late joiner is not retroactively knocked out
/// on day one.
pub const LATE_JOIN_GRACE_DAYS: i64 = 2;

/// Rule parameters for one season.
#[derive(Debug, Clone)]
pub struct HeartsConfig {
    /// Required workouts per window; 0 disables both gain and loss
    pub weekly_target: u32,
    /// Heart ceiling (= initial lives)
    pub max_hearts: u32,
    /// Windows are never scored past this bound
    pub season_end: DateTime<Utc>,
}

/// One scored 7-day window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyEvent {
    /// First local day of the window
    pub window_start: NaiveDate,
    /// Workouts counted strictly inside the window
    pub workouts: u32,
    /// Hearts removed this window
    pub hearts_lost: u32,
    /// Hearts restored this window
    pub hearts_gained: u32,
    /// Running heart count after this window
    pub hearts_after: u32,
}

/// Final hearts plus the full per-window event trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartsOutcome {
    pub hearts: u32,
    pub events: Vec<WeeklyEvent>,
}

/// Simulate hearts week by week.
///
/// `workout_times` must already be filtered to in-season workouts that
/// count (rejected posts excluded); ordering does not matter. Timestamps
/// are normalized to local calendar days using `tz_offset_minutes`.
///
/// Only fully elapsed windows are scored: a week still in progress can
/// neither cost nor restore hearts, and a partial final week before the
/// season end bound is never scored.
pub fn simulate(
    workout_times: &[DateTime<Utc>],
    anchor: DateTime<Utc>,
    now: DateTime<Utc>,
    tz_offset_minutes: i32,
    config: &HeartsConfig,
) -> HeartsOutcome {
    let anchor = if workout_times.is_empty()
        && now.signed_duration_since(anchor) > Duration::days(LATE_JOIN_GRACE_DAYS)
    {
        now
    } else {
        anchor
    };

    let horizon = now.min(config.season_end);
    let anchor_day = local_day(anchor, tz_offset_minutes);
    let horizon_day = local_day(horizon, tz_offset_minutes);

    let workout_days: Vec<NaiveDate> = workout_times
        .iter()
        .map(|t| local_day(*t, tz_offset_minutes))
        .collect();

    let windows = completed_windows(anchor_day, horizon_day);
    let mut hearts = config.max_hearts;
    let mut events = Vec::with_capacity(windows as usize);

    for index in 0..windows {
        let start = window_start(anchor_day, index);
        let end = start + Duration::days(DAYS_PER_WEEK);
        let workouts = workout_days.iter().filter(|d| **d >= start && **d < end).count() as u32;

        let (hearts_gained, hearts_lost) = if config.weekly_target > 0 && workouts >= config.weekly_target {
            let gained = u32::from(hearts < config.max_hearts);
            hearts += gained;
            (gained, 0)
        } else {
            // Loss is capped so one catastrophic week can neither go
            // negative nor exceed the heart ceiling
            let deficit = config.weekly_target.saturating_sub(workouts);
            let lost = deficit.min(hearts).min(config.max_hearts);
            hearts -= lost;
            (0, lost)
        };

        events.push(WeeklyEvent {
            window_start: start,
            workouts,
            hearts_lost,
            hearts_gained,
            hearts_after: hearts,
        });
    }

    HeartsOutcome {
        hearts: hearts.min(config.max_hearts),
        events,
    }
}
