// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure game-rule computations (no I/O, no clock access).

pub mod hearts;
pub mod streaks;

pub use hearts::{simulate, HeartsConfig, HeartsOutcome, WeeklyEvent};
pub use streaks::{avg_per_week, streaks, StreakStats};
