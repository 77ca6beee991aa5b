// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Frozen season summary, generated once at completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The final record of a completed season.
///
/// Generated exactly once when completion is first detected and then
/// treated as immutable truth: never recomputed, even though hearts and
/// stats are otherwise re-derived on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    /// Winners per the mode rule
    pub winners: Vec<String>,
    /// Losers per the mode rule
    pub losers: Vec<String>,
    /// Notable performances across the season
    pub highlights: Highlights,
    /// Pot value at the moment the season ended (money modes)
    pub final_pot_cents: i64,
    /// Pairwise debts from losers to winners (money modes; empty otherwise)
    pub debts: Vec<Debt>,
    /// When the summary was frozen
    pub generated_at: DateTime<Utc>,
}

/// Best-in-season markers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Highlights {
    /// Longest consecutive-day workout streak
    pub longest_streak: Option<Highlight>,
    /// Most workouts overall
    pub most_workouts: Option<Highlight>,
    /// Highest average workouts per week
    pub most_consistent: Option<Highlight>,
}

/// One highlight holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    /// The player holding the record
    pub player_id: String,
    /// The record value (days, workouts, or workouts/week)
    pub value: f64,
}

/// One pairwise debt in a money-mode settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    /// Who owes
    pub debtor_id: String,
    /// Who is owed
    pub creditor_id: String,
    /// Amount in cents
    pub amount_cents: i64,
}
