// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Manual heart adjustment ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed manual correction to a player's hearts.
///
/// The ledger is append-only: entries are never mutated or deleted, only
/// offset by new entries. The effective adjustment is the sum over all
/// entries, clamped into `[0, max_hearts]` together with the computed
/// hearts at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartAdjustment {
    /// Season scope
    pub season_id: String,
    /// Target player
    pub player_id: String,
    /// Signed heart delta
    pub delta: i32,
    /// Human-readable reason for the audit trail
    pub reason: String,
    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}
