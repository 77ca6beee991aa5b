// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Player model: one membership in a season.

use serde::{Deserialize, Serialize};

/// A player participating in a season.
///
/// Hearts are derived on every read from the activity history plus the
/// adjustment ledger; `lives_remaining` here is only a fallback for
/// pre-season display and must not be trusted once the season is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (also used as document ID)
    pub player_id: String,
    /// Season this membership belongs to
    pub season_id: String,
    /// Display name
    pub display_name: String,
    /// Opaque credential reference for the external fitness source,
    /// if the player linked an account
    pub fitness_credential: Option<String>,
    /// Stored lives fallback (pre-season display only)
    pub lives_remaining: u32,
    /// Whether the player opted into sudden death
    pub sudden_death_opt_in: bool,
    /// Readiness flag for season start
    pub ready: bool,
}
