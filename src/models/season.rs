// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Season model: one run of the competition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SeasonSummary;

/// A competition season.
///
/// The stage advances monotonically `PreStage -> Active -> Completed`
/// (`TransitionSpin` is a roulette-mode sub-stage before `Active`).
/// `Completed` is terminal for this season number; a new season increments
/// `number` and resets the mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    /// Season ID (also used as document ID)
    pub season_id: String,
    /// Display name
    pub name: String,
    /// Season number, incremented per run
    pub number: u32,
    /// Season start (the hearts-engine anchor)
    pub starts_at: DateTime<Utc>,
    /// Season end bound
    pub ends_at: DateTime<Utc>,
    /// Lifecycle stage
    pub stage: SeasonStage,
    /// Game mode
    pub mode: SeasonMode,
    /// Required workouts per week
    pub weekly_target: u32,
    /// Initial lives (heart ceiling)
    pub max_hearts: u32,
    /// Pot configuration (money modes)
    pub pot: PotConfig,
    /// Whether eliminated players may opt into sudden death
    pub sudden_death_enabled: bool,
    /// Season owner (may override disputes and write adjustments)
    pub owner_id: String,
    /// Frozen season summary; set once on completion, immutable after
    pub summary: Option<SeasonSummary>,
    /// Optimistic-concurrency counter, bumped on every checked write
    #[serde(default)]
    pub version: u64,
}

/// Season lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonStage {
    /// Created, members joining; hearts display the stored fallback
    PreStage,
    /// Roulette-mode challenge selection before play begins
    TransitionSpin,
    /// In play; hearts are recomputed on every read
    Active,
    /// Terminal; the frozen summary is the source of truth
    Completed,
}

impl SeasonStage {
    /// Hearts are live-derived only while the season is in play.
    pub fn is_live(&self) -> bool {
        matches!(self, SeasonStage::Active)
    }

    /// Pre-play stages display the stored `lives_remaining` verbatim.
    pub fn is_pre(&self) -> bool {
        matches!(self, SeasonStage::PreStage | SeasonStage::TransitionSpin)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SeasonStage::Completed)
    }
}

/// Season game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonMode {
    /// First player to 0 hearts loses and ends the season
    MoneySurvival,
    /// Last player with hearts standing wins the pot
    MoneyLastMan,
    /// Weekly spun challenges, calendar end, no pot
    ChallengeRoulette,
    /// Cumulative challenge targets, calendar end, no pot
    ChallengeCumulative,
}

impl SeasonMode {
    /// Money modes maintain a pot and settle pairwise debts.
    pub fn is_money(&self) -> bool {
        matches!(self, SeasonMode::MoneySurvival | SeasonMode::MoneyLastMan)
    }
}

/// Shared-pot configuration. All amounts are integer cents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PotConfig {
    /// Seed amount at season start
    pub initial_pot_cents: i64,
    /// Ante contributed per completed week
    pub weekly_ante_cents: i64,
    /// Multiply the ante by the member count each week
    pub scale_with_players: bool,
    /// One-time per-player buy-in boost
    pub player_boost_cents: i64,
}
