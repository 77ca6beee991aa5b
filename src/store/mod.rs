// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Persistence port for season state.
//!
//! The engine is written against [`SeasonStore`] so that the surrounding
//! system can bring its own database. [`MemoryStore`] is the in-process
//! reference implementation and is what the tests and the demo binary use.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{Activity, HeartAdjustment, Player, Season, Vote};

/// Storage operations the engine needs. All writes are last-write-wins
/// except the `*_checked` pair, which compare the stored `version` and
/// fail (return `false`) when another writer got there first.
#[async_trait]
pub trait SeasonStore: Send + Sync {
    // ─── Seasons ───

    async fn get_season(&self, season_id: &str) -> Result<Option<Season>, AppError>;

    async fn put_season(&self, season: &Season) -> Result<(), AppError>;

    /// Compare-and-swap write. Persists `season` with `version` bumped to
    /// `expected_version + 1` iff the stored version still equals
    /// `expected_version`. Returns `Ok(false)` on a version mismatch so the
    /// caller can re-read and retry (or accept the other writer's outcome).
    async fn update_season_checked(
        &self,
        season: &Season,
        expected_version: u64,
    ) -> Result<bool, AppError>;

    // ─── Players ───

    async fn get_player(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Option<Player>, AppError>;

    async fn put_player(&self, player: &Player) -> Result<(), AppError>;

    async fn list_players(&self, season_id: &str) -> Result<Vec<Player>, AppError>;

    // ─── Activities ───

    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError>;

    async fn put_activity(&self, activity: &Activity) -> Result<(), AppError>;

    /// Compare-and-swap write with the same contract as
    /// [`update_season_checked`](SeasonStore::update_season_checked).
    async fn update_activity_checked(
        &self,
        activity: &Activity,
        expected_version: u64,
    ) -> Result<bool, AppError>;

    /// Activities one player has logged in one season, in no particular order.
    async fn list_player_activities(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Vec<Activity>, AppError>;

    async fn list_season_activities(&self, season_id: &str) -> Result<Vec<Activity>, AppError>;

    // ─── Votes ───

    async fn list_votes(&self, activity_id: &str) -> Result<Vec<Vote>, AppError>;

    /// Writes a vote, replacing any earlier vote by the same voter on the
    /// same activity. One row per (activity, voter).
    async fn upsert_vote(&self, vote: &Vote) -> Result<(), AppError>;

    async fn delete_vote(&self, activity_id: &str, voter_id: &str) -> Result<(), AppError>;

    /// Drops every vote on an activity. Used when a dispute is cancelled.
    async fn clear_votes(&self, activity_id: &str) -> Result<(), AppError>;

    // ─── Heart adjustments ───

    /// Manual hearts ledger for one player, oldest first.
    async fn list_adjustments(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Vec<HeartAdjustment>, AppError>;

    async fn append_adjustment(&self, adjustment: &HeartAdjustment) -> Result<(), AppError>;
}

/// Builds a manual-entry activity in the approved state. Convenience for
/// write paths and tests; the store itself does not care how activities
/// are constructed.
pub fn new_manual_activity(
    activity_id: &str,
    season_id: &str,
    player_id: &str,
    recorded_at: DateTime<Utc>,
    duration_secs: u32,
    distance_meters: f64,
    kind: &str,
) -> Activity {
    Activity {
        activity_id: activity_id.to_string(),
        season_id: season_id.to_string(),
        player_id: player_id.to_string(),
        recorded_at,
        duration_secs,
        distance_meters,
        kind: kind.to_string(),
        origin: crate::models::ActivityOrigin::Manual,
        status: crate::models::DisputeStatus::Approved,
        vote_deadline: None,
        decided_at: None,
        dispute_opened_by: None,
        version: 0,
    }
}
