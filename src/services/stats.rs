// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Per-player stats hydration.
//!
//! Merges a player's manual entries with their linked tracker's workouts,
//! restricts to the in-season window, and derives everything the snapshot
//! shows: workout totals, streaks, weekly cadence, and hearts (engine
//! result plus the manual adjustment ledger, then the sudden-death
//! override). Hydration never fails, and it fails in two tiers: a tracker
//! fetch problem drops only the external workouts (soft error, manual
//! data still scores), while a store failure degrades the player to
//! their stored state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{self, HeartsConfig, WeeklyEvent};
use crate::error::AppError;
use crate::models::{Player, Season};
use crate::services::fitness::FitnessSource;
use crate::store::SeasonStore;

/// Everything the snapshot view needs for one player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub player_id: String,
    pub display_name: String,
    pub hearts: u32,
    pub in_sudden_death: bool,
    pub workouts_total: u32,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub avg_per_week: f64,
    pub weekly_events: Vec<WeeklyEvent>,
    pub external_connected: bool,
    /// True when hydration fell back to stored state for this player.
    pub degraded: bool,
}

/// Per-player hydration failure, reported alongside the aggregate
/// instead of failing it.
#[derive(Debug, Clone, Serialize)]
pub struct SoftError {
    pub player_id: String,
    pub message: String,
}

#[derive(Clone)]
pub struct StatsHydrator {
    store: Arc<dyn SeasonStore>,
    fitness: Arc<dyn FitnessSource>,
    fetch_timeout: Duration,
}

impl StatsHydrator {
    pub fn new(
        store: Arc<dyn SeasonStore>,
        fitness: Arc<dyn FitnessSource>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            fitness,
            fetch_timeout,
        }
    }

    /// Hydrates one player. Infallible by contract: a tracker failure
    /// costs only the external entries (reported as a soft error), and a
    /// store failure comes back as a degraded snapshot plus a soft error.
    pub async fn hydrate(
        &self,
        season: &Season,
        player: &Player,
        tz_offset_minutes: i32,
        now: DateTime<Utc>,
    ) -> (PlayerSnapshot, Vec<SoftError>) {
        // Before play starts the stored lives are the display value;
        // there is nothing to derive yet.
        if season.stage.is_pre() {
            return (self.stored_snapshot(season, player, false), Vec::new());
        }

        match self.try_hydrate(season, player, tz_offset_minutes, now).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    player_id = %player.player_id,
                    season_id = %season.season_id,
                    error = %e,
                    "Player hydration degraded to stored state"
                );
                let soft = SoftError {
                    player_id: player.player_id.clone(),
                    message: e.to_string(),
                };
                (self.stored_snapshot(season, player, true), vec![soft])
            }
        }
    }

    async fn try_hydrate(
        &self,
        season: &Season,
        player: &Player,
        tz_offset_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<(PlayerSnapshot, Vec<SoftError>), AppError> {
        let manual = self
            .store
            .list_player_activities(&season.season_id, &player.player_id)
            .await?;
        let adjustments = self
            .store
            .list_adjustments(&season.season_id, &player.player_id)
            .await?;

        // Rejected entries never count; approved and still-pending ones do.
        let mut times: Vec<DateTime<Utc>> = manual
            .iter()
            .filter(|a| a.status.counts_toward_hearts())
            .map(|a| a.recorded_at)
            .collect();

        let mut soft_errors = Vec::new();
        let mut external_connected = false;
        if let Some(credential) = &player.fitness_credential {
            let fetched = match tokio::time::timeout(
                self.fetch_timeout,
                self.fitness.recent_workouts(credential, season.starts_at),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::FitnessSource(format!(
                    "workout fetch timed out after {}s",
                    self.fetch_timeout.as_secs()
                ))),
            };
            match fetched {
                Ok(records) => {
                    external_connected = true;
                    times.extend(records.iter().map(|r| r.recorded_at));
                }
                // A tracker outage costs only the external entries; the
                // manual data below still scores.
                Err(e) => {
                    tracing::warn!(
                        player_id = %player.player_id,
                        season_id = %season.season_id,
                        error = %e,
                        "External workout fetch failed, continuing with manual entries"
                    );
                    soft_errors.push(SoftError {
                        player_id: player.player_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // The scoring window freezes at the season end once completed.
        let horizon = if season.stage.is_completed() {
            season.ends_at
        } else {
            now.min(season.ends_at)
        };
        times.retain(|t| *t >= season.starts_at && *t <= horizon);
        times.sort_unstable();

        let streaks = engine::streaks(&times, now, tz_offset_minutes);
        let outcome = engine::simulate(
            &times,
            season.starts_at,
            now,
            tz_offset_minutes,
            &HeartsConfig {
                weekly_target: season.weekly_target,
                max_hearts: season.max_hearts,
                season_end: season.ends_at,
            },
        );

        let ledger: i64 = adjustments.iter().map(|a| i64::from(a.delta)).sum();
        let adjusted =
            (i64::from(outcome.hearts) + ledger).clamp(0, i64::from(season.max_hearts)) as u32;

        let (hearts, in_sudden_death) =
            if season.sudden_death_enabled && player.sudden_death_opt_in && adjusted == 0 {
                // Opted-in players stay on the board with a single heart but
                // are out of the running for the pot.
                (1, true)
            } else {
                (adjusted, false)
            };

        let snapshot = PlayerSnapshot {
            player_id: player.player_id.clone(),
            display_name: player.display_name.clone(),
            hearts,
            in_sudden_death,
            workouts_total: times.len() as u32,
            current_streak_days: streaks.current_streak_days,
            longest_streak_days: streaks.longest_streak_days,
            avg_per_week: engine::avg_per_week(times.len() as u32, season.starts_at, horizon),
            weekly_events: outcome.events,
            external_connected,
            degraded: false,
        };
        Ok((snapshot, soft_errors))
    }

    /// Snapshot built purely from stored fields, used pre-season and as
    /// the degraded fallback.
    fn stored_snapshot(&self, season: &Season, player: &Player, degraded: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: player.player_id.clone(),
            display_name: player.display_name.clone(),
            hearts: player.lives_remaining.min(season.max_hearts),
            in_sudden_death: false,
            workouts_total: 0,
            current_streak_days: 0,
            longest_streak_days: 0,
            avg_per_week: 0.0,
            weekly_events: Vec::new(),
            external_connected: !degraded && player.fitness_credential.is_some(),
            degraded,
        }
    }
}
