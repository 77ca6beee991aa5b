// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Live season snapshot.
//!
//! One read assembles the whole season view: sweeps expired disputes,
//! hydrates every member concurrently, computes the shared pot, and runs
//! mode-specific completion detection. The first read that observes a
//! finished season freezes a [`SeasonSummary`] through a checked write;
//! from then on the summary is immutable truth and later reads only
//! display it.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{
    Debt, Highlight, Highlights, Season, SeasonMode, SeasonStage, SeasonSummary,
};
use crate::services::commentary::{publish_soft, CommentaryEvent, CommentarySink};
use crate::services::stats::{PlayerSnapshot, SoftError, StatsHydrator};
use crate::services::votes::VoteResolutionService;
use crate::store::SeasonStore;
use crate::time_utils;

/// Players hydrated in flight at once per snapshot read.
const CONCURRENT_HYDRATIONS: usize = 8;

/// The aggregate view returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonSnapshot {
    pub season_id: String,
    pub name: String,
    pub number: u32,
    pub stage: SeasonStage,
    pub mode: SeasonMode,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub weekly_target: u32,
    pub max_hearts: u32,
    pub pot_cents: i64,
    pub players: Vec<PlayerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SeasonSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub soft_errors: Vec<SoftError>,
    pub generated_at: String,
}

/// Why an active season is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletionReason {
    /// Money-survival: somebody hit 0 hearts.
    Knockout,
    /// Money-last-man: at most one player still standing.
    LastManStanding,
    /// Wall clock reached the season end.
    CalendarEnd,
}

#[derive(Clone)]
pub struct SnapshotService {
    store: Arc<dyn SeasonStore>,
    hydrator: StatsHydrator,
    votes: VoteResolutionService,
    commentary: Arc<dyn CommentarySink>,
}

impl SnapshotService {
    pub fn new(
        store: Arc<dyn SeasonStore>,
        hydrator: StatsHydrator,
        votes: VoteResolutionService,
        commentary: Arc<dyn CommentarySink>,
    ) -> Self {
        Self {
            store,
            hydrator,
            votes,
            commentary,
        }
    }

    /// Builds the full season view at `now`. Season and member reads fail
    /// loudly; everything per-player degrades softly instead.
    pub async fn live_snapshot(
        &self,
        season_id: &str,
        tz_offset_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<SeasonSnapshot, AppError> {
        let mut season = self
            .store
            .get_season(season_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("season {}", season_id)))?;
        let players = self.store.list_players(season_id).await?;

        // Expired disputes resolve before hearts are derived, so a
        // timed-out sus-fest cannot keep suppressing a workout.
        if season.stage.is_live() {
            if let Err(e) = self.votes.sweep_expired(&season, now).await {
                tracing::warn!(
                    season_id,
                    error = %e,
                    "Expired dispute sweep failed, continuing with snapshot"
                );
            }
        }

        // Futures are built eagerly: a lazily-mapped iterator inside
        // stream::iter leaves a borrow-capturing closure in the stream
        // type, which fails the router's Handler bound on this future.
        let hydrations: Vec<_> = players
            .iter()
            .map(|player| self.hydrator.hydrate(&season, player, tz_offset_minutes, now))
            .collect();
        let results: Vec<(PlayerSnapshot, Vec<SoftError>)> = stream::iter(hydrations)
            .buffer_unordered(CONCURRENT_HYDRATIONS)
            .collect()
            .await;

        let mut snapshots = Vec::with_capacity(results.len());
        let mut soft_errors = Vec::new();
        for (snapshot, errors) in results {
            snapshots.push(snapshot);
            soft_errors.extend(errors);
        }
        snapshots.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        let mut pot = compute_pot(&season, players.len() as u32, now);

        if season.stage.is_live() {
            if let Some(reason) = completion_reason(&season, &snapshots, now) {
                season = self
                    .freeze_completion(season, &snapshots, pot, reason, now)
                    .await?;
            }
        }

        // A frozen summary owns the pot from the moment of completion.
        if let Some(summary) = &season.summary {
            pot = summary.final_pot_cents;
        }

        Ok(SeasonSnapshot {
            season_id: season.season_id.clone(),
            name: season.name.clone(),
            number: season.number,
            stage: season.stage,
            mode: season.mode,
            starts_at: season.starts_at,
            ends_at: season.ends_at,
            weekly_target: season.weekly_target,
            max_hearts: season.max_hearts,
            pot_cents: pot,
            players: snapshots,
            summary: season.summary.clone(),
            soft_errors,
            generated_at: time_utils::format_utc_rfc3339(now),
        })
    }

    /// Transitions an active season to completed and freezes its summary.
    /// Exactly one concurrent reader wins the checked write; losers adopt
    /// the winner's stored truth.
    async fn freeze_completion(
        &self,
        season: Season,
        snapshots: &[PlayerSnapshot],
        pot: i64,
        reason: CompletionReason,
        now: DateTime<Utc>,
    ) -> Result<Season, AppError> {
        let summary = build_summary(&season, snapshots, pot, now);

        let mut completed = season.clone();
        completed.stage = SeasonStage::Completed;
        completed.summary = Some(summary.clone());

        if !self
            .store
            .update_season_checked(&completed, season.version)
            .await?
        {
            tracing::debug!(
                season_id = %season.season_id,
                "Lost the completion freeze race, adopting stored summary"
            );
            return self
                .store
                .get_season(&season.season_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("season {}", season.season_id)));
        }

        tracing::info!(
            season_id = %season.season_id,
            reason = ?reason,
            winners = summary.winners.len(),
            losers = summary.losers.len(),
            final_pot_cents = summary.final_pot_cents,
            "Season completed, summary frozen"
        );

        if reason == CompletionReason::Knockout {
            let knocked: Vec<String> = snapshots
                .iter()
                .filter(|s| !s.in_sudden_death && s.hearts == 0)
                .map(|s| s.player_id.clone())
                .collect();
            publish_soft(
                self.commentary.as_ref(),
                CommentaryEvent::Knockout {
                    season_id: season.season_id.clone(),
                    player_ids: knocked,
                },
            )
            .await;
        }
        publish_soft(
            self.commentary.as_ref(),
            CommentaryEvent::SeasonCompleted {
                season_id: season.season_id.clone(),
                winners: summary.winners.clone(),
                losers: summary.losers.clone(),
            },
        )
        .await;

        Ok(completed)
    }
}

/// Shared pot for money modes: seed, plus one ante per completed week
/// (optionally scaled by member count), plus per-player boosts. Week
/// boundaries are UTC so every caller sees the same pot.
pub fn compute_pot(season: &Season, member_count: u32, now: DateTime<Utc>) -> i64 {
    if !season.mode.is_money() {
        return 0;
    }
    let horizon = now.min(season.ends_at);
    let weeks = if horizon <= season.starts_at {
        0
    } else {
        time_utils::completed_windows(
            time_utils::local_day(season.starts_at, 0),
            time_utils::local_day(horizon, 0),
        )
    };
    let ante_scale = if season.pot.scale_with_players {
        i64::from(member_count)
    } else {
        1
    };
    season.pot.initial_pot_cents
        + season.pot.weekly_ante_cents * ante_scale * weeks
        + season.pot.player_boost_cents * i64::from(member_count)
}

/// Heart-based completion only fires on a fully-hydrated roster: a read
/// that fell back to stored lives must never end a season. Calendar end
/// always applies.
fn completion_reason(
    season: &Season,
    snapshots: &[PlayerSnapshot],
    now: DateTime<Utc>,
) -> Option<CompletionReason> {
    let clean = !snapshots.is_empty() && snapshots.iter().all(|s| !s.degraded);

    if clean && season.mode == SeasonMode::MoneySurvival {
        let knocked_out = snapshots
            .iter()
            .any(|s| !s.in_sudden_death && s.hearts == 0);
        if knocked_out {
            return Some(CompletionReason::Knockout);
        }
    }
    if clean && season.mode == SeasonMode::MoneyLastMan {
        let alive = snapshots
            .iter()
            .filter(|s| !s.in_sudden_death && s.hearts > 0)
            .count();
        if alive <= 1 {
            return Some(CompletionReason::LastManStanding);
        }
    }
    if now >= season.ends_at {
        return Some(CompletionReason::CalendarEnd);
    }
    None
}

/// Winners are non-sudden-death players still holding hearts; everyone
/// else (knocked out or in sudden death) lands in losers.
fn build_summary(
    season: &Season,
    snapshots: &[PlayerSnapshot],
    pot: i64,
    now: DateTime<Utc>,
) -> SeasonSummary {
    let winners: Vec<String> = snapshots
        .iter()
        .filter(|s| !s.in_sudden_death && s.hearts > 0)
        .map(|s| s.player_id.clone())
        .collect();
    let losers: Vec<String> = snapshots
        .iter()
        .filter(|s| s.in_sudden_death || s.hearts == 0)
        .map(|s| s.player_id.clone())
        .collect();

    let highlights = Highlights {
        longest_streak: best_by(snapshots, |s| f64::from(s.longest_streak_days)),
        most_workouts: best_by(snapshots, |s| f64::from(s.workouts_total)),
        most_consistent: best_by(snapshots, |s| s.avg_per_week),
    };

    let final_pot_cents = if season.mode.is_money() { pot } else { 0 };
    let debts = if season.mode.is_money() {
        build_debts(&losers, &winners, final_pot_cents)
    } else {
        Vec::new()
    };

    SeasonSummary {
        winners,
        losers,
        highlights,
        final_pot_cents,
        debts,
        generated_at: now,
    }
}

fn best_by<F>(snapshots: &[PlayerSnapshot], value: F) -> Option<Highlight>
where
    F: Fn(&PlayerSnapshot) -> f64,
{
    snapshots
        .iter()
        .filter(|s| !s.degraded)
        .map(|s| (s, value(s)))
        .filter(|(_, v)| *v > 0.0)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(s, v)| Highlight {
            player_id: s.player_id.clone(),
            value: v,
        })
}

/// Splits the pot into equal pairwise IOUs: every loser owes every winner
/// `pot / (losers × winners)` cents, integer division, remainder forgiven.
fn build_debts(losers: &[String], winners: &[String], pot_cents: i64) -> Vec<Debt> {
    if losers.is_empty() || winners.is_empty() || pot_cents <= 0 {
        return Vec::new();
    }
    let share = pot_cents / (losers.len() as i64 * winners.len() as i64);
    if share <= 0 {
        return Vec::new();
    }
    let mut debts = Vec::with_capacity(losers.len() * winners.len());
    for debtor in losers {
        for creditor in winners {
            debts.push(Debt {
                debtor_id: debtor.clone(),
                creditor_id: creditor.clone(),
                amount_cents: share,
            });
        }
    }
    debts
}
