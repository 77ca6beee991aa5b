// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Activity dispute voting.
//!
//! Any member may flag another player's workout as `sus`. The first vote
//! on an approved activity opens a dispute with a 24-hour deadline; votes
//! are tallied after every mutation and the dispute resolves by timeout,
//! supermajority, unanimity, or simple majority, in that order (which
//! matters at small voter counts). The dispute initiator and the season
//! owner hold a veto (`remove` cancels the whole dispute), and the owner
//! can force either terminal state with an override.
//!
//! Concurrent votes on one activity are serialized through the activity's
//! `version` counter: every mutation re-reads, re-tallies, and writes with
//! a checked update, retrying on conflict.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Activity, DisputeStatus, Season, Vote, VoteAction, VoteChoice};
use crate::services::commentary::{publish_soft, CommentaryEvent, CommentarySink};
use crate::store::SeasonStore;

/// How long a dispute stays open for votes.
pub const VOTE_WINDOW_HOURS: i64 = 24;

/// Seasons below this size have voting disabled entirely.
pub const MIN_VOTING_MEMBERS: usize = 3;

/// Checked-write attempts before giving up with a conflict error.
const MAX_CAS_RETRIES: u32 = 4;

/// Vote counts at the moment of a mutation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoteTally {
    pub legit: u32,
    pub sus: u32,
    pub eligible: u32,
}

/// Result of a vote mutation, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CastOutcome {
    pub activity_id: String,
    pub status: DisputeStatus,
    pub decided: bool,
    pub tally: VoteTally,
}

/// What the vote math says should happen to a pending dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Not enough votes yet; dispute stays open.
    Remain,
    Approve,
    Reject,
}

/// Pure resolution precedence: fizzle, timeout, supermajority, unanimity,
/// majority. The order is load-bearing at small `eligible` counts.
/// Thresholds use integer cross-multiplication, no floats.
pub fn resolve_tally(
    status: DisputeStatus,
    deadline: Option<DateTime<Utc>>,
    legit: u32,
    sus: u32,
    eligible: u32,
    now: DateTime<Utc>,
) -> Resolution {
    if eligible == 0 {
        return Resolution::Remain;
    }
    let total = legit + sus;
    // A pending dispute with no votes left has fizzled.
    if status == DisputeStatus::Pending && total == 0 {
        return Resolution::Approve;
    }
    // Timeout defaults to approve, even over a standing sus lead.
    if deadline.is_some_and(|d| now > d) {
        return Resolution::Approve;
    }
    // Supermajority: sus/eligible >= 3/4, only meaningful for eligible >= 2.
    if eligible >= 2 && u64::from(sus) * 4 >= u64::from(eligible) * 3 {
        return Resolution::Reject;
    }
    // Unanimous sus among all eligible voters.
    if sus == eligible {
        return Resolution::Reject;
    }
    // Majority participation: decide by plurality, legit wins ties.
    if u64::from(total) * 2 > u64::from(eligible) {
        return if legit >= sus {
            Resolution::Approve
        } else {
            Resolution::Reject
        };
    }
    Resolution::Remain
}

#[derive(Clone)]
pub struct VoteResolutionService {
    store: Arc<dyn SeasonStore>,
    commentary: Arc<dyn CommentarySink>,
}

impl VoteResolutionService {
    pub fn new(store: Arc<dyn SeasonStore>, commentary: Arc<dyn CommentarySink>) -> Self {
        Self { store, commentary }
    }

    /// Casts, changes, or removes one voter's choice on an activity and
    /// runs resolution. `now` is the caller's wall clock; all deadline
    /// math derives from it.
    pub async fn cast(
        &self,
        activity_id: &str,
        voter_id: &str,
        action: VoteAction,
        now: DateTime<Utc>,
    ) -> Result<CastOutcome, AppError> {
        for attempt in 0..MAX_CAS_RETRIES {
            let activity = self
                .store
                .get_activity(activity_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("activity {}", activity_id)))?;
            let season = self
                .store
                .get_season(&activity.season_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("season {}", activity.season_id)))?;
            let members = self.store.list_players(&season.season_id).await?;

            if !members.iter().any(|m| m.player_id == voter_id) {
                return Err(AppError::NotAMember(voter_id.to_string()));
            }
            if members.len() < MIN_VOTING_MEMBERS {
                return Err(AppError::VotingDisabled);
            }

            let eligible = members
                .iter()
                .filter(|m| m.player_id != activity.player_id)
                .count() as u32;

            let result = match action.as_choice() {
                Some(choice) => {
                    self.cast_choice(&season, &activity, voter_id, choice, eligible, now)
                        .await?
                }
                None => {
                    self.remove_vote(&season, &activity, voter_id, eligible, now)
                        .await?
                }
            };

            match result {
                Some(outcome) => return Ok(outcome),
                None => {
                    tracing::debug!(activity_id, attempt, "Vote write conflict, retrying");
                }
            }
        }

        Err(AppError::Conflict(format!(
            "activity {}: too many concurrent vote writers",
            activity_id
        )))
    }

    /// Season-owner override: force a terminal status, bypassing the vote
    /// math. Works from any state, including flipping an earlier decision.
    pub async fn override_status(
        &self,
        activity_id: &str,
        requester_id: &str,
        status: DisputeStatus,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<CastOutcome, AppError> {
        if status == DisputeStatus::Pending {
            return Err(AppError::BadRequest(
                "override status must be approved or rejected".to_string(),
            ));
        }

        for _attempt in 0..MAX_CAS_RETRIES {
            let activity = self
                .store
                .get_activity(activity_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("activity {}", activity_id)))?;
            let season = self
                .store
                .get_season(&activity.season_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("season {}", activity.season_id)))?;

            if season.owner_id != requester_id {
                return Err(AppError::Forbidden(
                    "only the season owner may override a dispute".to_string(),
                ));
            }

            let mut staged = activity.clone();
            staged.status = status;
            staged.decided_at = Some(now);

            if !self
                .store
                .update_activity_checked(&staged, activity.version)
                .await?
            {
                continue;
            }

            let (legit, sus) = self.tally(&staged).await.unwrap_or((0, 0));
            tracing::info!(
                activity_id,
                owner_id = %requester_id,
                status = ?status,
                reason,
                "Dispute decided by owner override"
            );
            publish_soft(
                self.commentary.as_ref(),
                CommentaryEvent::VoteDecided {
                    season_id: season.season_id.clone(),
                    activity_id: activity_id.to_string(),
                    status,
                    legit,
                    sus,
                    via_override: true,
                    reason: Some(reason.to_string()),
                },
            )
            .await;

            return Ok(CastOutcome {
                activity_id: activity_id.to_string(),
                status,
                decided: true,
                tally: VoteTally {
                    legit,
                    sus,
                    eligible: 0,
                },
            });
        }

        Err(AppError::Conflict(format!(
            "activity {}: too many concurrent vote writers",
            activity_id
        )))
    }

    /// Resolves every dispute whose deadline has passed. Called at the
    /// start of a snapshot read; per-activity failures are logged and
    /// skipped so one stuck dispute cannot block the read.
    pub async fn sweep_expired(&self, season: &Season, now: DateTime<Utc>) -> Result<u32, AppError> {
        let activities = self.store.list_season_activities(&season.season_id).await?;
        let members = self.store.list_players(&season.season_id).await?;

        let mut swept = 0;
        for activity in activities {
            if activity.status != DisputeStatus::Pending || activity.is_decided() {
                continue;
            }
            let Some(deadline) = activity.vote_deadline else {
                continue;
            };
            if now <= deadline {
                continue;
            }
            let eligible = members
                .iter()
                .filter(|m| m.player_id != activity.player_id)
                .count() as u32;
            if eligible == 0 {
                continue;
            }
            match self
                .finish_resolution(season, activity.clone(), activity.version, eligible, now, false)
                .await
            {
                Ok(Some(outcome)) if outcome.decided => swept += 1,
                Ok(_) => {} // lost a race; the next read picks it up
                Err(e) => {
                    tracing::warn!(
                        activity_id = %activity.activity_id,
                        error = %e,
                        "Expired dispute sweep failed"
                    );
                }
            }
        }

        if swept > 0 {
            tracing::info!(season_id = %season.season_id, swept, "Auto-resolved expired disputes");
        }
        Ok(swept)
    }

    async fn cast_choice(
        &self,
        season: &Season,
        activity: &Activity,
        voter_id: &str,
        choice: VoteChoice,
        eligible: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<CastOutcome>, AppError> {
        if voter_id == activity.player_id {
            return Err(AppError::SelfVote);
        }
        if activity.is_decided() || activity.status == DisputeStatus::Rejected {
            return Err(AppError::VotingClosed("activity already decided".to_string()));
        }
        if activity.status == DisputeStatus::Pending {
            if let Some(deadline) = activity.vote_deadline {
                if now > deadline {
                    return Err(AppError::VotingClosed(
                        "vote deadline has passed".to_string(),
                    ));
                }
            }
        }

        let mut staged = activity.clone();
        let newly_opened = staged.status == DisputeStatus::Approved;
        if newly_opened {
            staged.status = DisputeStatus::Pending;
            staged.vote_deadline = Some(now + Duration::hours(VOTE_WINDOW_HOURS));
            staged.dispute_opened_by = Some(voter_id.to_string());
        }

        self.store
            .upsert_vote(&Vote {
                activity_id: activity.activity_id.clone(),
                voter_id: voter_id.to_string(),
                choice,
                cast_at: now,
            })
            .await?;

        self.finish_resolution(season, staged, activity.version, eligible, now, newly_opened)
            .await
    }

    async fn remove_vote(
        &self,
        season: &Season,
        activity: &Activity,
        voter_id: &str,
        eligible: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<CastOutcome>, AppError> {
        let is_initiator = activity.dispute_opened_by.as_deref() == Some(voter_id);
        let is_owner = season.owner_id == voter_id;

        if activity.status == DisputeStatus::Pending
            && !activity.is_decided()
            && (is_initiator || is_owner)
        {
            // Veto: the initiator or owner cancels the whole dispute.
            let mut staged = activity.clone();
            staged.status = DisputeStatus::Approved;
            staged.vote_deadline = None;
            staged.dispute_opened_by = None;

            if !self
                .store
                .update_activity_checked(&staged, activity.version)
                .await?
            {
                return Ok(None);
            }

            self.store.clear_votes(&activity.activity_id).await?;
            publish_soft(
                self.commentary.as_ref(),
                CommentaryEvent::DisputeCancelled {
                    season_id: season.season_id.clone(),
                    activity_id: activity.activity_id.clone(),
                    cancelled_by: voter_id.to_string(),
                },
            )
            .await;

            return Ok(Some(CastOutcome {
                activity_id: activity.activity_id.clone(),
                status: DisputeStatus::Approved,
                decided: false,
                tally: VoteTally {
                    legit: 0,
                    sus: 0,
                    eligible,
                },
            }));
        }

        // Any other voter only retracts their own choice.
        self.store
            .delete_vote(&activity.activity_id, voter_id)
            .await?;

        if activity.is_decided() || activity.status != DisputeStatus::Pending {
            let (legit, sus) = self.tally(activity).await?;
            return Ok(Some(CastOutcome {
                activity_id: activity.activity_id.clone(),
                status: activity.status,
                decided: activity.is_decided(),
                tally: VoteTally {
                    legit,
                    sus,
                    eligible,
                },
            }));
        }

        self.finish_resolution(season, activity.clone(), activity.version, eligible, now, false)
            .await
    }

    /// Tallies, resolves, and writes the staged activity with a checked
    /// update. Returns `None` when the write lost a version race and the
    /// caller should retry, unless the winner already decided, in which
    /// case the decided state is returned as-is.
    async fn finish_resolution(
        &self,
        season: &Season,
        mut staged: Activity,
        expected_version: u64,
        eligible: u32,
        now: DateTime<Utc>,
        newly_opened: bool,
    ) -> Result<Option<CastOutcome>, AppError> {
        let (legit, sus) = self.tally(&staged).await?;

        let resolution = resolve_tally(staged.status, staged.vote_deadline, legit, sus, eligible, now);
        let decided = match resolution {
            Resolution::Remain => false,
            Resolution::Approve => {
                staged.status = DisputeStatus::Approved;
                staged.decided_at = Some(now);
                true
            }
            Resolution::Reject => {
                staged.status = DisputeStatus::Rejected;
                staged.decided_at = Some(now);
                true
            }
        };

        if !self
            .store
            .update_activity_checked(&staged, expected_version)
            .await?
        {
            // Someone else won the version race. If they reached a terminal
            // state, that decision stands; otherwise retry our mutation.
            if let Some(current) = self.store.get_activity(&staged.activity_id).await? {
                if current.is_decided() {
                    return Ok(Some(CastOutcome {
                        activity_id: current.activity_id.clone(),
                        status: current.status,
                        decided: true,
                        tally: VoteTally {
                            legit,
                            sus,
                            eligible,
                        },
                    }));
                }
            }
            return Ok(None);
        }

        if newly_opened {
            publish_soft(
                self.commentary.as_ref(),
                CommentaryEvent::DisputeOpened {
                    season_id: season.season_id.clone(),
                    activity_id: staged.activity_id.clone(),
                    opened_by: staged.dispute_opened_by.clone().unwrap_or_default(),
                    deadline: staged.vote_deadline.unwrap_or(now),
                },
            )
            .await;
        }
        if decided {
            tracing::info!(
                activity_id = %staged.activity_id,
                status = ?staged.status,
                legit,
                sus,
                eligible,
                "Dispute resolved"
            );
            publish_soft(
                self.commentary.as_ref(),
                CommentaryEvent::VoteDecided {
                    season_id: season.season_id.clone(),
                    activity_id: staged.activity_id.clone(),
                    status: staged.status,
                    legit,
                    sus,
                    via_override: false,
                    reason: None,
                },
            )
            .await;
        }

        Ok(Some(CastOutcome {
            activity_id: staged.activity_id.clone(),
            status: staged.status,
            decided,
            tally: VoteTally {
                legit,
                sus,
                eligible,
            },
        }))
    }

    /// Counts votes belonging to the activity's current dispute. Votes
    /// cast before the dispute opened (leftovers from a cancelled one)
    /// are excluded from the tally.
    async fn tally(&self, activity: &Activity) -> Result<(u32, u32), AppError> {
        let opened_at = activity
            .vote_deadline
            .map(|d| d - Duration::hours(VOTE_WINDOW_HOURS));
        let votes = self.store.list_votes(&activity.activity_id).await?;

        let mut legit = 0;
        let mut sus = 0;
        for vote in &votes {
            if let Some(opened_at) = opened_at {
                if vote.cast_at < opened_at {
                    continue;
                }
            }
            match vote.choice {
                VoteChoice::Legit => legit += 1,
                VoteChoice::Sus => sus += 1,
            }
        }
        Ok((legit, sus))
    }
}
