// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Game-state API: snapshot reads, dispute votes, owner actions.
//!
//! Identity is supplied by the caller (the surrounding system owns
//! authentication); handlers take explicit player ids and validate
//! membership and ownership against stored state.

use crate::error::{AppError, Result};
use crate::models::{DisputeStatus, HeartAdjustment, VoteAction};
use crate::services::votes::CastOutcome;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/seasons/{season_id}/snapshot", get(get_snapshot))
        .route("/api/seasons/{season_id}/adjustments", post(post_adjustment))
        .route("/api/activities/{activity_id}/votes", post(post_vote))
        .route("/api/activities/{activity_id}/override", post(post_override))
}

// ─── Season Snapshot ─────────────────────────────────────────

#[derive(Deserialize)]
struct SnapshotQuery {
    /// Caller's UTC offset in minutes; day boundaries default to UTC.
    #[serde(default)]
    tz_offset: i32,
}

/// Full live view of a season: every member hydrated, pot, completion
/// state, and the frozen summary once one exists.
async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(season_id): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<crate::services::SeasonSnapshot>> {
    let snapshot = state
        .snapshots
        .live_snapshot(&season_id, query.tz_offset, chrono::Utc::now())
        .await?;
    Ok(Json(snapshot))
}

// ─── Dispute Votes ───────────────────────────────────────────

#[derive(Deserialize)]
struct VoteRequest {
    voter_id: String,
    action: VoteAction,
}

/// Cast `legit`/`sus`, or `remove` a vote (which is a veto when issued
/// by the dispute initiator or the season owner).
async fn post_vote(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<CastOutcome>> {
    let outcome = state
        .votes
        .cast(&activity_id, &request.voter_id, request.action, chrono::Utc::now())
        .await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct OverrideRequest {
    requester_id: String,
    status: DisputeStatus,
    #[serde(default)]
    reason: String,
}

/// Season-owner override: force a terminal dispute status.
async fn post_override(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<CastOutcome>> {
    let outcome = state
        .votes
        .override_status(
            &activity_id,
            &request.requester_id,
            request.status,
            &request.reason,
            chrono::Utc::now(),
        )
        .await?;
    Ok(Json(outcome))
}

// ─── Heart Adjustments ───────────────────────────────────────

#[derive(Deserialize)]
struct AdjustmentRequest {
    requester_id: String,
    player_id: String,
    delta: i32,
    reason: String,
}

#[derive(Serialize)]
pub struct AdjustmentResponse {
    pub season_id: String,
    pub player_id: String,
    pub delta: i32,
}

/// Appends to a player's hearts ledger. Owner-only; the ledger is summed
/// at read time, so this never races with live recomputation.
async fn post_adjustment(
    State(state): State<Arc<AppState>>,
    Path(season_id): Path<String>,
    Json(request): Json<AdjustmentRequest>,
) -> Result<Json<AdjustmentResponse>> {
    if request.delta == 0 {
        return Err(AppError::BadRequest(
            "adjustment delta must be non-zero".to_string(),
        ));
    }

    let season = state
        .store
        .get_season(&season_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("season {}", season_id)))?;
    if season.owner_id != request.requester_id {
        return Err(AppError::Forbidden(
            "only the season owner may adjust hearts".to_string(),
        ));
    }
    if state
        .store
        .get_player(&season_id, &request.player_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotAMember(request.player_id.clone()));
    }

    let adjustment = HeartAdjustment {
        season_id: season_id.clone(),
        player_id: request.player_id.clone(),
        delta: request.delta,
        reason: request.reason.clone(),
        created_at: chrono::Utc::now(),
    };
    state.store.append_adjustment(&adjustment).await?;

    tracing::info!(
        season_id,
        player_id = %request.player_id,
        delta = request.delta,
        reason = %request.reason,
        "Heart adjustment recorded"
    );

    Ok(Json(AdjustmentResponse {
        season_id,
        player_id: request.player_id,
        delta: request.delta,
    }))
}
