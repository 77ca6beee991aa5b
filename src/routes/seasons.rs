// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Season setup: create, join, start, and manual workout logging.
//!
//! These are thin store writes so the engine can be driven end-to-end;
//! id allocation is left to the caller, matching the rest of the API.

use crate::error::{AppError, Result};
use crate::models::{Player, PotConfig, Season, SeasonMode, SeasonStage};
use crate::store::new_manual_activity;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/seasons", post(create_season))
        .route("/api/seasons/{season_id}/players", post(add_player))
        .route("/api/seasons/{season_id}/start", post(start_season))
        .route("/api/seasons/{season_id}/activities", post(log_activity))
}

// ─── Season Creation ─────────────────────────────────────────

#[derive(Deserialize)]
struct CreateSeasonRequest {
    season_id: String,
    name: String,
    #[serde(default = "default_number")]
    number: u32,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    mode: SeasonMode,
    weekly_target: u32,
    max_hearts: u32,
    #[serde(default)]
    pot: PotConfig,
    #[serde(default)]
    sudden_death_enabled: bool,
    owner_id: String,
}

fn default_number() -> u32 {
    1
}

async fn create_season(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSeasonRequest>,
) -> Result<Json<Season>> {
    if request.ends_at <= request.starts_at {
        return Err(AppError::BadRequest(
            "season end must be after season start".to_string(),
        ));
    }
    if request.max_hearts == 0 {
        return Err(AppError::BadRequest(
            "max_hearts must be at least 1".to_string(),
        ));
    }
    if state.store.get_season(&request.season_id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "season {} already exists",
            request.season_id
        )));
    }

    let season = Season {
        season_id: request.season_id,
        name: request.name,
        number: request.number,
        starts_at: request.starts_at,
        ends_at: request.ends_at,
        stage: SeasonStage::PreStage,
        mode: request.mode,
        weekly_target: request.weekly_target,
        max_hearts: request.max_hearts,
        pot: request.pot,
        sudden_death_enabled: request.sudden_death_enabled,
        owner_id: request.owner_id,
        summary: None,
        version: 0,
    };
    state.store.put_season(&season).await?;

    tracing::info!(season_id = %season.season_id, mode = ?season.mode, "Season created");
    Ok(Json(season))
}

// ─── Membership ──────────────────────────────────────────────

#[derive(Deserialize)]
struct AddPlayerRequest {
    player_id: String,
    display_name: String,
    #[serde(default)]
    fitness_credential: Option<String>,
    #[serde(default)]
    sudden_death_opt_in: bool,
}

async fn add_player(
    State(state): State<Arc<AppState>>,
    Path(season_id): Path<String>,
    Json(request): Json<AddPlayerRequest>,
) -> Result<Json<Player>> {
    let season = state
        .store
        .get_season(&season_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("season {}", season_id)))?;
    if season.stage.is_completed() {
        return Err(AppError::Conflict("season is already completed".to_string()));
    }

    // Late joiners start at full hearts; the rule engine's anchor grace
    // keeps them from losing weeks they were never part of.
    let player = Player {
        player_id: request.player_id,
        season_id: season_id.clone(),
        display_name: request.display_name,
        fitness_credential: request.fitness_credential,
        lives_remaining: season.max_hearts,
        sudden_death_opt_in: request.sudden_death_opt_in,
        ready: false,
    };
    state.store.put_player(&player).await?;

    tracing::info!(season_id, player_id = %player.player_id, "Player joined season");
    Ok(Json(player))
}

// ─── Stage Transition ────────────────────────────────────────

#[derive(Deserialize)]
struct StartSeasonRequest {
    requester_id: String,
}

async fn start_season(
    State(state): State<Arc<AppState>>,
    Path(season_id): Path<String>,
    Json(request): Json<StartSeasonRequest>,
) -> Result<Json<Season>> {
    let season = state
        .store
        .get_season(&season_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("season {}", season_id)))?;
    if season.owner_id != request.requester_id {
        return Err(AppError::Forbidden(
            "only the season owner may start the season".to_string(),
        ));
    }
    if !season.stage.is_pre() {
        return Err(AppError::Conflict(format!(
            "season is not in a pre-play stage (currently {:?})",
            season.stage
        )));
    }

    let mut started = season.clone();
    started.stage = SeasonStage::Active;
    if !state
        .store
        .update_season_checked(&started, season.version)
        .await?
    {
        return Err(AppError::Conflict(
            "season was modified concurrently, retry".to_string(),
        ));
    }

    tracing::info!(season_id, "Season started");
    started.version += 1;
    Ok(Json(started))
}

// ─── Manual Workout Logging ──────────────────────────────────

#[derive(Deserialize)]
struct LogActivityRequest {
    #[serde(default)]
    activity_id: Option<String>,
    player_id: String,
    recorded_at: DateTime<Utc>,
    #[serde(default)]
    duration_secs: u32,
    #[serde(default)]
    distance_meters: f64,
    kind: String,
}

async fn log_activity(
    State(state): State<Arc<AppState>>,
    Path(season_id): Path<String>,
    Json(request): Json<LogActivityRequest>,
) -> Result<Json<crate::models::Activity>> {
    let season = state
        .store
        .get_season(&season_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("season {}", season_id)))?;
    if season.stage.is_completed() {
        return Err(AppError::Conflict("season is already completed".to_string()));
    }
    if state
        .store
        .get_player(&season_id, &request.player_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotAMember(request.player_id.clone()));
    }

    let activity_id = request.activity_id.unwrap_or_else(|| {
        format!(
            "{}-{}-{}",
            season_id,
            request.player_id,
            request.recorded_at.timestamp_millis()
        )
    });
    if state.store.get_activity(&activity_id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "activity {} already exists",
            activity_id
        )));
    }

    let activity = new_manual_activity(
        &activity_id,
        &season_id,
        &request.player_id,
        request.recorded_at,
        request.duration_secs,
        request.distance_meters,
        &request.kind,
    );
    state.store.put_activity(&activity).await?;

    tracing::info!(
        season_id,
        player_id = %request.player_id,
        activity_id = %activity.activity_id,
        kind = %activity.kind,
        "Manual workout logged"
    );
    Ok(Json(activity))
}
