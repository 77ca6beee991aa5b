// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Sweatstakes: game-state engine for multiplayer fitness competitions.
//!
//! Friends compete in seasons: hit your weekly workout target or lose
//! hearts, dispute suspicious entries by vote, and (in money modes) settle
//! a shared pot when the season completes. Season state is derived: every
//! read recomputes hearts, streaks, and completion from the activity log,
//! so there is no scheduler and no stale cache to invalidate.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use services::{SnapshotService, VoteResolutionService};
use store::SeasonStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SeasonStore>,
    pub votes: VoteResolutionService,
    pub snapshots: SnapshotService,
}
