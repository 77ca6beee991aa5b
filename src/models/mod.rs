// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod adjustment;
pub mod player;
pub mod season;
pub mod summary;
pub mod vote;

pub use activity::{Activity, ActivityOrigin, DisputeStatus};
pub use adjustment::HeartAdjustment;
pub use player::Player;
pub use season::{PotConfig, Season, SeasonMode, SeasonStage};
pub use summary::{Debt, Highlight, Highlights, SeasonSummary};
pub use vote::{Vote, VoteAction, VoteChoice};
