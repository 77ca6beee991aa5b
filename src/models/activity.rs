// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Logged workout model and its dispute status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged workout, manual or sourced from the external fitness provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity ID (also used as document ID)
    pub activity_id: String,
    /// Season the workout was logged in
    pub season_id: String,
    /// Owning player
    pub player_id: String,
    /// When the workout happened
    pub recorded_at: DateTime<Utc>,
    /// Duration in seconds
    pub duration_secs: u32,
    /// Distance in meters
    pub distance_meters: f64,
    /// Workout type (Run, Ride, Lift, ...)
    pub kind: String,
    /// How the record entered the system
    pub origin: ActivityOrigin,
    /// Dispute status; only `Approved` and `Pending` count toward hearts
    pub status: DisputeStatus,
    /// Voting deadline while a dispute is open
    pub vote_deadline: Option<DateTime<Utc>>,
    /// Terminal decision marker; once set, only an owner override may
    /// change the status again
    pub decided_at: Option<DateTime<Utc>>,
    /// Player whose vote opened the dispute (holds the veto)
    pub dispute_opened_by: Option<String>,
    /// Optimistic-concurrency counter, bumped on every checked write
    #[serde(default)]
    pub version: u64,
}

impl Activity {
    /// Whether a terminal decision has been recorded.
    pub fn is_decided(&self) -> bool {
        self.decided_at.is_some()
    }
}

/// Where an activity record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityOrigin {
    Manual,
    External,
}

/// Dispute status of a logged workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    /// No active dispute (default), or dispute resolved in favor
    Approved,
    /// Dispute open, votes being collected
    Pending,
    /// Dispute resolved against; the workout never counts
    Rejected,
}

impl DisputeStatus {
    /// Rejected posts never count; pending ones count until decided.
    pub fn counts_toward_hearts(&self) -> bool {
        matches!(self, DisputeStatus::Approved | DisputeStatus::Pending)
    }
}
