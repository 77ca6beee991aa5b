// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Vote model for activity disputes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One voter's current choice on a disputed activity.
///
/// Unique per (activity, voter); re-casting overwrites the stored choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    /// Activity under dispute
    pub activity_id: String,
    /// Voting player
    pub voter_id: String,
    /// The choice cast
    pub choice: VoteChoice,
    /// When this choice was (last) cast
    pub cast_at: DateTime<Utc>,
}

/// A stored vote choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    /// The workout looks legitimate
    Legit,
    /// The workout looks suspicious
    Sus,
}

/// A vote request as it arrives from a client.
///
/// `Remove` is not a stored choice: it deletes the requester's own vote,
/// or cancels the whole dispute when issued by the dispute initiator or
/// the season owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Legit,
    Sus,
    Remove,
}

impl VoteAction {
    /// The stored choice this action casts, if any.
    pub fn as_choice(&self) -> Option<VoteChoice> {
        match self {
            VoteAction::Legit => Some(VoteChoice::Legit),
            VoteAction::Sus => Some(VoteChoice::Sus),
            VoteAction::Remove => None,
        }
    }
}
