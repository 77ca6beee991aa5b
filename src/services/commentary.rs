// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Commentary / audit event sink.
//!
//! Vote decisions, knockouts, and season completions emit events so the
//! surrounding system can announce them (group chat, feed, audit log).
//! Publishing is always soft: a sink failure is logged and never fails
//! the operation that produced the event.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::DisputeStatus;

/// Game events worth announcing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentaryEvent {
    DisputeOpened {
        season_id: String,
        activity_id: String,
        opened_by: String,
        deadline: DateTime<Utc>,
    },
    DisputeCancelled {
        season_id: String,
        activity_id: String,
        cancelled_by: String,
    },
    VoteDecided {
        season_id: String,
        activity_id: String,
        status: DisputeStatus,
        legit: u32,
        sus: u32,
        via_override: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Knockout {
        season_id: String,
        player_ids: Vec<String>,
    },
    SeasonCompleted {
        season_id: String,
        winners: Vec<String>,
        losers: Vec<String>,
    },
}

impl CommentaryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CommentaryEvent::DisputeOpened { .. } => "dispute_opened",
            CommentaryEvent::DisputeCancelled { .. } => "dispute_cancelled",
            CommentaryEvent::VoteDecided { .. } => "vote_decided",
            CommentaryEvent::Knockout { .. } => "knockout",
            CommentaryEvent::SeasonCompleted { .. } => "season_completed",
        }
    }
}

/// Port for delivering commentary events.
#[async_trait]
pub trait CommentarySink: Send + Sync {
    async fn publish(&self, event: CommentaryEvent) -> Result<(), AppError>;
}

/// Default sink: structured log lines, nothing else.
pub struct LoggingCommentary;

#[async_trait]
impl CommentarySink for LoggingCommentary {
    async fn publish(&self, event: CommentaryEvent) -> Result<(), AppError> {
        tracing::info!(
            kind = event.kind(),
            event = %serde_json::to_string(&event).unwrap_or_default(),
            "Commentary event"
        );
        Ok(())
    }
}

/// Publishes and swallows sink failures with a warning. Commentary must
/// never take down the game operation it narrates.
pub async fn publish_soft(sink: &dyn CommentarySink, event: CommentaryEvent) {
    let kind = event.kind();
    if let Err(e) = sink.publish(event).await {
        tracing::warn!(kind, error = %e, "Commentary publish failed, continuing");
    }
}
