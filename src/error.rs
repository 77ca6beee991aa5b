// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Validation, authorization and availability errors surface to the caller
/// with a stable code. Degraded-data errors (a single player's external
/// fetch failing) never travel this path; they are collected per player
/// inside the snapshot instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Players cannot vote on their own activity")]
    SelfVote,

    #[error("Voting is disabled for seasons with 2 or fewer members")]
    VotingDisabled,

    #[error("Voting closed: {0}")]
    VotingClosed(String),

    #[error("{0} is not a member of this season")]
    NotAMember(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Fitness source error: {0}")]
    FitnessSource(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::SelfVote => (StatusCode::BAD_REQUEST, "self_vote", None),
            AppError::VotingDisabled => (StatusCode::BAD_REQUEST, "voting_disabled", None),
            AppError::VotingClosed(msg) => {
                (StatusCode::CONFLICT, "voting_closed", Some(msg.clone()))
            }
            AppError::NotAMember(msg) => {
                (StatusCode::BAD_REQUEST, "not_a_member", Some(msg.clone()))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
            AppError::FitnessSource(msg) => (
                StatusCode::BAD_GATEWAY,
                "fitness_source_error",
                Some(msg.clone()),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
