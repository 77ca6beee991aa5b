// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! External fitness-source client.
//!
//! Players may link an external tracker; linked workouts merge with manual
//! entries during stats hydration. The engine only ever sees the
//! [`FitnessSource`] trait, so hydration stays testable without a network
//! and the surrounding system can plug in its own provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;

/// Port for fetching a player's externally-recorded workouts.
#[async_trait]
pub trait FitnessSource: Send + Sync {
    /// Workouts recorded after `after` for the player identified by
    /// `credential`. Failures are per-player: the hydrator degrades that
    /// player and keeps going.
    async fn recent_workouts(
        &self,
        credential: &str,
        after: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, AppError>;
}

/// One workout as reported by the external source.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutRecord {
    pub recorded_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub distance_meters: f64,
    pub kind: String,
}

/// HTTP implementation of [`FitnessSource`].
#[derive(Clone)]
pub struct HttpFitnessSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFitnessSource {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl FitnessSource for HttpFitnessSource {
    async fn recent_workouts(
        &self,
        credential: &str,
        after: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, AppError> {
        let url = format!("{}/v1/workouts", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(credential)
            .query(&[("after", after.timestamp().to_string())])
            .send()
            .await
            .map_err(|e| AppError::FitnessSource(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(AppError::FitnessSource(
                    "credential rejected by fitness source".to_string(),
                ));
            }

            return Err(AppError::FitnessSource(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::FitnessSource(format!("JSON parse error: {}", e)))
    }
}

/// Stand-in source for deployments with no tracker integration configured.
/// Linked players simply contribute no external workouts.
pub struct NullFitnessSource;

#[async_trait]
impl FitnessSource for NullFitnessSource {
    async fn recent_workouts(
        &self,
        _credential: &str,
        _after: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, AppError> {
        Ok(Vec::new())
    }
}
