// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! In-memory [`SeasonStore`] backed by [`DashMap`]s.
//!
//! Entry-level locking gives the checked writes real compare-and-swap
//! semantics under concurrency, which is what the vote and snapshot
//! services lean on. `set_offline` flips every operation to an error so
//! tests can exercise the degraded paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AppError;
use crate::models::{Activity, HeartAdjustment, Player, Season, Vote};
use crate::store::SeasonStore;

#[derive(Default)]
pub struct MemoryStore {
    seasons: DashMap<String, Season>,
    players: DashMap<String, Player>,
    activities: DashMap<String, Activity>,
    votes: DashMap<String, Vec<Vote>>,
    adjustments: DashMap<String, Vec<HeartAdjustment>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline, every store call returns [`AppError::Store`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Store("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn player_key(season_id: &str, player_id: &str) -> String {
        format!("{}:{}", season_id, player_id)
    }
}

#[async_trait]
impl SeasonStore for MemoryStore {
    async fn get_season(&self, season_id: &str) -> Result<Option<Season>, AppError> {
        self.check_online()?;
        Ok(self.seasons.get(season_id).map(|s| s.clone()))
    }

    async fn put_season(&self, season: &Season) -> Result<(), AppError> {
        self.check_online()?;
        self.seasons
            .insert(season.season_id.clone(), season.clone());
        Ok(())
    }

    async fn update_season_checked(
        &self,
        season: &Season,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        self.check_online()?;
        // get_mut holds the shard lock, so the version check and the write
        // are atomic with respect to other checked writers.
        match self.seasons.get_mut(&season.season_id) {
            Some(mut entry) if entry.version == expected_version => {
                let mut next = season.clone();
                next.version = expected_version + 1;
                *entry = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_player(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Option<Player>, AppError> {
        self.check_online()?;
        Ok(self
            .players
            .get(&Self::player_key(season_id, player_id))
            .map(|p| p.clone()))
    }

    async fn put_player(&self, player: &Player) -> Result<(), AppError> {
        self.check_online()?;
        self.players.insert(
            Self::player_key(&player.season_id, &player.player_id),
            player.clone(),
        );
        Ok(())
    }

    async fn list_players(&self, season_id: &str) -> Result<Vec<Player>, AppError> {
        self.check_online()?;
        let mut players: Vec<Player> = self
            .players
            .iter()
            .filter(|entry| entry.season_id == season_id)
            .map(|entry| entry.clone())
            .collect();
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        Ok(players)
    }

    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError> {
        self.check_online()?;
        Ok(self.activities.get(activity_id).map(|a| a.clone()))
    }

    async fn put_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.check_online()?;
        self.activities
            .insert(activity.activity_id.clone(), activity.clone());
        Ok(())
    }

    async fn update_activity_checked(
        &self,
        activity: &Activity,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        self.check_online()?;
        match self.activities.get_mut(&activity.activity_id) {
            Some(mut entry) if entry.version == expected_version => {
                let mut next = activity.clone();
                next.version = expected_version + 1;
                *entry = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_player_activities(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Vec<Activity>, AppError> {
        self.check_online()?;
        Ok(self
            .activities
            .iter()
            .filter(|entry| entry.season_id == season_id && entry.player_id == player_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn list_season_activities(&self, season_id: &str) -> Result<Vec<Activity>, AppError> {
        self.check_online()?;
        Ok(self
            .activities
            .iter()
            .filter(|entry| entry.season_id == season_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn list_votes(&self, activity_id: &str) -> Result<Vec<Vote>, AppError> {
        self.check_online()?;
        Ok(self
            .votes
            .get(activity_id)
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<(), AppError> {
        self.check_online()?;
        let mut votes = self.votes.entry(vote.activity_id.clone()).or_default();
        match votes.iter_mut().find(|v| v.voter_id == vote.voter_id) {
            Some(existing) => *existing = vote.clone(),
            None => votes.push(vote.clone()),
        }
        Ok(())
    }

    async fn delete_vote(&self, activity_id: &str, voter_id: &str) -> Result<(), AppError> {
        self.check_online()?;
        if let Some(mut votes) = self.votes.get_mut(activity_id) {
            votes.retain(|v| v.voter_id != voter_id);
        }
        Ok(())
    }

    async fn clear_votes(&self, activity_id: &str) -> Result<(), AppError> {
        self.check_online()?;
        self.votes.remove(activity_id);
        Ok(())
    }

    async fn list_adjustments(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Vec<HeartAdjustment>, AppError> {
        self.check_online()?;
        Ok(self
            .adjustments
            .get(&Self::player_key(season_id, player_id))
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn append_adjustment(&self, adjustment: &HeartAdjustment) -> Result<(), AppError> {
        self.check_online()?;
        self.adjustments
            .entry(Self::player_key(&adjustment.season_id, &adjustment.player_id))
            .or_default()
            .push(adjustment.clone());
        Ok(())
    }
}
