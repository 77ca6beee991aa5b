// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use sweatstakes::config::Config;
use sweatstakes::error::AppError;
use sweatstakes::models::{
    Activity, HeartAdjustment, Player, PotConfig, Season, SeasonMode, SeasonStage, Vote,
};
use sweatstakes::routes::create_router;
use sweatstakes::services::{
    CommentaryEvent, CommentarySink, FitnessSource, NullFitnessSource, SnapshotService,
    StatsHydrator, VoteResolutionService, WorkoutRecord,
};
use sweatstakes::store::{new_manual_activity, MemoryStore, SeasonStore};
use sweatstakes::AppState;

/// Monday, 2026-01-05 00:00 UTC. All fixtures anchor here.
#[allow(dead_code)]
pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap()
}

/// An active eight-week season: target 3/week, 3 hearts, owner `p1`.
#[allow(dead_code)]
pub fn test_season(mode: SeasonMode) -> Season {
    Season {
        season_id: "s1".to_string(),
        name: "Winter Grind".to_string(),
        number: 1,
        starts_at: season_start(),
        ends_at: season_start() + Duration::weeks(8),
        stage: SeasonStage::Active,
        mode,
        weekly_target: 3,
        max_hearts: 3,
        pot: PotConfig {
            initial_pot_cents: 5000,
            weekly_ante_cents: 500,
            scale_with_players: false,
            player_boost_cents: 0,
        },
        sudden_death_enabled: false,
        owner_id: "p1".to_string(),
        summary: None,
        version: 0,
    }
}

#[allow(dead_code)]
pub fn test_player(season_id: &str, player_id: &str, name: &str) -> Player {
    Player {
        player_id: player_id.to_string(),
        season_id: season_id.to_string(),
        display_name: name.to_string(),
        fitness_credential: None,
        lives_remaining: 3,
        sudden_death_opt_in: false,
        ready: true,
    }
}

/// Seeds a season with `n` players `p1..pn`.
#[allow(dead_code)]
pub async fn seed_season(store: &MemoryStore, season: &Season, n: usize) {
    store.put_season(season).await.expect("seed season");
    for i in 1..=n {
        let id = format!("p{}", i);
        let player = test_player(&season.season_id, &id, &format!("Player {}", i));
        store.put_player(&player).await.expect("seed player");
    }
}

/// Logs one approved manual workout for a player.
#[allow(dead_code)]
pub async fn log_workout(
    store: &MemoryStore,
    season_id: &str,
    player_id: &str,
    activity_id: &str,
    recorded_at: DateTime<Utc>,
) {
    let activity = new_manual_activity(
        activity_id,
        season_id,
        player_id,
        recorded_at,
        1800,
        5000.0,
        "Run",
    );
    store.put_activity(&activity).await.expect("seed activity");
}

/// Logs `per_week` evenly spaced workouts in each of `weeks` weeks.
#[allow(dead_code)]
pub async fn log_weekly_workouts(
    store: &MemoryStore,
    season: &Season,
    player_id: &str,
    weeks: u32,
    per_week: u32,
) {
    for week in 0..weeks {
        for i in 0..per_week {
            let at = season.starts_at
                + Duration::weeks(i64::from(week))
                + Duration::days(i64::from(i) * 2)
                + Duration::hours(9);
            let id = format!("{}-w{}-{}", player_id, week, i);
            log_workout(store, &season.season_id, player_id, &id, at).await;
        }
    }
}

/// Commentary sink that records every event for assertions.
#[derive(Default)]
pub struct RecordingCommentary {
    events: Mutex<Vec<CommentaryEvent>>,
}

impl RecordingCommentary {
    #[allow(dead_code)]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .expect("commentary lock")
            .iter()
            .map(|e| e.kind())
            .collect()
    }
}

#[async_trait]
impl CommentarySink for RecordingCommentary {
    async fn publish(&self, event: CommentaryEvent) -> Result<(), AppError> {
        self.events.lock().expect("commentary lock").push(event);
        Ok(())
    }
}

/// Fitness source stub: workouts per credential, plus a credential that
/// always fails to exercise the tracker-outage path.
#[derive(Default)]
pub struct StubFitness {
    workouts: HashMap<String, Vec<WorkoutRecord>>,
}

impl StubFitness {
    #[allow(dead_code)]
    pub fn with_workouts(credential: &str, times: Vec<DateTime<Utc>>) -> Self {
        let records = times
            .into_iter()
            .map(|recorded_at| WorkoutRecord {
                recorded_at,
                duration_secs: 2400,
                distance_meters: 8000.0,
                kind: "Ride".to_string(),
            })
            .collect();
        let mut workouts = HashMap::new();
        workouts.insert(credential.to_string(), records);
        Self { workouts }
    }
}

#[async_trait]
impl FitnessSource for StubFitness {
    async fn recent_workouts(
        &self,
        credential: &str,
        _after: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, AppError> {
        if credential == "broken" {
            return Err(AppError::FitnessSource("stub refuses this credential".to_string()));
        }
        Ok(self.workouts.get(credential).cloned().unwrap_or_default())
    }
}

/// Store wrapper that fails activity reads for one player and delegates
/// everything else to the wrapped [`MemoryStore`]. Exercises the
/// stored-lives degradation tier without taking the whole store down.
pub struct BrokenPlayerStore {
    inner: Arc<MemoryStore>,
    player_id: String,
}

impl BrokenPlayerStore {
    #[allow(dead_code)]
    pub fn new(inner: Arc<MemoryStore>, player_id: &str) -> Self {
        Self {
            inner,
            player_id: player_id.to_string(),
        }
    }
}

#[async_trait]
impl SeasonStore for BrokenPlayerStore {
    async fn get_season(&self, season_id: &str) -> Result<Option<Season>, AppError> {
        self.inner.get_season(season_id).await
    }

    async fn put_season(&self, season: &Season) -> Result<(), AppError> {
        self.inner.put_season(season).await
    }

    async fn update_season_checked(
        &self,
        season: &Season,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        self.inner.update_season_checked(season, expected_version).await
    }

    async fn get_player(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Option<Player>, AppError> {
        self.inner.get_player(season_id, player_id).await
    }

    async fn put_player(&self, player: &Player) -> Result<(), AppError> {
        self.inner.put_player(player).await
    }

    async fn list_players(&self, season_id: &str) -> Result<Vec<Player>, AppError> {
        self.inner.list_players(season_id).await
    }

    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError> {
        self.inner.get_activity(activity_id).await
    }

    async fn put_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.inner.put_activity(activity).await
    }

    async fn update_activity_checked(
        &self,
        activity: &Activity,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        self.inner.update_activity_checked(activity, expected_version).await
    }

    async fn list_player_activities(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Vec<Activity>, AppError> {
        if player_id == self.player_id {
            return Err(AppError::Store(format!(
                "activity reads are down for {}",
                player_id
            )));
        }
        self.inner.list_player_activities(season_id, player_id).await
    }

    async fn list_season_activities(&self, season_id: &str) -> Result<Vec<Activity>, AppError> {
        self.inner.list_season_activities(season_id).await
    }

    async fn list_votes(&self, activity_id: &str) -> Result<Vec<Vote>, AppError> {
        self.inner.list_votes(activity_id).await
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<(), AppError> {
        self.inner.upsert_vote(vote).await
    }

    async fn delete_vote(&self, activity_id: &str, voter_id: &str) -> Result<(), AppError> {
        self.inner.delete_vote(activity_id, voter_id).await
    }

    async fn clear_votes(&self, activity_id: &str) -> Result<(), AppError> {
        self.inner.clear_votes(activity_id).await
    }

    async fn list_adjustments(
        &self,
        season_id: &str,
        player_id: &str,
    ) -> Result<Vec<HeartAdjustment>, AppError> {
        self.inner.list_adjustments(season_id, player_id).await
    }

    async fn append_adjustment(&self, adjustment: &HeartAdjustment) -> Result<(), AppError> {
        self.inner.append_adjustment(adjustment).await
    }
}

/// Services wired over a shared [`MemoryStore`] with a recording
/// commentary sink and no external fitness source.
#[allow(dead_code)]
pub fn build_services(
    store: Arc<MemoryStore>,
) -> (
    VoteResolutionService,
    SnapshotService,
    Arc<RecordingCommentary>,
) {
    build_services_with_fitness(store, Arc::new(NullFitnessSource))
}

#[allow(dead_code)]
pub fn build_services_with_fitness(
    store: Arc<dyn SeasonStore>,
    fitness: Arc<dyn FitnessSource>,
) -> (
    VoteResolutionService,
    SnapshotService,
    Arc<RecordingCommentary>,
) {
    let commentary = Arc::new(RecordingCommentary::default());
    let hydrator = StatsHydrator::new(store.clone(), fitness, StdDuration::from_secs(5));
    let votes = VoteResolutionService::new(store.clone(), commentary.clone());
    let snapshots = SnapshotService::new(store, hydrator, votes.clone(), commentary.clone());
    (votes, snapshots, commentary)
}

/// Full test app over an empty in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let (votes, snapshots, _commentary) = build_services(store.clone());
    let state = Arc::new(AppState {
        config: Config::default(),
        store: store.clone(),
        votes,
        snapshots,
    });
    (create_router(state), store)
}
