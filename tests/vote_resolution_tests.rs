// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Dispute lifecycle tests: opening, tallying, veto, override, timeout.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use sweatstakes::error::AppError;
use sweatstakes::models::{DisputeStatus, SeasonMode, VoteAction};
use sweatstakes::store::{MemoryStore, SeasonStore};

mod common;
use common::{build_services, log_workout, seed_season, test_season};

/// Mid-season wall clock for vote tests.
fn mid_season() -> DateTime<Utc> {
    common::season_start() + Duration::weeks(3)
}

/// Five-member season with one approved workout by `p5`.
/// Eligible voters for that workout: p1..p4.
async fn disputed_fixture() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let season = test_season(SeasonMode::MoneySurvival);
    seed_season(&store, &season, 5).await;
    log_workout(
        &store,
        "s1",
        "p5",
        "a5",
        mid_season() - Duration::hours(2),
    )
    .await;
    store
}

#[tokio::test]
async fn first_vote_opens_a_dispute_with_deadline() {
    let store = disputed_fixture().await;
    let (votes, _, commentary) = build_services(store.clone());

    let outcome = votes
        .cast("a5", "p2", VoteAction::Sus, mid_season())
        .await
        .unwrap();

    assert_eq!(outcome.status, DisputeStatus::Pending);
    assert!(!outcome.decided);
    assert_eq!(outcome.tally.sus, 1);
    assert_eq!(outcome.tally.eligible, 4);

    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.status, DisputeStatus::Pending);
    assert_eq!(stored.vote_deadline, Some(mid_season() + Duration::hours(24)));
    assert_eq!(stored.dispute_opened_by.as_deref(), Some("p2"));
    assert!(commentary.kinds().contains(&"dispute_opened"));
}

#[tokio::test]
async fn a_legit_first_vote_also_opens_the_dispute() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());

    let outcome = votes
        .cast("a5", "p3", VoteAction::Legit, mid_season())
        .await
        .unwrap();

    assert_eq!(outcome.status, DisputeStatus::Pending);
    assert_eq!(outcome.tally.legit, 1);
    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.dispute_opened_by.as_deref(), Some("p3"));
}

#[tokio::test]
async fn players_cannot_vote_on_their_own_workout() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store);

    let err = votes
        .cast("a5", "p5", VoteAction::Sus, mid_season())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SelfVote));
}

#[tokio::test]
async fn non_members_cannot_vote() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store);

    let err = votes
        .cast("a5", "stranger", VoteAction::Sus, mid_season())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAMember(_)));
}

#[tokio::test]
async fn two_member_seasons_have_voting_disabled() {
    let store = Arc::new(MemoryStore::new());
    let season = test_season(SeasonMode::MoneySurvival);
    seed_season(&store, &season, 2).await;
    log_workout(&store, "s1", "p2", "a2", mid_season() - Duration::hours(1)).await;
    let (votes, _, _) = build_services(store);

    let err = votes
        .cast("a2", "p1", VoteAction::Sus, mid_season())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VotingDisabled));

    // Remove attempts are votes too at this size.
    let err = votes
        .cast("a2", "p1", VoteAction::Remove, mid_season())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VotingDisabled));
}

#[tokio::test]
async fn recasting_the_same_choice_is_idempotent() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());

    let first = votes
        .cast("a5", "p2", VoteAction::Sus, mid_season())
        .await
        .unwrap();
    let second = votes
        .cast("a5", "p2", VoteAction::Sus, mid_season() + Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(first.tally.sus, second.tally.sus);
    assert_eq!(second.tally.sus, 1);
    assert_eq!(store.list_votes("a5").await.unwrap().len(), 1);
}

#[tokio::test]
async fn switching_choice_replaces_the_stored_vote() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store);

    votes
        .cast("a5", "p2", VoteAction::Sus, mid_season())
        .await
        .unwrap();
    let outcome = votes
        .cast("a5", "p2", VoteAction::Legit, mid_season() + Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(outcome.tally.legit, 1);
    assert_eq!(outcome.tally.sus, 0);
}

#[tokio::test]
async fn sus_supermajority_rejects_before_full_participation() {
    let store = disputed_fixture().await;
    let (votes, _, commentary) = build_services(store.clone());
    let t = mid_season();

    votes.cast("a5", "p1", VoteAction::Sus, t).await.unwrap();
    let two = votes
        .cast("a5", "p2", VoteAction::Sus, t + Duration::minutes(1))
        .await
        .unwrap();
    assert!(!two.decided, "2 of 4 sus must not decide yet");

    // Third sus hits 3/4 = 0.75.
    let three = votes
        .cast("a5", "p3", VoteAction::Sus, t + Duration::minutes(2))
        .await
        .unwrap();
    assert!(three.decided);
    assert_eq!(three.status, DisputeStatus::Rejected);

    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert!(stored.is_decided());
    assert!(commentary.kinds().contains(&"vote_decided"));

    // The fourth voter is too late.
    let err = votes
        .cast("a5", "p4", VoteAction::Legit, t + Duration::minutes(3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VotingClosed(_)));
}

#[tokio::test]
async fn majority_participation_decides_by_plurality() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store);
    let t = mid_season();

    votes.cast("a5", "p1", VoteAction::Sus, t).await.unwrap();
    votes
        .cast("a5", "p2", VoteAction::Legit, t + Duration::minutes(1))
        .await
        .unwrap();
    // 3 of 4 voted: legit 2 vs sus 1 approves.
    let outcome = votes
        .cast("a5", "p3", VoteAction::Legit, t + Duration::minutes(2))
        .await
        .unwrap();

    assert!(outcome.decided);
    assert_eq!(outcome.status, DisputeStatus::Approved);
}

#[tokio::test]
async fn initiator_remove_cancels_the_whole_dispute() {
    let store = disputed_fixture().await;
    let (votes, _, commentary) = build_services(store.clone());
    let t = mid_season();

    votes.cast("a5", "p2", VoteAction::Sus, t).await.unwrap();
    votes
        .cast("a5", "p3", VoteAction::Sus, t + Duration::minutes(1))
        .await
        .unwrap();

    let outcome = votes
        .cast("a5", "p2", VoteAction::Remove, t + Duration::minutes(2))
        .await
        .unwrap();

    assert_eq!(outcome.status, DisputeStatus::Approved);
    assert!(!outcome.decided, "a veto is a cancellation, not a decision");

    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.status, DisputeStatus::Approved);
    assert!(stored.vote_deadline.is_none());
    assert!(stored.dispute_opened_by.is_none());
    assert!(!stored.is_decided());
    assert!(store.list_votes("a5").await.unwrap().is_empty());
    assert!(commentary.kinds().contains(&"dispute_cancelled"));

    // The workout can be disputed again from scratch.
    let reopened = votes
        .cast("a5", "p3", VoteAction::Sus, t + Duration::minutes(10))
        .await
        .unwrap();
    assert_eq!(reopened.status, DisputeStatus::Pending);
    assert_eq!(reopened.tally.sus, 1);
    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.dispute_opened_by.as_deref(), Some("p3"));
}

#[tokio::test]
async fn season_owner_remove_also_vetoes() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());
    let t = mid_season();

    votes.cast("a5", "p2", VoteAction::Sus, t).await.unwrap();
    // p1 owns the season but did not open the dispute.
    let outcome = votes
        .cast("a5", "p1", VoteAction::Remove, t + Duration::minutes(1))
        .await
        .unwrap();

    assert_eq!(outcome.status, DisputeStatus::Approved);
    assert!(store.list_votes("a5").await.unwrap().is_empty());
}

#[tokio::test]
async fn other_voters_remove_only_their_own_vote() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());
    let t = mid_season();

    votes.cast("a5", "p2", VoteAction::Sus, t).await.unwrap();
    votes
        .cast("a5", "p3", VoteAction::Sus, t + Duration::minutes(1))
        .await
        .unwrap();

    // p4 never voted; remove is a harmless no-op on the dispute.
    let outcome = votes
        .cast("a5", "p4", VoteAction::Remove, t + Duration::minutes(2))
        .await
        .unwrap();
    assert_eq!(outcome.status, DisputeStatus::Pending);
    assert_eq!(outcome.tally.sus, 2);

    // p3 retracts; the dispute stays open on p2's vote.
    let outcome = votes
        .cast("a5", "p3", VoteAction::Remove, t + Duration::minutes(3))
        .await
        .unwrap();
    assert_eq!(outcome.status, DisputeStatus::Pending);
    assert_eq!(outcome.tally.sus, 1);
    assert_eq!(store.list_votes("a5").await.unwrap().len(), 1);
}

#[tokio::test]
async fn votes_after_the_deadline_are_rejected() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store);
    let t = mid_season();

    votes.cast("a5", "p2", VoteAction::Sus, t).await.unwrap();

    let err = votes
        .cast("a5", "p3", VoteAction::Sus, t + Duration::hours(25))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VotingClosed(_)));
}

#[tokio::test]
async fn sweep_auto_approves_expired_disputes() {
    let store = disputed_fixture().await;
    let (votes, _, commentary) = build_services(store.clone());
    let t = mid_season();

    // One legit vote, then silence past the deadline.
    votes.cast("a5", "p2", VoteAction::Legit, t).await.unwrap();

    let season = store.get_season("s1").await.unwrap().unwrap();
    let swept = votes
        .sweep_expired(&season, t + Duration::hours(25))
        .await
        .unwrap();
    assert_eq!(swept, 1);

    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.status, DisputeStatus::Approved);
    assert!(stored.is_decided());
    assert!(commentary.kinds().contains(&"vote_decided"));

    // Nothing left to sweep.
    let swept = votes
        .sweep_expired(&season, t + Duration::hours(26))
        .await
        .unwrap();
    assert_eq!(swept, 0);
}

#[tokio::test]
async fn timeout_approves_even_with_a_sus_lead() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());
    let t = mid_season();

    votes.cast("a5", "p2", VoteAction::Sus, t).await.unwrap();
    votes
        .cast("a5", "p3", VoteAction::Sus, t + Duration::minutes(1))
        .await
        .unwrap();

    let season = store.get_season("s1").await.unwrap().unwrap();
    votes
        .sweep_expired(&season, t + Duration::hours(25))
        .await
        .unwrap();

    // A silent jury exonerates: 2 sus, 0 legit still approves on timeout.
    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.status, DisputeStatus::Approved);
    assert!(stored.is_decided());
}

#[tokio::test]
async fn owner_override_flips_a_decided_dispute() {
    let store = disputed_fixture().await;
    let (votes, _, commentary) = build_services(store.clone());
    let t = mid_season();

    for (i, voter) in ["p1", "p2", "p3"].iter().enumerate() {
        votes
            .cast("a5", voter, VoteAction::Sus, t + Duration::minutes(i as i64))
            .await
            .unwrap();
    }
    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.status, DisputeStatus::Rejected);

    // Owner overturns the mob.
    let outcome = votes
        .override_status("a5", "p1", DisputeStatus::Approved, "photo evidence checked", t)
        .await
        .unwrap();
    assert_eq!(outcome.status, DisputeStatus::Approved);
    assert!(outcome.decided);

    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert_eq!(stored.status, DisputeStatus::Approved);
    assert!(commentary.kinds().contains(&"vote_decided"));
}

#[tokio::test]
async fn override_is_owner_only_and_terminal_only() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store);
    let t = mid_season();

    let err = votes
        .override_status("a5", "p2", DisputeStatus::Rejected, "I said so", t)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = votes
        .override_status("a5", "p1", DisputeStatus::Pending, "re-open it", t)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn decided_activities_accept_no_further_votes() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());
    let t = mid_season();

    votes
        .override_status("a5", "p1", DisputeStatus::Rejected, "manual call", t)
        .await
        .unwrap();

    let err = votes
        .cast("a5", "p2", VoteAction::Sus, t + Duration::minutes(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VotingClosed(_)));

    // Remove on a decided activity cannot transition it either.
    let outcome = votes
        .cast("a5", "p2", VoteAction::Remove, t + Duration::minutes(2))
        .await
        .unwrap();
    assert_eq!(outcome.status, DisputeStatus::Rejected);
    assert!(outcome.decided);
}

#[tokio::test]
async fn concurrent_sus_votes_converge_to_one_rejection() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());
    let t = mid_season();

    let mut handles = Vec::new();
    for voter in ["p1", "p2", "p3", "p4"] {
        let votes = votes.clone();
        handles.push(tokio::spawn(async move {
            votes.cast("a5", voter, VoteAction::Sus, t).await
        }));
    }

    // The third counted sus already rejects at a 3-of-4 supermajority, so
    // a cast scheduled after the decision is told voting is closed.
    // Nothing else may fail, and somebody must observe the decision.
    let mut okays = 0;
    let mut decided_outcomes = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(outcome) => {
                okays += 1;
                if outcome.decided {
                    decided_outcomes += 1;
                }
            }
            Err(AppError::VotingClosed(_)) => {}
            Err(other) => panic!("unexpected cast error: {:?}", other),
        }
    }
    assert!(okays >= 3, "casts landed before the decision: {}", okays);
    assert!(decided_outcomes >= 1);

    let stored = store.get_activity("a5").await.unwrap().unwrap();
    assert!(stored.is_decided());
    assert_eq!(stored.status, DisputeStatus::Rejected);
    // Only casts that beat the decision leave a vote row behind.
    let rows = store.list_votes("a5").await.unwrap();
    assert!((3..=4).contains(&rows.len()), "vote rows: {}", rows.len());
}

#[tokio::test]
async fn offline_store_fails_votes_loudly() {
    let store = disputed_fixture().await;
    let (votes, _, _) = build_services(store.clone());
    store.set_offline(true);

    let err = votes
        .cast("a5", "p2", VoteAction::Sus, mid_season())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}
