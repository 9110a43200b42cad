// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Match detection tests over the in-memory store.
//!
//! These tests verify that:
//! 1. A match is created only when both sides liked each other
//! 2. Concurrent evaluations of the same pair create exactly one match
//! 3. Store failures leave the swipe recorded and can be recovered
//! 4. Notifications go to both participants, once per match

use mutual_match::config::Config;
use mutual_match::db::{MatchStore, SwipeStore};
use mutual_match::error::AppError;
use mutual_match::models::{match_key, MatchResult, PairState};
use std::time::Duration;

mod common;
use common::{create_test_app, create_test_app_with, settle};

#[tokio::test]
async fn test_one_sided_like_is_not_a_match() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    let outcome = service.record_swipe("alice", "bob", true).await.unwrap();

    assert_eq!(outcome.result, MatchResult::NoMatch);
    assert_eq!(app.db.match_count(), 0);
    assert_eq!(
        service.detector().pair_state("alice", "bob").await.unwrap(),
        PairState::PendingOneSided
    );
}

#[tokio::test]
async fn test_like_then_dislike_is_not_a_match() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    let outcome = service.record_swipe("bob", "alice", false).await.unwrap();

    assert_eq!(outcome.result, MatchResult::NoMatch);
    assert_eq!(app.db.match_count(), 0);
}

#[tokio::test]
async fn test_mutual_like_creates_match() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    let first = service.record_swipe("alice", "bob", true).await.unwrap();
    assert_eq!(first.result, MatchResult::NoMatch);

    let second = service.record_swipe("bob", "alice", true).await.unwrap();
    let MatchResult::NewMatch(matched) = second.result else {
        panic!("expected new match, got {:?}", second.result);
    };

    assert_eq!(matched.key, match_key("alice", "bob"));
    assert_eq!(matched.user_a_id, "alice");
    assert_eq!(matched.user_b_id, "bob");
    assert!(matched.active);
    assert_eq!(app.db.match_count(), 1);
}

#[tokio::test]
async fn test_match_key_is_independent_of_swipe_order() {
    let forward = create_test_app();
    forward
        .state
        .swipe_service
        .record_swipe("alice", "bob", true)
        .await
        .unwrap();
    let a = forward
        .state
        .swipe_service
        .record_swipe("bob", "alice", true)
        .await
        .unwrap();

    let backward = create_test_app();
    backward
        .state
        .swipe_service
        .record_swipe("bob", "alice", true)
        .await
        .unwrap();
    let b = backward
        .state
        .swipe_service
        .record_swipe("alice", "bob", true)
        .await
        .unwrap();

    let (Some(a), Some(b)) = (a.result.matched(), b.result.matched()) else {
        panic!("both orders should match");
    };
    assert_eq!(a.key, b.key);
    assert_eq!(a.participants, b.participants);
}

#[tokio::test]
async fn test_repeated_like_after_match_is_already_matched() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    service.record_swipe("bob", "alice", true).await.unwrap();

    let again = service.record_swipe("alice", "bob", true).await.unwrap();
    assert!(matches!(again.result, MatchResult::AlreadyMatched(_)));
    assert_eq!(app.db.match_count(), 1);
    assert_eq!(app.db.swipe_count(), 2);
}

#[tokio::test]
async fn test_dislike_after_match_keeps_match() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    service.record_swipe("bob", "alice", true).await.unwrap();

    let outcome = service.record_swipe("alice", "bob", false).await.unwrap();
    assert_eq!(outcome.result, MatchResult::NoMatch);

    let stored = app
        .db
        .get_match(&match_key("alice", "bob"))
        .await
        .unwrap()
        .expect("match should survive a later dislike");
    assert!(stored.active);
}

#[tokio::test]
async fn test_like_after_unmatch_does_not_reactivate() {
    let app = create_test_app();
    let service = &app.state.swipe_service;
    let key = match_key("alice", "bob");

    service.record_swipe("alice", "bob", true).await.unwrap();
    service.record_swipe("bob", "alice", true).await.unwrap();
    app.db.set_match_active(&key, false, "alice").await.unwrap();

    // Neither side's like reveals or revives the unmatched record
    for (actor, target) in [("bob", "alice"), ("alice", "bob")] {
        let outcome = service.record_swipe(actor, target, true).await.unwrap();
        assert_eq!(outcome.result, MatchResult::NoMatch);
    }

    let stored = app.db.get_match(&key).await.unwrap().unwrap();
    assert!(!stored.active);
    assert_eq!(stored.unmatched_by.as_deref(), Some("alice"));
    assert_eq!(app.db.match_count(), 1);
    settle().await;
    assert_eq!(app.notifier.sent().len(), 2, "only the original match notifies");
    assert_eq!(
        service.detector().pair_state("alice", "bob").await.unwrap(),
        PairState::Unmatched
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_evaluations_create_one_match() {
    const CONCURRENT_EVALUATIONS: usize = 16;

    let app = create_test_app();
    let alice_swipe = app.db.upsert_swipe("alice", "bob", true).await.unwrap();
    let bob_swipe = app.db.upsert_swipe("bob", "alice", true).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..CONCURRENT_EVALUATIONS {
        let detector = app.state.swipe_service.detector().clone();
        let swipe = if i % 2 == 0 {
            alice_swipe.clone()
        } else {
            bob_swipe.clone()
        };
        handles.push(tokio::spawn(async move { detector.evaluate(&swipe).await }));
    }

    let mut new_matches = 0;
    let mut already_matched = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            MatchResult::NewMatch(_) => new_matches += 1,
            MatchResult::AlreadyMatched(_) => already_matched += 1,
            MatchResult::NoMatch => panic!("mutual likes must never evaluate to NoMatch"),
        }
    }

    assert_eq!(new_matches, 1, "exactly one evaluation should win the create");
    assert_eq!(already_matched, CONCURRENT_EVALUATIONS - 1);
    assert_eq!(app.db.match_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_mutual_swipes_create_one_match() {
    let app = create_test_app();
    let alice = app.state.swipe_service.clone();
    let bob = app.state.swipe_service.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { alice.record_swipe("alice", "bob", true).await }),
        tokio::spawn(async move { bob.record_swipe("bob", "alice", true).await }),
    );
    let results = [a.unwrap().unwrap().result, b.unwrap().unwrap().result];

    // Either both saw the other's swipe (one wins the create) or only the
    // later one did. Never two new matches.
    let new_matches = results
        .iter()
        .filter(|r| matches!(r, MatchResult::NewMatch(_)))
        .count();
    assert_eq!(new_matches, 1);
    assert_eq!(app.db.match_count(), 1);
}

#[tokio::test]
async fn test_transient_create_fault_is_retried() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    app.db.fail_next_creates(1);

    let outcome = service.record_swipe("bob", "alice", true).await.unwrap();
    assert!(matches!(outcome.result, MatchResult::NewMatch(_)));
}

#[tokio::test]
async fn test_persistent_fault_keeps_swipe_and_recovers() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    app.db.fail_next_creates(2);

    let err = service.record_swipe("bob", "alice", true).await.unwrap_err();
    assert!(matches!(err, AppError::MatchDetectionFailed(_)));

    // The swipe stays recorded without a match
    let stored = app.db.get_swipe("bob", "alice").await.unwrap().unwrap();
    assert!(stored.liked);
    assert_eq!(app.db.match_count(), 0);
    assert_eq!(
        service.detector().pair_state("alice", "bob").await.unwrap(),
        PairState::PendingOneSided
    );

    // Retrying the same swipe completes the match
    let retry = service.record_swipe("bob", "alice", true).await.unwrap();
    assert!(matches!(retry.result, MatchResult::NewMatch(_)));
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let config = Config {
        store_timeout: Duration::from_millis(50),
        match_retry_backoff: Duration::from_millis(5),
        ..Config::test_default()
    };
    let app = create_test_app_with(config);
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    app.db.set_create_delay(Duration::from_millis(300));

    let err = service.record_swipe("bob", "alice", true).await.unwrap_err();
    assert!(matches!(err, AppError::MatchDetectionFailed(_)));
    assert_eq!(app.db.match_count(), 0);
    assert!(app.db.get_swipe("bob", "alice").await.unwrap().is_some());
}

#[tokio::test]
async fn test_self_swipe_is_rejected_before_write() {
    let app = create_test_app();

    let err = app
        .state
        .swipe_service
        .record_swipe("alice", "alice", true)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(app.db.swipe_count(), 0);
}

#[tokio::test]
async fn test_new_match_notifies_both_participants() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    service.record_swipe("bob", "alice", true).await.unwrap();
    settle().await;

    let key = match_key("alice", "bob");
    let mut sent = app.notifier.sent();
    sent.sort();
    assert_eq!(
        sent,
        vec![
            ("alice".to_string(), key.clone()),
            ("bob".to_string(), key.clone()),
        ]
    );

    // Already matched: no second round of notifications
    service.record_swipe("alice", "bob", true).await.unwrap();
    settle().await;
    assert_eq!(app.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_no_notification_without_match() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    service.record_swipe("alice", "bob", true).await.unwrap();
    service.record_swipe("carol", "alice", false).await.unwrap();
    settle().await;

    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_matching_scenario() {
    let app = create_test_app();
    let service = &app.state.swipe_service;

    // alice likes bob and carol; bob likes alice back, carol does not
    service.record_swipe("alice", "bob", true).await.unwrap();
    service.record_swipe("alice", "carol", true).await.unwrap();
    let bob = service.record_swipe("bob", "alice", true).await.unwrap();
    let carol = service.record_swipe("carol", "alice", false).await.unwrap();

    assert!(matches!(bob.result, MatchResult::NewMatch(_)));
    assert_eq!(carol.result, MatchResult::NoMatch);

    let alice_matches = app.db.list_matches_for("alice", false).await.unwrap();
    assert_eq!(alice_matches.len(), 1);
    assert_eq!(alice_matches[0].other_participant("alice"), Some("bob"));

    assert!(app.db.list_matches_for("carol", false).await.unwrap().is_empty());
}
