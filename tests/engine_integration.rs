//! Integration tests for the performance engine.
//!
//! These tests verify the end-to-end flow:
//! 1. Identical concurrent requests share one store read
//! 2. Store failures abort only the computation that issued the read
//! 3. Superseded results never overwrite newer ones
//! 4. Abandoned computations hand over to the next caller
//!
//! Uses the in-memory store with injected latency and failures.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use apptivia_scoring::adapters::{InMemoryPerformanceStore, StoreQuery};
use apptivia_scoring::application::{
    CacheKey, ComputationMode, EngineSettings, PerformanceEngine, ResultSlot, Scope, SlotUpdate,
};
use apptivia_scoring::domain::coaching::CoachingCatalog;
use apptivia_scoring::domain::dashboard::{Scorecard, SnapshotMode};
use apptivia_scoring::domain::foundation::{MetricKey, Period, ProfileId, SkillCategoryId};
use apptivia_scoring::domain::progress::MasteryRecord;
use apptivia_scoring::domain::scoring::{MetricDefinition, MetricObservation};
use apptivia_scoring::ports::{Profile, ProfileFilter};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn key(k: &str) -> MetricKey {
    MetricKey::new(k).unwrap()
}

/// Week 37 of 2024.
fn w37() -> Period {
    Period::week_ending(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap())
}

fn team(name: &str) -> Scope {
    Scope::custom(ProfileFilter::team(name), w37())
}

/// Two teams: A lags on calls, B is on target.
fn seeded_store() -> InMemoryPerformanceStore {
    let ada = ProfileId::new();
    let bob = ProfileId::new();
    let mut mastery = MasteryRecord::new(ada, SkillCategoryId::new("prospecting").unwrap());
    mastery.accumulate(40.0, 6, 1200);

    InMemoryPerformanceStore::new()
        .with_definition(MetricDefinition::new(key("calls"), 50.0, 0.5))
        .with_definition(MetricDefinition::new(key("meetings"), 10.0, 0.5))
        .with_profile(Profile::new(ada, "Ada").in_team("A"))
        .with_profile(Profile::new(bob, "Bob").in_team("B"))
        .with_observation(MetricObservation::new(ada, key("calls"), 25.0, w37()))
        .with_observation(MetricObservation::new(ada, key("meetings"), 12.0, w37()))
        .with_observation(MetricObservation::new(bob, key("calls"), 50.0, w37()))
        .with_observation(MetricObservation::new(bob, key("meetings"), 10.0, w37()))
        .with_mastery_record(mastery)
        .with_badges(ada, 2)
}

fn engine(store: Arc<InMemoryPerformanceStore>) -> Arc<PerformanceEngine> {
    Arc::new(PerformanceEngine::new(
        store,
        CoachingCatalog::default(),
        EngineSettings::default(),
    ))
}

// =============================================================================
// Request coalescing
// =============================================================================

#[tokio::test]
async fn concurrent_identical_requests_share_one_store_query() {
    let store = Arc::new(seeded_store().with_latency(Duration::from_millis(30)));
    let engine = engine(store.clone());
    let scope = team("A");

    let (first, second) = tokio::join!(
        engine.compute_scorecard(&scope),
        engine.compute_scorecard(&scope),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.rows[0].composite, 85);
    assert_eq!(store.query_count(StoreQuery::Profiles), 1);
    assert_eq!(store.query_count(StoreQuery::Observations), 1);
}

#[tokio::test]
async fn concurrent_requests_across_tasks_share_one_store_query() {
    let store = Arc::new(seeded_store().with_latency(Duration::from_millis(30)));
    let engine = engine(store.clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.compute_scorecard(&team("A")).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(store.query_count(StoreQuery::Observations), 1);
}

#[tokio::test]
async fn different_scopes_compute_independently() {
    let store = Arc::new(seeded_store());
    let engine = engine(store.clone());

    let a = engine.compute_scorecard(&team("A")).await.unwrap();
    let b = engine.compute_scorecard(&team("B")).await.unwrap();

    assert_eq!(a.rows[0].composite, 85);
    assert_eq!(b.rows[0].composite, 100);
    assert_eq!(store.query_count(StoreQuery::Profiles), 2);
}

#[tokio::test]
async fn abandoned_request_hands_over_to_next_caller() {
    let store = Arc::new(seeded_store().with_latency(Duration::from_millis(50)));
    let engine = engine(store.clone());
    let scope = team("A");

    let abandoned =
        tokio::time::timeout(Duration::from_millis(5), engine.compute_scorecard(&scope)).await;
    assert!(abandoned.is_err());

    let scorecard = engine.compute_scorecard(&scope).await.unwrap();
    assert_eq!(scorecard.rows[0].composite, 85);
}

// =============================================================================
// Error isolation
// =============================================================================

#[tokio::test]
async fn mastery_failure_aborts_only_the_snapshot() {
    let store = Arc::new(seeded_store().with_failing(StoreQuery::MasteryRecords));
    let engine = engine(store.clone());
    let scope = team("A");

    assert!(engine
        .compute_coach_snapshot(&scope, SnapshotMode::Summary)
        .await
        .is_err());

    assert!(engine.compute_scorecard(&scope).await.is_ok());
    assert!(engine.compute_trend(&scope).await.is_ok());
    let playbooks = engine.recommend_playbooks(&scope).await.unwrap();
    assert!(!playbooks.is_empty());
}

#[tokio::test]
async fn failures_are_not_cached() {
    let store = Arc::new(seeded_store().with_failing(StoreQuery::Observations));
    let engine = engine(store.clone());
    let scope = team("A");

    assert!(engine.compute_scorecard(&scope).await.is_err());

    store.recover(StoreQuery::Observations).await;
    let scorecard = engine.compute_scorecard(&scope).await.unwrap();
    assert_eq!(scorecard.rows[0].composite, 85);
}

#[tokio::test]
async fn badge_failure_degrades_to_estimate() {
    let store = Arc::new(seeded_store());
    let engine = engine(store.clone());
    let scope = team("A");

    let exact = engine
        .compute_coach_snapshot(&scope, SnapshotMode::Summary)
        .await
        .unwrap();
    assert!(exact.badges.is_exact());
    assert_eq!(exact.badges.value(), 2);

    store.fail(StoreQuery::Badges).await;
    let estimated = engine
        .compute_coach_snapshot(&scope, SnapshotMode::Full)
        .await
        .unwrap();
    assert!(!estimated.badges.is_exact());
    // 6 achievements -> 1, no streak milestone
    assert_eq!(estimated.badges.value(), 1);
}

// =============================================================================
// Latest-wins result slot
// =============================================================================

#[tokio::test]
async fn superseded_scope_result_is_discarded() {
    let store = Arc::new(seeded_store());
    let engine = engine(store.clone());
    let slot: ResultSlot<Scorecard> = ResultSlot::new();

    let scope_a = team("A");
    let scope_b = team("B");
    let ticket_a = slot.begin(CacheKey::new(ComputationMode::Scorecard, &scope_a));
    let ticket_b = slot.begin(CacheKey::new(ComputationMode::Scorecard, &scope_b));

    let b = engine.compute_scorecard(&scope_b).await;
    assert_eq!(slot.complete(&ticket_b, b), SlotUpdate::Applied);

    let a = engine.compute_scorecard(&scope_a).await;
    assert_eq!(slot.complete(&ticket_a, a), SlotUpdate::Discarded);

    let current = slot.current().unwrap();
    assert_eq!(current.rows[0].composite, 100);
}
