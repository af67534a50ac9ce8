//! In-memory performance store.
//!
//! Backs tests and demos. Keeps per-query call counters so callers can
//! assert how many store reads a computation issued, and supports simulated
//! latency and per-query failure injection.
//!
//! # Example
//!
//! ```ignore
//! let store = InMemoryPerformanceStore::new()
//!     .with_definition(MetricDefinition::new(calls, 50.0, 0.5))
//!     .with_profile(Profile::new(id, "Ada").in_team("A"))
//!     .with_latency(Duration::from_millis(50));
//!
//! engine.compute_scorecard(scope, period).await?;
//! assert_eq!(store.query_count(StoreQuery::Observations), 1);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{MetricKey, Period, ProfileId, SkillCategoryId};
use crate::domain::progress::MasteryRecord;
use crate::domain::scoring::{MetricDefinition, MetricObservation};
use crate::ports::{PerformanceStore, Profile, ProfileFilter, StoreError};

/// The store operations, for counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreQuery {
    MetricDefinitions,
    Observations,
    MasteryRecords,
    Profiles,
    Badges,
}

impl StoreQuery {
    const ALL: [StoreQuery; 5] = [
        StoreQuery::MetricDefinitions,
        StoreQuery::Observations,
        StoreQuery::MasteryRecords,
        StoreQuery::Profiles,
        StoreQuery::Badges,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct StoreData {
    definitions: Vec<MetricDefinition>,
    observations: Vec<MetricObservation>,
    mastery: HashMap<(ProfileId, SkillCategoryId), MasteryRecord>,
    profiles: Vec<Profile>,
    badges: HashMap<ProfileId, u64>,
}

/// In-memory implementation of [`PerformanceStore`].
#[derive(Debug, Default)]
pub struct InMemoryPerformanceStore {
    data: RwLock<StoreData>,
    failing: RwLock<HashSet<StoreQuery>>,
    latency: Duration,
    counters: [AtomicUsize; 5],
}

impl InMemoryPerformanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Builders ===

    pub fn with_definition(mut self, definition: MetricDefinition) -> Self {
        self.data.get_mut().definitions.push(definition);
        self
    }

    pub fn with_observation(mut self, observation: MetricObservation) -> Self {
        self.data.get_mut().observations.push(observation);
        self
    }

    pub fn with_mastery_record(mut self, record: MasteryRecord) -> Self {
        upsert_mastery(self.data.get_mut(), record);
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.data.get_mut().profiles.push(profile);
        self
    }

    pub fn with_badges(mut self, profile_id: ProfileId, count: u64) -> Self {
        *self.data.get_mut().badges.entry(profile_id).or_insert(0) += count;
        self
    }

    /// Sets simulated latency applied to every query.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes `query` fail with [`StoreError::Unavailable`] from the start.
    pub fn with_failing(mut self, query: StoreQuery) -> Self {
        self.failing.get_mut().insert(query);
        self
    }

    // === Runtime mutation ===

    pub async fn add_observation(&self, observation: MetricObservation) {
        self.data.write().await.observations.push(observation);
    }

    /// Stores a mastery record; an existing record for the same key only moves up.
    pub async fn upsert_mastery_record(&self, record: MasteryRecord) {
        upsert_mastery(&mut *self.data.write().await, record);
    }

    pub async fn fail(&self, query: StoreQuery) {
        self.failing.write().await.insert(query);
    }

    pub async fn recover(&self, query: StoreQuery) {
        self.failing.write().await.remove(&query);
    }

    // === Test Helpers ===

    /// Number of times `query` has been issued, including failed attempts.
    pub fn query_count(&self, query: StoreQuery) -> usize {
        self.counters[query.index()].load(Ordering::SeqCst)
    }

    pub fn total_queries(&self) -> usize {
        StoreQuery::ALL.iter().map(|q| self.query_count(*q)).sum()
    }

    async fn begin(&self, query: StoreQuery) -> Result<(), StoreError> {
        self.counters[query.index()].fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.read().await.contains(&query) {
            return Err(StoreError::Unavailable(format!(
                "simulated failure for {:?}",
                query
            )));
        }
        Ok(())
    }
}

fn upsert_mastery(data: &mut StoreData, record: MasteryRecord) {
    let key = (record.profile_id, record.skill_category_id.clone());
    match data.mastery.get_mut(&key) {
        Some(existing) => {
            // Keys match, so merge cannot fail.
            let _ = existing.merge(&record);
        }
        None => {
            data.mastery.insert(key, record);
        }
    }
}

#[async_trait]
impl PerformanceStore for InMemoryPerformanceStore {
    async fn list_metric_definitions(
        &self,
        active_only: bool,
        scorecard_visible_only: bool,
    ) -> Result<Vec<MetricDefinition>, StoreError> {
        self.begin(StoreQuery::MetricDefinitions).await?;
        let data = self.data.read().await;
        Ok(data
            .definitions
            .iter()
            .filter(|d| !active_only || d.active)
            .filter(|d| !scorecard_visible_only || d.visible_on_scorecard)
            .cloned()
            .collect())
    }

    async fn list_observations(
        &self,
        profile_ids: &[ProfileId],
        metric_keys: &[MetricKey],
        overlapping: Option<Period>,
    ) -> Result<Vec<MetricObservation>, StoreError> {
        self.begin(StoreQuery::Observations).await?;
        let data = self.data.read().await;
        Ok(data
            .observations
            .iter()
            .filter(|o| profile_ids.contains(&o.profile_id))
            .filter(|o| metric_keys.is_empty() || metric_keys.contains(&o.metric_key))
            .filter(|o| overlapping.as_ref().map_or(true, |p| o.period.overlaps(p)))
            .cloned()
            .collect())
    }

    async fn list_mastery_records(
        &self,
        profile_ids: &[ProfileId],
        skill_category_ids: &[SkillCategoryId],
    ) -> Result<Vec<MasteryRecord>, StoreError> {
        self.begin(StoreQuery::MasteryRecords).await?;
        let data = self.data.read().await;
        let mut records: Vec<MasteryRecord> = data
            .mastery
            .values()
            .filter(|r| profile_ids.contains(&r.profile_id))
            .filter(|r| {
                skill_category_ids.is_empty() || skill_category_ids.contains(&r.skill_category_id)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            (a.profile_id, &a.skill_category_id).cmp(&(b.profile_id, &b.skill_category_id))
        });
        Ok(records)
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<Profile>, StoreError> {
        self.begin(StoreQuery::Profiles).await?;
        let data = self.data.read().await;
        Ok(data
            .profiles
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn count_badges(&self, profile_ids: &[ProfileId]) -> Result<u64, StoreError> {
        self.begin(StoreQuery::Badges).await?;
        let data = self.data.read().await;
        Ok(profile_ids
            .iter()
            .map(|p| data.badges.get(p).copied().unwrap_or(0))
            .sum())
    }
}
