//! Store reads shared by the performance handlers.

use std::sync::Arc;
use tracing::warn;

use crate::domain::foundation::{Period, ProfileId};
use crate::domain::progress::MasteryRecord;
use crate::domain::scoring::{MetricCatalog, MetricObservation};
use crate::ports::{PerformanceStore, Profile, ProfileFilter, StoreError};

/// Loads the inputs of one scope from the store.
#[derive(Clone)]
pub struct ScopeLoader {
    store: Arc<dyn PerformanceStore>,
}

impl ScopeLoader {
    pub fn new(store: Arc<dyn PerformanceStore>) -> Self {
        Self { store }
    }

    /// Active metric definitions as a catalog.
    ///
    /// Misconfigured definitions are logged and excluded; they never fail the load.
    pub async fn metric_catalog(&self) -> Result<MetricCatalog, StoreError> {
        let definitions = self.store.list_metric_definitions(true, false).await?;
        let (catalog, rejected) = MetricCatalog::build(definitions);
        for err in &rejected {
            warn!(metric = %err.metric(), error = %err, "Excluding misconfigured metric");
        }
        Ok(catalog)
    }

    pub async fn profiles(&self, filter: &ProfileFilter) -> Result<Vec<Profile>, StoreError> {
        self.store.list_profiles(filter).await
    }

    /// Observations of the catalog's metrics. Skips the query for an empty cohort.
    pub async fn observations(
        &self,
        profile_ids: &[ProfileId],
        catalog: &MetricCatalog,
        overlapping: Option<Period>,
    ) -> Result<Vec<MetricObservation>, StoreError> {
        if profile_ids.is_empty() || catalog.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .list_observations(profile_ids, &catalog.keys(), overlapping)
            .await
    }

    /// All mastery records of the cohort. Skips the query for an empty cohort.
    pub async fn mastery_records(
        &self,
        profile_ids: &[ProfileId],
    ) -> Result<Vec<MasteryRecord>, StoreError> {
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store.list_mastery_records(profile_ids, &[]).await
    }

    /// Awarded badges, or `None` when the count cannot be read.
    pub async fn badge_count(&self, profile_ids: &[ProfileId]) -> Option<u64> {
        match self.store.count_badges(profile_ids).await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(error = %err, profiles = profile_ids.len(), "Badge count unavailable, estimating");
                None
            }
        }
    }
}
