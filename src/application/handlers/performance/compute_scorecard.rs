//! ComputeScorecardHandler - scores every profile in a scope for its period.

use std::sync::Arc;
use tracing::info;

use crate::application::cache::{CacheKey, ComputationMode, QueryCache, QueryError};
use crate::application::{EngineSettings, Scope};
use crate::domain::dashboard::Scorecard;
use crate::domain::foundation::ProfileId;
use crate::domain::scoring::{AttainmentRow, WeightedScoreCalculator};
use crate::ports::PerformanceStore;

use super::ScopeLoader;

/// Query to compute the scorecard of a scope.
#[derive(Debug, Clone)]
pub struct ComputeScorecardQuery {
    pub scope: Scope,
}

/// Handler for scorecard computation, memoized per scope.
pub struct ComputeScorecardHandler {
    loader: ScopeLoader,
    cache: QueryCache<Scorecard>,
    settings: EngineSettings,
}

impl ComputeScorecardHandler {
    pub fn new(store: Arc<dyn PerformanceStore>, settings: EngineSettings) -> Self {
        Self {
            loader: ScopeLoader::new(store),
            cache: QueryCache::new(),
            settings,
        }
    }

    pub fn key(scope: &Scope) -> CacheKey {
        CacheKey::new(ComputationMode::Scorecard, scope)
    }

    pub async fn handle(&self, query: ComputeScorecardQuery) -> Result<Arc<Scorecard>, QueryError> {
        self.cache
            .get_or_compute(Self::key(&query.scope), || self.compute(&query.scope))
            .await
    }

    /// Recomputes the scorecard even if one is cached.
    pub async fn refresh(&self, query: ComputeScorecardQuery) -> Result<Arc<Scorecard>, QueryError> {
        self.cache
            .refresh(Self::key(&query.scope), || self.compute(&query.scope))
            .await
    }

    async fn compute(&self, scope: &Scope) -> Result<Scorecard, QueryError> {
        let (profiles, catalog) = futures::try_join!(
            self.loader.profiles(&scope.filter),
            self.loader.metric_catalog()
        )?;
        let profile_ids: Vec<ProfileId> = profiles.iter().map(|p| p.id).collect();
        let observations = self
            .loader
            .observations(&profile_ids, &catalog, Some(scope.period))
            .await?;

        let rows: Vec<AttainmentRow> = profile_ids
            .iter()
            .map(|id| WeightedScoreCalculator::score(*id, &catalog, &observations, scope.period))
            .collect();
        for row in &rows {
            catalog.check_row(row)?;
        }

        let scorecard = Scorecard::from_rows(
            scope.period,
            rows,
            self.settings.full_attainment_threshold,
            self.settings.lagging_threshold,
        );
        info!(
            profiles = scorecard.rows.len(),
            cohort_average = scorecard.cohort_average,
            "Scorecard computed"
        );
        Ok(scorecard)
    }
}
