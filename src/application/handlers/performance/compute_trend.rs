//! ComputeTrendHandler - weighted-score time series for a scope.

use std::sync::Arc;
use tracing::info;

use crate::application::cache::{CacheKey, ComputationMode, QueryCache, QueryError};
use crate::application::{EngineSettings, Scope};
use crate::domain::foundation::ProfileId;
use crate::domain::trend::{TrendAggregator, TrendPoint, TrendWindow};
use crate::ports::PerformanceStore;

use super::ScopeLoader;

/// Query to compute the trend series of a scope.
///
/// Rolling presets end on the scope's period end (today, when the scope was
/// resolved from a preset); fixed presets and custom ranges end on the range end.
#[derive(Debug, Clone)]
pub struct ComputeTrendQuery {
    pub scope: Scope,
}

/// Handler for trend computation, memoized per scope.
pub struct ComputeTrendHandler {
    loader: ScopeLoader,
    cache: QueryCache<Vec<TrendPoint>>,
    aggregator: TrendAggregator,
    rolling_windows: usize,
}

impl ComputeTrendHandler {
    pub fn new(store: Arc<dyn PerformanceStore>, settings: EngineSettings) -> Self {
        Self {
            loader: ScopeLoader::new(store),
            cache: QueryCache::new(),
            aggregator: settings.trend_aggregator(),
            rolling_windows: settings.rolling_trend_windows,
        }
    }

    pub fn key(scope: &Scope) -> CacheKey {
        CacheKey::new(ComputationMode::Trend, scope)
    }

    /// The bucket window a scope's trend covers.
    pub fn window(&self, scope: &Scope) -> TrendWindow {
        TrendWindow::for_preset(
            scope.preset,
            scope.period,
            scope.period.end(),
            self.rolling_windows,
        )
    }

    pub async fn handle(&self, query: ComputeTrendQuery) -> Result<Arc<Vec<TrendPoint>>, QueryError> {
        self.cache
            .get_or_compute(Self::key(&query.scope), || self.compute(&query.scope))
            .await
    }

    /// The memoized trend of a scope, without computing it.
    pub fn cached(&self, scope: &Scope) -> Option<Arc<Vec<TrendPoint>>> {
        self.cache.peek(&Self::key(scope))
    }

    pub async fn refresh(&self, query: ComputeTrendQuery) -> Result<Arc<Vec<TrendPoint>>, QueryError> {
        self.cache
            .refresh(Self::key(&query.scope), || self.compute(&query.scope))
            .await
    }

    async fn compute(&self, scope: &Scope) -> Result<Vec<TrendPoint>, QueryError> {
        let window = self.window(scope);
        let (profiles, catalog) = futures::try_join!(
            self.loader.profiles(&scope.filter),
            self.loader.metric_catalog()
        )?;
        let profile_ids: Vec<ProfileId> = profiles.iter().map(|p| p.id).collect();

        let observations = self
            .loader
            .observations(&profile_ids, &catalog, window.overall())
            .await?;

        // Empty cohort: `observations` is empty too, so every bucket is 0 without data.
        let points = self
            .aggregator
            .aggregate(&window, &catalog, &observations, &profile_ids);
        info!(
            preset = %scope.preset,
            buckets = points.len(),
            with_data = points.iter().filter(|p| p.has_data).count(),
            "Trend computed"
        );
        Ok(points)
    }
}
