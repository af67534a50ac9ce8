//! ComputeCoachSnapshotHandler - level, streak and mastery overview of a cohort.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::application::cache::{CacheKey, ComputationMode, QueryCache, QueryError};
use crate::application::{EngineSettings, Scope};
use crate::domain::coaching::CoachingCatalog;
use crate::domain::dashboard::{CoachSnapshot, SnapshotInputs, SnapshotMode};
use crate::domain::foundation::ProfileId;
use crate::domain::progress::{LevelCalculator, StreakCalculator};
use crate::domain::scoring::MetricObservation;
use crate::ports::PerformanceStore;

use super::{ComputeScorecardHandler, ComputeScorecardQuery, ScopeLoader};

/// Query to compute a coach snapshot.
#[derive(Debug, Clone)]
pub struct ComputeCoachSnapshotQuery {
    pub scope: Scope,
    pub mode: SnapshotMode,
}

/// Handler for coach snapshots, memoized per scope and mode.
///
/// Reuses the scorecard of the same scope for current-period scores. A
/// failing badge count degrades to an estimate; any other store failure
/// fails the snapshot.
pub struct ComputeCoachSnapshotHandler {
    loader: ScopeLoader,
    scorecards: Arc<ComputeScorecardHandler>,
    catalog: Arc<CoachingCatalog>,
    cache: QueryCache<CoachSnapshot>,
    streaks: StreakCalculator,
    levels: LevelCalculator,
}

impl ComputeCoachSnapshotHandler {
    pub fn new(
        store: Arc<dyn PerformanceStore>,
        scorecards: Arc<ComputeScorecardHandler>,
        catalog: Arc<CoachingCatalog>,
        settings: EngineSettings,
    ) -> Self {
        let levels = LevelCalculator::new(catalog.levels.clone());
        Self {
            loader: ScopeLoader::new(store),
            scorecards,
            catalog,
            cache: QueryCache::new(),
            streaks: settings.streak_calculator(),
            levels,
        }
    }

    pub fn key(scope: &Scope, mode: SnapshotMode) -> CacheKey {
        let computation = match mode {
            SnapshotMode::Summary => ComputationMode::CoachSummary,
            SnapshotMode::Full => ComputationMode::CoachFull,
        };
        CacheKey::new(computation, scope)
    }

    pub async fn handle(&self, query: ComputeCoachSnapshotQuery) -> Result<Arc<CoachSnapshot>, QueryError> {
        self.cache
            .get_or_compute(Self::key(&query.scope, query.mode), || {
                self.compute(&query.scope, query.mode)
            })
            .await
    }

    pub fn cached(&self, scope: &Scope, mode: SnapshotMode) -> Option<Arc<CoachSnapshot>> {
        self.cache.peek(&Self::key(scope, mode))
    }

    /// Recomputes the snapshot from the memoized scorecard of the scope.
    pub async fn refresh(&self, query: ComputeCoachSnapshotQuery) -> Result<Arc<CoachSnapshot>, QueryError> {
        self.cache
            .refresh(Self::key(&query.scope, query.mode), || {
                self.compute(&query.scope, query.mode)
            })
            .await
    }

    async fn compute(&self, scope: &Scope, mode: SnapshotMode) -> Result<CoachSnapshot, QueryError> {
        let scorecard = self
            .scorecards
            .handle(ComputeScorecardQuery {
                scope: scope.clone(),
            })
            .await?;
        let profile_ids: Vec<ProfileId> = scorecard.rows.iter().map(|r| r.profile_id).collect();
        let composites: Vec<i64> = scorecard.rows.iter().map(|r| r.composite).collect();

        let catalog = self.loader.metric_catalog().await?;
        let history: Vec<MetricObservation> = self
            .loader
            .observations(&profile_ids, &catalog, None)
            .await?
            .into_iter()
            .filter(|o| o.period.end() <= scope.period.end())
            .collect();
        let streaks: HashMap<ProfileId, u32> = profile_ids
            .iter()
            .map(|id| (*id, self.streaks.streak(*id, &catalog, &history)))
            .collect();

        let (mastery_records, awarded_badges) = futures::join!(
            self.loader.mastery_records(&profile_ids),
            self.badge_count(&profile_ids)
        );
        let mastery_records = mastery_records?;

        let snapshot = CoachSnapshot::assemble(
            SnapshotInputs {
                mode,
                profile_ids: &profile_ids,
                composites: &composites,
                mastery_records: &mastery_records,
                streaks: &streaks,
                awarded_badges,
                skill_categories: &self.catalog.skill_categories,
            },
            &self.levels,
        );
        info!(
            mode = %mode,
            profiles = snapshot.profile_count,
            badges_exact = snapshot.badges.is_exact(),
            "Coach snapshot computed"
        );
        Ok(snapshot)
    }

    async fn badge_count(&self, profile_ids: &[ProfileId]) -> Option<u64> {
        if profile_ids.is_empty() {
            return Some(0);
        }
        self.loader.badge_count(profile_ids).await
    }
}
