//! Engine facade: one entry point per externally triggered computation.

use std::sync::Arc;
use tracing::warn;

use crate::domain::coaching::{CoachingAdvice, CoachingCatalog, Playbook};
use crate::domain::dashboard::{CoachSnapshot, Scorecard, SnapshotMode};
use crate::domain::trend::TrendPoint;
use crate::ports::PerformanceStore;

use super::cache::QueryError;
use super::handlers::{
    ComputeCoachSnapshotHandler, ComputeCoachSnapshotQuery, ComputeScorecardHandler,
    ComputeScorecardQuery, ComputeTrendHandler, ComputeTrendQuery, RecommendPlaybooksHandler,
    RecommendPlaybooksQuery,
};
use super::{EngineSettings, Scope};

/// Scoring and coaching engine over one performance store.
///
/// Construct once per process and share behind an `Arc`; every computation
/// is memoized per scope for the engine's lifetime. Computations for the
/// same scope fail independently: a failing trend read leaves the scorecard
/// of that scope usable.
pub struct PerformanceEngine {
    scorecards: Arc<ComputeScorecardHandler>,
    trends: ComputeTrendHandler,
    snapshots: ComputeCoachSnapshotHandler,
    playbooks: RecommendPlaybooksHandler,
    catalog: Arc<CoachingCatalog>,
    settings: EngineSettings,
}

impl PerformanceEngine {
    pub fn new(
        store: Arc<dyn PerformanceStore>,
        catalog: CoachingCatalog,
        settings: EngineSettings,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let scorecards = Arc::new(ComputeScorecardHandler::new(store.clone(), settings));
        Self {
            trends: ComputeTrendHandler::new(store.clone(), settings),
            snapshots: ComputeCoachSnapshotHandler::new(
                store,
                scorecards.clone(),
                catalog.clone(),
                settings,
            ),
            playbooks: RecommendPlaybooksHandler::new(scorecards.clone(), catalog.clone(), settings),
            scorecards,
            catalog,
            settings,
        }
    }

    pub fn catalog(&self) -> &CoachingCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub async fn compute_scorecard(&self, scope: &Scope) -> Result<Arc<Scorecard>, QueryError> {
        self.scorecards
            .handle(ComputeScorecardQuery {
                scope: scope.clone(),
            })
            .await
    }

    /// Recomputes every memoized result of `scope` from fresh store reads.
    ///
    /// The scorecard goes first; advice and snapshots are then rebuilt from
    /// it. Results never requested for the scope stay uncomputed. A dependent
    /// result that fails to refresh is logged and dropped from the cache.
    pub async fn refresh(&self, scope: &Scope) -> Result<Arc<Scorecard>, QueryError> {
        let scorecard = self
            .scorecards
            .refresh(ComputeScorecardQuery {
                scope: scope.clone(),
            })
            .await;

        let trend = async {
            if self.trends.cached(scope).is_none() {
                return Ok(());
            }
            self.trends
                .refresh(ComputeTrendQuery {
                    scope: scope.clone(),
                })
                .await
                .map(|_| ())
        };
        let advice = async {
            if self.playbooks.cached(scope).is_none() {
                return Ok(());
            }
            self.playbooks
                .refresh(RecommendPlaybooksQuery {
                    scope: scope.clone(),
                })
                .await
                .map(|_| ())
        };
        let summary = self.refresh_snapshot(scope, SnapshotMode::Summary);
        let full = self.refresh_snapshot(scope, SnapshotMode::Full);
        let (trend, advice, summary, full) = futures::join!(trend, advice, summary, full);

        for (computation, outcome) in [
            ("trend", trend),
            ("coaching", advice),
            ("coach_summary", summary),
            ("coach_full", full),
        ] {
            if let Err(err) = outcome {
                warn!(computation, error = %err, "Refresh failed");
            }
        }
        scorecard
    }

    async fn refresh_snapshot(&self, scope: &Scope, mode: SnapshotMode) -> Result<(), QueryError> {
        if self.snapshots.cached(scope, mode).is_none() {
            return Ok(());
        }
        self.snapshots
            .refresh(ComputeCoachSnapshotQuery {
                scope: scope.clone(),
                mode,
            })
            .await
            .map(|_| ())
    }

    pub async fn compute_trend(&self, scope: &Scope) -> Result<Arc<Vec<TrendPoint>>, QueryError> {
        self.trends
            .handle(ComputeTrendQuery {
                scope: scope.clone(),
            })
            .await
    }

    pub async fn compute_coach_snapshot(
        &self,
        scope: &Scope,
        mode: SnapshotMode,
    ) -> Result<Arc<CoachSnapshot>, QueryError> {
        self.snapshots
            .handle(ComputeCoachSnapshotQuery {
                scope: scope.clone(),
                mode,
            })
            .await
    }

    /// Lagging metrics of the scope and the playbooks ranked for them.
    pub async fn coaching_advice(&self, scope: &Scope) -> Result<Arc<CoachingAdvice>, QueryError> {
        self.playbooks
            .handle(RecommendPlaybooksQuery {
                scope: scope.clone(),
            })
            .await
    }

    /// At most `max_recommendations` playbooks, most relevant first.
    /// Empty when nothing in the scope is lagging.
    pub async fn recommend_playbooks(&self, scope: &Scope) -> Result<Vec<Playbook>, QueryError> {
        let advice = self.coaching_advice(scope).await?;
        Ok(advice.playbooks.iter().map(|m| m.playbook.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryPerformanceStore, StoreQuery};
    use crate::domain::foundation::{MetricKey, Period, ProfileId};
    use crate::domain::scoring::{MetricDefinition, MetricObservation};
    use crate::ports::{Profile, ProfileFilter};
    use chrono::NaiveDate;

    fn key(k: &str) -> MetricKey {
        MetricKey::new(k).unwrap()
    }

    fn week() -> Period {
        Period::week_ending(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap())
    }

    /// Calls 25/50 and meetings 12/10 at equal weight.
    fn store() -> Arc<InMemoryPerformanceStore> {
        let ada = ProfileId::new();
        Arc::new(
            InMemoryPerformanceStore::new()
                .with_definition(MetricDefinition::new(key("calls"), 50.0, 0.5))
                .with_definition(MetricDefinition::new(key("meetings"), 10.0, 0.5))
                .with_profile(Profile::new(ada, "Ada").in_team("A"))
                .with_observation(MetricObservation::new(ada, key("calls"), 25.0, week()))
                .with_observation(MetricObservation::new(ada, key("meetings"), 12.0, week())),
        )
    }

    fn engine(store: Arc<InMemoryPerformanceStore>) -> PerformanceEngine {
        PerformanceEngine::new(store, CoachingCatalog::default(), EngineSettings::default())
    }

    fn scope() -> Scope {
        Scope::custom(ProfileFilter::team("A"), week())
    }

    #[tokio::test]
    async fn test_scorecard_composite() {
        let engine = engine(store());
        let scorecard = engine.compute_scorecard(&scope()).await.unwrap();
        assert_eq!(scorecard.rows[0].composite, 85);
    }

    #[tokio::test]
    async fn test_recommendations_follow_lagging_calls() {
        let engine = engine(store());

        let playbooks = engine.recommend_playbooks(&scope()).await.unwrap();
        assert!(!playbooks.is_empty());
        assert!(playbooks.len() <= 3);
        assert!(playbooks.iter().all(|p| p.metric_keys.contains(&key("calls"))));
    }

    #[tokio::test]
    async fn test_snapshot_and_advice_reuse_scorecard() {
        let store = store();
        let engine = engine(store.clone());

        engine.compute_scorecard(&scope()).await.unwrap();
        engine.coaching_advice(&scope()).await.unwrap();
        engine.compute_coach_snapshot(&scope(), SnapshotMode::Summary).await.unwrap();

        assert_eq!(store.query_count(StoreQuery::Profiles), 1);
    }

    #[tokio::test]
    async fn test_trend_failure_leaves_scorecard_usable() {
        let store = store();
        let engine = engine(store.clone());
        engine.compute_scorecard(&scope()).await.unwrap();

        // The trend is the first computation to read observations after this point.
        store.fail(StoreQuery::Observations).await;
        assert!(engine.compute_trend(&scope()).await.is_err());

        let scorecard = engine.compute_scorecard(&scope()).await.unwrap();
        assert_eq!(scorecard.rows[0].composite, 85);
    }

    #[tokio::test]
    async fn test_refresh_sees_new_observations() {
        let store = store();
        let engine = engine(store.clone());
        let before = engine.compute_scorecard(&scope()).await.unwrap();

        let profile = before.rows[0].profile_id;
        store
            .add_observation(MetricObservation::new(profile, key("calls"), 25.0, week()))
            .await;

        let cached = engine.compute_scorecard(&scope()).await.unwrap();
        assert!(Arc::ptr_eq(&before, &cached));

        let refreshed = engine.refresh(&scope()).await.unwrap();
        // calls 50/50 -> 100, meetings 120 -> 110
        assert_eq!(refreshed.rows[0].composite, 110);
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_advice_and_snapshot() {
        let store = store();
        let engine = engine(store.clone());
        let scorecard = engine.compute_scorecard(&scope()).await.unwrap();
        let advice = engine.coaching_advice(&scope()).await.unwrap();
        let snapshot = engine
            .compute_coach_snapshot(&scope(), SnapshotMode::Summary)
            .await
            .unwrap();
        assert_eq!(advice.lagging.len(), 1);
        assert_eq!(snapshot.average_score, 85);

        let profile = scorecard.rows[0].profile_id;
        store
            .add_observation(MetricObservation::new(profile, key("calls"), 50.0, week()))
            .await;
        engine.refresh(&scope()).await.unwrap();

        let advice = engine.coaching_advice(&scope()).await.unwrap();
        assert!(advice.is_on_track());
        assert!(engine.recommend_playbooks(&scope()).await.unwrap().is_empty());
        let snapshot = engine
            .compute_coach_snapshot(&scope(), SnapshotMode::Summary)
            .await
            .unwrap();
        // calls 150% and meetings 120% at equal weight
        assert_eq!(snapshot.average_score, 135);
    }

    #[tokio::test]
    async fn test_refresh_leaves_uncomputed_results_alone() {
        let store = store();
        let engine = engine(store.clone());
        engine.compute_scorecard(&scope()).await.unwrap();

        engine.refresh(&scope()).await.unwrap();
        assert_eq!(store.query_count(StoreQuery::MasteryRecords), 0);
        assert_eq!(store.query_count(StoreQuery::Profiles), 2);
    }
}
