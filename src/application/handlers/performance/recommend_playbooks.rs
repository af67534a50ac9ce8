//! RecommendPlaybooksHandler - lagging metrics of a scope mapped to playbooks.

use std::sync::Arc;
use tracing::info;

use crate::application::cache::{CacheKey, ComputationMode, QueryCache, QueryError};
use crate::application::{EngineSettings, Scope};
use crate::domain::coaching::{CoachingAdvice, CoachingCatalog, CoachingMatcher};

use super::{ComputeScorecardHandler, ComputeScorecardQuery};

/// Query for coaching advice on a scope.
#[derive(Debug, Clone)]
pub struct RecommendPlaybooksQuery {
    pub scope: Scope,
}

/// Derives coaching advice from the scope's scorecard.
///
/// Never touches the store directly; all reads go through the shared
/// scorecard handler, so advice and scorecard agree for the same scope.
pub struct RecommendPlaybooksHandler {
    scorecards: Arc<ComputeScorecardHandler>,
    catalog: Arc<CoachingCatalog>,
    cache: QueryCache<CoachingAdvice>,
    matcher: CoachingMatcher,
}

impl RecommendPlaybooksHandler {
    pub fn new(
        scorecards: Arc<ComputeScorecardHandler>,
        catalog: Arc<CoachingCatalog>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            scorecards,
            catalog,
            cache: QueryCache::new(),
            matcher: settings.coaching_matcher(),
        }
    }

    pub fn key(scope: &Scope) -> CacheKey {
        CacheKey::new(ComputationMode::Playbooks, scope)
    }

    pub async fn handle(&self, query: RecommendPlaybooksQuery) -> Result<Arc<CoachingAdvice>, QueryError> {
        self.cache
            .get_or_compute(Self::key(&query.scope), || self.compute(&query.scope))
            .await
    }

    pub fn cached(&self, scope: &Scope) -> Option<Arc<CoachingAdvice>> {
        self.cache.peek(&Self::key(scope))
    }

    /// Recomputes the advice from the memoized scorecard of the scope.
    pub async fn refresh(&self, query: RecommendPlaybooksQuery) -> Result<Arc<CoachingAdvice>, QueryError> {
        self.cache
            .refresh(Self::key(&query.scope), || self.compute(&query.scope))
            .await
    }

    async fn compute(&self, scope: &Scope) -> Result<CoachingAdvice, QueryError> {
        let scorecard = self
            .scorecards
            .handle(ComputeScorecardQuery {
                scope: scope.clone(),
            })
            .await?;

        let advice = self
            .matcher
            .advise(&scorecard.rows, &self.catalog.skill_map, &self.catalog.playbooks);
        info!(
            lagging = advice.lagging.len(),
            playbooks = advice.playbooks.len(),
            "Coaching advice computed"
        );
        Ok(advice)
    }
}
