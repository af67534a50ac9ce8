//! Engine tunables handed to the handlers.

use crate::config::ScoringConfig;
use crate::domain::coaching::{CoachingMatcher, DEFAULT_LAGGING_THRESHOLD, MAX_RECOMMENDATIONS};
use crate::domain::progress::{StreakCalculator, FULL_ATTAINMENT_THRESHOLD};
use crate::domain::trend::{TrendAggregator, DEFAULT_TREND_PERCENTAGE_CAP};

/// Thresholds and sizes used across computations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub full_attainment_threshold: f64,
    pub lagging_threshold: f64,
    pub trend_percentage_cap: f64,
    pub rolling_trend_windows: usize,
    pub max_recommendations: usize,
}

impl EngineSettings {
    pub fn trend_aggregator(&self) -> TrendAggregator {
        TrendAggregator::new(self.trend_percentage_cap)
    }

    pub fn streak_calculator(&self) -> StreakCalculator {
        StreakCalculator::new(self.full_attainment_threshold)
    }

    pub fn coaching_matcher(&self) -> CoachingMatcher {
        CoachingMatcher::new(self.lagging_threshold, self.max_recommendations)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            full_attainment_threshold: FULL_ATTAINMENT_THRESHOLD,
            lagging_threshold: DEFAULT_LAGGING_THRESHOLD,
            trend_percentage_cap: DEFAULT_TREND_PERCENTAGE_CAP,
            rolling_trend_windows: 5,
            max_recommendations: MAX_RECOMMENDATIONS,
        }
    }
}

impl From<&ScoringConfig> for EngineSettings {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            full_attainment_threshold: config.full_attainment_threshold,
            lagging_threshold: config.lagging_threshold,
            trend_percentage_cap: config.trend_percentage_cap,
            rolling_trend_windows: config.rolling_trend_windows,
            max_recommendations: config.max_recommendations,
        }
    }
}
