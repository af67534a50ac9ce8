//! Streak Calculator - consecutive most-recent periods at full attainment.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::foundation::{MetricKey, Period, ProfileId};
use crate::domain::scoring::{MetricCatalog, MetricObservation, WeightedScoreCalculator};

/// Composite score a period needs to extend a streak.
pub const FULL_ATTAINMENT_THRESHOLD: f64 = 100.0;

/// Composite score of one historical period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodScore {
    pub period_end: NaiveDate,
    pub composite: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreakCalculator {
    threshold: f64,
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self::new(FULL_ATTAINMENT_THRESHOLD)
    }
}

impl StreakCalculator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Scores each distinct period of a profile's history, most recent first.
    ///
    /// Observations are grouped by period end date; each group is scored like
    /// a scorecard row (uncapped, rounded).
    pub fn period_scores(
        &self,
        profile_id: ProfileId,
        catalog: &MetricCatalog,
        observations: &[MetricObservation],
    ) -> Vec<PeriodScore> {
        let mut periods: BTreeMap<NaiveDate, (NaiveDate, BTreeMap<MetricKey, f64>)> =
            BTreeMap::new();

        for observation in observations.iter().filter(|o| o.profile_id == profile_id) {
            let end = observation.period.end();
            let (start, values) = periods
                .entry(end)
                .or_insert_with(|| (observation.period.start(), BTreeMap::new()));
            *start = (*start).min(observation.period.start());
            *values.entry(observation.metric_key.clone()).or_insert(0.0) += observation.value;
        }

        periods
            .into_iter()
            .rev()
            .map(|(end, (start, values))| {
                let period = Period::new(start, end).unwrap_or_else(|_| Period::day(end));
                let row = WeightedScoreCalculator::score_values(profile_id, catalog, &values, period);
                PeriodScore {
                    period_end: end,
                    composite: row.composite,
                }
            })
            .collect()
    }

    /// Counts leading scores at or above the threshold.
    ///
    /// `scores` must be ordered most recent first. The first miss ends the scan.
    pub fn count_leading(&self, scores: impl IntoIterator<Item = i64>) -> u32 {
        let mut streak = 0u32;
        for score in scores {
            if (score as f64) < self.threshold {
                break;
            }
            streak = streak.saturating_add(1);
        }
        streak
    }

    /// A profile's current streak.
    pub fn streak(
        &self,
        profile_id: ProfileId,
        catalog: &MetricCatalog,
        observations: &[MetricObservation],
    ) -> u32 {
        let scores = self.period_scores(profile_id, catalog, observations);
        self.count_leading(scores.iter().map(|s| s.composite))
    }

    /// Cohort streak: rounded mean of per-profile streaks, 0 for no profiles.
    pub fn cohort_streak(streaks: &[u32]) -> u32 {
        if streaks.is_empty() {
            return 0;
        }
        let total: f64 = streaks.iter().map(|s| f64::from(*s)).sum();
        (total / streaks.len() as f64).round() as u32
    }
}
