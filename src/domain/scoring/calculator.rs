//! Weighted Score Calculator - per-metric attainment and the composite score.

use std::collections::BTreeMap;

use crate::domain::foundation::{MetricKey, Period, ProfileId};

use super::{AttainmentRow, MetricAttainment, MetricCatalog, MetricObservation};

/// Attainment percentage for a value against a target.
///
/// Returns 0 for a zero (or negative) target instead of dividing by zero.
pub fn attainment_percentage(value: f64, target: f64) -> f64 {
    if target > 0.0 {
        value / target * 100.0
    } else {
        0.0
    }
}

/// Calculator for attainment rows.
pub struct WeightedScoreCalculator;

impl WeightedScoreCalculator {
    /// Sums a profile's observations that overlap `period`, per metric.
    ///
    /// Overlapping ranges merge by summation.
    pub fn sum_period_values(
        profile_id: &ProfileId,
        observations: &[MetricObservation],
        period: &Period,
    ) -> BTreeMap<MetricKey, f64> {
        let mut totals: BTreeMap<MetricKey, f64> = BTreeMap::new();
        for observation in observations
            .iter()
            .filter(|o| &o.profile_id == profile_id && o.period.overlaps(period))
        {
            *totals.entry(observation.metric_key.clone()).or_insert(0.0) += observation.value;
        }
        totals
    }

    /// Scores a profile's observations for a period.
    pub fn score(
        profile_id: ProfileId,
        catalog: &MetricCatalog,
        observations: &[MetricObservation],
        period: Period,
    ) -> AttainmentRow {
        let values = Self::sum_period_values(&profile_id, observations, &period);
        Self::score_values(profile_id, catalog, &values, period)
    }

    /// Scores pre-summed metric values.
    ///
    /// Metrics with no value count as 0. Only scorecard-visible metrics feed
    /// the composite, which is rounded once at the end.
    ///
    /// # Edge Cases
    /// - No visible metrics: composite 0 and an empty metric map
    pub fn score_values(
        profile_id: ProfileId,
        catalog: &MetricCatalog,
        values: &BTreeMap<MetricKey, f64>,
        period: Period,
    ) -> AttainmentRow {
        let mut metrics = BTreeMap::new();
        let mut informational = BTreeMap::new();
        let mut weighted = 0.0;

        for definition in catalog.definitions() {
            let value = values.get(&definition.key).copied().unwrap_or(0.0);
            let percentage = attainment_percentage(value, definition.target);
            let attainment = MetricAttainment::new(value, percentage);

            if definition.visible_on_scorecard {
                weighted += percentage * definition.weight;
                metrics.insert(definition.key.clone(), attainment);
            } else {
                informational.insert(definition.key.clone(), attainment);
            }
        }

        AttainmentRow {
            profile_id,
            period,
            metrics,
            informational,
            composite: weighted.round() as i64,
        }
    }
}
