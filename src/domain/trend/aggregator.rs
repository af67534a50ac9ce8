//! Historical Trend Aggregator - weighted score per seven-day bucket.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::foundation::{MetricKey, Period, ProfileId};
use crate::domain::scoring::{attainment_percentage, MetricCatalog, MetricObservation};

use super::{TrendBucket, TrendWindow};

/// Per-metric percentage ceiling applied in trend charts.
pub const DEFAULT_TREND_PERCENTAGE_CAP: f64 = 150.0;

/// One point of a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub period: Period,
    /// Weighted score for the bucket; 0 when no weighted metric has data.
    pub score: i64,
    /// Distinguishes "no activity recorded" from a genuine 0% bucket.
    pub has_data: bool,
}

/// Aggregates cohort observations into an ordered trend series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAggregator {
    percentage_cap: f64,
}

impl Default for TrendAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_PERCENTAGE_CAP)
    }
}

impl TrendAggregator {
    pub fn new(percentage_cap: f64) -> Self {
        Self { percentage_cap }
    }

    pub fn percentage_cap(&self) -> f64 {
        self.percentage_cap
    }

    /// Produces one point per bucket, oldest first.
    ///
    /// Only observations of `cohort` members count; an empty cohort slice
    /// means "every observation given".
    pub fn aggregate(
        &self,
        window: &TrendWindow,
        catalog: &MetricCatalog,
        observations: &[MetricObservation],
        cohort: &[ProfileId],
    ) -> Vec<TrendPoint> {
        let members: HashSet<&ProfileId> = cohort.iter().collect();
        let in_cohort: Vec<&MetricObservation> = observations
            .iter()
            .filter(|o| members.is_empty() || members.contains(&o.profile_id))
            .collect();

        window
            .buckets()
            .iter()
            .map(|bucket| self.score_bucket(bucket, catalog, &in_cohort))
            .collect()
    }

    /// Scores a single bucket.
    ///
    /// Duplicate observations of a metric inside the bucket are averaged, each
    /// metric percentage is capped, and the composite is the weight-normalised
    /// sum over metrics that have data.
    fn score_bucket(
        &self,
        bucket: &TrendBucket,
        catalog: &MetricCatalog,
        observations: &[&MetricObservation],
    ) -> TrendPoint {
        let mut samples: BTreeMap<&MetricKey, (f64, usize)> = BTreeMap::new();
        for observation in observations
            .iter()
            .filter(|o| o.period.overlaps(&bucket.period))
        {
            let entry = samples.entry(&observation.metric_key).or_insert((0.0, 0));
            entry.0 += observation.value;
            entry.1 += 1;
        }

        let mut weighted = 0.0;
        let mut weight_with_data = 0.0;
        let mut has_data = false;
        for definition in catalog.scorecard_metrics() {
            let Some((total, count)) = samples.get(&definition.key) else {
                continue;
            };
            let average = total / *count as f64;
            let percentage = self.capped_percentage(average, definition.target);
            weighted += percentage * definition.weight;
            weight_with_data += definition.weight;
            has_data = true;
        }

        let score = if weight_with_data > 0.0 {
            (weighted / weight_with_data).round() as i64
        } else {
            0
        };

        TrendPoint {
            label: bucket.label.clone(),
            period: bucket.period,
            score,
            has_data,
        }
    }

    /// Attainment percentage clamped to the trend cap.
    pub fn capped_percentage(&self, value: f64, target: f64) -> f64 {
        attainment_percentage(value, target).min(self.percentage_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scoring::MetricDefinition;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn key(k: &str) -> MetricKey {
        MetricKey::new(k).unwrap()
    }

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
    }

    fn catalog() -> MetricCatalog {
        MetricCatalog::build(vec![
            MetricDefinition::new(key("calls"), 50.0, 0.5),
            MetricDefinition::new(key("meetings"), 10.0, 0.5),
        ])
        .0
    }

    fn obs(profile: ProfileId, metric: &str, value: f64, period: Period) -> MetricObservation {
        MetricObservation::new(profile, key(metric), value, period)
    }

    #[test]
    fn series_has_one_point_per_bucket_newest_last() {
        let window = TrendWindow::ending_at(end(), 5);
        let points = TrendAggregator::default().aggregate(&window, &catalog(), &[], &[]);

        assert_eq!(points.len(), 5);
        assert_eq!(points[4].period.end(), end());
        assert!(points.iter().all(|p| p.score == 0 && !p.has_data));
    }

    #[test]
    fn duplicates_are_averaged_within_a_bucket() {
        let window = TrendWindow::ending_at(end(), 1);
        let week = window.buckets()[0].period;
        let a = ProfileId::new();
        let b = ProfileId::new();
        let observations = vec![obs(a, "calls", 20.0, week), obs(b, "calls", 40.0, week)];

        let points = TrendAggregator::default().aggregate(&window, &catalog(), &observations, &[]);

        // avg 30 of 50 = 60%; only calls has data so it carries the full weight.
        assert_eq!(points[0].score, 60);
        assert!(points[0].has_data);
    }

    #[test]
    fn zero_weight_samples_still_mark_data() {
        let catalog = MetricCatalog::build(vec![
            MetricDefinition::new(key("calls"), 50.0, 1.0),
            MetricDefinition::new(key("emails"), 20.0, 0.0),
        ])
        .0;
        let window = TrendWindow::ending_at(end(), 1);
        let week = window.buckets()[0].period;
        let observations = vec![obs(ProfileId::new(), "emails", 20.0, week)];

        let points = TrendAggregator::default().aggregate(&window, &catalog, &observations, &[]);

        assert!(points[0].has_data);
        assert_eq!(points[0].score, 0);
    }

    #[test]
    fn percentages_are_capped_before_weighting() {
        let window = TrendWindow::ending_at(end(), 1);
        let week = window.buckets()[0].period;
        let profile = ProfileId::new();
        let observations = vec![
            obs(profile, "calls", 500.0, week),
            obs(profile, "meetings", 5.0, week),
        ];

        let points = TrendAggregator::default().aggregate(&window, &catalog(), &observations, &[]);

        // calls 1000% -> 150, meetings 50%; (150*0.5 + 50*0.5) / 1.0
        assert_eq!(points[0].score, 100);
    }

    #[test]
    fn observation_spanning_two_buckets_counts_in_both() {
        let window = TrendWindow::ending_at(end(), 2);
        let spanning = Period::new(
            NaiveDate::from_ymd_opt(2024, 9, 6).unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 10).unwrap(),
        )
        .unwrap();
        let observations = vec![obs(ProfileId::new(), "calls", 25.0, spanning)];

        let points = TrendAggregator::default().aggregate(&window, &catalog(), &observations, &[]);
        assert_eq!(points[0].score, 50);
        assert_eq!(points[1].score, 50);
    }

    #[test]
    fn cohort_filter_excludes_outsiders() {
        let window = TrendWindow::ending_at(end(), 1);
        let week = window.buckets()[0].period;
        let member = ProfileId::new();
        let outsider = ProfileId::new();
        let observations = vec![
            obs(member, "calls", 50.0, week),
            obs(outsider, "calls", 0.0, week),
        ];

        let points =
            TrendAggregator::default().aggregate(&window, &catalog(), &observations, &[member]);
        assert_eq!(points[0].score, 100);
    }

    proptest! {
        #[test]
        fn prop_bucket_score_never_exceeds_cap(
            values in proptest::collection::vec(0.0f64..10_000.0, 1..6)
        ) {
            let window = TrendWindow::ending_at(end(), 1);
            let week = window.buckets()[0].period;
            let profile = ProfileId::new();
            let observations: Vec<_> = values
                .iter()
                .map(|v| obs(profile, "calls", *v, week))
                .chain(values.iter().map(|v| obs(profile, "meetings", *v, week)))
                .collect();

            let aggregator = TrendAggregator::default();
            let points = aggregator.aggregate(&window, &catalog(), &observations, &[]);
            prop_assert!(points[0].score as f64 <= DEFAULT_TREND_PERCENTAGE_CAP);
        }

        #[test]
        fn prop_capped_percentage_is_bounded(value in 0.0f64..1.0e7, target in 0.0f64..1000.0) {
            let pct = TrendAggregator::default().capped_percentage(value, target);
            prop_assert!(pct <= DEFAULT_TREND_PERCENTAGE_CAP);
        }
    }
}
