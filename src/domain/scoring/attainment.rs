//! Attainment rows - computed per-profile scoring results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{MetricKey, Period, ProfileId};

/// Value and attainment percentage for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAttainment {
    pub value: f64,
    /// `value / target * 100`, uncapped. Zero when the target is zero.
    pub percentage: f64,
}

impl MetricAttainment {
    pub fn new(value: f64, percentage: f64) -> Self {
        Self { value, percentage }
    }
}

/// One profile's scored period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttainmentRow {
    pub profile_id: ProfileId,
    pub period: Period,
    /// Scorecard-visible metrics; these make up the composite.
    pub metrics: BTreeMap<MetricKey, MetricAttainment>,
    /// Detail-view metrics that do not count towards the composite.
    #[serde(default)]
    pub informational: BTreeMap<MetricKey, MetricAttainment>,
    /// `round(sum(percentage * weight))` over the scorecard metrics.
    pub composite: i64,
}

impl AttainmentRow {
    /// Looks a metric up in either section.
    pub fn metric(&self, key: &MetricKey) -> Option<&MetricAttainment> {
        self.metrics.get(key).or_else(|| self.informational.get(key))
    }

    pub fn percentage(&self, key: &MetricKey) -> Option<f64> {
        self.metric(key).map(|m| m.percentage)
    }

    /// True when the composite reaches `threshold`.
    pub fn meets(&self, threshold: f64) -> bool {
        self.composite as f64 >= threshold
    }
}
