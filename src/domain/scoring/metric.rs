//! Metric definitions and raw observations.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MetricKey, Period, ProfileId};

use super::ScoringError;

/// Unit a metric value is expressed in. Display-only; scoring ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    #[default]
    Count,
    Currency,
    Minutes,
    Percent,
}

/// A configured performance metric with its goal and scoring weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    pub key: MetricKey,
    pub name: String,
    /// Goal value for one period.
    pub target: f64,
    /// Share of the composite score. Weights are not required to sum to 1.
    pub weight: f64,
    #[serde(default)]
    pub unit: MetricUnit,
    #[serde(default)]
    pub category: Option<String>,
    /// Whether the metric participates in the composite score.
    pub visible_on_scorecard: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub display_order: i32,
}

fn default_active() -> bool {
    true
}

impl MetricDefinition {
    /// Creates an active, scorecard-visible metric.
    pub fn new(key: MetricKey, target: f64, weight: f64) -> Self {
        Self {
            name: key.as_str().to_string(),
            key,
            target,
            weight,
            unit: MetricUnit::default(),
            category: None,
            visible_on_scorecard: true,
            active: true,
            display_order: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_display_order(mut self, order: i32) -> Self {
        self.display_order = order;
        self
    }

    /// Marks the metric as informational only (excluded from the composite).
    pub fn informational(mut self) -> Self {
        self.visible_on_scorecard = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Checks target and weight.
    ///
    /// A zero target is valid and always scores 0%.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if !self.target.is_finite() || self.target < 0.0 {
            return Err(ScoringError::configuration(
                self.key.clone(),
                format!("target must be a non-negative number, got {}", self.target),
            ));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ScoringError::configuration(
                self.key.clone(),
                format!("weight must be a non-negative number, got {}", self.weight),
            ));
        }
        Ok(())
    }
}

/// A raw activity value recorded for a profile over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricObservation {
    pub profile_id: ProfileId,
    pub metric_key: MetricKey,
    pub value: f64,
    pub period: Period,
}

impl MetricObservation {
    pub fn new(profile_id: ProfileId, metric_key: MetricKey, value: f64, period: Period) -> Self {
        Self {
            profile_id,
            metric_key,
            value,
            period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> MetricKey {
        MetricKey::new(k).unwrap()
    }

    #[test]
    fn negative_target_is_a_configuration_error() {
        let def = MetricDefinition::new(key("calls"), -5.0, 0.5);
        let err = def.validate().unwrap_err();
        assert!(matches!(err, ScoringError::Configuration { ref metric, .. } if metric.as_str() == "calls"));
    }

    #[test]
    fn zero_target_is_valid() {
        assert!(MetricDefinition::new(key("calls"), 0.0, 0.5).validate().is_ok());
    }

    #[test]
    fn non_finite_weight_is_rejected() {
        assert!(MetricDefinition::new(key("calls"), 10.0, f64::NAN).validate().is_err());
        assert!(MetricDefinition::new(key("calls"), 10.0, -0.1).validate().is_err());
    }

    #[test]
    fn definition_deserializes_with_defaults() {
        let json = r#"{"key":"emails","name":"Emails","target":100,"weight":0.2,"visibleOnScorecard":true}"#;
        let def: MetricDefinition = serde_json::from_str(json).unwrap();
        assert!(def.active);
        assert_eq!(def.unit, MetricUnit::Count);
        assert_eq!(def.display_order, 0);
    }
}
