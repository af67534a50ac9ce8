//! Scoring thresholds and catalog location

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Tunables for scoring, trends and coaching
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Composite score counted as full attainment (streaks, above-target count)
    #[serde(default = "default_full_attainment_threshold")]
    pub full_attainment_threshold: f64,

    /// Percentage under which a metric is lagging
    #[serde(default = "default_lagging_threshold")]
    pub lagging_threshold: f64,

    /// Per-metric percentage ceiling in trend series
    #[serde(default = "default_trend_percentage_cap")]
    pub trend_percentage_cap: f64,

    /// Buckets in a rolling-preset trend series
    #[serde(default = "default_rolling_trend_windows")]
    pub rolling_trend_windows: usize,

    /// Maximum playbooks recommended
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Optional YAML coaching catalog; built-in defaults otherwise
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl ScoringConfig {
    /// Validate scoring configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("full_attainment_threshold", self.full_attainment_threshold, 1.0, 1000.0)?;
        check_range("lagging_threshold", self.lagging_threshold, 0.0, 1000.0)?;
        check_range("trend_percentage_cap", self.trend_percentage_cap, 1.0, 10_000.0)?;
        if self.lagging_threshold > self.full_attainment_threshold {
            return Err(ValidationError::ThresholdsInverted);
        }
        if self.rolling_trend_windows == 0 {
            return Err(ValidationError::MustBePositive("rolling_trend_windows"));
        }
        if self.max_recommendations == 0 {
            return Err(ValidationError::MustBePositive("max_recommendations"));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::ThresholdOutOfRange { field, min, max });
    }
    Ok(())
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            full_attainment_threshold: default_full_attainment_threshold(),
            lagging_threshold: default_lagging_threshold(),
            trend_percentage_cap: default_trend_percentage_cap(),
            rolling_trend_windows: default_rolling_trend_windows(),
            max_recommendations: default_max_recommendations(),
            catalog_path: None,
        }
    }
}

fn default_full_attainment_threshold() -> f64 {
    100.0
}

fn default_lagging_threshold() -> f64 {
    80.0
}

fn default_trend_percentage_cap() -> f64 {
    150.0
}

fn default_rolling_trend_windows() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    3
}
