//! Scoring error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, MetricKey};

/// Errors raised while validating or applying metric configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The metric definition cannot be scored; it is excluded, not fatal.
    #[error("Metric '{metric}' is misconfigured: {reason}")]
    Configuration { metric: MetricKey, reason: String },

    /// A computed row references a metric the active catalog does not score.
    #[error("Metric '{metric}' is not part of the active catalog")]
    SchemaMismatch { metric: MetricKey },
}

impl ScoringError {
    pub fn configuration(metric: MetricKey, reason: impl Into<String>) -> Self {
        ScoringError::Configuration {
            metric,
            reason: reason.into(),
        }
    }

    /// The metric the error refers to.
    pub fn metric(&self) -> &MetricKey {
        match self {
            ScoringError::Configuration { metric, .. } => metric,
            ScoringError::SchemaMismatch { metric } => metric,
        }
    }
}

impl From<ScoringError> for DomainError {
    fn from(err: ScoringError) -> Self {
        let code = match &err {
            ScoringError::Configuration { .. } => ErrorCode::InvalidMetricConfiguration,
            ScoringError::SchemaMismatch { .. } => ErrorCode::CatalogSchemaMismatch,
        };
        let metric = err.metric().to_string();
        DomainError::new(code, err.to_string()).with_detail("metric", metric)
    }
}
