//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool size exceeds maximum allowed ({0})")]
    PoolSizeTooLarge(u32),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("{field} must be a finite number between {min} and {max}")]
    ThresholdOutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Lagging threshold must not exceed the full attainment threshold")]
    ThresholdsInverted,

    #[error("{0} must be at least 1")]
    MustBePositive(&'static str),

    #[error("Unknown report preset: {0}")]
    InvalidPreset(String),

    #[error("Invalid member id: {0}")]
    InvalidMemberId(String),

    #[error("Custom preset requires both start and end dates")]
    MissingCustomRange,

    #[error("Report end date is before its start date")]
    InvalidReportRange,
}
