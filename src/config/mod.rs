//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `APPTIVIA` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use apptivia_scoring::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Lagging below {}%", config.scoring.lagging_threshold);
//! ```

mod database;
mod engine;
mod error;
mod report;
mod scoring;

pub use database::DatabaseConfig;
pub use engine::{EngineConfig, Environment, LogFormat};
pub use error::{ConfigError, ValidationError};
pub use report::ReportConfig;
pub use scoring::ScoringConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub engine: EngineConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Scoring thresholds and catalog location
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Scope of the report binary
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `APPTIVIA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `APPTIVIA__DATABASE__URL=...` -> `database.url = ...`
    /// - `APPTIVIA__SCORING__LAGGING_THRESHOLD=75` -> `scoring.lagging_threshold = 75`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("APPTIVIA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.database.validate()?;
        self.scoring.validate()?;
        self.report.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.engine.is_production()
    }
}
