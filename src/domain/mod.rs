//! Domain layer containing the scoring rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, periods, percentages, errors)
//! - `scoring` - Metric catalog and weighted attainment scoring
//! - `trend` - Period presets, bucket windows and trend aggregation
//! - `progress` - Levels, mastery records and streaks
//! - `coaching` - Lagging-metric detection and playbook ranking
//! - `dashboard` - Scorecard and coach snapshot read models

pub mod coaching;
pub mod dashboard;
pub mod foundation;
pub mod progress;
pub mod scoring;
pub mod trend;
