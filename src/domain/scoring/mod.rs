//! Scoring Module - metric catalog and weighted attainment scoring.
//!
//! # Components
//!
//! - `MetricCatalog` - validated, ordered set of active metric definitions
//! - `WeightedScoreCalculator` - per-metric attainment and composite score
//!
//! All functions are pure. Observations and definitions come in, rows come out.

mod attainment;
mod calculator;
mod catalog;
mod errors;
mod metric;

pub use attainment::{AttainmentRow, MetricAttainment};
pub use calculator::{attainment_percentage, WeightedScoreCalculator};
pub use catalog::MetricCatalog;
pub use errors::ScoringError;
pub use metric::{MetricDefinition, MetricObservation, MetricUnit};
