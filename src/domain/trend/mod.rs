//! Trend Module - weekly score history for a cohort.
//!
//! - `PeriodPreset` - named reporting ranges (`this_week`, `last_month`, ...)
//! - `TrendWindow` - consecutive seven-day buckets ending at a chosen day
//! - `TrendAggregator` - capped, weight-normalised score per bucket

mod aggregator;
mod preset;
mod window;

pub use aggregator::{TrendAggregator, TrendPoint, DEFAULT_TREND_PERCENTAGE_CAP};
pub use preset::PeriodPreset;
pub use window::{TrendBucket, TrendWindow, BUCKET_DAYS};
