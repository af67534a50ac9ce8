//! Application handlers.
//!
//! Query handlers that orchestrate domain calculators over the store port.

pub mod performance;

pub use performance::{
    ComputeCoachSnapshotHandler, ComputeCoachSnapshotQuery, ComputeScorecardHandler,
    ComputeScorecardQuery, ComputeTrendHandler, ComputeTrendQuery, RecommendPlaybooksHandler,
    RecommendPlaybooksQuery,
};
