//! Performance query handlers.
//!
//! Each handler owns a [`QueryCache`](crate::application::cache::QueryCache)
//! for its computation. Snapshot and playbook handlers build on the shared
//! scorecard handler instead of re-reading the current period.

mod compute_coach_snapshot;
mod compute_scorecard;
mod compute_trend;
mod recommend_playbooks;
mod scope_loader;

pub use compute_coach_snapshot::{ComputeCoachSnapshotHandler, ComputeCoachSnapshotQuery};
pub use compute_scorecard::{ComputeScorecardHandler, ComputeScorecardQuery};
pub use compute_trend::{ComputeTrendHandler, ComputeTrendQuery};
pub use recommend_playbooks::{RecommendPlaybooksHandler, RecommendPlaybooksQuery};
pub use scope_loader::ScopeLoader;
