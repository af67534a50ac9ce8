//! Progress Module - levels, mastery and streaks.
//!
//! - `LevelCalculator` - table-driven points to level, band progress and points-to-next
//! - `MasteryRecord` / `SkillCategory` - cumulative per-skill progress, never decreasing
//! - `StreakCalculator` - consecutive recent periods at full attainment

mod errors;
mod level;
mod mastery;
mod streak;

pub use errors::ProgressError;
pub use level::{LevelBand, LevelCalculator, LevelStatus, LevelTable};
pub use mastery::{MasteryRecord, SkillCategory};
pub use streak::{PeriodScore, StreakCalculator, FULL_ATTAINMENT_THRESHOLD};
