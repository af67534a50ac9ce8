pub mod coach_snapshot;
pub mod scorecard;

pub use coach_snapshot::{
    BadgeTotal, CoachSnapshot, EstimateBasis, SkillProgress, SnapshotInputs, SnapshotMode,
    ACHIEVEMENTS_PER_BADGE, STREAK_BADGE_MILESTONES,
};
pub use scorecard::Scorecard;
