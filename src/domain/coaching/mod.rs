//! Coaching Module - playbook recommendations for lagging metrics.
//!
//! # Components
//!
//! - `CoachingMatcher` - lagging-metric detection and hit-count ranking
//! - `PlaybookCatalog` / `SkillMap` - static remediation content and skill links
//! - `CoachingCatalog` - the bundled static configuration with built-in defaults

mod catalog;
mod matcher;
mod playbook;
mod skill_map;

pub use catalog::CoachingCatalog;
pub use matcher::{
    CoachingAdvice, CoachingMatcher, LaggingMetric, PlaybookMatch, DEFAULT_LAGGING_THRESHOLD,
    MAX_RECOMMENDATIONS,
};
pub use playbook::{Playbook, PlaybookCatalog};
pub use skill_map::SkillMap;
