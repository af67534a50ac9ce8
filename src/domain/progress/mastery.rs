//! Skill categories and cumulative mastery records.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProfileId, SkillCategoryId};

use super::ProgressError;

/// A competency area achievements are grouped into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub id: SkillCategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display colour, e.g. `#2563eb`.
    #[serde(default)]
    pub color: String,
}

impl SkillCategory {
    pub fn new(id: SkillCategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            color: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// A profile's cumulative progress in one skill category.
///
/// Counters only move up: [`merge`](Self::merge) keeps field-wise maxima and
/// [`accumulate`](Self::accumulate) ignores negative increments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub profile_id: ProfileId,
    pub skill_category_id: SkillCategoryId,
    /// Cumulative progress percentage, 0-100.
    pub progress: f64,
    pub achievements_completed: u32,
    pub points_earned: u64,
}

impl MasteryRecord {
    pub fn new(profile_id: ProfileId, skill_category_id: SkillCategoryId) -> Self {
        Self {
            profile_id,
            skill_category_id,
            progress: 0.0,
            achievements_completed: 0,
            points_earned: 0,
        }
    }

    /// Adds newly earned progress. Negative or NaN progress is ignored.
    pub fn accumulate(&mut self, progress: f64, achievements: u32, points: u64) {
        if progress.is_finite() && progress > 0.0 {
            self.progress = (self.progress + progress).min(100.0);
        }
        self.achievements_completed = self.achievements_completed.saturating_add(achievements);
        self.points_earned = self.points_earned.saturating_add(points);
    }

    /// Folds a newer read of the same record in, never lowering a counter.
    pub fn merge(&mut self, other: &MasteryRecord) -> Result<(), ProgressError> {
        if self.profile_id != other.profile_id || self.skill_category_id != other.skill_category_id {
            return Err(ProgressError::MismatchedMasteryRecord);
        }
        if other.progress.is_finite() {
            self.progress = self.progress.max(other.progress.min(100.0));
        }
        self.achievements_completed = self.achievements_completed.max(other.achievements_completed);
        self.points_earned = self.points_earned.max(other.points_earned);
        Ok(())
    }
}
