use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Percentage, ProfileId, SkillCategoryId, ValidationError};
use crate::domain::progress::{LevelCalculator, MasteryRecord, SkillCategory, StreakCalculator};

/// Achievements that count as one estimated badge.
pub const ACHIEVEMENTS_PER_BADGE: u64 = 5;

/// Streak lengths that each count as one estimated badge once reached.
pub const STREAK_BADGE_MILESTONES: &[u32] = &[3, 5, 10];

/// How much of the snapshot to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Level, score, points, streak and totals.
    Summary,
    /// Summary plus per-skill-category progress.
    Full,
}

impl SnapshotMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotMode::Summary => "summary",
            SnapshotMode::Full => "full",
        }
    }
}

impl fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SnapshotMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(SnapshotMode::Summary),
            "full" => Ok(SnapshotMode::Full),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("unknown snapshot mode '{}'", other),
            )),
        }
    }
}

/// What an estimated figure was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateBasis {
    AchievementAndStreakMilestones,
}

/// Badge total, tagged with how much it can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BadgeTotal {
    /// Counted from awarded badges.
    Exact { value: u64 },
    /// Derived from other figures because the badge count was unavailable.
    Estimated { value: u64, basis: EstimateBasis },
}

impl BadgeTotal {
    pub fn value(&self) -> u64 {
        match self {
            BadgeTotal::Exact { value } | BadgeTotal::Estimated { value, .. } => *value,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, BadgeTotal::Exact { .. })
    }

    /// Estimates badges per profile from achievements and streak milestones.
    pub fn estimate(profiles: &[(u64, u32)]) -> Self {
        let value = profiles
            .iter()
            .map(|(achievements, streak)| {
                let milestones = STREAK_BADGE_MILESTONES
                    .iter()
                    .filter(|m| streak >= *m)
                    .count() as u64;
                achievements / ACHIEVEMENTS_PER_BADGE + milestones
            })
            .sum();
        BadgeTotal::Estimated {
            value,
            basis: EstimateBasis::AchievementAndStreakMilestones,
        }
    }
}

/// Cohort-average progress in one skill category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillProgress {
    pub skill_category_id: SkillCategoryId,
    pub name: String,
    pub color: String,
    pub average_progress: f64,
}

/// Coaching overview for a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachSnapshot {
    pub mode: SnapshotMode,
    pub profile_count: usize,
    /// Mean level number, one decimal.
    pub average_level: f64,
    /// Level label of the average points total.
    pub level_label: String,
    pub average_score: i64,
    pub average_points: u64,
    pub level_progress: Percentage,
    pub points_to_next: u64,
    pub streak: u32,
    pub badges: BadgeTotal,
    pub achievements_total: u64,
    pub points_total: u64,
    /// Empty in summary mode.
    pub skill_progress: Vec<SkillProgress>,
}

/// Already-fetched inputs for one snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotInputs<'a> {
    pub mode: SnapshotMode,
    pub profile_ids: &'a [ProfileId],
    /// Current-period composite per profile.
    pub composites: &'a [i64],
    pub mastery_records: &'a [MasteryRecord],
    pub streaks: &'a HashMap<ProfileId, u32>,
    /// `None` when the badge count could not be read.
    pub awarded_badges: Option<u64>,
    pub skill_categories: &'a [SkillCategory],
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

impl CoachSnapshot {
    pub fn assemble(inputs: SnapshotInputs<'_>, levels: &LevelCalculator) -> Self {
        let records = merge_records(inputs.mastery_records);
        let profile_count = inputs.profile_ids.len();

        let mut points_by_profile: HashMap<ProfileId, u64> = HashMap::new();
        let mut achievements_by_profile: HashMap<ProfileId, u64> = HashMap::new();
        for record in records.values() {
            *points_by_profile.entry(record.profile_id).or_insert(0) += record.points_earned;
            *achievements_by_profile.entry(record.profile_id).or_insert(0) +=
                u64::from(record.achievements_completed);
        }

        let points_total: u64 = inputs
            .profile_ids
            .iter()
            .map(|p| points_by_profile.get(p).copied().unwrap_or(0))
            .sum();
        let achievements_total: u64 = inputs
            .profile_ids
            .iter()
            .map(|p| achievements_by_profile.get(p).copied().unwrap_or(0))
            .sum();

        let level_sum: f64 = inputs
            .profile_ids
            .iter()
            .map(|p| {
                let points = points_by_profile.get(p).copied().unwrap_or(0);
                f64::from(levels.evaluate_points(points).level)
            })
            .sum();
        let average_points = mean(points_total as f64, profile_count);
        let average_status = levels.evaluate(average_points);

        let composite_total: i64 = inputs.composites.iter().sum();
        let average_score = mean(composite_total as f64, inputs.composites.len()).round() as i64;

        let streak_values: Vec<u32> = inputs
            .profile_ids
            .iter()
            .map(|p| inputs.streaks.get(p).copied().unwrap_or(0))
            .collect();
        let streak = StreakCalculator::cohort_streak(&streak_values);

        let badges = match inputs.awarded_badges {
            Some(value) => BadgeTotal::Exact { value },
            None => {
                let per_profile: Vec<(u64, u32)> = inputs
                    .profile_ids
                    .iter()
                    .zip(&streak_values)
                    .map(|(p, s)| (achievements_by_profile.get(p).copied().unwrap_or(0), *s))
                    .collect();
                BadgeTotal::estimate(&per_profile)
            }
        };

        let skill_progress = match inputs.mode {
            SnapshotMode::Summary => Vec::new(),
            SnapshotMode::Full => inputs
                .skill_categories
                .iter()
                .map(|category| {
                    let total: f64 = inputs
                        .profile_ids
                        .iter()
                        .filter_map(|p| records.get(&(*p, category.id.clone())))
                        .map(|r| r.progress)
                        .sum();
                    SkillProgress {
                        skill_category_id: category.id.clone(),
                        name: category.name.clone(),
                        color: category.color.clone(),
                        average_progress: round_one_decimal(mean(total, profile_count)),
                    }
                })
                .collect(),
        };

        Self {
            mode: inputs.mode,
            profile_count,
            average_level: round_one_decimal(mean(level_sum, profile_count)),
            level_label: average_status.label,
            average_score,
            average_points: average_status.points,
            level_progress: average_status.progress,
            points_to_next: average_status.points_to_next,
            streak,
            badges,
            achievements_total,
            points_total,
            skill_progress,
        }
    }
}

/// Collapses duplicate reads of the same (profile, skill) record.
fn merge_records(records: &[MasteryRecord]) -> BTreeMap<(ProfileId, SkillCategoryId), MasteryRecord> {
    let mut merged: BTreeMap<(ProfileId, SkillCategoryId), MasteryRecord> = BTreeMap::new();
    for record in records {
        let key = (record.profile_id, record.skill_category_id.clone());
        match merged.get_mut(&key) {
            // Same key on both sides, so merge cannot fail.
            Some(existing) => {
                let _ = existing.merge(record);
            }
            None => {
                merged.insert(key, record.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
#[path = "coach_snapshot_test.rs"]
mod coach_snapshot_test;
