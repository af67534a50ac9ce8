//! Cache keys: computation mode plus a canonical scope signature.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::application::Scope;

/// Which computation a cached value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationMode {
    Scorecard,
    Trend,
    CoachSummary,
    CoachFull,
    Playbooks,
}

impl ComputationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputationMode::Scorecard => "scorecard",
            ComputationMode::Trend => "trend",
            ComputationMode::CoachSummary => "coach_summary",
            ComputationMode::CoachFull => "coach_full",
            ComputationMode::Playbooks => "playbooks",
        }
    }
}

impl fmt::Display for ComputationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one memoized computation.
///
/// Two scopes that differ only in member-id order produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    mode: ComputationMode,
    signature: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalScope<'a> {
    mode: ComputationMode,
    department: Option<&'a str>,
    team: Option<&'a str>,
    members: Vec<String>,
    preset: &'static str,
    start: String,
    end: String,
}

impl CacheKey {
    pub fn new(mode: ComputationMode, scope: &Scope) -> Self {
        let mut members: Vec<String> = scope
            .filter
            .member_ids
            .iter()
            .map(|id| id.to_string())
            .collect();
        members.sort();
        members.dedup();

        let canonical = CanonicalScope {
            mode,
            department: scope.filter.department.as_deref(),
            team: scope.filter.team.as_deref(),
            members,
            preset: scope.preset.label(),
            start: scope.period.start().to_string(),
            end: scope.period.end().to_string(),
        };
        // Plain strings and enums always serialize.
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Self {
            mode,
            signature: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn mode(&self) -> ComputationMode {
        self.mode
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mode, &self.signature[..12.min(self.signature.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Period, ProfileId};
    use crate::ports::ProfileFilter;
    use chrono::NaiveDate;

    fn week() -> Period {
        Period::week_ending(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap())
    }

    #[test]
    fn test_member_order_does_not_change_key() {
        let a = ProfileId::new();
        let b = ProfileId::new();
        let first = Scope::custom(ProfileFilter::members([a, b]), week());
        let second = Scope::custom(ProfileFilter::members([b, a]), week());
        assert_eq!(
            CacheKey::new(ComputationMode::Scorecard, &first),
            CacheKey::new(ComputationMode::Scorecard, &second)
        );
    }

    #[test]
    fn test_mode_and_scope_change_key() {
        let scope = Scope::custom(ProfileFilter::team("A"), week());
        let other_team = Scope::custom(ProfileFilter::team("B"), week());

        let scorecard = CacheKey::new(ComputationMode::Scorecard, &scope);
        assert_ne!(scorecard, CacheKey::new(ComputationMode::Trend, &scope));
        assert_ne!(scorecard, CacheKey::new(ComputationMode::Scorecard, &other_team));
    }

    #[test]
    fn test_team_and_department_are_not_confused() {
        let team = Scope::custom(ProfileFilter::team("sales"), week());
        let department = Scope::custom(ProfileFilter::department("sales"), week());
        assert_ne!(
            CacheKey::new(ComputationMode::Scorecard, &team),
            CacheKey::new(ComputationMode::Scorecard, &department)
        );
    }

    #[test]
    fn test_display_is_short() {
        let key = CacheKey::new(
            ComputationMode::Playbooks,
            &Scope::custom(ProfileFilter::everyone(), week()),
        );
        let shown = key.to_string();
        assert!(shown.starts_with("playbooks:"));
        assert_eq!(shown.len(), "playbooks:".len() + 12);
        assert_eq!(key.signature().len(), 64);
    }
}
