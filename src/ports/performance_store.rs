use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, MetricKey, Period, ProfileId, SkillCategoryId,
};
use crate::domain::progress::MasteryRecord;
use crate::domain::scoring::{MetricDefinition, MetricObservation};

/// A person whose activity is scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub department: Option<String>,
    pub team: Option<String>,
}

impl Profile {
    pub fn new(id: ProfileId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            department: None,
            team: None,
        }
    }

    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn in_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }
}

/// Cohort selection. Every set field must match; an empty filter selects everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFilter {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<ProfileId>,
}

impl ProfileFilter {
    pub fn everyone() -> Self {
        Self::default()
    }

    pub fn department(department: impl Into<String>) -> Self {
        Self {
            department: Some(department.into()),
            ..Self::default()
        }
    }

    pub fn team(team: impl Into<String>) -> Self {
        Self {
            team: Some(team.into()),
            ..Self::default()
        }
    }

    pub fn members(member_ids: impl IntoIterator<Item = ProfileId>) -> Self {
        Self {
            member_ids: member_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let department_ok = self
            .department
            .as_ref()
            .map_or(true, |d| profile.department.as_ref() == Some(d));
        let team_ok = self
            .team
            .as_ref()
            .map_or(true, |t| profile.team.as_ref() == Some(t));
        let member_ok = self.member_ids.is_empty() || self.member_ids.contains(&profile.id);
        department_ok && team_ok && member_ok
    }
}

/// Read-only port over the performance data store.
///
/// The engine never writes through this port. Implementations must be safe to
/// call concurrently for different scopes.
#[async_trait]
pub trait PerformanceStore: Send + Sync {
    /// Lists metric definitions, optionally only active and/or scorecard-visible ones.
    async fn list_metric_definitions(
        &self,
        active_only: bool,
        scorecard_visible_only: bool,
    ) -> Result<Vec<MetricDefinition>, StoreError>;

    /// Lists observations for the given profiles and metrics.
    ///
    /// Empty `metric_keys` means all metrics. When `overlapping` is set only
    /// observations whose period overlaps it (inclusive) are returned.
    async fn list_observations(
        &self,
        profile_ids: &[ProfileId],
        metric_keys: &[MetricKey],
        overlapping: Option<Period>,
    ) -> Result<Vec<MetricObservation>, StoreError>;

    /// Lists mastery records. Empty `skill_category_ids` means all categories.
    async fn list_mastery_records(
        &self,
        profile_ids: &[ProfileId],
        skill_category_ids: &[SkillCategoryId],
    ) -> Result<Vec<MasteryRecord>, StoreError>;

    /// Lists profiles matching the filter, in a stable order.
    async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<Profile>, StoreError>;

    /// Counts badges awarded to the given profiles.
    async fn count_badges(&self, profile_ids: &[ProfileId]) -> Result<u64, StoreError>;
}

/// Errors that can occur when reading the store.
///
/// `Clone` so one failure can be handed to every caller waiting on the same query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
            StoreError::Query(_) | StoreError::Database(_) => ErrorCode::StoreQueryFailed,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_selects_everyone() {
        let profile = Profile::new(ProfileId::new(), "Ada").in_team("A");
        assert!(ProfileFilter::everyone().matches(&profile));
    }

    #[test]
    fn test_filter_fields_are_conjunctive() {
        let profile = Profile::new(ProfileId::new(), "Ada")
            .in_department("sales")
            .in_team("A");

        let filter = ProfileFilter {
            department: Some("sales".to_string()),
            team: Some("B".to_string()),
            member_ids: vec![],
        };
        assert!(!filter.matches(&profile));
        assert!(ProfileFilter::team("A").matches(&profile));
        assert!(ProfileFilter::department("sales").matches(&profile));
        assert!(!ProfileFilter::members([ProfileId::new()]).matches(&profile));
        assert!(ProfileFilter::members([profile.id]).matches(&profile));
    }

    #[test]
    fn test_error_conversion_from_sqlx() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));

        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_store_error_maps_to_domain_code() {
        let domain: DomainError = StoreError::Unavailable("down".to_string()).into();
        assert_eq!(domain.code, ErrorCode::StoreUnavailable);

        let domain: DomainError = StoreError::Query("bad".to_string()).into();
        assert_eq!(domain.code, ErrorCode::StoreQueryFailed);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::Unavailable("timeout".to_string()).to_string(),
            "Store unavailable: timeout"
        );
    }
}
