//! PostgreSQL implementation of PerformanceStore.
//!
//! Read-only queries over `metric_definitions`, `metric_observations`,
//! `mastery_records`, `profiles` and `badge_awards`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{MetricKey, Period, ProfileId, SkillCategoryId};
use crate::domain::progress::MasteryRecord;
use crate::domain::scoring::{MetricDefinition, MetricObservation, MetricUnit};
use crate::ports::{PerformanceStore, Profile, ProfileFilter, StoreError};

/// PostgreSQL implementation of PerformanceStore.
#[derive(Clone)]
pub struct PostgresPerformanceStore {
    pool: PgPool,
}

impl PostgresPerformanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {}", e)))
    }
}

fn uuids(profile_ids: &[ProfileId]) -> Vec<uuid::Uuid> {
    profile_ids.iter().map(|p| *p.as_uuid()).collect()
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Query(format!("Failed to get {}: {}", name, e)))
}

fn str_to_unit(s: &str) -> MetricUnit {
    match s {
        "currency" => MetricUnit::Currency,
        "minutes" => MetricUnit::Minutes,
        "percent" => MetricUnit::Percent,
        _ => MetricUnit::Count,
    }
}

fn row_to_definition(row: &PgRow) -> Result<MetricDefinition, StoreError> {
    let key: String = column(row, "key")?;
    let key = MetricKey::new(key).map_err(|e| StoreError::Query(e.to_string()))?;
    let unit: String = column(row, "unit")?;

    let mut definition = MetricDefinition::new(key, column(row, "target")?, column(row, "weight")?)
        .with_name(column::<String>(row, "name")?)
        .with_display_order(column(row, "display_order")?);
    definition.unit = str_to_unit(&unit);
    definition.category = column(row, "category")?;
    definition.visible_on_scorecard = column(row, "visible_on_scorecard")?;
    definition.active = column(row, "active")?;
    Ok(definition)
}

fn row_to_observation(row: &PgRow) -> Result<MetricObservation, StoreError> {
    let profile_id: uuid::Uuid = column(row, "profile_id")?;
    let metric_key: String = column(row, "metric_key")?;
    let metric_key = MetricKey::new(metric_key).map_err(|e| StoreError::Query(e.to_string()))?;
    let period = Period::new(column(row, "period_start")?, column(row, "period_end")?)
        .map_err(|e| StoreError::Query(e.to_string()))?;

    Ok(MetricObservation::new(
        ProfileId::from_uuid(profile_id),
        metric_key,
        column(row, "value")?,
        period,
    ))
}

fn row_to_mastery(row: &PgRow) -> Result<MasteryRecord, StoreError> {
    let profile_id: uuid::Uuid = column(row, "profile_id")?;
    let skill: String = column(row, "skill_category_id")?;
    let skill = SkillCategoryId::new(skill).map_err(|e| StoreError::Query(e.to_string()))?;
    let achievements: i32 = column(row, "achievements_completed")?;
    let points: i64 = column(row, "points_earned")?;

    let mut record = MasteryRecord::new(ProfileId::from_uuid(profile_id), skill);
    record.accumulate(
        column(row, "progress")?,
        u32::try_from(achievements).unwrap_or(0),
        u64::try_from(points).unwrap_or(0),
    );
    Ok(record)
}

fn row_to_profile(row: &PgRow) -> Result<Profile, StoreError> {
    let id: uuid::Uuid = column(row, "id")?;
    Ok(Profile {
        id: ProfileId::from_uuid(id),
        display_name: column(row, "display_name")?,
        department: column(row, "department")?,
        team: column(row, "team")?,
    })
}

#[async_trait]
impl PerformanceStore for PostgresPerformanceStore {
    async fn list_metric_definitions(
        &self,
        active_only: bool,
        scorecard_visible_only: bool,
    ) -> Result<Vec<MetricDefinition>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT key, name, target, weight, unit, category,
                   visible_on_scorecard, active, display_order
            FROM metric_definitions
            WHERE ($1 = FALSE OR active)
              AND ($2 = FALSE OR visible_on_scorecard)
            ORDER BY display_order, key
            "#,
        )
        .bind(active_only)
        .bind(scorecard_visible_only)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_definition).collect()
    }

    async fn list_observations(
        &self,
        profile_ids: &[ProfileId],
        metric_keys: &[MetricKey],
        overlapping: Option<Period>,
    ) -> Result<Vec<MetricObservation>, StoreError> {
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = metric_keys.iter().map(|k| k.as_str().to_string()).collect();

        let rows = sqlx::query(
            r#"
            SELECT profile_id, metric_key, value, period_start, period_end
            FROM metric_observations
            WHERE profile_id = ANY($1)
              AND (cardinality($2::text[]) = 0 OR metric_key = ANY($2))
              AND ($3::date IS NULL OR period_start <= $4::date)
              AND ($3::date IS NULL OR period_end >= $3::date)
            ORDER BY period_end, profile_id, metric_key
            "#,
        )
        .bind(uuids(profile_ids))
        .bind(keys)
        .bind(overlapping.map(|p| p.start()))
        .bind(overlapping.map(|p| p.end()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_observation).collect()
    }

    async fn list_mastery_records(
        &self,
        profile_ids: &[ProfileId],
        skill_category_ids: &[SkillCategoryId],
    ) -> Result<Vec<MasteryRecord>, StoreError> {
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }
        let skills: Vec<String> = skill_category_ids
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let rows = sqlx::query(
            r#"
            SELECT profile_id, skill_category_id, progress,
                   achievements_completed, points_earned
            FROM mastery_records
            WHERE profile_id = ANY($1)
              AND (cardinality($2::text[]) = 0 OR skill_category_id = ANY($2))
            ORDER BY profile_id, skill_category_id
            "#,
        )
        .bind(uuids(profile_ids))
        .bind(skills)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_mastery).collect()
    }

    async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_name, department, team
            FROM profiles
            WHERE ($1::text IS NULL OR department = $1)
              AND ($2::text IS NULL OR team = $2)
              AND (cardinality($3::uuid[]) = 0 OR id = ANY($3))
            ORDER BY display_name, id
            "#,
        )
        .bind(filter.department.as_deref())
        .bind(filter.team.as_deref())
        .bind(uuids(&filter.member_ids))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn count_badges(&self, profile_ids: &[ProfileId]) -> Result<u64, StoreError> {
        if profile_ids.is_empty() {
            return Ok(0);
        }
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM badge_awards WHERE profile_id = ANY($1)
            "#,
        )
        .bind(uuids(profile_ids))
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = column(&row, "count")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
