//! Apptivia report
//!
//! Computes the scorecard, trend, coach snapshot and coaching advice for one
//! scope and prints them as a single JSON document on stdout.
//!
//! # Usage
//!
//! ```bash
//! APPTIVIA__DATABASE__URL=postgres://localhost/apptivia \
//! APPTIVIA__REPORT__TEAM=east \
//! APPTIVIA__REPORT__PRESET=last_week \
//! apptivia-report
//!
//! # Full snapshot with per-skill progress
//! APPTIVIA__REPORT__FULL_SNAPSHOT=true apptivia-report
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to override the configured level.

use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info};

use apptivia_scoring::adapters::{PostgresPerformanceStore, YamlCatalogLoader};
use apptivia_scoring::application::{EngineSettings, PerformanceEngine, QueryError, Scope};
use apptivia_scoring::config::{AppConfig, ReportConfig};
use apptivia_scoring::domain::coaching::{CoachingAdvice, CoachingCatalog};
use apptivia_scoring::domain::dashboard::{CoachSnapshot, Scorecard, SnapshotMode};
use apptivia_scoring::domain::foundation::{Period, ProfileId};
use apptivia_scoring::domain::trend::{PeriodPreset, TrendPoint};
use apptivia_scoring::ports::ProfileFilter;
use apptivia_scoring::telemetry;

type BoxError = Box<dyn Error + Send + Sync>;

/// One computed part of the report, or the error that stopped it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Section<'a, T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a, T> Section<'a, T> {
    fn from_outcome(name: &str, outcome: &'a Result<Arc<T>, QueryError>) -> Self {
        match outcome {
            Ok(value) => Self {
                value: Some(value.as_ref()),
                error: None,
            },
            Err(err) => {
                error!(section = name, error = %err, "Report section failed");
                Self {
                    value: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    scope: &'a Scope,
    scorecard: Section<'a, Scorecard>,
    trend: Section<'a, Vec<TrendPoint>>,
    coach_snapshot: Section<'a, CoachSnapshot>,
    coaching: Section<'a, CoachingAdvice>,
}

impl Report<'_> {
    fn failed_sections(&self) -> usize {
        [
            self.scorecard.failed(),
            self.trend.failed(),
            self.coach_snapshot.failed(),
            self.coaching.failed(),
        ]
        .iter()
        .filter(|failed| **failed)
        .count()
    }
}

/// Resolves the configured report scope against `today`.
fn report_scope(report: &ReportConfig, today: NaiveDate) -> Result<Scope, BoxError> {
    let member_ids = report
        .member_id_list()
        .iter()
        .map(|id| ProfileId::from_str(id))
        .collect::<Result<Vec<_>, _>>()?;
    let filter = ProfileFilter {
        department: report.department.clone(),
        team: report.team.clone(),
        member_ids,
    };

    let preset = PeriodPreset::from_str(report.preset_name())?;
    let scope = match (preset, report.start, report.end) {
        (PeriodPreset::Custom, Some(start), Some(end)) => {
            Scope::custom(filter, Period::new(start, end)?)
        }
        _ => Scope::for_preset(filter, preset, today)?,
    };
    Ok(scope)
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    let pool = config
        .database
        .pool_options()
        .connect_with(config.database.connect_options()?)
        .await?;
    let store = PostgresPerformanceStore::new(pool);
    if config.database.run_migrations {
        store.migrate().await?;
        info!("Database migrations applied");
    }

    let catalog = match &config.scoring.catalog_path {
        Some(path) => YamlCatalogLoader::new(path).load().await?,
        None => CoachingCatalog::default(),
    };

    let engine = PerformanceEngine::new(
        Arc::new(store),
        catalog,
        EngineSettings::from(&config.scoring),
    );
    let scope = report_scope(&config.report, Local::now().date_naive())?;
    let mode = if config.report.full_snapshot {
        SnapshotMode::Full
    } else {
        SnapshotMode::Summary
    };
    info!(preset = %scope.preset, start = %scope.period.start(), end = %scope.period.end(), "Computing report");

    // Each section fails on its own; the others are still reported.
    let (scorecard, trend, snapshot, coaching) = tokio::join!(
        engine.compute_scorecard(&scope),
        engine.compute_trend(&scope),
        engine.compute_coach_snapshot(&scope, mode),
        engine.coaching_advice(&scope),
    );

    let report = Report {
        scope: &scope,
        scorecard: Section::from_outcome("scorecard", &scorecard),
        trend: Section::from_outcome("trend", &trend),
        coach_snapshot: Section::from_outcome("coach_snapshot", &snapshot),
        coaching: Section::from_outcome("coaching", &coaching),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    match report.failed_sections() {
        0 => Ok(()),
        failed => Err(format!("{} of 4 report sections failed", failed).into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.engine);
    config.validate()?;

    if let Err(err) = run(config).await {
        error!(error = %err, "Report failed");
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 12).unwrap()
    }

    #[test]
    fn test_default_scope_is_this_week() {
        let scope = report_scope(&ReportConfig::default(), today()).unwrap();
        assert_eq!(scope.preset, PeriodPreset::ThisWeek);
        assert_eq!(scope.period.end(), today());
        assert_eq!(scope.filter, ProfileFilter::everyone());
    }

    #[test]
    fn test_custom_range_and_members() {
        let member = ProfileId::new();
        let report = ReportConfig {
            team: Some("east".into()),
            member_ids: Some(format!(" {} ,", member)),
            preset: Some("custom".into()),
            start: Some(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()),
            ..Default::default()
        };

        let scope = report_scope(&report, today()).unwrap();
        assert_eq!(scope.preset, PeriodPreset::Custom);
        assert_eq!(scope.period.span_days(), 31);
        assert_eq!(scope.filter.member_ids, vec![member]);
        assert_eq!(scope.filter.team.as_deref(), Some("east"));
    }

    #[test]
    fn test_bad_member_id_is_rejected() {
        let report = ReportConfig {
            member_ids: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert!(report_scope(&report, today()).is_err());
    }

    #[test]
    fn test_failed_section_keeps_the_others() {
        let scope = report_scope(&ReportConfig::default(), today()).unwrap();
        let advice: Result<Arc<CoachingAdvice>, QueryError> =
            Ok(Arc::new(CoachingAdvice::default()));
        let trend: Result<Arc<Vec<TrendPoint>>, QueryError> = Ok(Arc::new(Vec::new()));
        let failed: Result<Arc<Scorecard>, QueryError> = Err(QueryError::Cancelled);
        let snapshot: Result<Arc<CoachSnapshot>, QueryError> = Err(QueryError::Cancelled);

        let report = Report {
            scope: &scope,
            scorecard: Section::from_outcome("scorecard", &failed),
            trend: Section::from_outcome("trend", &trend),
            coach_snapshot: Section::from_outcome("coach_snapshot", &snapshot),
            coaching: Section::from_outcome("coaching", &advice),
        };
        assert_eq!(report.failed_sections(), 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scorecard"]["error"], "Computation cancelled");
        assert!(json["scorecard"].get("value").is_none());
        assert_eq!(json["trend"]["value"], serde_json::json!([]));
        assert!(json["coaching"]["value"]["playbooks"].is_array());
    }
}
