//! Report scope for the `apptivia-report` binary

use chrono::NaiveDate;
use serde::Deserialize;

use super::error::ValidationError;

/// Which cohort and period the report covers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Restrict to one department
    pub department: Option<String>,

    /// Restrict to one team
    pub team: Option<String>,

    /// Restrict to these profile ids (comma-separated UUIDs)
    pub member_ids: Option<String>,

    /// Period preset name; `this_week` when unset
    pub preset: Option<String>,

    /// Range start for the `custom` preset
    pub start: Option<NaiveDate>,

    /// Range end for the `custom` preset
    pub end: Option<NaiveDate>,

    /// Include per-skill progress in the coach snapshot
    #[serde(default)]
    pub full_snapshot: bool,
}

impl ReportConfig {
    /// Member ids as trimmed, non-empty strings
    pub fn member_id_list(&self) -> Vec<String> {
        self.member_ids
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Preset name, defaulting to `this_week`
    pub fn preset_name(&self) -> &str {
        self.preset.as_deref().unwrap_or("this_week")
    }

    /// Validate report configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        const PRESETS: &[&str] = &[
            "this_week",
            "last_week",
            "this_month",
            "last_month",
            "this_quarter",
            "custom",
        ];
        let preset = self.preset_name().trim().to_ascii_lowercase();
        if !PRESETS.contains(&preset.as_str()) {
            return Err(ValidationError::InvalidPreset(preset));
        }
        if preset == "custom" {
            match (self.start, self.end) {
                (Some(start), Some(end)) if end < start => {
                    return Err(ValidationError::InvalidReportRange)
                }
                (Some(_), Some(_)) => {}
                _ => return Err(ValidationError::MissingCustomRange),
            }
        }
        for id in self.member_id_list() {
            if uuid::Uuid::parse_str(&id).is_err() {
                return Err(ValidationError::InvalidMemberId(id));
            }
        }
        Ok(())
    }
}
