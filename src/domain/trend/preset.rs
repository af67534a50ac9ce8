//! Named reporting periods.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Period, ValidationError};

/// Reporting period presets offered to callers.
///
/// `this_*` presets are rolling: they run up to today and their trend series
/// end today. The others are fixed ranges whose trend series end at the range end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPreset {
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    Custom,
}

impl PeriodPreset {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodPreset::ThisWeek => "this_week",
            PeriodPreset::LastWeek => "last_week",
            PeriodPreset::ThisMonth => "this_month",
            PeriodPreset::LastMonth => "last_month",
            PeriodPreset::ThisQuarter => "this_quarter",
            PeriodPreset::Custom => "custom",
        }
    }

    pub fn is_rolling(&self) -> bool {
        matches!(
            self,
            PeriodPreset::ThisWeek | PeriodPreset::ThisMonth | PeriodPreset::ThisQuarter
        )
    }

    /// The date range this preset covers as of `today`.
    ///
    /// Returns `None` for `Custom`, whose range is supplied by the caller.
    /// Weeks start on Monday.
    pub fn resolve(&self, today: NaiveDate) -> Option<Period> {
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let month_start = today.with_day(1)?;

        let (start, end) = match self {
            PeriodPreset::ThisWeek => (week_start, today),
            PeriodPreset::LastWeek => (
                week_start - Duration::days(7),
                week_start - Duration::days(1),
            ),
            PeriodPreset::ThisMonth => (month_start, today),
            PeriodPreset::LastMonth => {
                let last_month_end = month_start - Duration::days(1);
                (last_month_end.with_day(1)?, last_month_end)
            }
            PeriodPreset::ThisQuarter => {
                let quarter_month = (today.month0() / 3) * 3 + 1;
                (NaiveDate::from_ymd_opt(today.year(), quarter_month, 1)?, today)
            }
            PeriodPreset::Custom => return None,
        };

        Period::new(start, end).ok()
    }
}

impl fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for PeriodPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "this_week" => Ok(PeriodPreset::ThisWeek),
            "last_week" => Ok(PeriodPreset::LastWeek),
            "this_month" => Ok(PeriodPreset::ThisMonth),
            "last_month" => Ok(PeriodPreset::LastMonth),
            "this_quarter" => Ok(PeriodPreset::ThisQuarter),
            "custom" => Ok(PeriodPreset::Custom),
            other => Err(ValidationError::invalid_format(
                "preset",
                format!("unknown preset '{}'", other),
            )),
        }
    }
}
