//! Query scope: who is being scored and over which dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Period, ValidationError};
use crate::domain::trend::PeriodPreset;
use crate::ports::ProfileFilter;

/// Department/team/member filters plus the reporting period.
///
/// Every externally triggered computation is parameterised by a scope, and
/// every cache key is derived from one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub filter: ProfileFilter,
    pub preset: PeriodPreset,
    pub period: Period,
}

impl Scope {
    /// A scope over an explicit date range.
    pub fn custom(filter: ProfileFilter, period: Period) -> Self {
        Self {
            filter,
            preset: PeriodPreset::Custom,
            period,
        }
    }

    /// A scope over a named preset resolved against `today`.
    pub fn for_preset(
        filter: ProfileFilter,
        preset: PeriodPreset,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let period = preset.resolve(today).ok_or_else(|| {
            ValidationError::invalid_format("preset", "custom preset needs an explicit range")
        })?;
        Ok(Self {
            filter,
            preset,
            period,
        })
    }
}
