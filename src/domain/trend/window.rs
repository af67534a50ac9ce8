//! Fixed seven-day buckets for trend series.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Period;

use super::PeriodPreset;

/// Length of one trend bucket in days.
pub const BUCKET_DAYS: i64 = 7;

/// One seven-day slot of a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    /// Short label of the bucket's first day, e.g. "Sep 9".
    pub label: String,
    pub period: Period,
}

impl TrendBucket {
    fn ending_at(end: NaiveDate) -> Self {
        let period = Period::week_ending(end);
        Self {
            label: period.start().format("%b %-d").to_string(),
            period,
        }
    }
}

/// Consecutive buckets, oldest first, the newest ending on the window end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendWindow {
    buckets: Vec<TrendBucket>,
}

impl TrendWindow {
    /// `count` buckets (at least one) ending on `end`.
    pub fn ending_at(end: NaiveDate, count: usize) -> Self {
        let count = count.max(1) as i64;
        let buckets = (0..count)
            .rev()
            .map(|offset| TrendBucket::ending_at(end - Duration::days(offset * BUCKET_DAYS)))
            .collect();
        Self { buckets }
    }

    /// Builds the window for a preset.
    ///
    /// Rolling presets end today with `rolling_count` buckets. Fixed presets
    /// end at `range.end()` with enough buckets to cover the range.
    pub fn for_preset(
        preset: PeriodPreset,
        range: Period,
        today: NaiveDate,
        rolling_count: usize,
    ) -> Self {
        if preset.is_rolling() {
            Self::ending_at(today, rolling_count)
        } else {
            Self::ending_at(range.end(), Self::buckets_for_span(&range))
        }
    }

    /// `ceil(span_days / 7)`, minimum 1.
    pub fn buckets_for_span(range: &Period) -> usize {
        let span = range.span_days().max(1);
        ((span + BUCKET_DAYS - 1) / BUCKET_DAYS).max(1) as usize
    }

    pub fn buckets(&self) -> &[TrendBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The full range covered by all buckets.
    pub fn overall(&self) -> Option<Period> {
        let first = self.buckets.first()?;
        let last = self.buckets.last()?;
        Period::new(first.period.start(), last.period.end()).ok()
    }
}
