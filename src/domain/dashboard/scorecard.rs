use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Period, ProfileId};
use crate::domain::scoring::AttainmentRow;

/// Scored rows for a cohort plus headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub period: Period,
    pub rows: Vec<AttainmentRow>,
    /// Highest composite; the earlier row wins a tie.
    pub top_performer: Option<ProfileId>,
    /// Rounded mean composite, 0 for an empty cohort.
    pub cohort_average: i64,
    /// Rows at or above full attainment.
    pub above_target_count: usize,
    /// Rows under the lagging threshold.
    pub below_threshold_count: usize,
}

impl Scorecard {
    pub fn from_rows(
        period: Period,
        rows: Vec<AttainmentRow>,
        full_attainment_threshold: f64,
        lagging_threshold: f64,
    ) -> Self {
        let mut top: Option<&AttainmentRow> = None;
        for row in &rows {
            if top.map_or(true, |best| row.composite > best.composite) {
                top = Some(row);
            }
        }
        let top_performer = top.map(|row| row.profile_id);

        let cohort_average = if rows.is_empty() {
            0
        } else {
            let total: i64 = rows.iter().map(|r| r.composite).sum();
            (total as f64 / rows.len() as f64).round() as i64
        };

        let above_target_count = rows
            .iter()
            .filter(|r| r.meets(full_attainment_threshold))
            .count();
        let below_threshold_count = rows
            .iter()
            .filter(|r| !r.meets(lagging_threshold))
            .count();

        Self {
            period,
            rows,
            top_performer,
            cohort_average,
            above_target_count,
            below_threshold_count,
        }
    }

    pub fn row_for(&self, profile_id: &ProfileId) -> Option<&AttainmentRow> {
        self.rows.iter().find(|r| &r.profile_id == profile_id)
    }
}

#[cfg(test)]
#[path = "scorecard_test.rs"]
mod scorecard_test;
