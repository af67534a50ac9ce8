//! Mastery & Level Calculator - points to tier, progress and points-to-next.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Percentage;

use super::ProgressError;

/// One tier of the level table. `max_points` is `None` only for the top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBand {
    pub label: String,
    pub min_points: u64,
    #[serde(default)]
    pub max_points: Option<u64>,
}

impl LevelBand {
    pub fn bounded(label: impl Into<String>, min_points: u64, max_points: u64) -> Self {
        Self {
            label: label.into(),
            min_points,
            max_points: Some(max_points),
        }
    }

    pub fn open(label: impl Into<String>, min_points: u64) -> Self {
        Self {
            label: label.into(),
            min_points,
            max_points: None,
        }
    }

    pub fn contains(&self, points: u64) -> bool {
        points >= self.min_points && self.max_points.map_or(true, |max| points <= max)
    }
}

/// Ordered, gap-free level bands starting at zero points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelBand>", into = "Vec<LevelBand>")]
pub struct LevelTable {
    bands: Vec<LevelBand>,
}

impl LevelTable {
    /// Validates and builds a table.
    ///
    /// Bands must start at 0, ascend without gaps or overlaps, and only the
    /// last band may (and must) be open-ended.
    pub fn new(bands: Vec<LevelBand>) -> Result<Self, ProgressError> {
        let Some(first) = bands.first() else {
            return Err(ProgressError::InvalidLevelTable("no bands".to_string()));
        };
        if first.min_points != 0 {
            return Err(ProgressError::InvalidLevelTable(format!(
                "first band '{}' must start at 0",
                first.label
            )));
        }

        let last_index = bands.len() - 1;
        for (index, band) in bands.iter().enumerate() {
            match (index == last_index, band.max_points) {
                (true, Some(_)) => {
                    return Err(ProgressError::InvalidLevelTable(format!(
                        "top band '{}' must be open-ended",
                        band.label
                    )))
                }
                (false, None) => {
                    return Err(ProgressError::InvalidLevelTable(format!(
                        "band '{}' is open-ended but not the top band",
                        band.label
                    )))
                }
                (false, Some(max)) => {
                    if max < band.min_points {
                        return Err(ProgressError::InvalidLevelTable(format!(
                            "band '{}' ends before it starts",
                            band.label
                        )));
                    }
                    let Some(expected) = max.checked_add(1) else {
                        return Err(ProgressError::InvalidLevelTable(format!(
                            "band '{}' leaves no room for a higher band",
                            band.label
                        )));
                    };
                    let next = &bands[index + 1];
                    if next.min_points != expected {
                        return Err(ProgressError::InvalidLevelTable(format!(
                            "band '{}' must start at {}",
                            next.label, expected
                        )));
                    }
                }
                (true, None) => {}
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[LevelBand] {
        &self.bands
    }

    /// Index of the band containing `points`.
    pub fn band_index(&self, points: u64) -> usize {
        self.bands
            .iter()
            .position(|band| band.contains(points))
            .unwrap_or(self.bands.len() - 1)
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            bands: vec![
                LevelBand::bounded("Bronze", 0, 999),
                LevelBand::bounded("Silver", 1000, 2499),
                LevelBand::bounded("Gold", 2500, 3999),
                LevelBand::bounded("Platinum", 4000, 5499),
                LevelBand::open("Diamond", 5500),
            ],
        }
    }
}

impl TryFrom<Vec<LevelBand>> for LevelTable {
    type Error = ProgressError;

    fn try_from(bands: Vec<LevelBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<LevelTable> for Vec<LevelBand> {
    fn from(table: LevelTable) -> Self {
        table.bands
    }
}

/// Where a points total sits in the level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStatus {
    /// 1-based band number.
    pub level: u8,
    pub label: String,
    pub points: u64,
    pub progress: Percentage,
    pub points_to_next: u64,
    pub next_label: Option<String>,
}

/// Table-driven level lookup.
#[derive(Debug, Clone, Default)]
pub struct LevelCalculator {
    table: LevelTable,
}

impl LevelCalculator {
    pub fn new(table: LevelTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    /// Coerces raw points: rounded, negatives and NaN clamp to 0.
    pub fn normalize_points(points: f64) -> u64 {
        if points.is_nan() || points <= 0.0 {
            return 0;
        }
        if points >= u64::MAX as f64 {
            return u64::MAX;
        }
        points.round() as u64
    }

    pub fn evaluate(&self, points: f64) -> LevelStatus {
        self.evaluate_points(Self::normalize_points(points))
    }

    pub fn evaluate_points(&self, points: u64) -> LevelStatus {
        let index = self.table.band_index(points);
        let band = &self.table.bands()[index];
        let next_label = self.table.bands().get(index + 1).map(|b| b.label.clone());

        let (progress, points_to_next) = match band.max_points {
            None => (Percentage::HUNDRED, 0),
            Some(max) => {
                let span = max.saturating_sub(band.min_points);
                let progress = if span == 0 {
                    Percentage::HUNDRED
                } else {
                    let ratio = points.saturating_sub(band.min_points) as f64 / span as f64;
                    Percentage::from_f64(ratio * 100.0)
                };
                (progress, max.saturating_add(1).saturating_sub(points))
            }
        };

        LevelStatus {
            level: (index + 1).min(u8::MAX as usize) as u8,
            label: band.label.clone(),
            points,
            progress,
            points_to_next,
            next_label,
        }
    }
}
