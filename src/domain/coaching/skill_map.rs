//! Metric to skill-category dictionary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{MetricKey, SkillCategoryId};

/// Static mapping from a metric to the skill category that coaches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillMap {
    entries: BTreeMap<MetricKey, SkillCategoryId>,
}

impl SkillMap {
    pub fn new(entries: BTreeMap<MetricKey, SkillCategoryId>) -> Self {
        Self { entries }
    }

    /// The skill category for a metric, if one is mapped.
    pub fn skill_for(&self, metric: &MetricKey) -> Option<&SkillCategoryId> {
        self.entries.get(metric)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &SkillCategoryId)> {
        self.entries.iter()
    }
}

impl FromIterator<(MetricKey, SkillCategoryId)> for SkillMap {
    fn from_iter<I: IntoIterator<Item = (MetricKey, SkillCategoryId)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
