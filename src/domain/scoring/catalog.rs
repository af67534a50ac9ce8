//! Metric Catalog - the validated set of active metric definitions.

use std::collections::HashSet;

use crate::domain::foundation::MetricKey;

use super::{AttainmentRow, MetricDefinition, ScoringError};

/// Active, valid metric definitions in display order.
///
/// Built once per computation from whatever the store returned. Invalid
/// definitions are set aside with a [`ScoringError::Configuration`] so one
/// bad metric never blocks scoring of the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
}

impl MetricCatalog {
    /// Builds the catalog, returning the rejected definitions' errors alongside.
    ///
    /// Inactive definitions are dropped silently. A repeated key keeps the
    /// first occurrence and rejects the rest.
    pub fn build(
        definitions: impl IntoIterator<Item = MetricDefinition>,
    ) -> (Self, Vec<ScoringError>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut seen = HashSet::new();

        for definition in definitions {
            if !definition.active {
                continue;
            }
            if let Err(err) = definition.validate() {
                rejected.push(err);
                continue;
            }
            if !seen.insert(definition.key.clone()) {
                rejected.push(ScoringError::configuration(
                    definition.key.clone(),
                    "duplicate metric key",
                ));
                continue;
            }
            accepted.push(definition);
        }

        accepted.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.key.cmp(&b.key))
        });

        (Self { definitions: accepted }, rejected)
    }

    /// All accepted definitions in display order.
    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    /// Definitions that participate in the composite score.
    pub fn scorecard_metrics(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter().filter(|d| d.visible_on_scorecard)
    }

    /// Definitions shown in detail views only.
    pub fn informational_metrics(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter().filter(|d| !d.visible_on_scorecard)
    }

    pub fn get(&self, key: &MetricKey) -> Option<&MetricDefinition> {
        self.definitions.iter().find(|d| &d.key == key)
    }

    pub fn keys(&self) -> Vec<MetricKey> {
        self.definitions.iter().map(|d| d.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Verifies a row only carries metrics this catalog scores, each in the
    /// right section (composite vs informational).
    pub fn check_row(&self, row: &AttainmentRow) -> Result<(), ScoringError> {
        for key in row.metrics.keys() {
            match self.get(key) {
                Some(def) if def.visible_on_scorecard => {}
                _ => return Err(ScoringError::SchemaMismatch { metric: key.clone() }),
            }
        }
        for key in row.informational.keys() {
            match self.get(key) {
                Some(def) if !def.visible_on_scorecard => {}
                _ => return Err(ScoringError::SchemaMismatch { metric: key.clone() }),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Period, ProfileId};
    use crate::domain::scoring::MetricAttainment;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn key(k: &str) -> MetricKey {
        MetricKey::new(k).unwrap()
    }

    #[test]
    fn rejects_invalid_and_keeps_the_rest() {
        let (catalog, rejected) = MetricCatalog::build(vec![
            MetricDefinition::new(key("calls"), 50.0, 0.5),
            MetricDefinition::new(key("meetings"), -1.0, 0.5),
            MetricDefinition::new(key("emails"), 100.0, 0.5),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].metric().as_str(), "meetings");
    }

    #[test]
    fn drops_inactive_and_duplicate_keys() {
        let (catalog, rejected) = MetricCatalog::build(vec![
            MetricDefinition::new(key("calls"), 50.0, 0.5),
            MetricDefinition::new(key("calls"), 60.0, 0.5),
            MetricDefinition::new(key("demos"), 5.0, 0.5).inactive(),
        ]);

        assert_eq!(catalog.keys(), vec![key("calls")]);
        assert_eq!(catalog.get(&key("calls")).unwrap().target, 50.0);
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn orders_by_display_order_then_key() {
        let (catalog, _) = MetricCatalog::build(vec![
            MetricDefinition::new(key("b"), 1.0, 0.1).with_display_order(2),
            MetricDefinition::new(key("c"), 1.0, 0.1).with_display_order(1),
            MetricDefinition::new(key("a"), 1.0, 0.1).with_display_order(2),
        ]);
        assert_eq!(catalog.keys(), vec![key("c"), key("a"), key("b")]);
    }

    #[test]
    fn splits_visible_and_informational() {
        let (catalog, _) = MetricCatalog::build(vec![
            MetricDefinition::new(key("calls"), 50.0, 1.0),
            MetricDefinition::new(key("talk_time"), 300.0, 0.0).informational(),
        ]);
        assert_eq!(catalog.scorecard_metrics().count(), 1);
        assert_eq!(catalog.informational_metrics().count(), 1);
    }

    #[test]
    fn check_row_flags_unknown_metric() {
        let (catalog, _) = MetricCatalog::build(vec![MetricDefinition::new(key("calls"), 50.0, 1.0)]);
        let day = NaiveDate::from_ymd_opt(2024, 9, 9).unwrap();
        let mut metrics = BTreeMap::new();
        metrics.insert(key("calls"), MetricAttainment::new(10.0, 20.0));
        metrics.insert(key("ghost"), MetricAttainment::new(1.0, 1.0));
        let row = AttainmentRow {
            profile_id: ProfileId::new(),
            period: Period::day(day),
            metrics,
            informational: BTreeMap::new(),
            composite: 0,
        };

        assert_eq!(
            catalog.check_row(&row),
            Err(ScoringError::SchemaMismatch { metric: key("ghost") })
        );
    }
}
