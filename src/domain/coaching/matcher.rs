//! Coaching Recommendation Matcher - lagging metrics to ranked playbooks.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::foundation::{MetricKey, SkillCategoryId};
use crate::domain::scoring::AttainmentRow;

use super::{Playbook, PlaybookCatalog, SkillMap};

/// Metrics below this attainment percentage are lagging.
pub const DEFAULT_LAGGING_THRESHOLD: f64 = 80.0;

/// Upper bound on returned playbooks.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// A metric under the lagging threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaggingMetric {
    pub key: MetricKey,
    /// Attainment percentage; the cohort mean when several rows are in scope.
    pub percentage: f64,
    /// Where "open coaching for this metric" links to. `None` when unmapped.
    pub skill_category: Option<SkillCategoryId>,
}

/// A recommended playbook and how many lagging metrics it addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookMatch {
    pub playbook: Playbook,
    pub hit_count: usize,
}

/// Lagging metrics plus the ranked playbooks for them.
///
/// Empty `playbooks` means nothing is lagging; callers show their own
/// "keep it up" message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingAdvice {
    pub lagging: Vec<LaggingMetric>,
    pub playbooks: Vec<PlaybookMatch>,
}

impl CoachingAdvice {
    pub fn is_on_track(&self) -> bool {
        self.lagging.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoachingMatcher {
    lagging_threshold: f64,
    max_results: usize,
}

impl Default for CoachingMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_LAGGING_THRESHOLD, MAX_RECOMMENDATIONS)
    }
}

impl CoachingMatcher {
    pub fn new(lagging_threshold: f64, max_results: usize) -> Self {
        Self {
            lagging_threshold,
            max_results,
        }
    }

    /// Scorecard metrics whose (mean) percentage is below the threshold,
    /// worst first.
    ///
    /// With several rows each metric is averaged over the rows that carry it.
    pub fn lagging_metrics(&self, rows: &[AttainmentRow], skills: &SkillMap) -> Vec<LaggingMetric> {
        let mut sums: BTreeMap<&MetricKey, (f64, usize)> = BTreeMap::new();
        for row in rows {
            for (key, attainment) in &row.metrics {
                let entry = sums.entry(key).or_insert((0.0, 0));
                entry.0 += attainment.percentage;
                entry.1 += 1;
            }
        }

        let mut lagging: Vec<LaggingMetric> = sums
            .into_iter()
            .map(|(key, (total, count))| (key, total / count as f64))
            .filter(|(_, percentage)| *percentage < self.lagging_threshold)
            .map(|(key, percentage)| LaggingMetric {
                key: key.clone(),
                percentage,
                skill_category: skills.skill_for(key).cloned(),
            })
            .collect();

        lagging.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
        lagging
    }

    /// Ranks playbooks by how many lagging metrics they cover.
    ///
    /// Playbooks with no hits are dropped; ties keep catalog order.
    pub fn rank_playbooks(
        &self,
        lagging: &[LaggingMetric],
        catalog: &PlaybookCatalog,
    ) -> Vec<PlaybookMatch> {
        if lagging.is_empty() {
            return Vec::new();
        }
        let lagging_keys: HashSet<&MetricKey> = lagging.iter().map(|m| &m.key).collect();

        let mut matches: Vec<PlaybookMatch> = catalog
            .playbooks()
            .iter()
            .filter_map(|playbook| {
                let hit_count = playbook.hit_count(&lagging_keys);
                (hit_count > 0).then(|| PlaybookMatch {
                    playbook: playbook.clone(),
                    hit_count,
                })
            })
            .collect();

        // Vec::sort_by_key is stable.
        matches.sort_by_key(|m| std::cmp::Reverse(m.hit_count));
        matches.truncate(self.max_results);
        matches
    }

    pub fn advise(
        &self,
        rows: &[AttainmentRow],
        skills: &SkillMap,
        catalog: &PlaybookCatalog,
    ) -> CoachingAdvice {
        let lagging = self.lagging_metrics(rows, skills);
        let playbooks = self.rank_playbooks(&lagging, catalog);
        CoachingAdvice { lagging, playbooks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Period, PlaybookId, ProfileId};
    use crate::domain::scoring::MetricAttainment;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn key(k: &str) -> MetricKey {
        MetricKey::new(k).unwrap()
    }

    fn playbook(id: &str, keys: &[&str]) -> Playbook {
        Playbook::new(
            PlaybookId::new(id).unwrap(),
            id,
            keys.iter().map(|k| key(k)).collect(),
        )
    }

    fn row(percentages: &[(&str, f64)]) -> AttainmentRow {
        AttainmentRow {
            profile_id: ProfileId::new(),
            period: Period::day(NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()),
            metrics: percentages
                .iter()
                .map(|(k, p)| (key(k), MetricAttainment::new(*p, *p)))
                .collect(),
            informational: BTreeMap::new(),
            composite: 0,
        }
    }

    fn lagging(keys: &[&str]) -> Vec<LaggingMetric> {
        keys.iter()
            .map(|k| LaggingMetric {
                key: key(k),
                percentage: 10.0,
                skill_category: None,
            })
            .collect()
    }

    #[test]
    fn more_hits_rank_first() {
        let catalog = PlaybookCatalog::new(vec![
            playbook("one-hit", &["calls", "demos"]),
            playbook("two-hits", &["calls", "emails"]),
        ]);

        let ranked = CoachingMatcher::default().rank_playbooks(&lagging(&["calls", "emails"]), &catalog);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].playbook.id.as_str(), "two-hits");
        assert_eq!(ranked[0].hit_count, 2);
        assert_eq!(ranked[1].hit_count, 1);
    }

    #[test]
    fn zero_hit_playbooks_are_dropped() {
        let catalog = PlaybookCatalog::new(vec![
            playbook("demos", &["demos"]),
            playbook("calls", &["calls"]),
        ]);
        let ranked = CoachingMatcher::default().rank_playbooks(&lagging(&["calls"]), &catalog);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].playbook.id.as_str(), "calls");
    }

    #[test]
    fn ties_keep_declaration_order_and_cap_at_three() {
        let catalog = PlaybookCatalog::new(vec![
            playbook("a", &["calls"]),
            playbook("b", &["calls"]),
            playbook("c", &["calls"]),
            playbook("d", &["calls"]),
        ]);
        let ranked = CoachingMatcher::default().rank_playbooks(&lagging(&["calls"]), &catalog);
        let ids: Vec<_> = ranked.iter().map(|m| m.playbook.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn nothing_lagging_means_no_playbooks() {
        let catalog = PlaybookCatalog::new(vec![playbook("a", &["calls"])]);
        let advice = CoachingMatcher::default().advise(
            &[row(&[("calls", 95.0)])],
            &SkillMap::default(),
            &catalog,
        );
        assert!(advice.is_on_track());
        assert!(advice.playbooks.is_empty());
    }

    #[test]
    fn cohort_uses_mean_percentage() {
        let rows = vec![row(&[("calls", 60.0)]), row(&[("calls", 110.0)])];
        // mean 85 -> not lagging
        assert!(CoachingMatcher::default()
            .lagging_metrics(&rows, &SkillMap::default())
            .is_empty());

        let rows = vec![row(&[("calls", 50.0)]), row(&[("calls", 100.0)])];
        let lagging = CoachingMatcher::default().lagging_metrics(&rows, &SkillMap::default());
        assert_eq!(lagging.len(), 1);
        assert_eq!(lagging[0].percentage, 75.0);
    }

    #[test]
    fn lagging_metrics_resolve_skill_links() {
        let skills: SkillMap = [(key("calls"), SkillCategoryId::new("prospecting").unwrap())]
            .into_iter()
            .collect();
        let lagging = CoachingMatcher::default()
            .lagging_metrics(&[row(&[("calls", 10.0), ("emails", 20.0)])], &skills);

        assert_eq!(lagging[0].key.as_str(), "calls");
        assert_eq!(lagging[0].skill_category.as_ref().unwrap().as_str(), "prospecting");
        assert!(lagging[1].skill_category.is_none());
    }

    #[test]
    fn threshold_is_exclusive() {
        let lagging = CoachingMatcher::default()
            .lagging_metrics(&[row(&[("calls", 80.0)])], &SkillMap::default());
        assert!(lagging.is_empty());
    }

    proptest! {
        #[test]
        fn prop_ranking_is_bounded_stable_and_hit_only(
            playbook_keys in proptest::collection::vec(
                proptest::collection::vec(0usize..6, 0..4), 0..10),
            lagging_idx in proptest::collection::vec(0usize..6, 0..6),
        ) {
            let names = ["calls", "emails", "meetings", "demos", "opportunities", "revenue"];
            let catalog = PlaybookCatalog::new(
                playbook_keys
                    .iter()
                    .enumerate()
                    .map(|(i, ks)| {
                        let keys: Vec<&str> = ks.iter().map(|k| names[*k]).collect();
                        playbook(&format!("p{:02}", i), &keys)
                    })
                    .collect(),
            );
            let lagging_names: Vec<&str> = lagging_idx.iter().map(|k| names[*k]).collect();

            let ranked = CoachingMatcher::default().rank_playbooks(&lagging(&lagging_names), &catalog);

            prop_assert!(ranked.len() <= MAX_RECOMMENDATIONS);
            prop_assert!(ranked.iter().all(|m| m.hit_count > 0));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].hit_count >= pair[1].hit_count);
                if pair[0].hit_count == pair[1].hit_count {
                    prop_assert!(pair[0].playbook.id < pair[1].playbook.id);
                }
            }
        }
    }
}
