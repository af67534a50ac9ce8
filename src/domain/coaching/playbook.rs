//! Improvement playbooks and their catalog.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{MetricKey, PlaybookId};

/// A static remediation recipe tied to one or more metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    pub id: PlaybookId,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub metric_keys: Vec<MetricKey>,
    /// Ordered remediation steps.
    pub steps: Vec<String>,
}

impl Playbook {
    pub fn new(id: PlaybookId, title: impl Into<String>, metric_keys: Vec<MetricKey>) -> Self {
        Self {
            id,
            title: title.into(),
            summary: String::new(),
            metric_keys,
            steps: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_steps<S: Into<String>>(mut self, steps: impl IntoIterator<Item = S>) -> Self {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Number of distinct playbook metrics found in `lagging`.
    pub fn hit_count(&self, lagging: &HashSet<&MetricKey>) -> usize {
        let own: HashSet<&MetricKey> = self.metric_keys.iter().collect();
        own.intersection(lagging).count()
    }
}

/// Playbooks in declaration order. Order is the tie-breaker when ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybookCatalog {
    playbooks: Vec<Playbook>,
}

impl PlaybookCatalog {
    pub fn new(playbooks: Vec<Playbook>) -> Self {
        Self { playbooks }
    }

    pub fn playbooks(&self) -> &[Playbook] {
        &self.playbooks
    }

    pub fn get(&self, id: &PlaybookId) -> Option<&Playbook> {
        self.playbooks.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.playbooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playbooks.is_empty()
    }
}
