//! Static coaching configuration and its built-in defaults.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MetricKey, PlaybookId, SkillCategoryId};
use crate::domain::progress::{LevelTable, SkillCategory};

use super::{Playbook, PlaybookCatalog, SkillMap};

/// Everything the engine treats as static configuration: level bands,
/// skill categories, the metric→skill dictionary and playbooks.
///
/// Missing sections fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingCatalog {
    #[serde(default = "default_level_table")]
    pub levels: LevelTable,
    #[serde(default = "default_skill_categories")]
    pub skill_categories: Vec<SkillCategory>,
    #[serde(default = "default_skill_map")]
    pub skill_map: SkillMap,
    #[serde(default = "default_playbooks")]
    pub playbooks: PlaybookCatalog,
}

impl CoachingCatalog {
    pub fn skill_category(&self, id: &SkillCategoryId) -> Option<&SkillCategory> {
        self.skill_categories.iter().find(|c| &c.id == id)
    }
}

impl Default for CoachingCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

fn default_level_table() -> LevelTable {
    DEFAULT_CATALOG.levels.clone()
}

fn default_skill_categories() -> Vec<SkillCategory> {
    DEFAULT_CATALOG.skill_categories.clone()
}

fn default_skill_map() -> SkillMap {
    DEFAULT_CATALOG.skill_map.clone()
}

fn default_playbooks() -> PlaybookCatalog {
    DEFAULT_CATALOG.playbooks.clone()
}

// Literal ids below are non-empty, so the constructors cannot fail.
fn metric(key: &str) -> MetricKey {
    MetricKey::new(key).unwrap_or_else(|_| unreachable!("built-in metric key"))
}

fn skill(id: &str) -> SkillCategoryId {
    SkillCategoryId::new(id).unwrap_or_else(|_| unreachable!("built-in skill id"))
}

fn playbook(id: &str, title: &str, metrics: &[&str]) -> Playbook {
    Playbook::new(
        PlaybookId::new(id).unwrap_or_else(|_| unreachable!("built-in playbook id")),
        title,
        metrics.iter().map(|m| metric(m)).collect(),
    )
}

static DEFAULT_CATALOG: Lazy<CoachingCatalog> = Lazy::new(|| CoachingCatalog {
    levels: LevelTable::default(),
    skill_categories: vec![
        SkillCategory::new(skill("prospecting"), "Prospecting")
            .with_description("Building pipeline through outbound activity")
            .with_color("#2563eb"),
        SkillCategory::new(skill("communication"), "Communication")
            .with_description("Written and follow-up outreach quality")
            .with_color("#7c3aed"),
        SkillCategory::new(skill("discovery"), "Discovery")
            .with_description("Qualifying needs in meetings and demos")
            .with_color("#059669"),
        SkillCategory::new(skill("pipeline"), "Pipeline Management")
            .with_description("Moving opportunities forward on time")
            .with_color("#d97706"),
        SkillCategory::new(skill("closing"), "Closing")
            .with_description("Turning proposals into revenue")
            .with_color("#dc2626"),
    ],
    skill_map: [
        ("calls", "prospecting"),
        ("emails", "communication"),
        ("meetings", "discovery"),
        ("demos", "discovery"),
        ("opportunities", "pipeline"),
        ("proposals", "closing"),
        ("deals_closed", "closing"),
        ("revenue", "closing"),
    ]
    .into_iter()
    .map(|(m, s)| (metric(m), skill(s)))
    .collect(),
    playbooks: PlaybookCatalog::new(vec![
        playbook("cold-call-power-hour", "Cold Call Power Hour", &["calls", "meetings"])
            .with_summary("Protected daily dialing blocks to lift connects and booked meetings")
            .with_steps([
                "Block one uninterrupted hour each morning for outbound calls",
                "Prepare a list of 40 prioritised prospects the evening before",
                "Open every call with a 15-second relevance statement",
                "Ask for a meeting on every live connect",
            ]),
        playbook("email-sequence-refresh", "Email Sequence Refresh", &["emails", "meetings"])
            .with_summary("Rework outbound sequences for reply rate")
            .with_steps([
                "Audit the last 50 sent emails for personalisation",
                "Cut each email to under 90 words with a single ask",
                "Add a breakup email as the final touch",
            ]),
        playbook(
            "discovery-call-framework",
            "Discovery Call Framework",
            &["meetings", "demos", "opportunities"],
        )
        .with_summary("Structured discovery that converts meetings into qualified opportunities")
        .with_steps([
            "Send an agenda before every first meeting",
            "Use five open questions on pain, impact and timeline",
            "Book the demo before the call ends",
            "Log qualification notes the same day",
        ]),
        playbook("pipeline-hygiene-sprint", "Pipeline Hygiene Sprint", &["opportunities", "proposals"])
            .with_summary("Weekly pipeline review to unstick stalled deals")
            .with_steps([
                "Review every opportunity older than 30 days",
                "Set a dated next step on each open opportunity",
                "Close out deals with no activity in 45 days",
            ]),
        playbook(
            "closing-confidence",
            "Closing Confidence",
            &["proposals", "deals_closed", "revenue"],
        )
        .with_summary("Tighter proposals and mutual close plans")
        .with_steps([
            "Agree a mutual close plan before sending a proposal",
            "Walk the buyer through pricing live, never by email only",
            "Confirm decision makers and signing process in writing",
        ]),
        playbook("multi-touch-cadence", "Multi-Touch Cadence", &["calls", "emails"])
            .with_summary("Pair calls and emails in a consistent touch pattern")
            .with_steps([
                "Follow every unanswered call with a same-day email",
                "Run eight touches over fourteen days per new prospect",
                "Track touches per prospect in the CRM",
            ]),
    ]),
});
