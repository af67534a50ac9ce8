use super::*;

fn skill(id: &str) -> SkillCategoryId {
    SkillCategoryId::new(id).unwrap()
}

fn record(profile: ProfileId, skill_id: &str, progress: f64, achievements: u32, points: u64) -> MasteryRecord {
    let mut record = MasteryRecord::new(profile, skill(skill_id));
    record.accumulate(progress, achievements, points);
    record
}

fn categories() -> Vec<SkillCategory> {
    vec![
        SkillCategory::new(skill("prospecting"), "Prospecting"),
        SkillCategory::new(skill("closing"), "Closing"),
    ]
}

struct Fixture {
    profiles: Vec<ProfileId>,
    records: Vec<MasteryRecord>,
    streaks: HashMap<ProfileId, u32>,
}

fn fixture() -> Fixture {
    let a = ProfileId::new();
    let b = ProfileId::new();
    Fixture {
        profiles: vec![a, b],
        records: vec![
            record(a, "prospecting", 80.0, 6, 1500),
            record(a, "closing", 20.0, 4, 500),
            record(b, "prospecting", 40.0, 2, 400),
        ],
        streaks: [(a, 5), (b, 0)].into_iter().collect(),
    }
}

fn snapshot(f: &Fixture, mode: SnapshotMode, badges: Option<u64>) -> CoachSnapshot {
    let categories = categories();
    CoachSnapshot::assemble(
        SnapshotInputs {
            mode,
            profile_ids: &f.profiles,
            composites: &[110, 71],
            mastery_records: &f.records,
            streaks: &f.streaks,
            awarded_badges: badges,
            skill_categories: &categories,
        },
        &LevelCalculator::default(),
    )
}

#[test]
fn test_summary_totals_and_averages() {
    let f = fixture();
    let s = snapshot(&f, SnapshotMode::Summary, Some(7));

    assert_eq!(s.profile_count, 2);
    assert_eq!(s.points_total, 2400);
    assert_eq!(s.achievements_total, 12);
    // a = 2000 points (Silver, level 2), b = 400 points (Bronze, level 1)
    assert_eq!(s.average_level, 1.5);
    assert_eq!(s.average_points, 1200);
    assert_eq!(s.level_label, "Silver");
    assert_eq!(s.points_to_next, 1300);
    assert_eq!(s.average_score, 91);
    // mean(5, 0) = 2.5 rounds to 3
    assert_eq!(s.streak, 3);
    assert_eq!(s.badges, BadgeTotal::Exact { value: 7 });
    assert!(s.skill_progress.is_empty());
}

#[test]
fn test_full_mode_reports_every_category() {
    let f = fixture();
    let s = snapshot(&f, SnapshotMode::Full, Some(0));

    assert_eq!(s.skill_progress.len(), 2);
    assert_eq!(s.skill_progress[0].skill_category_id, skill("prospecting"));
    assert_eq!(s.skill_progress[0].average_progress, 60.0);
    // only profile a has closing progress; b counts as zero
    assert_eq!(s.skill_progress[1].average_progress, 10.0);
}

#[test]
fn test_missing_badge_count_is_estimated() {
    let f = fixture();
    let s = snapshot(&f, SnapshotMode::Summary, None);

    // a: 10 achievements -> 2, streak 5 -> 2 milestones; b: 2 achievements -> 0
    assert_eq!(
        s.badges,
        BadgeTotal::Estimated {
            value: 4,
            basis: EstimateBasis::AchievementAndStreakMilestones
        }
    );
    assert!(!s.badges.is_exact());
    assert_eq!(s.badges.value(), 4);
}

#[test]
fn test_duplicate_records_are_merged_not_summed() {
    let a = ProfileId::new();
    let f = Fixture {
        profiles: vec![a],
        records: vec![
            record(a, "prospecting", 50.0, 3, 1200),
            record(a, "prospecting", 30.0, 2, 1000),
        ],
        streaks: HashMap::new(),
    };
    let s = snapshot(&f, SnapshotMode::Summary, Some(0));
    assert_eq!(s.points_total, 1200);
    assert_eq!(s.achievements_total, 3);
}

#[test]
fn test_empty_cohort_is_all_zero() {
    let f = Fixture {
        profiles: vec![],
        records: vec![],
        streaks: HashMap::new(),
    };
    let categories = categories();
    let s = CoachSnapshot::assemble(
        SnapshotInputs {
            mode: SnapshotMode::Full,
            profile_ids: &f.profiles,
            composites: &[],
            mastery_records: &f.records,
            streaks: &f.streaks,
            awarded_badges: None,
            skill_categories: &categories,
        },
        &LevelCalculator::default(),
    );

    assert_eq!(s.average_level, 0.0);
    assert_eq!(s.average_score, 0);
    assert_eq!(s.streak, 0);
    assert_eq!(s.badges.value(), 0);
    assert!(s.skill_progress.iter().all(|p| p.average_progress == 0.0));
}

#[test]
fn test_badge_total_serializes_with_kind_tag() {
    let json = serde_json::to_value(BadgeTotal::Exact { value: 3 }).unwrap();
    assert_eq!(json["kind"], "exact");
    assert_eq!(json["value"], 3);

    let json = serde_json::to_value(BadgeTotal::estimate(&[(10, 3)])).unwrap();
    assert_eq!(json["kind"], "estimated");
    assert_eq!(json["value"], 3);
    assert_eq!(json["basis"], "achievement_and_streak_milestones");
}

#[test]
fn test_snapshot_mode_parses() {
    assert_eq!("FULL".parse::<SnapshotMode>().unwrap(), SnapshotMode::Full);
    assert!("everything".parse::<SnapshotMode>().is_err());
}
