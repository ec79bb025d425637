//! Evaluator tests — NL (non-linear), VIT (vitality), KC (knowledge),
//! BIO (biography).

use fabula_core::config::AnalysisConfig;
use fabula_core::models::chapter::Participation;
use fabula_core::models::identifiers::{ChapterId, ProjectId};
use fabula_core::models::violation::{Severity, Violation, ViolationKind};
use fabula_consistency::{AnalysisInput, ConsistencyPipeline};
use test_fixtures::*;

fn input() -> AnalysisInput {
    AnalysisInput {
        project: ProjectId("test".to_string()),
        chapters: chapters(8),
        markers: Vec::new(),
        mentions: Vec::new(),
        deaths: Vec::new(),
        facts: Vec::new(),
        knowledge_uses: Vec::new(),
    }
}

fn run(input: &AnalysisInput) -> Vec<Violation> {
    ConsistencyPipeline::with_defaults()
        .run(input)
        .unwrap()
        .violations
}

fn of_kind(violations: &[Violation], kind: ViolationKind) -> Vec<&Violation> {
    violations.iter().filter(|v| v.kind == kind).collect()
}

// ---- NL-01: linear narration produces zero flags ----

#[test]
fn nl_01_linear_narration_clean() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (1999, 1, 1), 0.95),
        date_marker(2, 0, (1999, 2, 1), 0.95),
        date_marker(3, 0, (1999, 3, 1), 0.95),
        date_marker(4, 0, (1999, 6, 1), 0.95),
    ];
    let violations = run(&input);
    assert!(of_kind(&violations, ViolationKind::NonLinearDivergence).is_empty());
}

// ---- NL-02: a flashback chapter is analepsis ----

#[test]
fn nl_02_analepsis_detected() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (1999, 3, 1), 0.95),
        date_marker(2, 0, (1999, 6, 1), 0.95),
        date_marker(3, 0, (1998, 1, 1), 0.95),
    ];
    let violations = run(&input);
    let nl = of_kind(&violations, ViolationKind::NonLinearDivergence);
    assert_eq!(nl.len(), 1);
    assert_eq!(nl[0].chapter, ChapterId(3));
    assert_eq!(nl[0].evidence["direction"], "analepsis");
    assert_eq!(nl[0].severity, Severity::Medium);
}

// ---- NL-03: divergence below the threshold is ignored ----

#[test]
fn nl_03_small_divergence_ignored() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (1999, 3, 10), 0.95),
        date_marker(2, 0, (1999, 3, 7), 0.95), // 3 days back
    ];
    let violations = run(&input);
    assert!(of_kind(&violations, ViolationKind::NonLinearDivergence).is_empty());
}

// ---- NL-04: an instance excursion is not non-linear narration ----

#[test]
fn nl_04_instance_transition_exempt() {
    use fabula_core::models::marker::TimeDirection;
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (2000, 1, 1), 0.95),
        year_offset_marker(2, 0, "x", 20, TimeDirection::Future, 0.8),
        days_later(3, 0, 3, 0.9),
    ];
    let violations = run(&input);
    assert!(of_kind(&violations, ViolationKind::NonLinearDivergence).is_empty());
}

// ---- NL-05: a jump the narrative returns from is prolepsis ----

#[test]
fn nl_05_prolepsis_detected() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (2000, 1, 1), 0.95),
        date_marker(2, 0, (2010, 1, 1), 0.95),
        date_marker(3, 0, (2000, 2, 1), 0.95),
    ];
    let violations = run(&input);
    let nl = of_kind(&violations, ViolationKind::NonLinearDivergence);
    let prolepsis: Vec<_> = nl
        .iter()
        .filter(|v| v.evidence["direction"] == "prolepsis")
        .collect();
    assert_eq!(prolepsis.len(), 1);
    assert_eq!(prolepsis[0].chapter, ChapterId(2));
    // The return itself reads as a flashback relative to the jump.
    assert!(nl.iter().any(|v| v.evidence["direction"] == "analepsis"
        && v.chapter == ChapterId(3)));
}

// ---- NL-06: a dead instance sighting becomes a flashback hint ----

#[test]
fn nl_06_dead_instance_sighting_is_flashback_hint() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (2000, 1, 1), 0.95),
        phase_marker(1, 20, "x", "elderly", 0.9),
        phase_marker(3, 0, "x", "elderly", 0.9),
    ];
    input.deaths = vec![instance_death("x", "x@phase:elder", 2, 0.9)];
    let violations = run(&input);
    let nl = of_kind(&violations, ViolationKind::NonLinearDivergence);
    assert_eq!(nl.len(), 1);
    assert_eq!(nl[0].severity, Severity::Low);
    assert_eq!(nl[0].chapter, ChapterId(3));
    assert_eq!(
        nl[0].instance.as_ref().map(|i| i.as_str()),
        Some("x@phase:elder")
    );
}

// ---- VIT-01: active participation after death ----

#[test]
fn vit_01_post_mortem_appearance() {
    let mut input = input();
    input.deaths = vec![death("victor", 3, 0.9)];
    input.mentions = vec![
        active_mention("victor", 2, 0.9),  // before death: fine
        passive_mention("victor", 5, 0.9), // remembered: fine
        active_mention("victor", 5, 0.9),  // violation
    ];
    let violations = run(&input);
    let pm = of_kind(&violations, ViolationKind::PostMortemAppearance);
    assert_eq!(pm.len(), 1);
    assert_eq!(pm[0].chapter, ChapterId(5));
    assert_eq!(pm[0].severity, Severity::High);
    assert_eq!(pm[0].evidence["death_record"]["chapter"], 3);
}

// ---- VIT-02: death of one instance leaves siblings alive ----

#[test]
fn vit_02_dual_instance_scenario() {
    let mut input = input();
    input.markers = vec![
        phase_marker(2, 0, "x", "young", 0.9),
        phase_marker(5, 0, "x", "elderly", 0.9),
    ];
    input.deaths = vec![instance_death("x", "x@phase:elder", 7, 0.9)];
    input.mentions = vec![
        mention("x", Some("x@phase:elder"), 8, Participation::Active, 0.9),
        mention("x", Some("x@phase:young"), 8, Participation::Active, 0.9),
        active_mention("x", 8, 0.9),
    ];
    let violations = run(&input);
    let pm = of_kind(&violations, ViolationKind::PostMortemAppearance);
    assert_eq!(pm.len(), 1);
    assert_eq!(
        pm[0].instance.as_ref().map(|i| i.as_str()),
        Some("x@phase:elder")
    );
}

// ---- VIT-03: instance created after a canonical death is an
// alternate temporal copy ----

#[test]
fn vit_03_post_death_instance_alive() {
    let mut input = input();
    input.deaths = vec![death("x", 3, 0.9)];
    input.markers = vec![age_marker(6, 0, "x", 20, 0.9)];
    input.mentions = vec![
        mention("x", Some("x@age:20"), 7, Participation::Active, 0.9),
        active_mention("x", 7, 0.9),
    ];
    let violations = run(&input);
    let pm = of_kind(&violations, ViolationKind::PostMortemAppearance);
    // Only the undifferentiated identity is dead.
    assert_eq!(pm.len(), 1);
    assert!(pm[0].instance.is_none());
}

// ---- KC-01: acting on a fact before learning it ----

#[test]
fn kc_01_anachronism() {
    let mut input = input();
    input.facts = vec![fact("ana", "secret:locket", 6, 0.9)];
    input.knowledge_uses = vec![usage("ana", "secret:locket", 2)];
    let violations = run(&input);
    let kc = of_kind(&violations, ViolationKind::Anachronism);
    assert_eq!(kc.len(), 1);
    assert_eq!(kc[0].chapter, ChapterId(2));
    // Four chapters early: severe.
    assert_eq!(kc[0].severity, Severity::High);
    assert_eq!(kc[0].evidence["learned_in"], 6);
}

// ---- KC-02: knowledge used after acquisition is clean ----

#[test]
fn kc_02_acquired_knowledge_clean() {
    let mut input = input();
    input.facts = vec![fact("ana", "secret:locket", 2, 0.9)];
    input.knowledge_uses = vec![usage("ana", "secret:locket", 5)];
    let violations = run(&input);
    assert!(of_kind(&violations, ViolationKind::Anachronism).is_empty());
}

// ---- KC-03: "known" compares story time, not discourse order ----

#[test]
fn kc_03_flashback_learning_is_not_anachronistic() {
    let mut input = input();
    // ch3 is printed last but is story-earliest.
    input.chapters = chapters(3);
    input.markers = vec![
        date_marker(1, 0, (1999, 3, 1), 0.95),
        date_marker(2, 0, (1999, 6, 1), 0.95),
        date_marker(3, 0, (1990, 1, 1), 0.95),
    ];
    input.facts = vec![fact("ana", "secret:locket", 3, 0.9)];
    input.knowledge_uses = vec![usage("ana", "secret:locket", 1)];
    let violations = run(&input);
    assert!(of_kind(&violations, ViolationKind::Anachronism).is_empty());
}

// ---- KC-04: decayed confidence via the scorer ----

#[test]
fn kc_04_knows_returns_decayed_confidence() {
    use fabula_consistency::KnowledgeScorer;
    use fabula_core::calendar::Gregorian;
    use fabula_core::models::identifiers::EntityId;
    use fabula_temporal::{TemporalMap, TimelineBuilder};

    let config = AnalysisConfig::default();
    let calendar = Gregorian;
    let mut map = TemporalMap::new(config.day_offset_clamp);
    TimelineBuilder::new(&config, &calendar)
        .build(
            &chapters(12),
            &[],
            &[],
            &[fact("ana", "secret:locket", 1, 1.0)],
            &mut map,
        )
        .unwrap();

    let scorer = KnowledgeScorer::new(&map, &config);
    let ana = EntityId::new("ana");
    let c = scorer.knows(&ana, "secret:locket", ChapterId(11)).unwrap();
    assert!((c - 0.7374).abs() < 1e-4, "got {c}");
    assert!(scorer.knows(&ana, "secret:ring", ChapterId(11)).is_none());
}

// ---- KC-05: decay distance counts chapters, not timeline events ----

#[test]
fn kc_05_decay_distance_is_chapter_scale() {
    use fabula_consistency::KnowledgeScorer;
    use fabula_core::calendar::Gregorian;
    use fabula_core::models::identifiers::EntityId;
    use fabula_temporal::{TemporalMap, TimelineBuilder};

    // Two positioned events in every chapter: the decayed confidence
    // after ten chapters must be the ten-chapter bound, unaffected by
    // how many events those chapters produced.
    let config = AnalysisConfig::default();
    let calendar = Gregorian;
    let mut map = TemporalMap::new(config.day_offset_clamp);
    let mut markers = Vec::new();
    for ch in 1..=11u32 {
        markers.push(date_marker(ch, 0, (2000, 1, ch), 0.95));
        markers.push(days_later(ch, 20, 1, 0.9));
    }
    TimelineBuilder::new(&config, &calendar)
        .build(
            &chapters(11),
            &markers,
            &[],
            &[fact("ana", "secret:locket", 1, 1.0)],
            &mut map,
        )
        .unwrap();

    let scorer = KnowledgeScorer::new(&map, &config);
    let ana = EntityId::new("ana");
    let c = scorer.knows(&ana, "secret:locket", ChapterId(11)).unwrap();
    assert!((c - 0.7374).abs() < 1e-4, "got {c}");
}

// ---- BIO-01: age regression without a flashback ----

#[test]
fn bio_01_age_regression() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (2000, 1, 1), 0.95),
        age_marker(1, 10, "x", 40, 0.9),
        age_marker(2, 0, "x", 30, 0.9),
    ];
    let violations = run(&input);
    let bio = of_kind(&violations, ViolationKind::AgeRegression);
    assert_eq!(bio.len(), 1);
    assert_eq!(bio[0].chapter, ChapterId(2));
    assert_eq!(bio[0].evidence["previous_age"], 40);
}

// ---- BIO-02: regression inside an established flashback is fine ----

#[test]
fn bio_02_flashback_regression_exempt() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (2000, 3, 1), 0.95),
        age_marker(1, 10, "x", 40, 0.9),
        date_marker(2, 0, (2000, 6, 1), 0.95),
        date_marker(3, 0, (1990, 1, 1), 0.95),
        age_marker(3, 10, "x", 30, 0.9),
    ];
    let violations = run(&input);
    assert!(of_kind(&violations, ViolationKind::AgeRegression).is_empty());
}

// ---- BIO-03: stated age incompatible with stated phase ----

#[test]
fn bio_03_phase_age_conflict() {
    let mut input = input();
    input.markers = vec![
        age_marker(1, 0, "x", 8, 0.9),
        phase_marker(1, 20, "x", "elderly", 0.9),
    ];
    let violations = run(&input);
    let bio = of_kind(&violations, ViolationKind::PhaseAgeConflict);
    assert_eq!(bio.len(), 1);
    assert_eq!(bio[0].severity, Severity::High);
    assert_eq!(bio[0].evidence["phase"], "elder");
}

// ---- BIO-04: irreconcilable birth years ----

#[test]
fn bio_04_birth_year_conflict() {
    let mut input = input();
    input.markers = vec![
        date_marker(1, 0, (2000, 1, 1), 0.95),
        age_marker(1, 10, "x", 40, 0.9),
        date_marker(2, 0, (2001, 1, 1), 0.95),
        age_marker(2, 10, "x", 30, 0.9),
    ];
    let violations = run(&input);
    let bio = of_kind(&violations, ViolationKind::BirthYearConflict);
    assert_eq!(bio.len(), 1);
}
