//! Entity biography checks across chapters.
//!
//! Links every temporal instance of an entity into one biography and
//! looks for impossibilities: ages that regress without a flashback,
//! ages incompatible with stated life phases, and birth years that
//! cannot all be true.

use fabula_core::config::AnalysisConfig;
use fabula_core::models::event::TimelineEvent;
use fabula_core::models::identifiers::{ChapterId, Confidence, EntityId};
use fabula_core::models::instance::{Discriminator, TemporalInstance};
use fabula_core::models::violation::{Severity, Violation, ViolationKind};
use fabula_core::{FxHashMap, FxHashSet};
use fabula_temporal::TemporalMap;

pub fn check(
    map: &TemporalMap,
    events: &[TimelineEvent],
    flashback_chapters: &FxHashSet<ChapterId>,
    config: &AnalysisConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let chapter_years = chapter_years(events);
    let mut by_entity: FxHashMap<&EntityId, Vec<&TemporalInstance>> = FxHashMap::default();
    for instance in map.instances() {
        by_entity.entry(&instance.entity).or_default().push(instance);
    }

    for (entity, instances) in &by_entity {
        check_age_regression(map, entity, instances, flashback_chapters, &mut violations);
        check_phase_age(entity, instances, config, &mut violations);
        check_birth_years(entity, instances, &chapter_years, config, &mut violations);
    }

    violations
}

/// Year of the first trusted dated event per chapter.
fn chapter_years(events: &[TimelineEvent]) -> FxHashMap<ChapterId, i32> {
    use chrono::Datelike;
    let mut years = FxHashMap::default();
    for event in events {
        if event.superseded {
            continue;
        }
        if let Some(date) = event.story_date {
            years.entry(event.chapter).or_insert_with(|| date.year());
        }
    }
    years
}

/// Stated ages must not move backwards in discourse order unless the
/// chapter is an established flashback. Phase-only instances are
/// exempt: past/future selves are explicit temporal copies.
fn check_age_regression(
    map: &TemporalMap,
    entity: &EntityId,
    instances: &[&TemporalInstance],
    flashback_chapters: &FxHashSet<ChapterId>,
    violations: &mut Vec<Violation>,
) {
    let discourse = |c: ChapterId| {
        map.chapter_meta(c)
            .map(|m| m.discourse_order)
            .unwrap_or(c.0)
    };

    let mut timeline: Vec<(u32, ChapterId, i64, Confidence)> = instances
        .iter()
        .filter_map(|i| match i.discriminator {
            Discriminator::Age { years } => Some((
                discourse(i.origin_chapter),
                i.origin_chapter,
                i64::from(years),
                i.confidence,
            )),
            _ => None,
        })
        .collect();
    timeline.sort_by_key(|(order, ..)| *order);

    let mut max_seen: Option<(i64, ChapterId)> = None;
    for (_, chapter, age, confidence) in &timeline {
        if let Some((max_age, max_chapter)) = max_seen {
            if *age < max_age && !flashback_chapters.contains(chapter) {
                violations.push(Violation {
                    kind: ViolationKind::AgeRegression,
                    severity: Severity::Medium,
                    entity: Some(entity.clone()),
                    instance: None,
                    chapter: *chapter,
                    confidence: *confidence,
                    detail: format!(
                        "{entity} is {age} in {chapter} after being {max_age} in {max_chapter}, with no flashback"
                    ),
                    evidence: serde_json::json!({
                        "age": age,
                        "previous_age": max_age,
                        "previous_chapter": max_chapter,
                    }),
                });
            }
        }
        if max_seen.map_or(true, |(m, _)| *age > m) {
            max_seen = Some((*age, *chapter));
        }
    }
}

/// An explicit age and a life phase stated in the same chapter must be
/// compatible within the configured tolerance.
fn check_phase_age(
    entity: &EntityId,
    instances: &[&TemporalInstance],
    config: &AnalysisConfig,
    violations: &mut Vec<Violation>,
) {
    let tolerance = i64::from(config.phase_age_tolerance_years);
    for a in instances {
        let Discriminator::Age { years } = a.discriminator else {
            continue;
        };
        for p in instances {
            let Discriminator::Phase { phase } = p.discriminator else {
                continue;
            };
            if p.origin_chapter != a.origin_chapter {
                continue;
            }
            let Some((lo, hi)) = phase.age_range() else {
                continue;
            };
            let age = i64::from(years);
            if age >= i64::from(lo) - tolerance && age <= i64::from(hi) + tolerance {
                continue;
            }
            let distance = (age - i64::from(lo)).abs().min((age - i64::from(hi)).abs());
            violations.push(Violation {
                kind: ViolationKind::PhaseAgeConflict,
                severity: if distance > 2 * tolerance {
                    Severity::High
                } else {
                    Severity::Medium
                },
                entity: Some(entity.clone()),
                instance: Some(a.id.clone()),
                chapter: a.origin_chapter,
                confidence: Confidence::new(
                    a.confidence.value().min(p.confidence.value()),
                ),
                detail: format!(
                    "{entity} is {years} but described as {phase} in {}",
                    a.origin_chapter
                ),
                evidence: serde_json::json!({
                    "age": years,
                    "phase": phase,
                    "phase_range": [lo, hi],
                }),
            });
        }
    }
}

/// Infer birth years from (chapter year, stated age) pairs; they must
/// agree within the configured spread.
fn check_birth_years(
    entity: &EntityId,
    instances: &[&TemporalInstance],
    chapter_years: &FxHashMap<ChapterId, i32>,
    config: &AnalysisConfig,
    violations: &mut Vec<Violation>,
) {
    let mut inferred: Vec<(i32, ChapterId, u32)> = Vec::new();
    for instance in instances {
        let Discriminator::Age { years } = instance.discriminator else {
            continue;
        };
        if let Some(year) = chapter_years.get(&instance.origin_chapter) {
            inferred.push((year - years as i32, instance.origin_chapter, years));
        }
    }
    if inferred.len() < 2 {
        return;
    }
    let min = inferred.iter().map(|(b, ..)| *b).min().unwrap_or(0);
    let max = inferred.iter().map(|(b, ..)| *b).max().unwrap_or(0);
    if (max - min) as u32 > config.birth_year_max_spread {
        let (_, chapter, _) = inferred[inferred.len() - 1];
        violations.push(Violation {
            kind: ViolationKind::BirthYearConflict,
            severity: Severity::Medium,
            entity: Some(entity.clone()),
            instance: None,
            chapter,
            confidence: Confidence::new(0.7),
            detail: format!(
                "{entity}'s stated ages imply birth years {min}..{max}, spread {}",
                max - min
            ),
            evidence: serde_json::json!({
                "inferred": inferred
                    .iter()
                    .map(|(birth, ch, age)| serde_json::json!({
                        "birth_year": birth,
                        "chapter": ch,
                        "age": age,
                    }))
                    .collect::<Vec<_>>(),
            }),
        });
    }
}
