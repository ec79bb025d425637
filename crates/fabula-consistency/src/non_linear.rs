//! Non-linear narration detection.
//!
//! Walks the timeline in discourse order, tracking a story-time
//! high-water mark per identity track (the main narration plus one
//! track per temporal instance). An event that falls behind its
//! track's mark by at least the divergence threshold is analepsis; a
//! jump ahead that the track later returns from is prolepsis.
//! Switching tracks is a deliberate instance transition and is never
//! flagged. Linear narration produces zero flags by construction: the
//! marks only advance.

use fabula_core::config::AnalysisConfig;
use fabula_core::models::event::TimelineEvent;
use fabula_core::models::identifiers::{ChapterId, Confidence, InstanceId};
use fabula_core::models::violation::{NonLinearDirection, Severity, Violation, ViolationKind};
use fabula_core::{FxHashMap, FxHashSet};
use fabula_temporal::TemporalMap;

/// Detector output: violations plus the set of chapters explained as
/// flashbacks, which downstream biography checks must not re-flag.
#[derive(Debug, Default)]
pub struct NonLinearReport {
    pub violations: Vec<Violation>,
    pub flashback_chapters: FxHashSet<ChapterId>,
}

pub fn detect(
    events: &[TimelineEvent],
    map: &TemporalMap,
    config: &AnalysisConfig,
) -> NonLinearReport {
    let mut report = NonLinearReport::default();

    // Only positioned, trusted events participate. Dated events carry
    // an epoch-scale day offset from the build, so one offset scale
    // covers both categories here.
    let mut ordered: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| !e.superseded && e.confidence.value() > 0.0 && e.day_offset.is_some())
        .collect();
    ordered.sort_by_key(|e| e.discourse_position);

    let mut high_water: FxHashMap<Option<&InstanceId>, i64> = FxHashMap::default();
    for (idx, event) in ordered.iter().enumerate() {
        let offset = event.day_offset.unwrap_or(0);
        let track = event.instance.as_ref();
        let Some(&hw) = high_water.get(&track) else {
            high_water.insert(track, offset);
            continue;
        };

        if hw - offset >= config.min_divergence_days {
            let divergence = hw - offset;
            report.violations.push(divergence_violation(
                event,
                NonLinearDirection::Analepsis,
                divergence,
                hw,
            ));
            report.flashback_chapters.insert(event.chapter);
        } else if offset - hw >= config.min_divergence_days {
            // Forward motion is normal narration; it is prolepsis only
            // when the track later resumes near the point of departure.
            // A return far below the old mark is its own flashback, not
            // evidence that this jump was a flash-forward.
            let divergence = offset - hw;
            let slack = config.prolepsis_return_slack * config.min_divergence_days;
            let returns = ordered[idx + 1..].iter().any(|later| {
                later.instance.as_ref() == track
                    && later.day_offset.map_or(false, |o| {
                        o + config.min_divergence_days <= offset && o >= hw - slack
                    })
            });
            if returns {
                report.violations.push(divergence_violation(
                    event,
                    NonLinearDirection::Prolepsis,
                    divergence,
                    hw,
                ));
            }
        }
        high_water.insert(track, hw.max(offset));
    }

    // Sightings of dead instances routed here by the temporal map:
    // likely flashbacks, surfaced at low confidence.
    for hint in map.flashback_hints() {
        report.flashback_chapters.insert(hint.chapter);
        report.violations.push(Violation {
            kind: ViolationKind::NonLinearDivergence,
            severity: Severity::Low,
            entity: Some(hint.entity.clone()),
            instance: Some(hint.instance.clone()),
            chapter: hint.chapter,
            confidence: Confidence::new(0.3),
            detail: format!(
                "{} appears in {} after dying in {}; likely a flashback",
                hint.instance, hint.chapter, hint.death_chapter
            ),
            evidence: serde_json::json!({
                "direction": NonLinearDirection::Analepsis,
                "death_chapter": hint.death_chapter,
            }),
        });
    }

    report
}

fn divergence_violation(
    event: &TimelineEvent,
    direction: NonLinearDirection,
    divergence: i64,
    high_water: i64,
) -> Violation {
    let severity = if divergence >= 3650 {
        Severity::High
    } else if divergence >= 365 {
        Severity::Medium
    } else {
        Severity::Low
    };
    let confidence = Confidence::new(0.4 + (divergence as f64 / 3650.0).min(0.5));
    let label = match direction {
        NonLinearDirection::Analepsis => "flashback",
        NonLinearDirection::Prolepsis => "flash-forward",
    };
    Violation {
        kind: ViolationKind::NonLinearDivergence,
        severity,
        entity: event.entity.clone(),
        instance: event.instance.clone(),
        chapter: event.chapter,
        confidence,
        detail: format!("{label} of {divergence} days in {}", event.chapter),
        evidence: serde_json::json!({
            "direction": direction,
            "divergence_days": divergence,
            "high_water_offset": high_water,
            "event_offset": event.day_offset,
            "discourse_position": event.discourse_position,
        }),
    }
}
