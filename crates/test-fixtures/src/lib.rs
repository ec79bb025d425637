//! Shared builders for integration tests. Spans are synthesized from a
//! per-chapter cursor argument so fixtures stay deterministic.

use fabula_core::models::chapter::{Chapter, EntityMention, Participation};
use fabula_core::models::identifiers::{ChapterId, Confidence, EntityId, InstanceId};
use fabula_core::models::marker::{
    CalendarUnit, CandidateValue, MarkerCandidate, Span, TimeDirection,
};
use fabula_core::models::records::{DeathAssertion, KnowledgeFact, KnowledgeUse};

/// `n` chapters with ids 1..=n in reading order.
pub fn chapters(n: u32) -> Vec<Chapter> {
    (1..=n)
        .map(|i| Chapter {
            id: ChapterId(i),
            discourse_order: i,
            title: None,
        })
        .collect()
}

fn candidate(
    value: CandidateValue,
    chapter: u32,
    at: usize,
    entity: Option<&str>,
    confidence: f64,
) -> MarkerCandidate {
    MarkerCandidate {
        value,
        chapter: ChapterId(chapter),
        span: Span::new(at, at + 10),
        entity: entity.map(EntityId::from),
        confidence: Confidence::new(confidence),
    }
}

pub fn date_marker(chapter: u32, at: usize, ymd: (i32, u32, u32), confidence: f64) -> MarkerCandidate {
    candidate(
        CandidateValue::AbsoluteDate {
            year: ymd.0,
            month: Some(ymd.1),
            day: Some(ymd.2),
        },
        chapter,
        at,
        None,
        confidence,
    )
}

pub fn days_later(chapter: u32, at: usize, days: u32, confidence: f64) -> MarkerCandidate {
    candidate(
        CandidateValue::RelativeOffset {
            quantity: days,
            unit: CalendarUnit::Day,
            direction: TimeDirection::Future,
        },
        chapter,
        at,
        None,
        confidence,
    )
}

pub fn days_earlier(chapter: u32, at: usize, days: u32, confidence: f64) -> MarkerCandidate {
    candidate(
        CandidateValue::RelativeOffset {
            quantity: days,
            unit: CalendarUnit::Day,
            direction: TimeDirection::Past,
        },
        chapter,
        at,
        None,
        confidence,
    )
}

pub fn offset_marker(
    chapter: u32,
    at: usize,
    quantity: u32,
    unit: CalendarUnit,
    direction: TimeDirection,
    confidence: f64,
) -> MarkerCandidate {
    candidate(
        CandidateValue::RelativeOffset {
            quantity,
            unit,
            direction,
        },
        chapter,
        at,
        None,
        confidence,
    )
}

pub fn age_marker(
    chapter: u32,
    at: usize,
    entity: &str,
    years: u32,
    confidence: f64,
) -> MarkerCandidate {
    candidate(
        CandidateValue::Age { years },
        chapter,
        at,
        Some(entity),
        confidence,
    )
}

pub fn phase_marker(
    chapter: u32,
    at: usize,
    entity: &str,
    label: &str,
    confidence: f64,
) -> MarkerCandidate {
    candidate(
        CandidateValue::Phase {
            label: label.to_string(),
        },
        chapter,
        at,
        Some(entity),
        confidence,
    )
}

pub fn year_offset_marker(
    chapter: u32,
    at: usize,
    entity: &str,
    years: u32,
    direction: TimeDirection,
    confidence: f64,
) -> MarkerCandidate {
    candidate(
        CandidateValue::YearOffset { years, direction },
        chapter,
        at,
        Some(entity),
        confidence,
    )
}

pub fn active_mention(entity: &str, chapter: u32, confidence: f64) -> EntityMention {
    mention(entity, None, chapter, Participation::Active, confidence)
}

pub fn passive_mention(entity: &str, chapter: u32, confidence: f64) -> EntityMention {
    mention(entity, None, chapter, Participation::Passive, confidence)
}

pub fn mention(
    entity: &str,
    instance: Option<&str>,
    chapter: u32,
    participation: Participation,
    confidence: f64,
) -> EntityMention {
    EntityMention {
        entity: EntityId::from(entity),
        instance: instance.map(InstanceId::new),
        chapter: ChapterId(chapter),
        span: Span::new(0, 10),
        participation,
        confidence: Confidence::new(confidence),
    }
}

pub fn death(entity: &str, chapter: u32, confidence: f64) -> DeathAssertion {
    DeathAssertion {
        entity: EntityId::from(entity),
        instance: None,
        chapter: ChapterId(chapter),
        confidence: Confidence::new(confidence),
    }
}

pub fn instance_death(
    entity: &str,
    instance: &str,
    chapter: u32,
    confidence: f64,
) -> DeathAssertion {
    DeathAssertion {
        entity: EntityId::from(entity),
        instance: Some(InstanceId::new(instance)),
        chapter: ChapterId(chapter),
        confidence: Confidence::new(confidence),
    }
}

pub fn fact(entity: &str, key: &str, learned_in: u32, confidence: f64) -> KnowledgeFact {
    KnowledgeFact {
        entity: EntityId::from(entity),
        fact_key: key.to_string(),
        learned_in: ChapterId(learned_in),
        learned_how: None,
        confidence: Confidence::new(confidence),
    }
}

pub fn usage(entity: &str, key: &str, chapter: u32) -> KnowledgeUse {
    KnowledgeUse {
        entity: EntityId::from(entity),
        fact_key: key.to_string(),
        chapter: ChapterId(chapter),
    }
}
