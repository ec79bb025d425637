//! Post-mortem appearance checks.
//!
//! Active participation by a dead identity is a violation; passive
//! presence (being remembered, discussed, seen in photographs) is
//! legitimate storytelling and never flagged.

use fabula_core::models::chapter::{EntityMention, Participation};
use fabula_core::models::identifiers::Confidence;
use fabula_core::models::violation::{Severity, Violation, ViolationKind};
use fabula_temporal::TemporalMap;

/// Evaluate one mention. `None` means no violation.
pub fn evaluate(map: &TemporalMap, mention: &EntityMention) -> Option<Violation> {
    if mention.participation != Participation::Active {
        return None;
    }
    let record = map.governing_death(&mention.entity, mention.instance.as_ref(), mention.chapter)?;
    let identity = match &mention.instance {
        Some(instance) => instance.to_string(),
        None => mention.entity.to_string(),
    };
    Some(Violation {
        kind: ViolationKind::PostMortemAppearance,
        severity: Severity::High,
        entity: Some(mention.entity.clone()),
        instance: mention.instance.clone(),
        chapter: mention.chapter,
        confidence: Confidence::new(
            record.confidence.value().min(mention.confidence.value()),
        ),
        detail: format!(
            "{identity} participates actively in {} after dying in {}",
            mention.chapter, record.chapter
        ),
        evidence: serde_json::json!({ "death_record": record }),
    })
}

pub fn evaluate_all(map: &TemporalMap, mentions: &[EntityMention]) -> Vec<Violation> {
    mentions
        .iter()
        .filter_map(|m| evaluate(map, m))
        .collect()
}
