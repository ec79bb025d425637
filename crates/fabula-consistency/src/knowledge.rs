//! Knowledge consistency: who knows what, when, and how certainly.
//!
//! Acquisition confidence decays exponentially with story-time
//! distance down to a floor, so old knowledge stays usable but weak.
//! "Known" always compares story-time rank, never discourse position:
//! a fact learned in a flashback chapter can legitimately be used in a
//! chapter printed earlier.

use fabula_core::config::AnalysisConfig;
use fabula_core::models::identifiers::{ChapterId, EntityId};
use fabula_core::models::records::{KnowledgeFact, KnowledgeUse};
use fabula_core::models::violation::{Severity, Violation, ViolationKind};
use fabula_temporal::TemporalMap;

/// Rank gap beyond which an anachronism is considered severe.
const SEVERE_GAP: u64 = 3;

/// `max(floor, base · rate^distance)` — the floor applies even at
/// distance zero.
pub fn decayed_confidence(base: f64, distance: u64, rate: f64, floor: f64) -> f64 {
    (base * rate.powf(distance as f64)).max(floor)
}

pub struct KnowledgeScorer<'a> {
    map: &'a TemporalMap,
    config: &'a AnalysisConfig,
}

impl<'a> KnowledgeScorer<'a> {
    pub fn new(map: &'a TemporalMap, config: &'a AnalysisConfig) -> Self {
        Self { map, config }
    }

    /// Decayed confidence that `entity` knows `fact_key` in `chapter`,
    /// or `None` when no acquisition precedes it in story time.
    pub fn knows(&self, entity: &EntityId, fact_key: &str, chapter: ChapterId) -> Option<f64> {
        self.applicable_facts(entity, fact_key, chapter)
            .map(|fact| {
                decayed_confidence(
                    fact.confidence.value(),
                    self.map.rank_distance(fact.learned_in, chapter),
                    self.config.knowledge_decay_rate,
                    self.config.knowledge_decay_floor,
                )
            })
            .fold(None, |best, c| Some(best.map_or(c, |b: f64| b.max(c))))
    }

    /// Check one usage. A usage with no recorded acquisition at all is
    /// skipped: provenance unknown is not the same as provenance
    /// violated.
    pub fn check_usage(&self, usage: &KnowledgeUse) -> Option<Violation> {
        let all: Vec<&KnowledgeFact> = self
            .map
            .facts()
            .iter()
            .filter(|f| f.entity == usage.entity && f.fact_key == usage.fact_key)
            .collect();
        if all.is_empty() {
            return None;
        }
        if self
            .applicable_facts(&usage.entity, &usage.fact_key, usage.chapter)
            .next()
            .is_some()
        {
            return None;
        }

        // Every acquisition resolves after the usage in story time.
        let earliest = all
            .iter()
            .copied()
            .min_by(|a, b| {
                if self.map.at_or_before(a.learned_in, b.learned_in) {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Greater
                }
            })
            .expect("non-empty fact list");
        let gap = self.map.rank_distance(usage.chapter, earliest.learned_in);
        Some(Violation {
            kind: ViolationKind::Anachronism,
            severity: if gap > SEVERE_GAP {
                Severity::High
            } else {
                Severity::Medium
            },
            entity: Some(usage.entity.clone()),
            instance: None,
            chapter: usage.chapter,
            confidence: earliest.confidence,
            detail: format!(
                "{} acts on {:?} in {} but only learns it in {}",
                usage.entity, usage.fact_key, usage.chapter, earliest.learned_in
            ),
            evidence: serde_json::json!({
                "fact_key": usage.fact_key,
                "used_in": usage.chapter,
                "learned_in": earliest.learned_in,
                "rank_gap": gap,
                "learned_how": earliest.learned_how,
            }),
        })
    }

    pub fn check_usages(&self, usages: &[KnowledgeUse]) -> Vec<Violation> {
        usages.iter().filter_map(|u| self.check_usage(u)).collect()
    }

    fn applicable_facts(
        &self,
        entity: &EntityId,
        fact_key: &str,
        chapter: ChapterId,
    ) -> impl Iterator<Item = &KnowledgeFact> {
        let entity = entity.clone();
        let fact_key = fact_key.to_string();
        self.map.facts().iter().filter(move |f| {
            f.entity == entity
                && f.fact_key == fact_key
                && self.map.at_or_before(f.learned_in, chapter)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_identity_at_distance_zero_above_floor() {
        assert_eq!(decayed_confidence(1.0, 0, 0.97, 0.15), 1.0);
    }

    #[test]
    fn test_decay_at_ten_chapters() {
        let c = decayed_confidence(1.0, 10, 0.97, 0.15);
        assert!((c - 0.7374).abs() < 1e-4, "got {c}");
    }

    #[test]
    fn test_decay_hits_floor() {
        assert_eq!(decayed_confidence(1.0, 100, 0.97, 0.15), 0.15);
        // The floor also lifts weak acquisitions.
        assert_eq!(decayed_confidence(0.05, 0, 0.97, 0.15), 0.15);
    }

    #[test]
    fn test_decay_monotonic_in_distance() {
        let mut prev = decayed_confidence(0.9, 0, 0.97, 0.15);
        for d in 1..200 {
            let c = decayed_confidence(0.9, d, 0.97, 0.15);
            assert!(c <= prev);
            assert!(c >= 0.15);
            prev = c;
        }
    }
}
