//! Input-contract validation. Runs before any map mutation, so a
//! rejected input leaves no partial state behind.

use fabula_core::errors::{FabulaError, FabulaResult};
use fabula_core::models::chapter::Chapter;
use fabula_core::models::identifiers::ChapterId;
use fabula_core::models::marker::MarkerCandidate;
use fabula_core::models::records::{DeathAssertion, KnowledgeFact};
use fabula_core::{FxHashMap, FxHashSet};

/// Check the input contract and return the chapters sorted by
/// discourse order.
pub fn check_inputs(
    chapters: &[Chapter],
    candidates: &[MarkerCandidate],
    deaths: &[DeathAssertion],
    facts: &[KnowledgeFact],
) -> FabulaResult<Vec<Chapter>> {
    if chapters.is_empty() {
        return Err(FabulaError::EmptyChapterList);
    }

    let mut ids = FxHashSet::default();
    let mut orders: FxHashMap<u32, ChapterId> = FxHashMap::default();
    for chapter in chapters {
        if !ids.insert(chapter.id) {
            return Err(FabulaError::DuplicateChapterId(chapter.id));
        }
        if let Some(first) = orders.insert(chapter.discourse_order, chapter.id) {
            return Err(FabulaError::DuplicateDiscourseOrder {
                order: chapter.discourse_order,
                first,
                second: chapter.id,
            });
        }
    }

    for candidate in candidates {
        if !ids.contains(&candidate.chapter) {
            return Err(FabulaError::UnknownChapter(candidate.chapter));
        }
    }
    for death in deaths {
        if !ids.contains(&death.chapter) {
            return Err(FabulaError::UnknownChapter(death.chapter));
        }
    }
    for fact in facts {
        if !ids.contains(&fact.learned_in) {
            return Err(FabulaError::UnknownChapter(fact.learned_in));
        }
    }

    let mut ordered = chapters.to_vec();
    ordered.sort_by_key(|c| c.discourse_order);
    Ok(ordered)
}
