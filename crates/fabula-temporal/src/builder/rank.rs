//! Narrative rank key.
//!
//! Events are ordered by a three-level tuple: evidence category
//! (absolute date > day offset > neither), numeric position within the
//! category, and discourse position as the final tiebreak. Deriving
//! the order from one tuple makes it total — a comparator with
//! independent per-category branches is not transitive, and a sort
//! under an intransitive comparator is unspecified.

use std::cmp::Ordering;

use chrono::Datelike;
use fabula_core::models::event::TimelineEvent;

/// Evidence categories, strongest first.
pub const CATEGORY_DATE: u8 = 2;
pub const CATEGORY_OFFSET: u8 = 1;
pub const CATEGORY_NONE: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankKey {
    pub category: u8,
    pub numeric: i64,
    pub discourse: u64,
}

impl RankKey {
    pub fn for_event(event: &TimelineEvent) -> Self {
        if let Some(date) = event.story_date {
            Self {
                category: CATEGORY_DATE,
                numeric: i64::from(date.num_days_from_ce()),
                discourse: event.discourse_position,
            }
        } else if let Some(offset) = event.day_offset {
            Self {
                category: CATEGORY_OFFSET,
                numeric: offset,
                discourse: event.discourse_position,
            }
        } else {
            Self {
                category: CATEGORY_NONE,
                numeric: 0,
                discourse: event.discourse_position,
            }
        }
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Category descending, then numeric and discourse ascending.
        other
            .category
            .cmp(&self.category)
            .then(self.numeric.cmp(&other.numeric))
            .then(self.discourse.cmp(&other.discourse))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(category: u8, numeric: i64, discourse: u64) -> RankKey {
        RankKey {
            category,
            numeric,
            discourse,
        }
    }

    #[test]
    fn test_dated_sorts_before_offset_only() {
        assert!(key(CATEGORY_DATE, 730_000, 5) < key(CATEGORY_OFFSET, 3, 0));
        assert!(key(CATEGORY_OFFSET, 3, 0) < key(CATEGORY_NONE, 0, 0));
    }

    #[test]
    fn test_numeric_orders_within_category() {
        assert!(key(CATEGORY_OFFSET, -10, 9) < key(CATEGORY_OFFSET, 4, 0));
    }

    #[test]
    fn test_discourse_breaks_ties() {
        assert!(key(CATEGORY_NONE, 0, 1) < key(CATEGORY_NONE, 0, 2));
        assert_eq!(key(CATEGORY_OFFSET, 4, 7), key(CATEGORY_OFFSET, 4, 7));
    }

    #[test]
    fn test_transitivity_across_categories() {
        // Under a per-category branching comparator this triple used
        // to cycle: a<b by category, b<c by discourse, c<a by numeric.
        let a = key(CATEGORY_DATE, 100, 9);
        let b = key(CATEGORY_OFFSET, 50, 1);
        let c = key(CATEGORY_OFFSET, 60, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }
}
