//! Timeline events: one story-time placement per resolved (or
//! unresolved) temporal signal, ordered by narrative rank.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::identifiers::{ChapterId, Confidence, EntityId, InstanceId};
use super::marker::Span;

/// Whether the event came from a resolved marker or is a retained
/// placeholder for one the engine could not place in story time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventResolution {
    Resolved,
    Unresolved,
}

/// One placement on the story timeline.
///
/// `superseded` is the only mutable field: it is set when a
/// higher-confidence marker for the same chapter replaces this event.
/// Superseded events stay in the output so corrections are auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub chapter: ChapterId,
    /// Position in reading order (global, strictly increasing).
    pub discourse_position: u64,
    /// Story-time offset in days, clamped to the engine bound.
    pub day_offset: Option<i64>,
    pub story_date: Option<NaiveDate>,
    /// Derived from `story_date` only; never fabricated from offsets.
    pub weekday: Option<Weekday>,
    pub entity: Option<EntityId>,
    pub instance: Option<InstanceId>,
    /// Rank after story-time ordering (0-based, dense).
    pub narrative_order: u64,
    pub confidence: Confidence,
    pub resolution: EventResolution,
    pub superseded: bool,
    pub source_span: Option<Span>,
}

impl TimelineEvent {
    pub fn is_anchor(&self) -> bool {
        self.story_date.is_some() && self.day_offset.is_some()
    }
}
