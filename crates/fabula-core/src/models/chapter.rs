//! Chapter and mention inputs. Produced by the upstream segmentation
//! and entity-resolution stages; this crate treats them as ground
//! truth.

use serde::{Deserialize, Serialize};

use super::identifiers::{ChapterId, Confidence, EntityId, InstanceId};
use super::marker::Span;

/// A manuscript chapter. `discourse_order` is reading order and must be
/// unique across the input; the id is stable across reorderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub discourse_order: u32,
    pub title: Option<String>,
}

/// How an entity participates in a scene. Passive mentions (being
/// remembered, discussed, seen in a photograph) are legitimate for the
/// dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Participation {
    Active,
    Passive,
}

/// One resolved entity mention inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub entity: EntityId,
    /// Set when the mention refers to a specific temporal instance.
    pub instance: Option<InstanceId>,
    pub chapter: ChapterId,
    pub span: Span,
    pub participation: Participation,
    pub confidence: Confidence,
}
