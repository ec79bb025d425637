//! Death and knowledge records held by the temporal map.

use serde::{Deserialize, Serialize};

use super::identifiers::{ChapterId, Confidence, EntityId, InstanceId};

/// A death stated by the text, as classified upstream. Input form of
/// `DeathRecord`: the temporal map assigns the append sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathAssertion {
    pub entity: EntityId,
    pub instance: Option<InstanceId>,
    pub chapter: ChapterId,
    pub confidence: Confidence,
}

/// An assertion that an entity (or one specific temporal instance of
/// it) died in a chapter. Append-only: contradictions are reconciled
/// at query time, never by rewriting records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub entity: EntityId,
    /// `None` scopes the death to the undifferentiated canonical
    /// identity.
    pub instance: Option<InstanceId>,
    pub chapter: ChapterId,
    pub confidence: Confidence,
    /// Append order within the run.
    pub seq: u64,
}

/// A fact a character has learned, keyed for later usage checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFact {
    /// Who knows.
    pub entity: EntityId,
    /// Opaque fact key, e.g. `"secret:locket"`.
    pub fact_key: String,
    pub learned_in: ChapterId,
    /// How it was learned (witnessed, told, inferred), free text.
    pub learned_how: Option<String>,
    pub confidence: Confidence,
}

/// A character shown acting on a fact, supplied by the caller for
/// consistency checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeUse {
    pub entity: EntityId,
    pub fact_key: String,
    pub chapter: ChapterId,
}
