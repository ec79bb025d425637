//! Consistency violations produced by the evaluators.

use serde::{Deserialize, Serialize};

use super::identifiers::{ChapterId, Confidence, EntityId, InstanceId};

/// What kind of inconsistency was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A dead identity participates actively after its death.
    PostMortemAppearance,
    /// A character acts on a fact before learning it in story time.
    Anachronism,
    /// Discourse order diverges from story order (analepsis/prolepsis).
    NonLinearDivergence,
    /// Contradictory death records for the same identity.
    ConflictingDeathRecord,
    /// An entity gets younger across chapters with no flashback.
    AgeRegression,
    /// Stated age incompatible with the stated life phase.
    PhaseAgeConflict,
    /// Inferred birth years spread too far apart.
    BirthYearConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Direction of a non-linear jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonLinearDirection {
    /// Flashback: story time moves backwards.
    Analepsis,
    /// Flash-forward: story time jumps ahead.
    Prolepsis,
}

/// One detected inconsistency, with machine-readable evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub entity: Option<EntityId>,
    pub instance: Option<InstanceId>,
    pub chapter: ChapterId,
    pub confidence: Confidence,
    /// Human-readable one-liner.
    pub detail: String,
    /// Structured evidence (records, offsets, ranks) for the UI layer.
    pub evidence: serde_json::Value,
}
