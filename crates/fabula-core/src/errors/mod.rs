//! Error and diagnostic types.
//!
//! Hard errors are reserved for input-contract violations that make a
//! run meaningless. Everything degradable (unresolvable markers,
//! clamped offsets, contradictory records) is a `Diagnostic` carried
//! in the analysis report instead.

use serde::{Deserialize, Serialize};

use crate::models::identifiers::{ChapterId, EntityId, InstanceId};
use crate::models::marker::Span;

/// Run-aborting errors.
#[derive(Debug, thiserror::Error)]
pub enum FabulaError {
    #[error("empty chapter list")]
    EmptyChapterList,

    #[error("duplicate discourse order {order}: chapters {first} and {second}")]
    DuplicateDiscourseOrder {
        order: u32,
        first: ChapterId,
        second: ChapterId,
    },

    #[error("duplicate chapter id {0}")]
    DuplicateChapterId(ChapterId),

    #[error("marker references unknown chapter {0}")]
    UnknownChapter(ChapterId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Structurally unreachable in-process (the map has a single
    /// `&mut` writer); exists for the persistence boundary contract.
    #[error("concurrent mutation detected: {0}")]
    ConcurrentMutationDetected(String),
}

pub type FabulaResult<T> = Result<T, FabulaError>;

/// Non-fatal conditions recorded during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Diagnostic {
    /// A candidate the resolver could not place in story time. The
    /// marker is retained with confidence zero.
    UnresolvableMarker {
        chapter: ChapterId,
        span: Span,
        reason: String,
    },
    /// A day offset exceeded the engine bound and was clamped.
    OverflowClamped {
        chapter: ChapterId,
        requested: i64,
        clamped_to: i64,
    },
    /// Two death records for the same identity disagree on the
    /// chapter. Both records are kept.
    ConflictingDeathRecord {
        entity: EntityId,
        instance: Option<InstanceId>,
        first_chapter: ChapterId,
        second_chapter: ChapterId,
    },
}
