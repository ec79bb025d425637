//! Persistence boundary types. The engine itself never touches
//! storage; a run exports one `PersistedState` per project and the
//! host application decides where it lives.

use serde::{Deserialize, Serialize};

use super::event::TimelineEvent;
use super::identifiers::ProjectId;
use super::records::{DeathRecord, KnowledgeFact};

/// Bump when the serialized shape changes.
pub const SCHEMA_VERSION: u16 = 1;

/// Everything a host needs to persist for later incremental re-runs:
/// timeline events, death records, and knowledge facts, keyed by
/// project. Instance references stay nullable opaque string keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub project: ProjectId,
    pub schema_version: u16,
    pub events: Vec<TimelineEvent>,
    pub deaths: Vec<DeathRecord>,
    pub facts: Vec<KnowledgeFact>,
}

impl PersistedState {
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            schema_version: SCHEMA_VERSION,
            events: Vec::new(),
            deaths: Vec::new(),
            facts: Vec::new(),
        }
    }
}
