//! Alive-checks over the append-only death records.
//!
//! Precedence rules:
//! 1. An instance-specific death record governs that instance alone.
//! 2. A canonical (instance-less) record governs the undifferentiated
//!    identity and every instance created before the record; an
//!    instance created after a canonical death is an alternate
//!    temporal copy and stays alive by default.
//! 3. With no applicable record, the identity is alive. Uncertain
//!    narratives must not spray false positives.

use fabula_core::models::identifiers::{ChapterId, EntityId, InstanceId};
use fabula_core::models::records::DeathRecord;

use super::TemporalMap;

impl TemporalMap {
    /// Is the queried identity alive in `chapter` (story time)?
    /// `instance = None` queries the undifferentiated canonical
    /// identity.
    pub fn is_alive(
        &self,
        entity: &EntityId,
        instance: Option<&InstanceId>,
        chapter: ChapterId,
    ) -> bool {
        self.governing_death(entity, instance, chapter).is_none()
    }

    /// The death record that makes the queried identity dead in
    /// `chapter`, if any. Evidence for post-mortem violations.
    pub fn governing_death(
        &self,
        entity: &EntityId,
        instance: Option<&InstanceId>,
        chapter: ChapterId,
    ) -> Option<&DeathRecord> {
        // Rule 1: instance-specific record wins outright.
        if let Some(id) = instance {
            if let Some(record) = self
                .deaths()
                .iter()
                .find(|r| r.instance.as_ref() == Some(id) && self.at_or_before(r.chapter, chapter))
            {
                return Some(record);
            }
        }

        // Rule 2: canonical record, unless the queried instance is a
        // later-created temporal copy.
        let canonical = self
            .deaths()
            .iter()
            .find(|r| {
                r.entity == *entity
                    && r.instance.is_none()
                    && self.at_or_before(r.chapter, chapter)
            })?;
        if let Some(id) = instance {
            if let Some(inst) = self.instance(id) {
                if inst.created_seq > canonical.seq {
                    return None;
                }
            }
        }
        Some(canonical)
    }
}
