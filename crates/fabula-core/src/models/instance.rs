//! Temporal instances: co-existing versions of one canonical entity
//! (time travel, flashback selves, parallel ages).
//!
//! Instance ids are pure functions of (entity, discriminator) so
//! re-running an analysis can never mint a different id for the same
//! evidence.

use serde::{Deserialize, Serialize};

use super::identifiers::{ChapterId, Confidence, EntityId, InstanceId};
use super::marker::LifePhase;

/// What differentiates an instance from the undifferentiated canonical
/// identity: an explicit age, a life phase, or a relative year offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Discriminator {
    Age { years: u32 },
    Phase { phase: LifePhase },
    /// Years relative to the narrative present; sign is part of the id.
    YearOffset { years: i32 },
}

impl Discriminator {
    /// Derive the deterministic instance id.
    pub fn instance_id(&self, entity: &EntityId) -> InstanceId {
        let id = match self {
            Discriminator::Age { years } => format!("{entity}@age:{years}"),
            Discriminator::Phase { phase } => format!("{entity}@phase:{phase}"),
            Discriminator::YearOffset { years } => {
                format!("{entity}@offset_years:{years:+}")
            }
        };
        InstanceId::new(id)
    }

    /// Parse an instance id back into its parts. Returns `None` for
    /// ids that do not follow the derived grammar.
    pub fn parse(id: &InstanceId) -> Option<(EntityId, Discriminator)> {
        let (entity, rest) = id.as_str().rsplit_once('@')?;
        let (key, value) = rest.split_once(':')?;
        let discriminator = match key {
            "age" => Discriminator::Age {
                years: value.parse().ok()?,
            },
            "phase" => Discriminator::Phase {
                phase: LifePhase::from_label(value)?,
            },
            "offset_years" => Discriminator::YearOffset {
                years: value.parse().ok()?,
            },
            _ => return None,
        };
        Some((EntityId::new(entity), discriminator))
    }

    /// Sort key within one entity's biography: year offsets first
    /// (story placement), then ages, then phase rank.
    pub fn biography_key(&self) -> (i64, i64, i64) {
        match self {
            Discriminator::YearOffset { years } => (0, *years as i64, 0),
            Discriminator::Age { years } => (1, *years as i64, 0),
            Discriminator::Phase { phase } => (2, phase.rank() as i64, 0),
        }
    }
}

/// Lifecycle of an instance. DEAD is terminal; apparent reappearances
/// are flashback material, never a state rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Created,
    Active,
    Dead,
}

/// One temporal version of a canonical entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalInstance {
    pub entity: EntityId,
    pub id: InstanceId,
    pub discriminator: Discriminator,
    /// Chapter whose marker first materialized this instance.
    pub origin_chapter: ChapterId,
    /// Story-time anchor in days, when one is known.
    pub day_offset: Option<i64>,
    /// Creation order within the run. Observable and deterministic:
    /// used by alive-checks to tell pre-death from post-death copies.
    pub created_seq: u64,
    pub state: InstanceState,
    pub confidence: Confidence,
    /// Opaque extension field for exotic chronologies. The engine
    /// never interprets it.
    pub proper_time: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_grammar() {
        let ana = EntityId::new("ana");
        assert_eq!(
            Discriminator::Age { years: 40 }.instance_id(&ana).as_str(),
            "ana@age:40"
        );
        assert_eq!(
            Discriminator::Phase { phase: LifePhase::Young }
                .instance_id(&ana)
                .as_str(),
            "ana@phase:young"
        );
        assert_eq!(
            Discriminator::YearOffset { years: 20 }.instance_id(&ana).as_str(),
            "ana@offset_years:+20"
        );
        assert_eq!(
            Discriminator::YearOffset { years: -3 }.instance_id(&ana).as_str(),
            "ana@offset_years:-3"
        );
    }

    #[test]
    fn test_instance_id_round_trip() {
        let ana = EntityId::new("ana");
        for d in [
            Discriminator::Age { years: 7 },
            Discriminator::Phase { phase: LifePhase::Elder },
            Discriminator::YearOffset { years: -12 },
        ] {
            let id = d.instance_id(&ana);
            let (entity, parsed) = Discriminator::parse(&id).unwrap();
            assert_eq!(entity, ana);
            assert_eq!(parsed, d);
        }
    }

    #[test]
    fn test_parse_rejects_foreign_ids() {
        assert!(Discriminator::parse(&InstanceId::new("ana")).is_none());
        assert!(Discriminator::parse(&InstanceId::new("ana@era:victorian")).is_none());
        assert!(Discriminator::parse(&InstanceId::new("ana@age:forty")).is_none());
    }
}
