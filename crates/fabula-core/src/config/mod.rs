//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::models::identifiers::EntityId;
use crate::models::instance::Discriminator;

/// Force-materialize an instance the heuristics would miss (or score
/// below the confidence threshold). The manual escape hatch for
/// heuristic instance creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceOverride {
    pub entity: EntityId,
    pub discriminator: Discriminator,
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Timeline
    pub day_offset_clamp: i64,
    /// Confidence multiplier per hop when chaining relative markers.
    pub relative_chain_damping: f64,

    // Non-linear detection
    pub min_divergence_days: i64,
    /// How far below the departure point a later return may land, in
    /// multiples of `min_divergence_days`, for a forward jump to still
    /// count as prolepsis.
    pub prolepsis_return_slack: i64,

    // Instances
    pub min_instance_confidence: f64,
    pub instance_overrides: Vec<InstanceOverride>,

    // Knowledge decay
    pub knowledge_decay_rate: f64,
    pub knowledge_decay_floor: f64,

    // Biography checks
    pub phase_age_tolerance_years: u32,
    pub birth_year_max_spread: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            day_offset_clamp: 365_000,        // ~1000 years
            relative_chain_damping: 0.8,
            min_divergence_days: 7,
            prolepsis_return_slack: 3,
            min_instance_confidence: 0.60,
            instance_overrides: Vec::new(),
            knowledge_decay_rate: 0.97,
            knowledge_decay_floor: 0.15,
            phase_age_tolerance_years: 3,
            birth_year_max_spread: 2,
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations that would make queries nonsensical.
    pub fn validate(&self) -> Result<(), String> {
        if self.day_offset_clamp <= 0 {
            return Err("day_offset_clamp must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.knowledge_decay_rate) {
            return Err("knowledge_decay_rate must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.knowledge_decay_floor) {
            return Err("knowledge_decay_floor must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.min_instance_confidence) {
            return Err("min_instance_confidence must be in [0, 1]".into());
        }
        Ok(())
    }
}
