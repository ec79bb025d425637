//! One analysis run per project: validate, build the timeline, run
//! every evaluator, assemble the report.
//!
//! The temporal map is constructed here, mutably borrowed only by the
//! builder, then read by the evaluators. No singletons: concurrent
//! projects each get their own pipeline and map.

use std::time::Instant;

use fabula_core::calendar::Gregorian;
use fabula_core::config::AnalysisConfig;
use fabula_core::errors::{Diagnostic, FabulaError, FabulaResult};
use fabula_core::models::chapter::{Chapter, EntityMention};
use fabula_core::models::event::TimelineEvent;
use fabula_core::models::identifiers::ProjectId;
use fabula_core::models::marker::MarkerCandidate;
use fabula_core::models::persistence::{PersistedState, SCHEMA_VERSION};
use fabula_core::models::records::{DeathAssertion, KnowledgeFact, KnowledgeUse};
use fabula_core::models::violation::Violation;
use fabula_temporal::{TemporalMap, TimelineBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::knowledge::KnowledgeScorer;
use crate::{biography, non_linear, vitality};

/// Everything one run consumes. All inputs come from upstream stages
/// (segmentation, NER, marker classification) and are treated as
/// ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub project: ProjectId,
    pub chapters: Vec<Chapter>,
    pub markers: Vec<MarkerCandidate>,
    pub mentions: Vec<EntityMention>,
    pub deaths: Vec<DeathAssertion>,
    pub facts: Vec<KnowledgeFact>,
    pub knowledge_uses: Vec<KnowledgeUse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub chapters: usize,
    pub markers: usize,
    pub events: usize,
    pub instances: usize,
    pub violations: usize,
    pub diagnostics: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub events: Vec<TimelineEvent>,
    pub violations: Vec<Violation>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: AnalysisStats,
    /// What the host should persist for incremental re-runs.
    pub state: PersistedState,
}

pub struct ConsistencyPipeline {
    config: AnalysisConfig,
}

impl ConsistencyPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    pub fn run(&self, input: &AnalysisInput) -> FabulaResult<AnalysisReport> {
        let started = Instant::now();
        self.config.validate().map_err(FabulaError::InvalidConfig)?;
        let mut map = TemporalMap::new(self.config.day_offset_clamp);
        let calendar = Gregorian;

        let builder = TimelineBuilder::new(&self.config, &calendar);
        let events = builder.build(
            &input.chapters,
            &input.markers,
            &input.deaths,
            &input.facts,
            &mut map,
        )?;

        let non_linear_report = non_linear::detect(&events, &map, &self.config);
        let mut violations = non_linear_report.violations;
        violations.extend(vitality::evaluate_all(&map, &input.mentions));
        let scorer = KnowledgeScorer::new(&map, &self.config);
        violations.extend(scorer.check_usages(&input.knowledge_uses));
        violations.extend(biography::check(
            &map,
            &events,
            &non_linear_report.flashback_chapters,
            &self.config,
        ));

        let diagnostics = map.diagnostics().to_vec();
        let state = PersistedState {
            project: input.project.clone(),
            schema_version: SCHEMA_VERSION,
            events: events.clone(),
            deaths: map.deaths().to_vec(),
            facts: map.facts().to_vec(),
        };
        let stats = AnalysisStats {
            chapters: input.chapters.len(),
            markers: input.markers.len(),
            events: events.len(),
            instances: map.instances().count(),
            violations: violations.len(),
            diagnostics: diagnostics.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            project = %input.project,
            events = stats.events,
            violations = stats.violations,
            diagnostics = stats.diagnostics,
            elapsed_ms = stats.elapsed_ms,
            "analysis complete"
        );

        Ok(AnalysisReport {
            events,
            violations,
            diagnostics,
            stats,
            state,
        })
    }
}
