//! # fabula-consistency
//!
//! Consistency evaluators that read the temporal map after a build:
//! non-linear narration (analepsis/prolepsis), post-mortem
//! appearances, knowledge anachronisms with confidence decay, and
//! entity biography checks. `ConsistencyPipeline` runs the whole
//! batch for one project.

pub mod biography;
pub mod knowledge;
pub mod non_linear;
pub mod pipeline;
pub mod vitality;

pub use knowledge::KnowledgeScorer;
pub use non_linear::NonLinearReport;
pub use pipeline::{AnalysisInput, AnalysisReport, AnalysisStats, ConsistencyPipeline};
