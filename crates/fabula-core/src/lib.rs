//! # fabula-core
//!
//! Foundation crate for the Fabula narrative-time engine.
//! Defines the data model (markers, timeline events, temporal instances,
//! death and knowledge records, violations), errors, and configuration.
//! Every other crate in the workspace depends on this.

pub mod calendar;
pub mod collections;
pub mod config;
pub mod errors;
pub mod models;

// Re-export the most commonly used types at the crate root.
pub use calendar::{Calendar, Gregorian};
pub use collections::{FxHashMap, FxHashSet};
pub use config::AnalysisConfig;
pub use errors::{Diagnostic, FabulaError, FabulaResult};
pub use models::identifiers::{ChapterId, Confidence, EntityId, InstanceId, ProjectId};
