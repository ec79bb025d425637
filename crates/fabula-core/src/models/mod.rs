//! Data model for the Fabula engine. Types only, no logic: ownership
//! of live state belongs to the temporal map in `fabula-temporal`.

pub mod chapter;
pub mod event;
pub mod identifiers;
pub mod instance;
pub mod marker;
pub mod persistence;
pub mod records;
pub mod violation;

pub use chapter::{Chapter, EntityMention, Participation};
pub use event::{EventResolution, TimelineEvent};
pub use identifiers::{ChapterId, Confidence, EntityId, InstanceId, ProjectId};
pub use instance::{Discriminator, InstanceState, TemporalInstance};
pub use marker::{
    CalendarUnit, CandidateValue, LifePhase, MarkerCandidate, MarkerKind, MarkerValue, Span,
    TemporalMarker, TimeDirection,
};
pub use persistence::{PersistedState, SCHEMA_VERSION};
pub use records::{DeathAssertion, DeathRecord, KnowledgeFact, KnowledgeUse};
pub use violation::{NonLinearDirection, Severity, Violation, ViolationKind};
