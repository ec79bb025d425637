//! # fabula-temporal
//!
//! The temporal engine: marker resolution, the authoritative temporal
//! map (entities, instances, deaths, knowledge), and the timeline
//! builder that reconciles discourse order with story time.
//!
//! Writes follow a single-writer discipline: the `TimelineBuilder` is
//! the only code that mutates a `TemporalMap` during a run, and it
//! commits one chapter at a time.

pub mod builder;
pub mod map;
pub mod resolve;

pub use builder::rank::RankKey;
pub use builder::TimelineBuilder;
pub use map::{FlashbackHint, TemporalMap};
pub use resolve::Resolver;
