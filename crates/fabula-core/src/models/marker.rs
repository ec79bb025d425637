//! Temporal marker types: the externally-classified candidate form and
//! the normalized, immutable marker the engine works with.
//!
//! Phrase-level classification happens upstream; this crate only sees
//! candidates that already carry a kind and raw value. Normalization
//! never drops a candidate: anything it cannot resolve becomes an
//! `Unresolved` marker with confidence zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::identifiers::{ChapterId, Confidence, EntityId};

/// Byte span of the source phrase within its chapter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Direction of a relative reference ("three days earlier" vs "later").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeDirection {
    Past,
    Future,
}

/// Calendar units a relative offset or duration can be expressed in.
/// Conversion to days goes through the `Calendar` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Coarse life phase of a character, used as an instance discriminator
/// when no explicit age is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifePhase {
    Child,
    Teen,
    Young,
    Adult,
    Elder,
    FutureSelf,
    PastSelf,
}

impl LifePhase {
    /// Chronological rank within one lifetime. `PastSelf` sorts before
    /// everything, `FutureSelf` after.
    pub fn rank(&self) -> i8 {
        match self {
            LifePhase::PastSelf => -1,
            LifePhase::Child => 0,
            LifePhase::Teen => 1,
            LifePhase::Young => 2,
            LifePhase::Adult => 3,
            LifePhase::Elder => 4,
            LifePhase::FutureSelf => 5,
        }
    }

    /// Plausible age range in years. Ranges deliberately overlap;
    /// compatibility checks add a tolerance on top.
    pub fn age_range(&self) -> Option<(u32, u32)> {
        match self {
            LifePhase::Child => Some((0, 14)),
            LifePhase::Teen => Some((11, 21)),
            LifePhase::Young => Some((17, 40)),
            LifePhase::Adult => Some((30, 70)),
            LifePhase::Elder => Some((55, 130)),
            LifePhase::FutureSelf | LifePhase::PastSelf => None,
        }
    }

    /// Normalize a free-text phase label. Returns `None` for labels
    /// outside the alias table; callers emit an unresolved marker.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "child" | "kid" | "boy" | "girl" | "little" => Some(LifePhase::Child),
            "teen" | "teenager" | "adolescent" => Some(LifePhase::Teen),
            "young" | "youth" | "younger" => Some(LifePhase::Young),
            "adult" | "grown" | "middle-aged" => Some(LifePhase::Adult),
            "elder" | "elderly" | "old" | "older" => Some(LifePhase::Elder),
            "future self" | "future_self" | "future" => Some(LifePhase::FutureSelf),
            "past self" | "past_self" | "former" => Some(LifePhase::PastSelf),
            _ => None,
        }
    }

    /// Stable label used inside instance ids.
    pub fn label(&self) -> &'static str {
        match self {
            LifePhase::Child => "child",
            LifePhase::Teen => "teen",
            LifePhase::Young => "young",
            LifePhase::Adult => "adult",
            LifePhase::Elder => "elder",
            LifePhase::FutureSelf => "future_self",
            LifePhase::PastSelf => "past_self",
        }
    }
}

impl std::fmt::Display for LifePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Marker kind discriminant, for diagnostics and exhaustive dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    AbsoluteDate,
    RelativeOffset,
    Duration,
    AgePhase,
    RelativeYearOffset,
    Unresolved,
}

/// Raw value of an externally-classified candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CandidateValue {
    /// "March 3rd, 1999" — month/day may be missing ("in 1999").
    AbsoluteDate {
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
    },
    /// "three weeks later", "the day before".
    RelativeOffset {
        quantity: u32,
        unit: CalendarUnit,
        direction: TimeDirection,
    },
    /// "for two months" — extent, not position.
    Duration { quantity: u32, unit: CalendarUnit },
    /// "Ana, forty years old".
    Age { years: u32 },
    /// "young Ana", "her future self".
    Phase { label: String },
    /// "twenty years into the future".
    YearOffset { years: u32, direction: TimeDirection },
}

/// A classified temporal phrase as delivered by the upstream stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerCandidate {
    pub value: CandidateValue,
    pub chapter: ChapterId,
    pub span: Span,
    /// Entity the phrase is associated with, if the upstream
    /// coreference stage attached one.
    pub entity: Option<EntityId>,
    pub confidence: Confidence,
}

/// Normalized marker payload. Offsets and durations are already in
/// days; dates are concrete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MarkerValue {
    AbsoluteDate { date: NaiveDate },
    /// Signed day offset relative to the active temporal frame.
    RelativeOffset { days: i64 },
    Duration { days: i64 },
    AgePhase {
        age: Option<u32>,
        phase: Option<LifePhase>,
    },
    RelativeYearOffset { years: i32 },
    /// Retained with confidence zero; absence of emission is a defect.
    Unresolved { reason: String },
}

impl MarkerValue {
    pub fn kind(&self) -> MarkerKind {
        match self {
            MarkerValue::AbsoluteDate { .. } => MarkerKind::AbsoluteDate,
            MarkerValue::RelativeOffset { .. } => MarkerKind::RelativeOffset,
            MarkerValue::Duration { .. } => MarkerKind::Duration,
            MarkerValue::AgePhase { .. } => MarkerKind::AgePhase,
            MarkerValue::RelativeYearOffset { .. } => MarkerKind::RelativeYearOffset,
            MarkerValue::Unresolved { .. } => MarkerKind::Unresolved,
        }
    }
}

/// A normalized temporal marker. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalMarker {
    pub value: MarkerValue,
    pub chapter: ChapterId,
    pub span: Span,
    pub entity: Option<EntityId>,
    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_alias_table() {
        assert_eq!(LifePhase::from_label("Elderly"), Some(LifePhase::Elder));
        assert_eq!(LifePhase::from_label("teenager"), Some(LifePhase::Teen));
        assert_eq!(LifePhase::from_label("protagonist"), None);
    }

    #[test]
    fn test_phase_ranks_are_chronological() {
        let order = [
            LifePhase::PastSelf,
            LifePhase::Child,
            LifePhase::Teen,
            LifePhase::Young,
            LifePhase::Adult,
            LifePhase::Elder,
            LifePhase::FutureSelf,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn test_phase_age_ranges_overlap_neighbours() {
        let (_, teen_hi) = LifePhase::Teen.age_range().unwrap();
        let (young_lo, _) = LifePhase::Young.age_range().unwrap();
        assert!(young_lo < teen_hi);
    }
}
