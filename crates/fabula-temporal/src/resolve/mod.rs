//! Marker normalization.
//!
//! Turns externally-classified `MarkerCandidate`s into normalized
//! `TemporalMarker`s. Never drops a candidate: anything unresolvable
//! becomes an `Unresolved` marker with confidence zero plus a
//! diagnostic.

pub mod frames;

use fabula_core::calendar::Calendar;
use fabula_core::errors::Diagnostic;
use fabula_core::models::instance::Discriminator;
use fabula_core::models::marker::{
    CandidateValue, LifePhase, MarkerCandidate, MarkerValue, TemporalMarker, TimeDirection,
};
use fabula_core::models::identifiers::Confidence;

pub use frames::{Frame, FrameKey, FrameSet};

/// Stateless candidate normalizer. Frame state lives with the builder;
/// the resolver only converts values.
pub struct Resolver<'a> {
    calendar: &'a dyn Calendar,
}

impl<'a> Resolver<'a> {
    pub fn new(calendar: &'a dyn Calendar) -> Self {
        Self { calendar }
    }

    /// Normalize one candidate. On failure the returned marker is
    /// `Unresolved` with confidence zero and a diagnostic explains why.
    pub fn normalize(
        &self,
        candidate: &MarkerCandidate,
    ) -> (TemporalMarker, Option<Diagnostic>) {
        let (value, diagnostic) = match &candidate.value {
            CandidateValue::AbsoluteDate { year, month, day } => {
                // Partial dates snap to the start of the period.
                match chrono::NaiveDate::from_ymd_opt(
                    *year,
                    month.unwrap_or(1),
                    day.unwrap_or(1),
                ) {
                    Some(date) => (MarkerValue::AbsoluteDate { date }, None),
                    None => self.unresolved(
                        candidate,
                        format!("invalid date {year}-{month:?}-{day:?}"),
                    ),
                }
            }
            CandidateValue::RelativeOffset {
                quantity,
                unit,
                direction,
            } => {
                let magnitude = self.calendar.to_days(*quantity, *unit);
                let days = match direction {
                    TimeDirection::Past => -magnitude,
                    TimeDirection::Future => magnitude,
                };
                (MarkerValue::RelativeOffset { days }, None)
            }
            CandidateValue::Duration { quantity, unit } => (
                MarkerValue::Duration {
                    days: self.calendar.to_days(*quantity, *unit),
                },
                None,
            ),
            CandidateValue::Age { years } => (
                MarkerValue::AgePhase {
                    age: Some(*years),
                    phase: None,
                },
                None,
            ),
            CandidateValue::Phase { label } => match LifePhase::from_label(label) {
                Some(phase) => (
                    MarkerValue::AgePhase {
                        age: None,
                        phase: Some(phase),
                    },
                    None,
                ),
                None => {
                    self.unresolved(candidate, format!("unknown life phase {label:?}"))
                }
            },
            CandidateValue::YearOffset { years, direction } => {
                let years = *years as i32;
                let signed = match direction {
                    TimeDirection::Past => -years,
                    TimeDirection::Future => years,
                };
                (MarkerValue::RelativeYearOffset { years: signed }, None)
            }
        };

        let confidence = match value {
            MarkerValue::Unresolved { .. } => Confidence::ZERO,
            _ => candidate.confidence,
        };
        (
            TemporalMarker {
                value,
                chapter: candidate.chapter,
                span: candidate.span,
                entity: candidate.entity.clone(),
                confidence,
            },
            diagnostic,
        )
    }

    fn unresolved(
        &self,
        candidate: &MarkerCandidate,
        reason: String,
    ) -> (MarkerValue, Option<Diagnostic>) {
        (
            MarkerValue::Unresolved {
                reason: reason.clone(),
            },
            Some(Diagnostic::UnresolvableMarker {
                chapter: candidate.chapter,
                span: candidate.span,
                reason,
            }),
        )
    }
}

/// The instance discriminator a marker implies, if any. Explicit age
/// wins over a phase label when a marker carries both.
pub fn discriminator_for(marker: &TemporalMarker) -> Option<Discriminator> {
    match &marker.value {
        MarkerValue::AgePhase { age: Some(years), .. } => {
            Some(Discriminator::Age { years: *years })
        }
        MarkerValue::AgePhase {
            age: None,
            phase: Some(phase),
        } => Some(Discriminator::Phase { phase: *phase }),
        MarkerValue::RelativeYearOffset { years } => {
            Some(Discriminator::YearOffset { years: *years })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::calendar::Gregorian;
    use fabula_core::models::identifiers::{ChapterId, EntityId};
    use fabula_core::models::marker::{CalendarUnit, Span};

    fn candidate(value: CandidateValue) -> MarkerCandidate {
        MarkerCandidate {
            value,
            chapter: ChapterId(1),
            span: Span::new(0, 10),
            entity: Some(EntityId::new("ana")),
            confidence: Confidence::new(0.9),
        }
    }

    #[test]
    fn test_relative_offset_normalizes_to_signed_days() {
        let cal = Gregorian;
        let resolver = Resolver::new(&cal);
        let (marker, diag) = resolver.normalize(&candidate(CandidateValue::RelativeOffset {
            quantity: 3,
            unit: CalendarUnit::Week,
            direction: TimeDirection::Past,
        }));
        assert!(diag.is_none());
        assert_eq!(marker.value, MarkerValue::RelativeOffset { days: -21 });
    }

    #[test]
    fn test_invalid_date_is_retained_unresolved() {
        let cal = Gregorian;
        let resolver = Resolver::new(&cal);
        let (marker, diag) = resolver.normalize(&candidate(CandidateValue::AbsoluteDate {
            year: 1999,
            month: Some(2),
            day: Some(30),
        }));
        assert!(matches!(marker.value, MarkerValue::Unresolved { .. }));
        assert_eq!(marker.confidence, Confidence::ZERO);
        assert!(matches!(diag, Some(Diagnostic::UnresolvableMarker { .. })));
    }

    #[test]
    fn test_partial_date_snaps_to_period_start() {
        let cal = Gregorian;
        let resolver = Resolver::new(&cal);
        let (marker, _) = resolver.normalize(&candidate(CandidateValue::AbsoluteDate {
            year: 1999,
            month: None,
            day: None,
        }));
        assert_eq!(
            marker.value,
            MarkerValue::AbsoluteDate {
                date: chrono::NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()
            }
        );
    }

    #[test]
    fn test_age_beats_phase_as_discriminator() {
        let marker = TemporalMarker {
            value: MarkerValue::AgePhase {
                age: Some(40),
                phase: Some(LifePhase::Young),
            },
            chapter: ChapterId(1),
            span: Span::new(0, 1),
            entity: Some(EntityId::new("ana")),
            confidence: Confidence::new(0.8),
        };
        assert_eq!(
            discriminator_for(&marker),
            Some(Discriminator::Age { years: 40 })
        );
    }
}
