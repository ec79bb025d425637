//! Timeline construction.
//!
//! The builder is the single writer of the temporal map. It walks the
//! chapters in discourse order, resolves each marker against the
//! active temporal frames, and commits one chapter at a time: a
//! chapter that fails to process leaves no partial events, instances,
//! or death records behind.

pub mod rank;
pub mod validate;

use chrono::{Datelike, NaiveDate};
use fabula_core::calendar::Calendar;
use fabula_core::config::AnalysisConfig;
use fabula_core::errors::{Diagnostic, FabulaError, FabulaResult};
use fabula_core::models::chapter::Chapter;
use fabula_core::models::event::{EventResolution, TimelineEvent};
use fabula_core::models::identifiers::{ChapterId, Confidence, EntityId};
use fabula_core::models::instance::Discriminator;
use fabula_core::models::marker::{
    CalendarUnit, CandidateValue, MarkerCandidate, MarkerValue, TemporalMarker,
};
use fabula_core::models::records::{DeathAssertion, KnowledgeFact};
use fabula_core::FxHashMap;
use tracing::{debug, info};

use crate::map::TemporalMap;
use crate::resolve::{discriminator_for, Frame, FrameSet, Resolver};
use rank::RankKey;

/// Confidence of the synthetic day-zero anchor used when a manuscript
/// has relative markers but no absolute date at all.
const SYNTHETIC_ANCHOR_CONFIDENCE: f64 = 0.5;

/// An instance materialization staged for commit.
struct StagedInstance {
    entity: EntityId,
    discriminator: Discriminator,
    confidence: Confidence,
    day_offset: Option<i64>,
}

/// Everything one chapter produced, applied to the map only when the
/// whole chapter resolved.
#[derive(Default)]
struct ChapterDraft {
    events: Vec<TimelineEvent>,
    instances: Vec<StagedInstance>,
    diagnostics: Vec<Diagnostic>,
}

/// Mutable state threaded through the build.
struct BuildState {
    frames: FrameSet,
    /// First absolute date seen; origin of the day-offset scale once
    /// dates exist.
    epoch: Option<NaiveDate>,
    discourse: u64,
}

pub struct TimelineBuilder<'a> {
    config: &'a AnalysisConfig,
    calendar: &'a dyn Calendar,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(config: &'a AnalysisConfig, calendar: &'a dyn Calendar) -> Self {
        Self { config, calendar }
    }

    /// Build the timeline, populating `map` as the sole writer.
    /// Returns events sorted by narrative order.
    pub fn build(
        &self,
        chapters: &[Chapter],
        candidates: &[MarkerCandidate],
        deaths: &[DeathAssertion],
        facts: &[KnowledgeFact],
        map: &mut TemporalMap,
    ) -> FabulaResult<Vec<TimelineEvent>> {
        self.config.validate().map_err(FabulaError::InvalidConfig)?;
        let ordered = validate::check_inputs(chapters, candidates, deaths, facts)?;

        for chapter in &ordered {
            map.register_chapter(chapter);
        }
        let first_chapter = ordered[0].id;
        for ov in &self.config.instance_overrides {
            let id = map.register_instance(
                &ov.entity,
                ov.discriminator,
                first_chapter,
                Confidence::FULL,
                None,
            );
            map.observe_instance(&id, first_chapter);
        }

        let mut candidates_by_chapter: FxHashMap<ChapterId, Vec<&MarkerCandidate>> =
            FxHashMap::default();
        for candidate in candidates {
            candidates_by_chapter
                .entry(candidate.chapter)
                .or_default()
                .push(candidate);
        }
        for list in candidates_by_chapter.values_mut() {
            list.sort_by_key(|c| (c.span.start, c.span.end));
        }
        let mut deaths_by_chapter: FxHashMap<ChapterId, Vec<&DeathAssertion>> =
            FxHashMap::default();
        for death in deaths {
            deaths_by_chapter.entry(death.chapter).or_default().push(death);
        }
        let mut facts_by_chapter: FxHashMap<ChapterId, Vec<&KnowledgeFact>> =
            FxHashMap::default();
        for fact in facts {
            facts_by_chapter.entry(fact.learned_in).or_default().push(fact);
        }

        let resolver = Resolver::new(self.calendar);
        let mut state = BuildState {
            frames: FrameSet::new(),
            epoch: None,
            discourse: 0,
        };
        let mut events: Vec<TimelineEvent> = Vec::new();

        let has_absolute = candidates
            .iter()
            .any(|c| matches!(c.value, CandidateValue::AbsoluteDate { .. }));
        let has_relative = candidates.iter().any(|c| {
            matches!(
                c.value,
                CandidateValue::RelativeOffset { .. } | CandidateValue::Duration { .. }
            )
        });
        if !has_absolute && has_relative {
            // No date anywhere: ground the offset scale at day zero of
            // the first chapter instead of inventing a fictitious date.
            let confidence = Confidence::new(SYNTHETIC_ANCHOR_CONFIDENCE);
            state.frames.set_global(Frame {
                date: None,
                day_offset: Some(0),
                confidence: Some(confidence),
            });
            events.push(TimelineEvent {
                chapter: first_chapter,
                discourse_position: state.discourse,
                day_offset: Some(0),
                story_date: None,
                weekday: None,
                entity: None,
                instance: None,
                narrative_order: 0,
                confidence,
                resolution: EventResolution::Resolved,
                superseded: false,
                source_span: None,
            });
            state.discourse += 1;
            debug!("no absolute dates; synthetic day-zero anchor installed");
        }

        for chapter in &ordered {
            let chapter_candidates = candidates_by_chapter
                .get(&chapter.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let draft = self.process_chapter(chapter, chapter_candidates, &resolver, &mut state)?;

            // Commit: the only point the map is mutated for this chapter.
            for staged in draft.instances {
                let day_offset = staged
                    .day_offset
                    .map(|o| map.clamp_offset(chapter.id, o));
                let id = map.register_instance(
                    &staged.entity,
                    staged.discriminator,
                    chapter.id,
                    staged.confidence,
                    day_offset,
                );
                map.observe_instance(&id, chapter.id);
            }
            for mut event in draft.events {
                if let Some(offset) = event.day_offset {
                    event.day_offset = Some(map.clamp_offset(chapter.id, offset));
                }
                events.push(event);
            }
            for diagnostic in draft.diagnostics {
                map.push_diagnostic(diagnostic);
            }
            if let Some(chapter_deaths) = deaths_by_chapter.get(&chapter.id) {
                for death in chapter_deaths {
                    map.register_death(
                        &death.entity,
                        death.instance.clone(),
                        death.chapter,
                        death.confidence,
                    );
                }
            }
            if let Some(chapter_facts) = facts_by_chapter.get(&chapter.id) {
                for fact in chapter_facts {
                    map.register_fact((*fact).clone());
                }
            }
        }

        mark_superseded(&mut events);

        events.sort_by(|a, b| RankKey::for_event(a).cmp(&RankKey::for_event(b)));
        for (idx, event) in events.iter_mut().enumerate() {
            event.narrative_order = idx as u64;
        }

        // Chapter story ranks are dense positions over the positioned
        // chapters in story-time order, taken from each chapter's
        // best-positioned event. Rank distances thereby count chapters,
        // not events. Chapters with no positional evidence keep no rank
        // and fall back to discourse order in queries.
        let mut best: FxHashMap<ChapterId, u64> = FxHashMap::default();
        for event in &events {
            if event.superseded || (event.story_date.is_none() && event.day_offset.is_none()) {
                continue;
            }
            let entry = best.entry(event.chapter).or_insert(event.narrative_order);
            *entry = (*entry).min(event.narrative_order);
        }
        let mut positioned: Vec<(ChapterId, u64)> = best.into_iter().collect();
        positioned.sort_by_key(|&(_, order)| order);
        for (rank, (chapter, _)) in positioned.iter().enumerate() {
            map.set_story_rank(*chapter, rank as u64);
        }

        info!(
            chapters = ordered.len(),
            events = events.len(),
            "timeline built"
        );
        Ok(events)
    }

    fn process_chapter(
        &self,
        chapter: &Chapter,
        candidates: &[&MarkerCandidate],
        resolver: &Resolver<'_>,
        state: &mut BuildState,
    ) -> FabulaResult<ChapterDraft> {
        let mut draft = ChapterDraft::default();

        for candidate in candidates {
            let (marker, diagnostic) = resolver.normalize(candidate);
            if let Some(d) = diagnostic {
                draft.diagnostics.push(d);
            }
            let position = state.discourse;
            state.discourse += 1;
            let event = self.place_marker(&marker, chapter.id, position, state, &mut draft);
            draft.events.push(event);
        }

        Ok(draft)
    }

    /// Resolve one normalized marker into a timeline event, updating
    /// frames and staging instance materializations.
    fn place_marker(
        &self,
        marker: &TemporalMarker,
        chapter: ChapterId,
        position: u64,
        state: &mut BuildState,
        draft: &mut ChapterDraft,
    ) -> TimelineEvent {
        let mut event = TimelineEvent {
            chapter,
            discourse_position: position,
            day_offset: None,
            story_date: None,
            weekday: None,
            entity: marker.entity.clone(),
            instance: None,
            narrative_order: 0,
            confidence: marker.confidence,
            resolution: EventResolution::Resolved,
            superseded: false,
            source_span: Some(marker.span),
        };

        match &marker.value {
            MarkerValue::AbsoluteDate { date } => {
                let epoch = *state.epoch.get_or_insert(*date);
                let offset = date.signed_duration_since(epoch).num_days();
                let frame = Frame {
                    date: Some(*date),
                    day_offset: Some(offset),
                    confidence: Some(marker.confidence),
                };
                state.frames.set_global(frame);
                if let Some(entity) = &marker.entity {
                    state.frames.set_entity(entity, frame);
                }
                event.story_date = Some(*date);
                event.weekday = Some(date.weekday());
                event.day_offset = Some(offset);
            }
            MarkerValue::RelativeOffset { days } => {
                let base = self.base_frame(marker, state);
                let chained = Confidence::new(
                    marker
                        .confidence
                        .value()
                        .min(base.confidence.map_or(1.0, |c| c.value()))
                        * self.config.relative_chain_damping,
                );
                let mut frame = base.shifted(*days);
                frame.confidence = Some(chained);
                self.store_frame(marker, frame, state);
                event.story_date = frame.date;
                event.weekday = frame.date.map(|d| d.weekday());
                event.day_offset = frame.day_offset;
                event.confidence = chained;
            }
            MarkerValue::Duration { days } => {
                // A duration positions its scene at the current frame
                // and moves time forward past it.
                let base = state.frames.resolve_for(marker.entity.as_ref());
                event.story_date = base.date;
                event.weekday = base.date.map(|d| d.weekday());
                event.day_offset = base.day_offset;
                if !base.is_empty() {
                    self.store_frame(marker, base.shifted(*days), state);
                }
            }
            MarkerValue::AgePhase { .. } | MarkerValue::RelativeYearOffset { .. } => {
                // Age evidence does not move the scene clock; a year
                // offset jumps the entity's own track.
                let base = state.frames.resolve_for(marker.entity.as_ref());
                event.story_date = base.date;
                event.weekday = base.date.map(|d| d.weekday());
                event.day_offset = base.day_offset;
                if let (Some(entity), Some(discriminator)) =
                    (&marker.entity, discriminator_for(marker))
                {
                    if marker.confidence.value() >= self.config.min_instance_confidence {
                        let placed = match discriminator {
                            Discriminator::YearOffset { years } => {
                                let magnitude = self
                                    .calendar
                                    .to_days(years.unsigned_abs(), CalendarUnit::Year);
                                let jumped = base
                                    .shifted(if years < 0 { -magnitude } else { magnitude });
                                state.frames.set_entity(entity, jumped);
                                jumped
                            }
                            _ => base,
                        };
                        event.story_date = placed.date;
                        event.weekday = placed.date.map(|d| d.weekday());
                        event.day_offset = placed.day_offset;
                        event.instance = Some(discriminator.instance_id(entity));
                        draft.instances.push(StagedInstance {
                            entity: entity.clone(),
                            discriminator,
                            confidence: marker.confidence,
                            day_offset: placed.day_offset,
                        });
                    } else {
                        debug!(
                            entity = %entity,
                            confidence = marker.confidence.value(),
                            "instance evidence below confidence threshold"
                        );
                    }
                }
            }
            MarkerValue::Unresolved { .. } => {
                event.resolution = EventResolution::Unresolved;
                event.confidence = Confidence::ZERO;
            }
        }

        event
    }

    /// Frame a relative marker resolves against. A chain with no
    /// anchor at all grounds itself at day zero of the offset scale.
    fn base_frame(&self, marker: &TemporalMarker, state: &BuildState) -> Frame {
        let base = state.frames.resolve_for(marker.entity.as_ref());
        if base.is_empty() {
            Frame {
                date: None,
                day_offset: Some(0),
                confidence: Some(marker.confidence),
            }
        } else {
            base
        }
    }

    fn store_frame(&self, marker: &TemporalMarker, frame: Frame, state: &mut BuildState) {
        match &marker.entity {
            Some(entity) => state.frames.set_entity(entity, frame),
            None => state.frames.set_global(frame),
        }
    }
}

/// Keep the strongest absolute date per chapter; flag the rest.
/// Superseded events stay in the output for auditability.
fn mark_superseded(events: &mut [TimelineEvent]) {
    let mut by_chapter: FxHashMap<ChapterId, Vec<usize>> = FxHashMap::default();
    for (idx, event) in events.iter().enumerate() {
        if event.story_date.is_some() && event.resolution == EventResolution::Resolved {
            by_chapter.entry(event.chapter).or_default().push(idx);
        }
    }
    for indices in by_chapter.values() {
        let dates: Vec<_> = indices
            .iter()
            .filter_map(|&i| events[i].story_date)
            .collect();
        if dates.windows(2).all(|w| w[0] == w[1]) {
            continue;
        }
        let winner = *indices
            .iter()
            .max_by(|&&a, &&b| {
                events[a]
                    .confidence
                    .value()
                    .partial_cmp(&events[b].confidence.value())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // Ties go to the earlier phrase.
                    .then(events[b].discourse_position.cmp(&events[a].discourse_position))
            })
            .expect("non-empty chapter group");
        let winning_date = events[winner].story_date;
        for &idx in indices {
            if events[idx].story_date != winning_date {
                events[idx].superseded = true;
            }
        }
    }
}
