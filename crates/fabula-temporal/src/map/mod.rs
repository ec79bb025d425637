//! The authoritative temporal map for one project: canonical entities,
//! temporal instances, death records, knowledge facts, and chapter
//! story ranks.
//!
//! The map owns every record and hands out ids. During a run it is
//! mutated only by the `TimelineBuilder` (single writer); the
//! evaluators read it through `&` after the build.

mod vitality;

use fabula_core::errors::Diagnostic;
use fabula_core::models::chapter::Chapter;
use fabula_core::models::identifiers::{ChapterId, Confidence, EntityId, InstanceId};
use fabula_core::models::instance::{Discriminator, InstanceState, TemporalInstance};
use fabula_core::models::records::{DeathRecord, KnowledgeFact};
use fabula_core::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

/// Per-chapter bookkeeping. The story rank is the chapter's dense
/// position among positioned chapters in story-time order, installed
/// by the builder after ordering; until then queries fall back to
/// discourse order.
#[derive(Debug, Clone, Copy)]
pub struct ChapterMeta {
    pub discourse_order: u32,
    pub story_rank: Option<u64>,
}

/// A marker referenced a dead instance at an earlier story time.
/// Routed to the non-linear detector as flashback material; the
/// instance state machine never rolls back.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashbackHint {
    pub entity: EntityId,
    pub instance: InstanceId,
    pub chapter: ChapterId,
    pub death_chapter: ChapterId,
}

#[derive(Debug)]
pub struct TemporalMap {
    entities: FxHashSet<EntityId>,
    instances: FxHashMap<InstanceId, TemporalInstance>,
    /// Deterministic iteration order for reports and exports.
    instance_order: Vec<InstanceId>,
    deaths: Vec<DeathRecord>,
    facts: Vec<KnowledgeFact>,
    chapters: FxHashMap<ChapterId, ChapterMeta>,
    diagnostics: Vec<Diagnostic>,
    flashback_hints: Vec<FlashbackHint>,
    /// Shared append sequence for instances and death records, so
    /// "created after the canonical death" is well defined.
    next_seq: u64,
    clamp_logged: FxHashSet<ChapterId>,
    day_offset_clamp: i64,
}

impl TemporalMap {
    pub fn new(day_offset_clamp: i64) -> Self {
        Self {
            entities: FxHashSet::default(),
            instances: FxHashMap::default(),
            instance_order: Vec::new(),
            deaths: Vec::new(),
            facts: Vec::new(),
            chapters: FxHashMap::default(),
            diagnostics: Vec::new(),
            flashback_hints: Vec::new(),
            next_seq: 0,
            clamp_logged: FxHashSet::default(),
            day_offset_clamp,
        }
    }

    // ---- registration (builder only) ----

    pub fn register_chapter(&mut self, chapter: &Chapter) {
        self.chapters.insert(
            chapter.id,
            ChapterMeta {
                discourse_order: chapter.discourse_order,
                story_rank: None,
            },
        );
    }

    /// Entities are created at first mention and never deleted.
    pub fn register_entity(&mut self, entity: &EntityId) {
        self.entities.insert(entity.clone());
    }

    /// Upsert a temporal instance. The id is derived from the
    /// discriminator, so re-registering the same evidence is a no-op
    /// apart from a state bump — re-runs can never duplicate.
    pub fn register_instance(
        &mut self,
        entity: &EntityId,
        discriminator: Discriminator,
        chapter: ChapterId,
        confidence: Confidence,
        day_offset: Option<i64>,
    ) -> InstanceId {
        self.register_entity(entity);
        let id = discriminator.instance_id(entity);
        if let Some(existing) = self.instances.get_mut(&id) {
            if existing.state == InstanceState::Created {
                existing.state = InstanceState::Active;
            }
            if existing.day_offset.is_none() {
                existing.day_offset = day_offset;
            }
            return id;
        }
        let seq = self.bump_seq();
        debug!(instance = %id, %chapter, "materialized temporal instance");
        self.instances.insert(
            id.clone(),
            TemporalInstance {
                entity: entity.clone(),
                id: id.clone(),
                discriminator,
                origin_chapter: chapter,
                day_offset,
                created_seq: seq,
                state: InstanceState::Created,
                confidence,
                proper_time: None,
            },
        );
        self.instance_order.push(id.clone());
        id
    }

    /// Note that a chapter references an instance. Dead instances stay
    /// dead; the sighting becomes a flashback hint instead.
    pub fn observe_instance(&mut self, id: &InstanceId, chapter: ChapterId) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        match instance.state {
            InstanceState::Created => instance.state = InstanceState::Active,
            InstanceState::Active => {}
            InstanceState::Dead => {
                let death_chapter = self
                    .deaths
                    .iter()
                    .find(|r| r.instance.as_ref() == Some(id))
                    .map(|r| r.chapter)
                    .unwrap_or(chapter);
                self.flashback_hints.push(FlashbackHint {
                    entity: instance.entity.clone(),
                    instance: id.clone(),
                    chapter,
                    death_chapter,
                });
            }
        }
    }

    /// Append a death record. Never rejects: contradictions are kept
    /// and reported as diagnostics, reconciled at query time.
    pub fn register_death(
        &mut self,
        entity: &EntityId,
        instance: Option<InstanceId>,
        chapter: ChapterId,
        confidence: Confidence,
    ) {
        self.register_entity(entity);
        if let Some(prior) = self
            .deaths
            .iter()
            .find(|r| r.entity == *entity && r.instance == instance && r.chapter != chapter)
        {
            warn!(
                %entity,
                first = %prior.chapter,
                second = %chapter,
                "conflicting death records"
            );
            self.diagnostics.push(Diagnostic::ConflictingDeathRecord {
                entity: entity.clone(),
                instance: instance.clone(),
                first_chapter: prior.chapter,
                second_chapter: chapter,
            });
        }
        let seq = self.bump_seq();
        if let Some(id) = &instance {
            if let Some(inst) = self.instances.get_mut(id) {
                // DEAD is terminal.
                inst.state = InstanceState::Dead;
            }
        }
        self.deaths.push(DeathRecord {
            entity: entity.clone(),
            instance,
            chapter,
            confidence,
            seq,
        });
    }

    pub fn register_fact(&mut self, fact: KnowledgeFact) {
        let knower = fact.entity.clone();
        self.register_entity(&knower);
        self.facts.push(fact);
    }

    /// Install the story rank the builder computed for a chapter.
    pub fn set_story_rank(&mut self, chapter: ChapterId, rank: u64) {
        if let Some(meta) = self.chapters.get_mut(&chapter) {
            meta.story_rank = Some(rank);
        }
    }

    /// Record a diagnostic raised outside the map itself.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    // ---- queries ----

    /// Clamp a day offset to the engine bound. Total: extreme inputs
    /// degrade to the bound, logged once per chapter.
    pub fn clamp_offset(&mut self, chapter: ChapterId, requested: i64) -> i64 {
        let bound = self.day_offset_clamp;
        if requested.abs() <= bound {
            return requested;
        }
        let clamped = requested.clamp(-bound, bound);
        if self.clamp_logged.insert(chapter) {
            warn!(%chapter, requested, clamped, "day offset clamped");
            self.diagnostics.push(Diagnostic::OverflowClamped {
                chapter,
                requested,
                clamped_to: clamped,
            });
        }
        clamped
    }

    /// True when chapter `a` is at or before chapter `b` in story
    /// time. Falls back to discourse order while ranks are missing, so
    /// the relation stays total.
    pub fn at_or_before(&self, a: ChapterId, b: ChapterId) -> bool {
        let (Some(ma), Some(mb)) = (self.chapters.get(&a), self.chapters.get(&b)) else {
            return a.0 <= b.0;
        };
        match (ma.story_rank, mb.story_rank) {
            (Some(ra), Some(rb)) => ra <= rb,
            _ => ma.discourse_order <= mb.discourse_order,
        }
    }

    /// Distance between two chapters in story order, measured in
    /// chapters. Story ranks and discourse orders are different
    /// scales, so the comparison uses ranks only when both chapters
    /// carry one.
    pub fn rank_distance(&self, a: ChapterId, b: ChapterId) -> u64 {
        match (self.chapters.get(&a), self.chapters.get(&b)) {
            (Some(ma), Some(mb)) => match (ma.story_rank, mb.story_rank) {
                (Some(ra), Some(rb)) => ra.abs_diff(rb),
                _ => u64::from(ma.discourse_order).abs_diff(u64::from(mb.discourse_order)),
            },
            _ => u64::from(a.0).abs_diff(u64::from(b.0)),
        }
    }

    pub fn chapter_meta(&self, chapter: ChapterId) -> Option<&ChapterMeta> {
        self.chapters.get(&chapter)
    }

    pub fn contains_chapter(&self, chapter: ChapterId) -> bool {
        self.chapters.contains_key(&chapter)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter()
    }

    pub fn instance(&self, id: &InstanceId) -> Option<&TemporalInstance> {
        self.instances.get(id)
    }

    /// Instances in creation order.
    pub fn instances(&self) -> impl Iterator<Item = &TemporalInstance> {
        self.instance_order.iter().filter_map(|id| self.instances.get(id))
    }

    pub fn deaths(&self) -> &[DeathRecord] {
        &self.deaths
    }

    pub fn facts(&self) -> &[KnowledgeFact] {
        &self.facts
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn flashback_hints(&self) -> &[FlashbackHint] {
        &self.flashback_hints
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
