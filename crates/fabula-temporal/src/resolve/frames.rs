//! Active temporal frames.
//!
//! A frame is the "current story moment" a relative marker resolves
//! against: the most recent resolved position for one identity, with
//! the global (scene-level) frame as fallback. Frames never consult
//! wall-clock time.

use chrono::NaiveDate;
use fabula_core::models::identifiers::{Confidence, EntityId};
use fabula_core::FxHashMap;

/// Which identity a frame belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameKey {
    Global,
    Entity(EntityId),
}

/// A story-time position. Either side may be unknown; an event built
/// from a frame carrying both becomes an anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub date: Option<NaiveDate>,
    pub day_offset: Option<i64>,
    /// Confidence of the chain that produced this frame.
    pub confidence: Option<Confidence>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.day_offset.is_none()
    }

    /// Shift the frame by a signed number of days.
    pub fn shifted(&self, days: i64) -> Frame {
        Frame {
            date: self
                .date
                .and_then(|d| d.checked_add_signed(chrono::Duration::days(days))),
            day_offset: self.day_offset.map(|o| o.saturating_add(days)),
            confidence: self.confidence,
        }
    }
}

/// The per-identity frame table for one build.
#[derive(Debug, Default)]
pub struct FrameSet {
    frames: FxHashMap<FrameKey, Frame>,
}

impl FrameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame a marker for `entity` resolves against: the entity's
    /// own frame if it has one, else the global frame.
    pub fn resolve_for(&self, entity: Option<&EntityId>) -> Frame {
        if let Some(e) = entity {
            if let Some(f) = self.frames.get(&FrameKey::Entity(e.clone())) {
                if !f.is_empty() {
                    return *f;
                }
            }
        }
        self.frames.get(&FrameKey::Global).copied().unwrap_or_default()
    }

    pub fn global(&self) -> Frame {
        self.frames.get(&FrameKey::Global).copied().unwrap_or_default()
    }

    pub fn set_global(&mut self, frame: Frame) {
        self.frames.insert(FrameKey::Global, frame);
    }

    pub fn set_entity(&mut self, entity: &EntityId, frame: Frame) {
        self.frames.insert(FrameKey::Entity(entity.clone()), frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_frame_falls_back_to_global() {
        let mut frames = FrameSet::new();
        frames.set_global(Frame {
            day_offset: Some(10),
            ..Default::default()
        });
        let ana = EntityId::new("ana");
        assert_eq!(frames.resolve_for(Some(&ana)).day_offset, Some(10));

        frames.set_entity(
            &ana,
            Frame {
                day_offset: Some(99),
                ..Default::default()
            },
        );
        assert_eq!(frames.resolve_for(Some(&ana)).day_offset, Some(99));
        assert_eq!(frames.resolve_for(None).day_offset, Some(10));
    }

    #[test]
    fn test_shift_moves_both_scales() {
        let f = Frame {
            date: NaiveDate::from_ymd_opt(1999, 3, 1),
            day_offset: Some(100),
            confidence: None,
        };
        let shifted = f.shifted(3);
        assert_eq!(shifted.date, NaiveDate::from_ymd_opt(1999, 3, 4));
        assert_eq!(shifted.day_offset, Some(103));
    }
}
