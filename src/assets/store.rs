use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Debug)]
/// One decoded still of the sequence, in premultiplied RGBA8 form.
pub struct Frame {
    /// 1-based sequence position the frame was loaded from.
    pub position: u32,
    pub width: u32,
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Fixed-length, immutable sequence of frames indexed by 0-based slot.
///
/// A slot is `None` when its frame failed to load. Absence is tolerated, never repaired.
pub struct FrameStore {
    slots: Vec<Option<Arc<Frame>>>,
}

/// Result of resolving a slot with fallback.
#[derive(Clone, Debug)]
pub struct ResolvedFrame<'a> {
    /// Slot that actually supplied the frame.
    pub slot: usize,
    /// Whether the requested slot was empty and slot 0 was substituted.
    pub fell_back: bool,
    pub frame: &'a Arc<Frame>,
}

impl FrameStore {
    pub fn empty(total: usize) -> Self {
        Self {
            slots: vec![None; total],
        }
    }

    /// Build a store from pre-populated slots.
    ///
    /// Slot `i` must hold the frame for position `i + 1` when present.
    pub fn from_slots(slots: Vec<Option<Arc<Frame>>>) -> ReelResult<Self> {
        for (i, slot) in slots.iter().enumerate() {
            if let Some(frame) = slot
                && frame.position as usize != i + 1
            {
                return Err(ReelError::validation(format!(
                    "slot {i} holds frame position {}, expected {}",
                    frame.position,
                    i + 1
                )));
            }
        }
        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn resolved(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn missing(&self) -> usize {
        self.len() - self.resolved()
    }

    pub fn get(&self, slot: usize) -> Option<&Arc<Frame>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Resolve `slot` (clamped to `[0, N-1]`), substituting slot 0 when the slot is empty.
    ///
    /// Returns `None` only when neither the slot nor slot 0 holds a frame.
    pub fn resolve(&self, slot: usize) -> Option<ResolvedFrame<'_>> {
        let last = self.len().checked_sub(1)?;
        let slot = slot.min(last);
        if let Some(frame) = self.get(slot) {
            return Some(ResolvedFrame {
                slot,
                fell_back: false,
                frame,
            });
        }
        self.get(0).map(|frame| ResolvedFrame {
            slot: 0,
            fell_back: slot != 0,
            frame,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
