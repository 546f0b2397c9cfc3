use crate::{
    assets::store::FrameStore,
    foundation::{
        core::Rgba8,
        error::{ReelError, ReelResult},
    },
    render::{canvas::DrawSurface, cover::cover_fit, filter::FrameFilter},
    scroll::mapper::FrameMapper,
};

/// What a render pass did to the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RenderOutcome {
    Drawn {
        /// Store slot whose frame was painted.
        slot: usize,
        /// 1-based sequence position of that frame.
        position: u32,
        /// The requested slot was empty and slot 0 was substituted.
        fell_back: bool,
    },
    /// No frame was available; the surface was left untouched.
    Skipped,
}

impl RenderOutcome {
    pub fn is_drawn(self) -> bool {
        matches!(self, Self::Drawn { .. })
    }
}

/// Paints one frame of the store, cover-fitted, onto a [`DrawSurface`].
#[derive(Clone, Debug)]
pub struct CanvasRenderer {
    mapper: FrameMapper,
    background: Rgba8,
    filter: Option<FrameFilter>,
    last_index: f64,
}

impl CanvasRenderer {
    pub fn new(mapper: FrameMapper, background: Rgba8, filter: Option<FrameFilter>) -> Self {
        Self {
            mapper,
            background,
            filter,
            last_index: 0.0,
        }
    }

    pub fn mapper(&self) -> FrameMapper {
        self.mapper
    }

    /// Fractional index of the most recent render request.
    pub fn last_index(&self) -> f64 {
        self.last_index
    }

    /// Draw the frame for `index`, falling back to slot 0 when the slot is empty.
    ///
    /// A missing frame is never an error: with nothing to draw the pass is skipped. Surfaces
    /// that cannot filter draw the frame unfiltered.
    pub fn render(
        &mut self,
        index: f64,
        store: &FrameStore,
        surface: &mut dyn DrawSurface,
    ) -> ReelResult<RenderOutcome> {
        self.last_index = index;
        let slot = self.mapper.resolve(index);
        let Some(resolved) = store.resolve(slot) else {
            tracing::debug!(slot, "no frame available, skipping draw");
            return Ok(RenderOutcome::Skipped);
        };
        let frame = resolved.frame;

        let viewport = surface.viewport();
        let Some(fit) = cover_fit(
            f64::from(frame.width),
            f64::from(frame.height),
            viewport.width,
            viewport.height,
        ) else {
            return Ok(RenderOutcome::Skipped);
        };

        surface.begin_frame(self.background)?;
        match surface.set_filter(self.filter) {
            Ok(()) => {}
            Err(ReelError::Unsupported(reason)) => {
                tracing::debug!(%reason, "frame filter unavailable, drawing unfiltered");
            }
            Err(err) => return Err(err),
        }
        surface.draw_frame(frame, &fit)?;
        surface.end_frame()?;

        if resolved.fell_back {
            tracing::debug!(requested = slot, "slot empty, drew first frame instead");
        }
        Ok(RenderOutcome::Drawn {
            slot: resolved.slot,
            position: frame.position,
            fell_back: resolved.fell_back,
        })
    }

    /// Redraw the last requested index, e.g. after the surface was resized.
    pub fn rerender(
        &mut self,
        store: &FrameStore,
        surface: &mut dyn DrawSurface,
    ) -> ReelResult<RenderOutcome> {
        self.render(self.last_index, store, surface)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
