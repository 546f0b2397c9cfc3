/// Coalesces progress-driven redraw requests to one per display refresh.
///
/// Requests between two ticks overwrite each other; only the latest index is drawn.
#[derive(Clone, Debug, Default)]
pub struct RedrawScheduler {
    pending: Option<f64>,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `index` as the next frame to draw.
    ///
    /// Returns `true` when this request scheduled a new redraw, `false` when it was folded into
    /// one already pending.
    pub fn request(&mut self, index: f64) -> bool {
        self.pending.replace(index).is_none()
    }

    /// Consume the pending redraw on a refresh tick.
    pub fn take_due(&mut self) -> Option<f64> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending redraw.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
