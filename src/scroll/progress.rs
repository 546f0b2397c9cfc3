use crate::foundation::{
    core::Progress,
    error::{ReelError, ReelResult},
};

/// Scroll offsets bounding a tall container.
///
/// `start` is the offset at which the container's top meets the viewport's top; `end` is the
/// offset at which the container's bottom meets the viewport's bottom.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollRange {
    pub start: f64,
    pub end: f64,
}

impl ScrollRange {
    pub fn new(start: f64, end: f64) -> ReelResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ReelError::validation("scroll range offsets must be finite"));
        }
        if end < start {
            return Err(ReelError::validation(format!(
                "scroll range end ({end}) must be >= start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Range for a container at document offset `top` with height `height`, seen through a
    /// viewport `viewport_height` tall.
    ///
    /// A container no taller than the viewport yields an empty range.
    pub fn for_container(top: f64, height: f64, viewport_height: f64) -> ReelResult<Self> {
        let end = top + (height - viewport_height).max(0.0);
        Self::new(top, end)
    }

    pub fn len(self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.len() <= 0.0
    }

    /// Linear position of `scroll_y` inside the range, clamped to `[0, 1]`.
    pub fn progress_at(self, scroll_y: f64) -> Progress {
        if self.is_empty() {
            return if scroll_y >= self.start {
                Progress::ONE
            } else {
                Progress::ZERO
            };
        }
        Progress::new((scroll_y - self.start) / self.len())
    }
}

/// One scroll notification.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScrollTick {
    pub scroll_y: f64,
    pub progress: Progress,
}

/// Tracks the page scroll offset against a container and normalizes it to [`Progress`].
///
/// Every call to [`ScrollProgressSource::on_scroll`] is a notification; nothing is debounced.
#[derive(Clone, Debug)]
pub struct ScrollProgressSource {
    container_top: f64,
    container_vh: f64,
    range: ScrollRange,
    last: ScrollTick,
}

impl ScrollProgressSource {
    /// Source for a container starting at `container_top` whose height is `container_vh`
    /// viewport heights (`8.0` for an `800vh` section).
    pub fn new(container_top: f64, container_vh: f64, viewport_height: f64) -> ReelResult<Self> {
        if !container_vh.is_finite() || container_vh <= 0.0 {
            return Err(ReelError::validation(
                "container height in viewport units must be > 0",
            ));
        }
        let range = ScrollRange::for_container(
            container_top,
            container_vh * viewport_height,
            viewport_height,
        )?;
        Ok(Self {
            container_top,
            container_vh,
            range,
            last: ScrollTick {
                scroll_y: 0.0,
                progress: range.progress_at(0.0),
            },
        })
    }

    /// Source with an explicit range, for hosts that measure the container themselves.
    pub fn with_range(range: ScrollRange) -> Self {
        Self {
            container_top: range.start,
            container_vh: 0.0,
            range,
            last: ScrollTick {
                scroll_y: 0.0,
                progress: range.progress_at(0.0),
            },
        }
    }

    pub fn range(&self) -> ScrollRange {
        self.range
    }

    pub fn last(&self) -> ScrollTick {
        self.last
    }

    pub fn progress(&self) -> Progress {
        self.last.progress
    }

    pub fn on_scroll(&mut self, scroll_y: f64) -> ScrollTick {
        let scroll_y = if scroll_y.is_finite() {
            scroll_y
        } else {
            self.last.scroll_y
        };
        self.last = ScrollTick {
            scroll_y,
            progress: self.range.progress_at(scroll_y),
        };
        self.last
    }

    /// Re-derive the range after a viewport height change and re-evaluate the last offset.
    ///
    /// Sources built with an explicit range keep it.
    pub fn on_resize(&mut self, viewport_height: f64) -> ReelResult<ScrollTick> {
        if self.container_vh > 0.0 {
            self.range = ScrollRange::for_container(
                self.container_top,
                self.container_vh * viewport_height,
                viewport_height,
            )?;
        }
        Ok(self.on_scroll(self.last.scroll_y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/progress.rs"]
mod tests;
