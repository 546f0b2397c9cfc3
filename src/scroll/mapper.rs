use crate::foundation::{
    core::Progress,
    error::{ReelError, ReelResult},
};

/// Linear map from scroll progress to a fractional frame index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameMapper {
    total_frames: usize,
}

impl FrameMapper {
    pub fn new(total_frames: usize) -> ReelResult<Self> {
        if total_frames == 0 {
            return Err(ReelError::validation("total frame count must be >= 1"));
        }
        Ok(Self { total_frames })
    }

    pub fn total_frames(self) -> usize {
        self.total_frames
    }

    /// `progress * (N - 1)`.
    pub fn index(self, progress: Progress) -> f64 {
        progress.get() * (self.total_frames - 1) as f64
    }

    /// Floor `index` and clamp it to `[0, N - 1]`. NaN resolves to slot 0.
    pub fn resolve(self, index: f64) -> usize {
        let last = self.total_frames - 1;
        if index.is_nan() || index <= 0.0 {
            return 0;
        }
        let floored = index.floor();
        if floored >= last as f64 {
            last
        } else {
            floored as usize
        }
    }

    /// `resolve(index(progress))`.
    pub fn slot(self, progress: Progress) -> usize {
        self.resolve(self.index(progress))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/mapper.rs"]
mod tests;
