use crate::foundation::{
    error::{ReelError, ReelResult},
    math::{mul_div255_u8, unpremul_channel},
};

/// Cosmetic color filter applied to frame images before they are drawn.
///
/// Semantics follow the CSS filter chain `contrast(c) saturate(s)`: each stage works on
/// straight-alpha sRGB values in `[0, 1]` and clamps its output. Alpha is untouched.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameFilter {
    pub contrast: f64,
    pub saturate: f64,
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self {
            contrast: 1.1,
            saturate: 1.1,
        }
    }
}

impl FrameFilter {
    pub const IDENTITY: Self = Self {
        contrast: 1.0,
        saturate: 1.0,
    };

    pub fn validate(&self) -> ReelResult<()> {
        for (name, v) in [("contrast", self.contrast), ("saturate", self.saturate)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::config(format!(
                    "filter {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.contrast == 1.0 && self.saturate == 1.0
    }

    /// Stable bit pattern for cache keys.
    pub(crate) fn key(&self) -> (u64, u64) {
        (self.contrast.to_bits(), self.saturate.to_bits())
    }

    /// Filter premultiplied RGBA8 pixels in place.
    pub fn apply_premul_rgba8(&self, rgba: &mut [u8]) {
        if self.is_identity() {
            return;
        }

        let contrast_lut = self.contrast_lut();
        let m = self.saturate_matrix();

        for px in rgba.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 {
                continue;
            }
            let straight = |c: u8| if a == 255 { c } else { unpremul_channel(c, a) };
            let r = f32::from(contrast_lut[usize::from(straight(px[0]))]) / 255.0;
            let g = f32::from(contrast_lut[usize::from(straight(px[1]))]) / 255.0;
            let b = f32::from(contrast_lut[usize::from(straight(px[2]))]) / 255.0;

            let out = [
                m[0][0] * r + m[0][1] * g + m[0][2] * b,
                m[1][0] * r + m[1][1] * g + m[1][2] * b,
                m[2][0] * r + m[2][1] * g + m[2][2] * b,
            ];
            for (dst, v) in px[..3].iter_mut().zip(out) {
                let c = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                *dst = if a == 255 {
                    c
                } else {
                    mul_div255_u8(u16::from(c), u16::from(a))
                };
            }
        }
    }

    fn contrast_lut(&self) -> [u8; 256] {
        let k = self.contrast;
        let mut lut = [0u8; 256];
        for (i, out) in lut.iter_mut().enumerate() {
            let c = i as f64 / 255.0;
            let v = ((c - 0.5) * k + 0.5).clamp(0.0, 1.0);
            *out = (v * 255.0).round() as u8;
        }
        lut
    }

    fn saturate_matrix(&self) -> [[f32; 3]; 3] {
        let s = self.saturate as f32;
        [
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/filter.rs"]
mod tests;
