use crate::foundation::core::{Affine, Vec2};

/// Placement of an image scaled to cover a target area, centered, overflow cropped.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CoverFit {
    /// Uniform scale applied to the image.
    pub ratio: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    /// Left edge of the scaled image; negative when horizontal overflow is cropped.
    pub offset_x: f64,
    /// Top edge of the scaled image; negative when vertical overflow is cropped.
    pub offset_y: f64,
}

impl CoverFit {
    /// Image-space to target-space transform.
    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.offset_x, self.offset_y)) * Affine::scale(self.ratio)
    }
}

/// `ratio = max(target_w / image_w, target_h / image_h)`, centered on both axes.
///
/// Returns `None` for a zero-sized image.
pub fn cover_fit(image_w: f64, image_h: f64, target_w: f64, target_h: f64) -> Option<CoverFit> {
    if image_w <= 0.0 || image_h <= 0.0 {
        return None;
    }
    let ratio = (target_w / image_w).max(target_h / image_h);
    let draw_width = image_w * ratio;
    let draw_height = image_h * ratio;
    Some(CoverFit {
        ratio,
        draw_width,
        draw_height,
        offset_x: (target_w - draw_width) / 2.0,
        offset_y: (target_h - draw_height) / 2.0,
    })
}
