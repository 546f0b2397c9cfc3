use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::store::Frame,
    foundation::error::{ReelError, ReelResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Decode one encoded frame (JPEG, PNG, anything `image` understands) into premultiplied RGBA8.
///
/// `position` is the 1-based sequence position the bytes were fetched for.
pub fn decode_frame(position: u32, bytes: &[u8]) -> ReelResult<Frame> {
    if position == 0 {
        return Err(ReelError::validation("frame positions are 1-based"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .with_context(|| format!("decode frame {position} from memory"))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ReelError::load(format!("frame {position} has zero size")));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(Frame {
        position,
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
