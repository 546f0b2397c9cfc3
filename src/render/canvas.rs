use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use crate::{
    assets::store::Frame,
    foundation::{
        core::{Affine, Rgba8, Viewport},
        error::{ReelError, ReelResult},
    },
    render::{cover::CoverFit, filter::FrameFilter},
};

/// Pixels read back from a drawing surface.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// The drawing target the renderer paints frames onto.
///
/// All coordinates passed in are logical; the surface owns the mapping to physical pixels
/// (`logical * device_pixel_ratio`). A frame is drawn between `begin_frame` and `end_frame`.
pub trait DrawSurface {
    fn viewport(&self) -> Viewport;

    /// Resize the backing store to the viewport's physical size.
    fn resize(&mut self, viewport: Viewport) -> ReelResult<()>;

    /// Clear everything and fill with `background`.
    fn begin_frame(&mut self, background: Rgba8) -> ReelResult<()>;

    /// Set or clear the filter applied to subsequent `draw_frame` calls.
    ///
    /// Surfaces without filter support return [`ReelError::Unsupported`].
    fn set_filter(&mut self, filter: Option<FrameFilter>) -> ReelResult<()>;

    fn draw_frame(&mut self, frame: &Arc<Frame>, fit: &CoverFit) -> ReelResult<()>;

    fn end_frame(&mut self) -> ReelResult<()>;

    fn snapshot(&self) -> FrameRGBA;
}

/// Identifies a cached paint. `pixels` is only meaningful while the entry holds that buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PaintKey {
    pixels: usize,
    position: u32,
    filter: Option<(u64, u64)>,
}

struct CachedPaint {
    // Pins the source buffer so its address cannot be reused by another frame while cached.
    _pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// CPU drawing surface backed by a `vello_cpu` pixmap.
pub struct CpuCanvas {
    viewport: Viewport,
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    filters_supported: bool,
    filter: Option<FrameFilter>,
    paint_cache: HashMap<PaintKey, CachedPaint>,
    lru: VecDeque<PaintKey>,
    cache_capacity: usize,
}

impl CpuCanvas {
    pub const DEFAULT_CACHE_CAPACITY: usize = 32;

    pub fn new(viewport: Viewport) -> ReelResult<Self> {
        let (width, height) = physical_dims(viewport)?;
        Ok(Self {
            viewport,
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width.max(1), height.max(1)),
            ctx: None,
            filters_supported: true,
            filter: None,
            paint_cache: HashMap::new(),
            lru: VecDeque::new(),
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
        })
    }

    /// A surface that rejects filters, like a host context lacking filter effects.
    pub fn without_filters(mut self) -> Self {
        self.filters_supported = false;
        self
    }

    /// Number of decoded frame paints kept alive between draws.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    /// Physical pixel size of the backing store.
    pub fn physical_size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    /// Forget cached frame paints, e.g. after a new store is published.
    pub fn clear_cache(&mut self) {
        self.paint_cache.clear();
        self.lru.clear();
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn paint_for(&mut self, frame: &Frame) -> ReelResult<vello_cpu::Image> {
        let key = PaintKey {
            pixels: Arc::as_ptr(&frame.rgba8_premul) as usize,
            position: frame.position,
            filter: self.filter.filter(|f| !f.is_identity()).map(|f| f.key()),
        };
        if let Some(paint) = self.paint_cache.get(&key).map(|c| c.paint.clone()) {
            self.touch(key);
            return Ok(paint);
        }

        let pixmap = match self.filter {
            Some(filter) if !filter.is_identity() => {
                let mut filtered = frame.rgba8_premul.as_ref().clone();
                filter.apply_premul_rgba8(&mut filtered);
                image_premul_bytes_to_pixmap(&filtered, frame.width, frame.height)?
            }
            _ => image_premul_bytes_to_pixmap(
                frame.rgba8_premul.as_slice(),
                frame.width,
                frame.height,
            )?,
        };
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.paint_cache.insert(
            key,
            CachedPaint {
                _pixels: Arc::clone(&frame.rgba8_premul),
                paint: paint.clone(),
            },
        );
        self.touch(key);
        while self.lru.len() > self.cache_capacity {
            if let Some(old) = self.lru.pop_front() {
                self.paint_cache.remove(&old);
            }
        }
        Ok(paint)
    }

    fn touch(&mut self, key: PaintKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    fn device_transform(&self) -> Affine {
        Affine::scale(self.viewport.device_pixel_ratio)
    }
}

impl DrawSurface for CpuCanvas {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[tracing::instrument(skip(self), fields(w = viewport.width, h = viewport.height))]
    fn resize(&mut self, viewport: Viewport) -> ReelResult<()> {
        let (width, height) = physical_dims(viewport)?;
        if (width, height) != (self.width, self.height) {
            self.pixmap = vello_cpu::Pixmap::new(width.max(1), height.max(1));
        }
        self.viewport = viewport;
        self.width = width;
        self.height = height;
        self.ctx = None;
        Ok(())
    }

    fn begin_frame(&mut self, background: Rgba8) -> ReelResult<()> {
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
        if self.is_empty() {
            self.ctx = None;
            return Ok(());
        }

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            background.a,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
        self.ctx = Some(ctx);
        Ok(())
    }

    fn set_filter(&mut self, filter: Option<FrameFilter>) -> ReelResult<()> {
        if filter.is_some() && !self.filters_supported {
            return Err(ReelError::unsupported("surface has no filter support"));
        }
        self.filter = filter;
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Arc<Frame>, fit: &CoverFit) -> ReelResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        if self.ctx.is_none() {
            return Err(ReelError::render("draw_frame called outside of a frame"));
        }

        let paint = self.paint_for(frame)?;
        let transform = affine_to_cpu(self.device_transform() * fit.to_affine());
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(ReelError::render("draw_frame called outside of a frame"));
        };
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(transform);
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        ));
        Ok(())
    }

    fn end_frame(&mut self) -> ReelResult<()> {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.flush();
            ctx.render_to_pixmap(&mut self.pixmap);
        }
        Ok(())
    }

    fn snapshot(&self) -> FrameRGBA {
        if self.is_empty() {
            return FrameRGBA {
                width: u32::from(self.width),
                height: u32::from(self.height),
                data: Vec::new(),
                premultiplied: true,
            };
        }
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn physical_dims(viewport: Viewport) -> ReelResult<(u16, u16)> {
    let (w, h) = viewport.physical_size();
    let w: u16 = w
        .try_into()
        .map_err(|_| ReelError::validation("surface width exceeds u16"))?;
    let h: u16 = h
        .try_into()
        .map_err(|_| ReelError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("frame height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ReelError::render("frame byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
