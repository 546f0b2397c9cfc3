//! Scrollreel is a headless, scroll-driven frame-sequence player.
//!
//! A sequence of still images is scrubbed as the page scrolls, simulating video playback
//! without any video decoding. The host feeds scroll offsets, viewport changes and display
//! refresh ticks; the engine answers with progress, overlay opacities, navbar state and pixels.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `FrameSource -> FrameStore` on a background thread (bounded concurrency,
//!    per-attempt timeout, retry, cancellation)
//! 2. **Scroll**: `scroll_y -> Progress` against a tall container (`ScrollProgressSource`)
//! 3. **Map**: `Progress -> frame index` (`FrameMapper`) and `Progress -> OverlayState`
//!    (`OverlayController`)
//! 4. **Render**: cover-fit the resolved frame onto a `DrawSurface` (`CanvasRenderer`),
//!    coalesced to one redraw per refresh tick (`RedrawScheduler`)
//!
//! `ScrollPlayer` wires all of the above together.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Missing frames are not errors**: absent slots fall back to the first frame, or skip.
//! - **Premultiplied RGBA8** end-to-end on the CPU surface.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod footer;
mod foundation;
mod navbar;
mod overlay;
mod player;
mod render;
mod scroll;
mod sweep;

pub use assets::decode::decode_frame;
pub use assets::loader::{CancelToken, FrameLoader, LoadOpts};
pub use assets::source::{DirFrameSource, FrameSource, MemoryFrameSource, frame_file_name};
pub use assets::store::{Frame, FrameStore, ResolvedFrame};
pub use config::{
    FramesConfig, LoaderConfig, MAX_FRAMES, ReelConfig, RenderConfig, ScrollConfig,
};
pub use footer::FooterConfig;
pub use foundation::core::{Affine, Progress, Rect, Rgba8, Vec2, Viewport};
pub use foundation::error::{ReelError, ReelResult};
pub use navbar::{CtaStyle, NavAppearance, NavBar, NavConfig, NavState, NavTransition};
pub use overlay::curve::{Breakpoint, Curve};
pub use overlay::panels::{
    Align, OverlayController, OverlayState, Panel, PanelAction, PanelCopy, PanelSpec,
    default_panels,
};
pub use player::{LoadingIndicator, PlayerState, ScrollPlayer, ScrollUpdate};
pub use render::canvas::{CpuCanvas, DrawSurface, FrameRGBA};
pub use render::cover::{CoverFit, cover_fit};
pub use render::filter::FrameFilter;
pub use render::renderer::{CanvasRenderer, RenderOutcome};
pub use render::schedule::RedrawScheduler;
pub use scroll::mapper::FrameMapper;
pub use scroll::progress::{ScrollProgressSource, ScrollRange, ScrollTick};
pub use sweep::{SweepFrame, SweepOpts, render_sweep, sweep_progress};
