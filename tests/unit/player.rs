use std::{io::Cursor, time::Duration};

use super::*;
use crate::{
    assets::{source::MemoryFrameSource, store::Frame},
    overlay::panels::Panel,
};

const FRAMES: usize = 5;

fn config() -> ReelConfig {
    let mut config = ReelConfig::default();
    config.frames.count = FRAMES;
    config.loader.timeout_ms = Some(5_000);
    config.loader.retries = 0;
    config
}

fn viewport() -> Viewport {
    Viewport::new(10.0, 10.0, 1.0).unwrap()
}

fn player() -> ScrollPlayer {
    let canvas = CpuCanvas::new(viewport()).unwrap();
    ScrollPlayer::new(config(), viewport(), canvas).unwrap()
}

fn frame(position: u32) -> Option<Arc<Frame>> {
    let shade = (position * 40) as u8;
    Some(Arc::new(Frame {
        position,
        width: 4,
        height: 4,
        rgba8_premul: Arc::new([shade, shade, shade, 255].repeat(16)),
    }))
}

fn full_store() -> FrameStore {
    FrameStore::from_slots((1..=FRAMES as u32).map(frame).collect()).unwrap()
}

fn png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([shade, shade, shade, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn scroll_flood_coalesces_into_one_draw_of_latest_index() {
    let mut p = player();
    p.set_store(full_store()).unwrap();
    p.on_animation_frame();

    let first = p.on_scroll(7.0);
    assert!(first.redraw_scheduled);
    for y in [14.0, 28.0, 42.0, 56.0] {
        assert!(!p.on_scroll(y).redraw_scheduled);
    }
    let last = p.on_scroll(70.0);
    assert_eq!(last.progress, Progress::ONE);
    assert_eq!(last.frame_index, 4.0);

    assert_eq!(
        p.on_animation_frame(),
        Some(RenderOutcome::Drawn {
            slot: 4,
            position: 5,
            fell_back: false
        })
    );
    assert_eq!(p.on_animation_frame(), None);
}

#[test]
fn scroll_update_carries_overlay_and_navbar() {
    let mut p = player();
    let update = p.on_scroll(14.0);
    assert!((update.progress.get() - 0.2).abs() < 1e-12);
    assert!((update.overlay.opacity(Panel::Engineering) - 0.5).abs() < 1e-9);
    assert_eq!(update.overlay.opacity(Panel::Hero), 0.0);
    assert_eq!(update.nav_transition, None);

    let update = p.on_scroll(150.0);
    assert_eq!(update.progress, Progress::ONE);
    assert_eq!(
        update.nav_transition,
        Some(NavTransition {
            from: NavState::Transparent,
            to: NavState::Opaque
        })
    );
    assert_eq!(update.overlay.opacity(Panel::CallToAction), 1.0);
    assert_eq!(p.nav_state(), NavState::Opaque);
}

#[test]
fn rendering_before_frames_load_is_skipped() {
    let mut p = player();
    p.on_scroll(30.0);
    assert_eq!(p.on_animation_frame(), Some(RenderOutcome::Skipped));
    assert!(p.loading().visible);
}

#[test]
fn background_load_publishes_store_and_hides_indicator() {
    let mut source = MemoryFrameSource::new();
    for position in 1..=FRAMES as u32 {
        if position != 3 {
            source.insert(position, png_bytes(position as u8 * 30));
        }
    }

    let mut p = player();
    p.begin_loading(Arc::new(source)).unwrap();
    assert!(p.is_loading());
    let indicator = p.finish_loading().unwrap();

    assert!(!indicator.visible);
    assert_eq!(indicator.percent, 100.0);
    assert_eq!(indicator.label(), "100%");
    assert!(!p.is_loading());
    assert_eq!(p.store().len(), FRAMES);
    assert_eq!(p.store().missing(), 1);

    // Publishing schedules a draw of the current frame.
    assert!(p.on_animation_frame().is_some_and(RenderOutcome::is_drawn));
}

#[test]
fn poll_loading_never_blocks_and_eventually_publishes() {
    let mut source = MemoryFrameSource::new();
    for position in 1..=FRAMES as u32 {
        source.insert(position, png_bytes(200));
    }
    let mut p = player();
    p.begin_loading(Arc::new(source)).unwrap();

    let mut last = 0.0;
    for _ in 0..500 {
        let indicator = p.poll_loading();
        assert!(indicator.percent >= last);
        last = indicator.percent;
        if !indicator.visible {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(!p.loading().visible);
    assert_eq!(p.store().resolved(), FRAMES);
}

#[test]
fn cancelled_load_publishes_nothing() {
    struct Slow;
    impl FrameSource for Slow {
        fn fetch(&self, _position: u32) -> ReelResult<Vec<u8>> {
            std::thread::sleep(Duration::from_millis(100));
            Ok(png_bytes(10))
        }
    }

    let mut p = player();
    p.begin_loading(Arc::new(Slow)).unwrap();
    p.cancel_loading();
    assert!(!p.is_loading());
    std::thread::sleep(Duration::from_millis(300));
    p.poll_loading();
    assert_eq!(p.store().resolved(), 0);
    assert!(p.loading().visible);
}

#[test]
fn resize_redraws_synchronously() {
    let mut p = player();
    p.set_store(full_store()).unwrap();
    let outcome = p
        .on_resize(Viewport::new(6.0, 3.0, 2.0).unwrap())
        .unwrap();
    assert!(outcome.is_drawn());
    let snap = p.snapshot();
    assert_eq!((snap.width, snap.height), (12, 6));
    assert!(snap.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn resize_keeps_offset_and_rederives_progress() {
    let mut p = player();
    p.on_scroll(35.0);
    assert!((p.progress().get() - 0.5).abs() < 1e-12);
    // Taller viewport: the container grows to 8 x 20, range becomes 0..140.
    p.on_resize(Viewport::new(10.0, 20.0, 1.0).unwrap()).unwrap();
    assert!((p.progress().get() - 0.25).abs() < 1e-12);
}

#[test]
fn store_length_must_match_frame_count() {
    let mut p = player();
    assert!(p.set_store(FrameStore::empty(FRAMES + 1)).is_err());
}

#[test]
fn state_serializes_for_hosts() {
    let mut p = player();
    p.on_scroll(200.0);
    let state = p.state();
    assert_eq!(state.slot, FRAMES - 1);
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["navbar"]["state"], "opaque");
    assert_eq!(json["overlay"]["call-to-action"], 1.0);
    assert_eq!(json["loading"]["visible"], true);
}
