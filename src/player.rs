use std::{
    sync::{Arc, mpsc},
    thread,
};

use crate::{
    assets::{
        loader::{CancelToken, FrameLoader},
        source::FrameSource,
        store::FrameStore,
    },
    config::ReelConfig,
    footer::FooterConfig,
    foundation::{
        core::{Progress, Viewport},
        error::{ReelError, ReelResult},
    },
    navbar::{NavAppearance, NavBar, NavState, NavTransition},
    overlay::panels::{OverlayController, OverlayState},
    render::{
        canvas::{CpuCanvas, DrawSurface, FrameRGBA},
        renderer::{CanvasRenderer, RenderOutcome},
        schedule::RedrawScheduler,
    },
    scroll::{
        mapper::FrameMapper,
        progress::{ScrollProgressSource, ScrollRange},
    },
};

/// Loading overlay shown until the frame store is published.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LoadingIndicator {
    /// Cumulative share of settled fetch attempts, `0..=100`.
    pub percent: f64,
    pub visible: bool,
}

impl LoadingIndicator {
    /// Whole-percent label, e.g. `"42%"`.
    pub fn label(&self) -> String {
        format!("{:.0}%", self.percent)
    }
}

/// Everything derived from one scroll notification.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScrollUpdate {
    pub progress: Progress,
    pub frame_index: f64,
    pub overlay: OverlayState,
    pub nav_transition: Option<NavTransition>,
    /// A new redraw was scheduled (`false` when folded into a pending one).
    pub redraw_scheduled: bool,
}

/// Serializable view of the player for hosts and tooling.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlayerState {
    pub scroll_y: f64,
    pub progress: Progress,
    pub frame_index: f64,
    pub slot: usize,
    pub overlay: OverlayState,
    pub navbar: NavAppearance,
    pub loading: LoadingIndicator,
}

enum LoadEvent {
    Progress(f64),
    Finished(FrameStore),
    Failed(ReelError),
}

struct LoadHandle {
    cancel: CancelToken,
    events: mpsc::Receiver<LoadEvent>,
}

/// Scroll-driven frame sequence player.
///
/// All state lives on the host thread. Scroll ticks update derived state immediately and
/// schedule at most one redraw, which is performed on the next [`ScrollPlayer::on_animation_frame`].
/// Resizes redraw synchronously. Frames load on a background thread and are published in one
/// piece by [`ScrollPlayer::poll_loading`].
pub struct ScrollPlayer<S: DrawSurface = CpuCanvas> {
    config: ReelConfig,
    surface: S,
    scroll: ScrollProgressSource,
    mapper: FrameMapper,
    overlay: OverlayController,
    navbar: NavBar,
    renderer: CanvasRenderer,
    scheduler: RedrawScheduler,
    store: FrameStore,
    loading: LoadingIndicator,
    load: Option<LoadHandle>,
}

impl<S: DrawSurface> ScrollPlayer<S> {
    pub fn new(config: ReelConfig, viewport: Viewport, mut surface: S) -> ReelResult<Self> {
        config.validate()?;
        surface.resize(viewport)?;

        let scroll = ScrollProgressSource::new(
            config.scroll.container_top,
            config.scroll.container_vh,
            viewport.height,
        )?;
        let mapper = FrameMapper::new(config.frames.count)?;
        let overlay = OverlayController::new(config.panels.clone())?;
        let navbar = NavBar::new(config.navbar.clone())?;
        let renderer = CanvasRenderer::new(mapper, config.render.background, config.render.filter);

        Ok(Self {
            store: FrameStore::empty(config.frames.count),
            config,
            surface,
            scroll,
            mapper,
            overlay,
            navbar,
            renderer,
            scheduler: RedrawScheduler::new(),
            loading: LoadingIndicator {
                percent: 0.0,
                visible: true,
            },
            load: None,
        })
    }

    /// Start loading the sequence from `source` on a background thread.
    ///
    /// A load already in progress is cancelled first.
    pub fn begin_loading(&mut self, source: Arc<dyn FrameSource>) -> ReelResult<()> {
        self.cancel_loading();

        let loader = FrameLoader::new(
            source,
            self.config.frames.count,
            self.config.loader.to_load_opts(),
        )?;
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        let worker_cancel = cancel.clone();
        thread::Builder::new()
            .name("scrollreel-loader".to_owned())
            .spawn(move || {
                let result = loader.load(&worker_cancel, |p| {
                    let _ = tx.send(LoadEvent::Progress(p));
                });
                let event = match result {
                    Ok(store) => LoadEvent::Finished(store),
                    Err(err) => LoadEvent::Failed(err),
                };
                let _ = tx.send(event);
            })
            .map_err(|e| ReelError::load(format!("spawn loader thread: {e}")))?;

        self.loading = LoadingIndicator {
            percent: 0.0,
            visible: true,
        };
        self.load = Some(LoadHandle {
            cancel,
            events: rx,
        });
        Ok(())
    }

    /// Apply load events that arrived since the last call. Never blocks.
    pub fn poll_loading(&mut self) -> LoadingIndicator {
        loop {
            let Some(handle) = &self.load else {
                break;
            };
            match handle.events.try_recv() {
                Ok(event) => self.apply_load_event(event),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.load = None;
                    break;
                }
            }
        }
        self.loading
    }

    /// Block until the running load settles, applying every event on the way.
    pub fn finish_loading(&mut self) -> ReelResult<LoadingIndicator> {
        while let Some(handle) = &self.load {
            match handle.events.recv() {
                Ok(LoadEvent::Failed(err)) => {
                    tracing::warn!(error = %err, "frame loading failed");
                    self.loading.visible = false;
                    self.load = None;
                    return Err(err);
                }
                Ok(event) => self.apply_load_event(event),
                Err(_) => self.load = None,
            }
        }
        Ok(self.loading)
    }

    fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(percent) => {
                self.loading.percent = self.loading.percent.max(percent);
            }
            LoadEvent::Finished(store) => {
                tracing::info!(
                    resolved = store.resolved(),
                    missing = store.missing(),
                    "frame store published"
                );
                self.store = store;
                self.loading = LoadingIndicator {
                    percent: 100.0,
                    visible: false,
                };
                self.load = None;
                self.scheduler.request(self.frame_index());
            }
            LoadEvent::Failed(err) => {
                tracing::warn!(error = %err, "frame loading failed");
                self.loading.visible = false;
                self.load = None;
            }
        }
    }

    /// Abandon a running load; nothing it produces is published.
    pub fn cancel_loading(&mut self) {
        if let Some(handle) = self.load.take() {
            handle.cancel.cancel();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    pub fn on_scroll(&mut self, scroll_y: f64) -> ScrollUpdate {
        let tick = self.scroll.on_scroll(scroll_y);
        let frame_index = self.mapper.index(tick.progress);
        let nav_transition = self.navbar.on_scroll(tick.scroll_y);
        let redraw_scheduled = self.scheduler.request(frame_index);
        ScrollUpdate {
            progress: tick.progress,
            frame_index,
            overlay: self.overlay.sample(tick.progress),
            nav_transition,
            redraw_scheduled,
        }
    }

    /// Display refresh tick: perform the pending redraw, if any.
    pub fn on_animation_frame(&mut self) -> Option<RenderOutcome> {
        let index = self.scheduler.take_due()?;
        match self
            .renderer
            .render(index, &self.store, &mut self.surface)
        {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(error = %err, index, "redraw failed");
                None
            }
        }
    }

    /// Resize the surface and redraw the current frame immediately.
    pub fn on_resize(&mut self, viewport: Viewport) -> ReelResult<RenderOutcome> {
        self.surface.resize(viewport)?;
        self.scroll.on_resize(viewport.height)?;
        let index = self.frame_index();
        self.renderer.render(index, &self.store, &mut self.surface)
    }

    pub fn progress(&self) -> Progress {
        self.scroll.progress()
    }

    /// Scroll offsets spanning the container for the current viewport.
    pub fn scroll_range(&self) -> ScrollRange {
        self.scroll.range()
    }

    /// Fractional frame index for the current progress.
    pub fn frame_index(&self) -> f64 {
        self.mapper.index(self.scroll.progress())
    }

    pub fn overlay(&self) -> OverlayState {
        self.overlay.sample(self.scroll.progress())
    }

    pub fn overlay_controller(&self) -> &OverlayController {
        &self.overlay
    }

    pub fn nav_state(&self) -> NavState {
        self.navbar.state()
    }

    pub fn nav_appearance(&self) -> NavAppearance {
        self.navbar.appearance()
    }

    pub fn footer(&self) -> &FooterConfig {
        &self.config.footer
    }

    pub fn loading(&self) -> LoadingIndicator {
        self.loading
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Publish a store directly, bypassing the background loader.
    pub fn set_store(&mut self, store: FrameStore) -> ReelResult<()> {
        if store.len() != self.mapper.total_frames() {
            return Err(ReelError::validation(format!(
                "store has {} slots, player expects {}",
                store.len(),
                self.mapper.total_frames()
            )));
        }
        self.cancel_loading();
        self.apply_load_event(LoadEvent::Finished(store));
        Ok(())
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn snapshot(&self) -> FrameRGBA {
        self.surface.snapshot()
    }

    pub fn state(&self) -> PlayerState {
        let tick = self.scroll.last();
        let frame_index = self.frame_index();
        PlayerState {
            scroll_y: tick.scroll_y,
            progress: tick.progress,
            frame_index,
            slot: self.mapper.resolve(frame_index),
            overlay: self.overlay(),
            navbar: self.nav_appearance(),
            loading: self.loading,
        }
    }
}

impl<S: DrawSurface> Drop for ScrollPlayer<S> {
    fn drop(&mut self) {
        self.cancel_loading();
    }
}

#[cfg(test)]
#[path = "../tests/unit/player.rs"]
mod tests;
