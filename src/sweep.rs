use rayon::prelude::*;

use crate::{
    assets::store::FrameStore,
    config::ReelConfig,
    foundation::{
        core::{Progress, Viewport},
        error::{ReelError, ReelResult},
    },
    render::{
        canvas::{CpuCanvas, DrawSurface, FrameRGBA},
        renderer::{CanvasRenderer, RenderOutcome},
    },
    scroll::mapper::FrameMapper,
};

/// How a progress sweep is scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepOpts {
    /// Number of evenly spaced progress values, both ends included.
    pub steps: usize,
    pub parallel: bool,
    /// Worker count for parallel sweeps; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for SweepOpts {
    fn default() -> Self {
        Self {
            steps: 10,
            parallel: false,
            threads: None,
        }
    }
}

/// One rendered step of a sweep.
#[derive(Clone, Debug)]
pub struct SweepFrame {
    pub step: usize,
    pub progress: Progress,
    pub outcome: RenderOutcome,
    pub image: FrameRGBA,
}

/// Progress of step `step` out of `steps` evenly spaced samples over `[0, 1]`.
pub fn sweep_progress(step: usize, steps: usize) -> Progress {
    if steps <= 1 {
        return Progress::ZERO;
    }
    Progress::new(step as f64 / (steps - 1) as f64)
}

struct Worker {
    renderer: CanvasRenderer,
    canvas: CpuCanvas,
}

impl Worker {
    fn new(config: &ReelConfig, mapper: FrameMapper, viewport: Viewport) -> ReelResult<Self> {
        Ok(Self {
            renderer: CanvasRenderer::new(mapper, config.render.background, config.render.filter),
            canvas: CpuCanvas::new(viewport)?.with_cache_capacity(config.render.paint_cache),
        })
    }

    fn render_step(
        &mut self,
        mapper: FrameMapper,
        store: &FrameStore,
        step: usize,
        steps: usize,
    ) -> ReelResult<SweepFrame> {
        let progress = sweep_progress(step, steps);
        let outcome = self
            .renderer
            .render(mapper.index(progress), store, &mut self.canvas)?;
        Ok(SweepFrame {
            step,
            progress,
            outcome,
            image: self.canvas.snapshot(),
        })
    }
}

/// Render `opts.steps` evenly spaced progress values and hand each result to `sink`.
///
/// Parallel sweeps give every rayon worker its own canvas; `sink` may then be called from
/// several threads and in any order.
#[tracing::instrument(skip(config, store, sink), fields(steps = opts.steps, parallel = opts.parallel))]
pub fn render_sweep<F>(
    config: &ReelConfig,
    viewport: Viewport,
    store: &FrameStore,
    opts: SweepOpts,
    sink: F,
) -> ReelResult<()>
where
    F: Fn(SweepFrame) -> ReelResult<()> + Sync,
{
    if opts.steps == 0 {
        return Err(ReelError::validation("sweep steps must be >= 1"));
    }
    let mapper = FrameMapper::new(store.len())?;
    let steps = opts.steps;

    if !opts.parallel {
        let mut worker = Worker::new(config, mapper, viewport)?;
        for step in 0..steps {
            sink(worker.render_step(mapper, store, step, steps)?)?;
        }
        return Ok(());
    }

    let pool = build_thread_pool(opts.threads)?;
    pool.install(|| {
        (0..steps).into_par_iter().try_for_each_init(
            || Worker::new(config, mapper, viewport),
            |worker, step| -> ReelResult<()> {
                let worker = match worker {
                    Ok(w) => w,
                    Err(e) => return Err(ReelError::render(format!("sweep worker: {e}"))),
                };
                sink(worker.render_step(mapper, store, step, steps)?)
            },
        )
    })
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation("sweep 'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/sweep.rs"]
mod tests;
