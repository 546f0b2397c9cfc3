use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use scrollreel::{
    CancelToken, CpuCanvas, DirFrameSource, FrameLoader, FrameRGBA, FrameSource, ReelConfig,
    ScrollPlayer, SweepOpts, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "scrollreel", version)]
struct Cli {
    /// Log verbosity written to stderr.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame shown at one scroll position as a PNG.
    Frame(FrameArgs),
    /// Render evenly spaced scroll positions as numbered PNGs.
    Sweep(SweepArgs),
    /// Print overlay and navbar state at one scroll position as JSON.
    State(StateArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Logical viewport width.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Logical viewport height.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Position {
    /// Raw scroll offset in logical pixels.
    #[arg(long)]
    scroll_y: Option<f64>,

    /// Normalized progress in [0, 1].
    #[arg(long)]
    progress: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Directory holding the frame sequence (overrides the config).
    #[arg(long)]
    frames: Option<PathBuf>,

    #[command(flatten)]
    position: Position,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Directory holding the frame sequence (overrides the config).
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Number of evenly spaced progress values, both ends included.
    #[arg(long, default_value_t = 10)]
    steps: usize,

    /// Output directory for `step-NNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Render steps on a rayon thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct StateArgs {
    #[command(flatten)]
    position: Position,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::from(cli.log_level))
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::State(args) => cmd_state(args),
    }
}

fn read_config(common: &CommonArgs) -> anyhow::Result<ReelConfig> {
    match &common.config {
        Some(path) => ReelConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(ReelConfig::default()),
    }
}

fn viewport(common: &CommonArgs) -> anyhow::Result<Viewport> {
    Ok(Viewport::new(common.width, common.height, common.dpr)?)
}

fn frame_source(
    config: &ReelConfig,
    common: &CommonArgs,
    frames: Option<&Path>,
) -> DirFrameSource {
    match frames {
        Some(dir) => DirFrameSource::new(
            dir,
            config.frames.template.clone(),
            config.frames.extension.clone(),
        ),
        None => config
            .frames
            .dir_source(common.config.as_deref().and_then(Path::parent)),
    }
}

fn make_player(config: ReelConfig, common: &CommonArgs) -> anyhow::Result<ScrollPlayer> {
    let viewport = viewport(common)?;
    let canvas = CpuCanvas::new(viewport)?.with_cache_capacity(config.render.paint_cache);
    Ok(ScrollPlayer::new(config, viewport, canvas)?)
}

fn scroll_to(player: &mut ScrollPlayer, position: &Position) {
    let scroll_y = match (position.scroll_y, position.progress) {
        (Some(y), _) => y,
        (None, Some(p)) => {
            let range = player.scroll_range();
            range.start + p.clamp(0.0, 1.0) * range.len()
        }
        (None, None) => 0.0,
    };
    player.on_scroll(scroll_y);
}

fn write_png(path: &Path, image: &FrameRGBA) -> anyhow::Result<()> {
    if image.data.is_empty() {
        anyhow::bail!("nothing to write: surface is {}x{}", image.width, image.height);
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &image.data,
        image.width,
        image.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = read_config(&args.common)?;
    let source = frame_source(&config, &args.common, args.frames.as_deref());
    tracing::info!(dir = %source.dir().display(), "loading frames");

    let mut player = make_player(config, &args.common)?;
    player.begin_loading(Arc::new(source))?;
    player.finish_loading()?;
    if player.store().resolved() == 0 {
        anyhow::bail!("no frames could be loaded");
    }

    scroll_to(&mut player, &args.position);
    let outcome = player
        .on_animation_frame()
        .context("no redraw was scheduled")?;
    tracing::info!(?outcome, progress = player.progress().get(), "rendered");

    write_png(&args.out, &player.snapshot())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let config = read_config(&args.common)?;
    let viewport = viewport(&args.common)?;
    let source: Arc<dyn FrameSource> =
        Arc::new(frame_source(&config, &args.common, args.frames.as_deref()));

    let loader = FrameLoader::new(
        source,
        config.frames.count,
        config.loader.to_load_opts(),
    )?;
    let store = loader.load(&CancelToken::new(), |p| {
        tracing::debug!(percent = p, "loading");
    })?;
    if store.resolved() == 0 {
        anyhow::bail!("no frames could be loaded");
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let opts = SweepOpts {
        steps: args.steps,
        parallel: args.parallel,
        threads: args.threads,
    };
    scrollreel::render_sweep(&config, viewport, &store, opts, |frame| {
        let path = args.out_dir.join(format!("step-{:03}.png", frame.step));
        write_png(&path, &frame.image).map_err(scrollreel::ReelError::from)
    })?;

    eprintln!("wrote {} frames to {}", args.steps, args.out_dir.display());
    Ok(())
}

fn cmd_state(args: StateArgs) -> anyhow::Result<()> {
    let config = read_config(&args.common)?;
    let mut player = make_player(config, &args.common)?;
    scroll_to(&mut player, &args.position);

    let json =
        serde_json::to_string_pretty(&player.state()).context("serialize player state")?;
    println!("{json}");
    Ok(())
}
