use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nebula", version, about = "Render the animated nebula backdrop")]
struct Cli {
    /// Theme settings file.
    #[arg(long, global = true, default_value = "nebula-settings.json")]
    settings: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a frame range as a numbered PNG sequence.
    Frames(FramesArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Show or change the theme.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Print the default backdrop config as JSON.
    Config,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Backdrop config JSON. Defaults to the stock scene.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Override the theme from the settings file.
    #[arg(long, value_enum)]
    theme: Option<ThemeChoice>,

    /// Render the static starfield, as when the live scene cannot be mounted.
    #[arg(long)]
    placeholder: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive).
    #[arg(long)]
    end: u64,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// File name prefix.
    #[arg(long, default_value = "frame_")]
    prefix: String,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Duration in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    /// Print the current theme.
    Show,
    /// Switch between dark and light.
    Toggle,
    /// Set the theme.
    Set {
        #[arg(value_enum)]
        theme: ThemeChoice,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ThemeChoice {
    Dark,
    Light,
}

impl ThemeChoice {
    fn from_settings(settings: &nebula::Settings) -> Self {
        if settings.dark_mode { Self::Dark } else { Self::Light }
    }

    fn is_dark(self) -> bool {
        self == Self::Dark
    }

    fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = nebula::SettingsStore::new(&cli.settings);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, &store),
        Command::Frames(args) => cmd_frames(args, &store),
        Command::Render(args) => cmd_render(args, &store),
        Command::Theme { action } => cmd_theme(action, &store),
        Command::Config => {
            println!("{}", nebula::BackdropConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<nebula::BackdropConfig> {
    let config = match path {
        Some(path) => nebula::BackdropConfig::from_path(path)
            .with_context(|| format!("load backdrop config '{}'", path.display()))?,
        None => nebula::BackdropConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn pipeline_opts(
    scene: &SceneArgs,
    store: &nebula::SettingsStore,
) -> anyhow::Result<nebula::PipelineOpts> {
    let theme = match scene.theme {
        Some(theme) => theme,
        None => ThemeChoice::from_settings(&store.load()?),
    };
    let settings = nebula::Settings {
        dark_mode: theme.is_dark(),
    };
    Ok(nebula::PipelineOpts {
        settings: nebula::RenderSettings::from(&settings),
        force_placeholder: scene.placeholder,
        ..nebula::PipelineOpts::default()
    })
}

fn cmd_frame(args: FrameArgs, store: &nebula::SettingsStore) -> anyhow::Result<()> {
    let config = read_config(args.scene.in_path.as_deref())?;
    let opts = pipeline_opts(&args.scene, store)?;

    let frame = nebula::render_frame(&config, nebula::FrameIndex(args.frame), opts)?;
    let mut straight = vec![0u8; frame.data.len()];
    nebula::unpremultiply_rgba8(&mut straight, &frame.data)?;
    nebula::write_png(&args.out, &straight, frame.width, frame.height)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs, store: &nebula::SettingsStore) -> anyhow::Result<()> {
    let config = read_config(args.scene.in_path.as_deref())?;
    let opts = pipeline_opts(&args.scene, store)?;
    let range =
        nebula::FrameRange::new(nebula::FrameIndex(args.start), nebula::FrameIndex(args.end))?;

    let mut sink = nebula::PngSequenceSink::new(&args.out_dir, args.prefix);
    let stats = nebula::render_range(&config, range, opts, &mut sink)?;

    eprintln!(
        "wrote {} frames to {} ({} rendered, {} reused)",
        stats.frames_total,
        args.out_dir.display(),
        stats.frames_rendered,
        stats.frames_reused
    );
    Ok(())
}

fn cmd_render(args: RenderArgs, store: &nebula::SettingsStore) -> anyhow::Result<()> {
    let config = read_config(args.scene.in_path.as_deref())?;
    let opts = pipeline_opts(&args.scene, store)?;
    if !(args.seconds.is_finite() && args.seconds > 0.0) {
        anyhow::bail!("--seconds must be > 0");
    }
    let frames = config.fps.secs_to_frames_floor(args.seconds).max(1);
    let range = nebula::FrameRange::new(nebula::FrameIndex(0), nebula::FrameIndex(frames))?;

    // Light theme renders transparent pixels; the video has no alpha, so they land on white.
    let mut sink_opts = nebula::FfmpegSinkOpts::new(&args.out);
    if !opts.settings.opaque_clear {
        sink_opts.background_rgb = [255, 255, 255];
    }
    let mut sink = nebula::FfmpegSink::new(sink_opts);
    let stats = nebula::render_range(&config, range, opts, &mut sink)?;

    eprintln!(
        "wrote {} ({} frames, {} rendered)",
        args.out.display(),
        stats.frames_total,
        stats.frames_rendered
    );
    Ok(())
}

fn cmd_theme(action: ThemeAction, store: &nebula::SettingsStore) -> anyhow::Result<()> {
    let settings = match action {
        ThemeAction::Show => store.load()?,
        ThemeAction::Toggle => store.toggle_dark_mode()?,
        ThemeAction::Set { theme } => store.set_dark_mode(theme.is_dark())?,
    };
    println!("{}", ThemeChoice::from_settings(&settings).name());
    Ok(())
}
