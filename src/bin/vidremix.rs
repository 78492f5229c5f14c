use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use vidremix::{
    batch::{BatchConfig, run_batch},
    catalog::AssetCatalog,
    engine::FfmpegEngine,
    job::CodecParams,
    recipe::build_recipe,
    segment::{BackgroundConfig, BackgroundFill, CommandSegmenter, SegModel, replace_background},
    strategy::{self, Intensity},
};

#[derive(Parser, Debug)]
#[command(name = "vidremix", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every variant of every video in a directory (requires
    /// `ffmpeg`/`ffprobe` on PATH).
    Batch(BatchArgs),
    /// List the per-content-type editing strategies.
    Strategies(StrategiesArgs),
    /// Print one variant recipe as JSON without rendering anything.
    Recipe(RecipeArgs),
    /// Replace the background of a single video.
    RemoveBg(RemoveBgArgs),
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory of source .mp4 files.
    #[arg(long = "in")]
    input_dir: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Asset catalog root (stickers/ and overlays/ live under it).
    #[arg(long)]
    assets: PathBuf,

    /// Variants rendered per input video.
    #[arg(long, default_value_t = 5)]
    variants: usize,

    /// x264 CRF.
    #[arg(long, default_value_t = 20)]
    crf: u8,

    /// x264 preset.
    #[arg(long, default_value = "fast")]
    preset: String,
}

#[derive(Parser, Debug)]
struct StrategiesArgs {
    /// Print the full strategy description for one content type instead of
    /// the summary table.
    #[arg(long)]
    content_type: Option<String>,

    /// Intensity applied when describing a single strategy.
    #[arg(long, value_enum, default_value_t = IntensityChoice::Medium)]
    intensity: IntensityChoice,
}

#[derive(Parser, Debug)]
struct RecipeArgs {
    /// Position of the video within the batch.
    #[arg(long, default_value_t = 0)]
    video_index: usize,

    /// Variant slot.
    #[arg(long, default_value_t = 0)]
    variant: usize,

    /// Frame width.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Frame height.
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Asset catalog root.
    #[arg(long)]
    assets: PathBuf,
}

#[derive(Parser, Debug)]
struct RemoveBgArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video.
    #[arg(long)]
    out: PathBuf,

    /// Segmentation command (rembg-compatible CLI).
    #[arg(long, default_value = "rembg")]
    segmenter: String,

    #[arg(long, value_enum, default_value_t = ModelChoice::General)]
    model: ModelChoice,

    /// Background fill: "transparent" or a hex color like "1a1210".
    #[arg(long, default_value = "transparent")]
    fill: String,

    /// Mask edge blur radius in pixels.
    #[arg(long, default_value_t = 2)]
    feather: u32,

    /// Segment every Nth frame, reusing masks in between.
    #[arg(long, default_value_t = 1)]
    frame_skip: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IntensityChoice {
    Light,
    Medium,
    Strong,
    Extreme,
}

impl From<IntensityChoice> for Intensity {
    fn from(c: IntensityChoice) -> Self {
        match c {
            IntensityChoice::Light => Intensity::Light,
            IntensityChoice::Medium => Intensity::Medium,
            IntensityChoice::Strong => Intensity::Strong,
            IntensityChoice::Extreme => Intensity::Extreme,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelChoice {
    General,
    Lightweight,
    Human,
    Detailed,
}

impl From<ModelChoice> for SegModel {
    fn from(c: ModelChoice) -> Self {
        match c {
            ModelChoice::General => SegModel::General,
            ModelChoice::Lightweight => SegModel::Lightweight,
            ModelChoice::Human => SegModel::Human,
            ModelChoice::Detailed => SegModel::Detailed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Batch(args) => cmd_batch(args),
        Command::Strategies(args) => cmd_strategies(args),
        Command::Recipe(args) => cmd_recipe(args),
        Command::RemoveBg(args) => cmd_remove_bg(args),
    }
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let mut config = BatchConfig::new(args.input_dir, args.out, args.assets);
    config.variants_per_video = args.variants;
    config.codec = CodecParams {
        crf: args.crf,
        preset: args.preset,
        ..CodecParams::default()
    };

    // Per-item failures are already counted in the report; only a broken
    // setup (unreadable input dir) fails the process.
    let report = run_batch(&FfmpegEngine, &config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_strategies(args: StrategiesArgs) -> anyhow::Result<()> {
    match args.content_type {
        Some(name) => {
            let strategy = strategy::strategy_by_name(&name);
            let scaled = strategy::scale_intensity(strategy, Intensity::from(args.intensity));
            println!("{}", strategy::describe(&scaled));
        }
        None => {
            for s in strategy::all_strategies() {
                println!(
                    "{:<12} {:<24} {}",
                    s.content_type.as_str(),
                    s.name,
                    s.description
                );
            }
        }
    }
    Ok(())
}

fn cmd_recipe(args: RecipeArgs) -> anyhow::Result<()> {
    let catalog = AssetCatalog::new(args.assets);
    let recipe = build_recipe(
        args.video_index,
        args.variant,
        args.width,
        args.height,
        &catalog,
    )?;
    println!("{}", serde_json::to_string_pretty(&recipe)?);
    Ok(())
}

fn cmd_remove_bg(args: RemoveBgArgs) -> anyhow::Result<()> {
    let fill = parse_fill(&args.fill)?;
    let config = BackgroundConfig {
        model: args.model.into(),
        fill,
        feather_px: args.feather,
        frame_skip: args.frame_skip,
    };
    let segmenter = CommandSegmenter::new(args.segmenter, config.model);
    replace_background(&FfmpegEngine, &segmenter, &args.in_path, &args.out, &config)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn parse_fill(s: &str) -> anyhow::Result<BackgroundFill> {
    if s.eq_ignore_ascii_case("transparent") {
        return Ok(BackgroundFill::Transparent);
    }
    let hex = s.trim_start_matches('#');
    anyhow::ensure!(hex.len() == 6, "fill must be 'transparent' or RRGGBB hex");
    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).context("invalid hex digit in fill color")
    };
    Ok(BackgroundFill::Solid {
        rgb: [parse(0..2)?, parse(2..4)?, parse(4..6)?],
    })
}
