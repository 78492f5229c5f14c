use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    catalog::AssetCatalog,
    engine::RenderEngine,
    error::RemixResult,
    job::{CodecParams, build_job},
    recipe::build_recipe,
};

/// All paths and knobs for one batch run, supplied by the caller.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub assets_root: PathBuf,
    pub variants_per_video: usize,
    /// Outputs smaller than this count as failed.
    pub min_output_bytes: u64,
    pub codec: CodecParams,
}

impl BatchConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        assets_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            assets_root: assets_root.into(),
            variants_per_video: 5,
            min_output_bytes: 10 * 1024,
            codec: CodecParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Inputs dropped entirely because probing failed.
    pub skipped_inputs: usize,
}

/// Render every (input, variant) pair. A probe failure skips the whole
/// input; a job failure marks that one output and moves on. No retries.
#[tracing::instrument(skip_all, fields(input_dir = %config.input_dir.display()))]
pub fn run_batch(engine: &dyn RenderEngine, config: &BatchConfig) -> RemixResult<BatchReport> {
    let catalog = AssetCatalog::new(&config.assets_root);
    let inputs = list_inputs(&config.input_dir)?;
    info!(inputs = inputs.len(), variants = config.variants_per_video, "starting batch");

    let stems: Vec<String> = inputs.iter().map(|p| input_stem(p).to_string()).collect();

    let mut report = BatchReport::default();
    for (video_idx, input) in inputs.iter().enumerate() {
        let info = match engine.probe(input) {
            Ok(info) => info,
            Err(e) => {
                warn!(input = %input.display(), error = %e, "probe failed, skipping input");
                report.skipped_inputs += 1;
                continue;
            }
        };

        for variant in 0..config.variants_per_video {
            report.attempted += 1;
            let output = output_path(&config.output_dir, input, video_idx, variant, &stems);
            let result = build_recipe(video_idx, variant, info.width, info.height, &catalog)
                .and_then(|recipe| build_job(&recipe, input, &output, config.codec.clone()))
                .and_then(|job| engine.execute(&job));

            match result {
                Ok(()) if output_is_plausible(&output, config.min_output_bytes) => {
                    info!(output = %output.display(), "variant rendered");
                    report.succeeded += 1;
                }
                Ok(()) => {
                    warn!(output = %output.display(), "output missing or undersized");
                    report.failed += 1;
                }
                Err(e) => {
                    warn!(output = %output.display(), error = %e, "variant failed");
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped_inputs = report.skipped_inputs,
        "batch finished"
    );
    Ok(report)
}

/// Sorted `*.mp4` files directly inside `dir`. No recursion.
pub fn list_inputs(dir: &Path) -> RemixResult<Vec<PathBuf>> {
    use anyhow::Context as _;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory '{}'", dir.display()))?;

    let mut inputs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
        })
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// `<output_dir>/<stem>_v<variant + 1>.mp4`
pub fn variant_output_path(output_dir: &Path, input: &Path, variant: usize) -> PathBuf {
    let stem = input_stem(input);
    output_dir.join(format!("{stem}_v{}.mp4", variant + 1))
}

fn input_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("video")
}

/// Output path for one (input, variant) pair. Inputs sharing a stem (e.g.
/// `clip.mp4` and `clip.MP4`) would collide on the plain naming scheme, so
/// a duplicated stem gets the 1-based input ordinal folded in.
fn output_path(
    output_dir: &Path,
    input: &Path,
    video_idx: usize,
    variant: usize,
    stems: &[String],
) -> PathBuf {
    let stem = input_stem(input);
    let duplicated = stems.iter().filter(|s| s.as_str() == stem).count() > 1;
    if duplicated {
        output_dir.join(format!("{stem}_{}_v{}.mp4", video_idx + 1, variant + 1))
    } else {
        variant_output_path(output_dir, input, variant)
    }
}

fn output_is_plausible(path: &Path, min_bytes: u64) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.len() >= min_bytes)
}
