use std::path::{Path, PathBuf};
use std::process::Command;

use image::{GrayImage, RgbaImage, imageops};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    engine::{RenderEngine, ensure_parent_dir},
    error::{RemixError, RemixResult},
    scratch::ScratchDir,
};

const SEG_WORKERS: usize = 4;

/// Segmentation model selector, mapped to the external tool's model names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegModel {
    General,
    Lightweight,
    Human,
    Detailed,
}

impl SegModel {
    pub fn model_name(self) -> &'static str {
        match self {
            SegModel::General => "u2net",
            SegModel::Lightweight => "u2netp",
            SegModel::Human => "u2net_human_seg",
            SegModel::Detailed => "isnet-general-use",
        }
    }
}

/// What replaces the removed background.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFill {
    Solid { rgb: [u8; 3] },
    Image { path: PathBuf },
    /// Accepted in the config type for forward compatibility; rejected by
    /// `validate` because per-frame video compositing is not implemented.
    Video { path: PathBuf },
    Transparent,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundConfig {
    pub model: SegModel,
    pub fill: BackgroundFill,
    /// Mask edge blur radius in pixels; 0 keeps the hard edge.
    pub feather_px: u32,
    /// Segment every Nth frame and reuse the most recent mask in between.
    /// 1 segments every frame.
    pub frame_skip: u32,
}

impl BackgroundConfig {
    pub fn validate(&self) -> RemixResult<()> {
        if self.frame_skip == 0 {
            return Err(RemixError::validation("frame_skip must be at least 1"));
        }
        if self.feather_px > 64 {
            return Err(RemixError::validation("feather_px must be 64 or less"));
        }
        if matches!(self.fill, BackgroundFill::Video { .. }) {
            return Err(RemixError::validation(
                "video background fill is not supported; use a solid color or image",
            ));
        }
        Ok(())
    }
}

/// Per-frame segmentation seam. `Sync` so frames can be dispatched across
/// the worker pool.
pub trait Segmenter: Sync {
    /// Produce an 8-bit foreground mask (255 = keep) for one frame image.
    fn mask(&self, frame: &Path) -> RemixResult<GrayImage>;
}

/// Segmenter backed by an external per-frame command (`rembg` compatible
/// argument shape: `<program> i -om -m <model> <input> <output>`).
#[derive(Clone, Debug)]
pub struct CommandSegmenter {
    pub program: String,
    pub model: SegModel,
}

impl CommandSegmenter {
    pub fn new(program: impl Into<String>, model: SegModel) -> Self {
        Self {
            program: program.into(),
            model,
        }
    }
}

impl Segmenter for CommandSegmenter {
    fn mask(&self, frame: &Path) -> RemixResult<GrayImage> {
        let mask_path = frame.with_extension("mask.png");
        let out = Command::new(&self.program)
            .args(["i", "-om", "-m", self.model.model_name()])
            .arg(frame)
            .arg(&mask_path)
            .output()
            .map_err(|e| {
                RemixError::segmentation(format!("failed to run '{}': {e}", self.program))
            })?;
        if !out.status.success() {
            return Err(RemixError::segmentation(format!(
                "'{}' failed for '{}': {}",
                self.program,
                frame.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        let mask = image::open(&mask_path)
            .map_err(|e| {
                RemixError::segmentation(format!(
                    "failed to read mask '{}': {e}",
                    mask_path.display()
                ))
            })?
            .to_luma8();
        Ok(mask)
    }
}

/// For each frame index, the index of the keyframe whose mask it reuses.
/// Keyframes are every `frame_skip`th frame starting at 0.
pub fn keyframe_schedule(total_frames: usize, frame_skip: u32) -> Vec<usize> {
    let skip = frame_skip.max(1) as usize;
    (0..total_frames).map(|i| (i / skip) * skip).collect()
}

/// Composite one frame against the configured fill using its mask.
/// The mask is resized to the frame when dimensions differ, then feathered.
pub fn composite_frame(
    frame: &RgbaImage,
    mask: &GrayImage,
    fill: &BackgroundFill,
    feather_px: u32,
    background: Option<&RgbaImage>,
) -> RemixResult<RgbaImage> {
    let (w, h) = frame.dimensions();
    let mut mask = if mask.dimensions() == (w, h) {
        mask.clone()
    } else {
        imageops::resize(mask, w, h, imageops::FilterType::Triangle)
    };
    if feather_px > 0 {
        mask = imageops::blur(&mask, feather_px as f32);
    }

    let mut out = RgbaImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let fg = frame.get_pixel(x, y).0;
        let a = u16::from(mask.get_pixel(x, y).0[0]);
        match fill {
            BackgroundFill::Transparent => {
                *px = image::Rgba([fg[0], fg[1], fg[2], a as u8]);
            }
            BackgroundFill::Solid { rgb } => {
                *px = image::Rgba(blend(fg, [rgb[0], rgb[1], rgb[2], 255], a));
            }
            BackgroundFill::Image { .. } => {
                let bg = background
                    .map(|b| b.get_pixel(x, y).0)
                    .unwrap_or([0, 0, 0, 255]);
                *px = image::Rgba(blend(fg, bg, a));
            }
            BackgroundFill::Video { .. } => {
                return Err(RemixError::validation(
                    "video background fill is not supported",
                ));
            }
        }
    }
    Ok(out)
}

fn blend(fg: [u8; 4], bg: [u8; 4], a: u16) -> [u8; 4] {
    let inv = 255 - a;
    let mix = |f: u8, b: u8| (((u32::from(f) * u32::from(a)) + (u32::from(b) * u32::from(inv)) + 127) / 255) as u8;
    [mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2]), 255]
}

/// Replace the background of `input`, writing the result to `output`.
///
/// Frames are extracted to a scratch dir, keyframes are segmented on a
/// bounded pool, skipped frames reuse the nearest earlier keyframe mask,
/// and the composited frames are re-encoded with the original audio
/// stream-copied. The scratch dir is removed on every exit path.
pub fn replace_background(
    engine: &dyn RenderEngine,
    segmenter: &dyn Segmenter,
    input: &Path,
    output: &Path,
    config: &BackgroundConfig,
) -> RemixResult<()> {
    config.validate()?;
    let info = engine.probe(input)?;
    ensure_parent_dir(output)?;

    let scratch = ScratchDir::new("vidremix-seg")?;
    let frames = extract_frames(input, scratch.path())?;
    if frames.is_empty() {
        return Err(RemixError::segmentation(format!(
            "no frames extracted from '{}'",
            input.display()
        )));
    }
    info!(
        input = %input.display(),
        frames = frames.len(),
        model = segmenter_label(config),
        "segmenting background"
    );

    let background = match &config.fill {
        BackgroundFill::Image { path } => {
            let img = image::open(path)
                .map_err(|e| {
                    RemixError::segmentation(format!(
                        "failed to read background image '{}': {e}",
                        path.display()
                    ))
                })?
                .to_rgba8();
            Some(imageops::resize(
                &img,
                info.width,
                info.height,
                imageops::FilterType::Triangle,
            ))
        }
        _ => None,
    };

    // Masks for the keyframes only, in parallel on a bounded pool.
    let schedule = keyframe_schedule(frames.len(), config.frame_skip);
    let mut keyframes: Vec<usize> = schedule.clone();
    keyframes.dedup();

    let masks = collect_masks(segmenter, &frames, &keyframes)?;
    let mask_of = |key: usize| masks.iter().find(|(i, _)| *i == key).map(|(_, m)| m);

    for (i, frame_path) in frames.iter().enumerate() {
        let frame = image::open(frame_path)
            .map_err(|e| {
                RemixError::segmentation(format!(
                    "failed to read frame '{}': {e}",
                    frame_path.display()
                ))
            })?
            .to_rgba8();
        let mask = mask_of(schedule[i]).ok_or_else(|| {
            RemixError::segmentation(format!("missing mask for keyframe {}", schedule[i]))
        })?;
        let composed = composite_frame(
            &frame,
            mask,
            &config.fill,
            config.feather_px,
            background.as_ref(),
        )?;
        let out_path = scratch.file(format!("out_{:05}.png", i + 1));
        composed.save(&out_path).map_err(|e| {
            RemixError::segmentation(format!(
                "failed to write composited frame '{}': {e}",
                out_path.display()
            ))
        })?;
        debug!(frame = i, keyframe = schedule[i], "composited frame");
    }

    assemble(scratch.path(), input, output, &info, &config.fill)
}

fn segmenter_label(config: &BackgroundConfig) -> &'static str {
    config.model.model_name()
}

/// Segment the keyframes on a bounded pool, preserving keyframe order. A
/// frame whose segmentation fails degrades to a full-foreground mask, so
/// the source frame passes through unchanged instead of failing the video.
fn collect_masks(
    segmenter: &dyn Segmenter,
    frames: &[PathBuf],
    keyframes: &[usize],
) -> RemixResult<Vec<(usize, GrayImage)>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(SEG_WORKERS)
        .build()
        .map_err(|e| RemixError::segmentation(format!("failed to build worker pool: {e}")))?;

    Ok(pool.install(|| {
        keyframes
            .par_iter()
            .map(|&i| match segmenter.mask(&frames[i]) {
                Ok(m) => (i, m),
                Err(e) => {
                    warn!(frame = i, error = %e, "segmentation failed, keeping original frame");
                    // Resized to frame dimensions at composite time.
                    (i, GrayImage::from_pixel(1, 1, image::Luma([255])))
                }
            })
            .collect()
    }))
}

fn extract_frames(input: &Path, scratch: &Path) -> RemixResult<Vec<PathBuf>> {
    let pattern = scratch.join("frame_%05d.png");
    let out = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(input)
        .arg(&pattern)
        .output()
        .map_err(|e| RemixError::engine(format!("failed to spawn ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(RemixError::engine(format!(
            "frame extraction failed for '{}': {}",
            input.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let mut frames: Vec<PathBuf> = std::fs::read_dir(scratch)
        .map_err(|e| RemixError::engine(format!("failed to list scratch dir: {e}")))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".png"))
        })
        .collect();
    frames.sort();
    Ok(frames)
}

fn assemble(
    scratch: &Path,
    original: &Path,
    output: &Path,
    info: &crate::engine::VideoInfo,
    fill: &BackgroundFill,
) -> RemixResult<()> {
    let fps = if info.fps() > 0.0 { info.fps() } else { 30.0 };
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-loglevel", "error"])
        .args(["-framerate", &format!("{fps:.3}")])
        .arg("-i")
        .arg(scratch.join("out_%05d.png"))
        .arg("-i")
        .arg(original)
        .args(["-map", "0:v", "-map", "1:a?", "-c:a", "copy"]);

    // Alpha survives only in a codec that carries it.
    if matches!(fill, BackgroundFill::Transparent) {
        cmd.args(["-c:v", "qtrle"]);
    } else {
        cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]);
    }
    cmd.args(["-shortest"]).arg(output);

    let out = cmd
        .output()
        .map_err(|e| RemixError::engine(format!("failed to spawn ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(RemixError::engine(format!(
            "re-encode failed for '{}': {}",
            output.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}
