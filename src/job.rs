use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{
    error::RemixResult,
    filtergraph::{Filter, FilterChain, FilterGraph, StreamRef},
    placement,
    recipe::{CompositionShape, StickerPlacement, VariantRecipe},
};

/// One `-i` entry of the assembled command, in declaration order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct JobInput {
    pub path: PathBuf,
    /// Loop the input indefinitely; paired with a `shortest` overlay so the
    /// output duration is still bounded by the primary stream.
    pub loop_forever: bool,
}

/// How the audio stream reaches the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum AudioMode {
    /// Stream copy, no transcode.
    Copy,
    /// AAC re-encode; required whenever the playback rate changed.
    Encode { bitrate_kbps: u32 },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CodecParams {
    pub crf: u8,
    pub preset: String,
    pub audio: AudioMode,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self {
            crf: 20,
            preset: "fast".to_string(),
            audio: AudioMode::Copy,
        }
    }
}

/// A fully-assembled render job: ordered inputs, the filter graph, output
/// stream labels and codec parameters. Built once per (video, variant) and
/// discarded after execution.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderJob {
    pub inputs: Vec<JobInput>,
    pub graph: FilterGraph,
    pub video_label: String,
    /// Label of the filtered audio stream; `None` maps the source audio
    /// directly.
    pub audio_label: Option<String>,
    pub codec: CodecParams,
    pub output_path: PathBuf,
}

const VIDEO_OUT: &str = "vout";
const AUDIO_OUT: &str = "aout";

/// Assemble the render job for one recipe.
///
/// Input order is fixed: the source video, then the looped flicker clip when
/// the shape uses one, then each surviving sticker in layer order. Stickers
/// whose file is missing or unreadable are dropped here, before input
/// declaration, so every positional index in the graph refers to a declared
/// input.
pub fn build_job(
    recipe: &VariantRecipe,
    source: &Path,
    output: &Path,
    mut codec: CodecParams,
) -> RemixResult<RenderJob> {
    let w = recipe.width;
    let h = recipe.height;

    let mut inputs = vec![JobInput {
        path: source.to_path_buf(),
        loop_forever: false,
    }];
    let mut graph = FilterGraph::default();

    // Base chain: geometry first, then grade, then rate.
    let mut base = Vec::new();
    if recipe.shape == CompositionShape::MirrorSpeed {
        base.push(Filter::Hflip);
    }
    if let Some(margin) = recipe.crop_margin_frac {
        let mx = (w as f32 * margin) as u32;
        let my = (h as f32 * margin) as u32;
        base.push(Filter::Crop {
            w: w - 2 * mx,
            h: h - 2 * my,
            x: mx,
            y: my,
        });
        base.push(Filter::Scale {
            w: w as i32,
            h: h as i32,
        });
    }
    let s = &recipe.scheme;
    base.push(Filter::ColorBalance {
        rs: s.shadows.0,
        gs: s.shadows.1,
        bs: s.shadows.2,
        rm: s.midtones.0,
        gm: s.midtones.1,
        bm: s.midtones.2,
    });
    base.push(Filter::Eq {
        brightness: recipe.grade.brightness,
        contrast: recipe.grade.contrast,
        saturation: recipe.grade.saturation,
    });
    if let Some(speed) = recipe.speed {
        base.push(Filter::SetPts {
            rate: speed.video_rate,
        });
    }
    graph.push(FilterChain::new(vec![StreamRef::Video(0)], base, "base"));
    let mut current = "base".to_string();

    // Flicker bands: one looped input fanned out to a top and a bottom band.
    if let Some(flicker) = &recipe.flicker {
        let idx = inputs.len();
        inputs.push(JobInput {
            path: flicker.clip_path.clone(),
            loop_forever: true,
        });
        graph.push(FilterChain::with_outputs(
            vec![StreamRef::Video(idx)],
            vec![
                Filter::Scale {
                    w: w as i32,
                    h: flicker.band_h as i32,
                },
                Filter::Desaturate,
                Filter::Eq {
                    brightness: Some(flicker.brightness),
                    contrast: Some(flicker.contrast),
                    saturation: None,
                },
                Filter::FormatRgba,
                Filter::Alpha {
                    opacity: flicker.opacity,
                },
                Filter::Split { n: 2 },
            ],
            vec!["fltop".to_string(), "flbot".to_string()],
        ));
        current = overlay(&mut graph, &current, "fltop", (0, 0), true, "flick_t");
        current = overlay(
            &mut graph,
            &current,
            "flbot",
            (0, i64::from(h) - i64::from(flicker.band_h)),
            true,
            "flick_b",
        );
    }

    // Gradient masks, opaque at the frame edge and fading inward.
    for (label, band_h, from_top) in [
        ("mtop", recipe.masks.top_h, true),
        ("mbot", recipe.masks.bottom_h, false),
    ] {
        graph.push(FilterChain::new(
            vec![],
            vec![
                Filter::ColorSource {
                    rgb: s.gradient_rgb,
                    w,
                    h: band_h,
                },
                Filter::FormatRgba,
                Filter::GradientAlpha {
                    band_h,
                    falloff_px: (band_h / 2).max(1),
                    exponent: recipe.masks.exponent,
                    from_top,
                },
            ],
            label,
        ));
        let y = if from_top {
            0
        } else {
            i64::from(h) - i64::from(band_h)
        };
        current = overlay(&mut graph, &current, label, (0, y), false, &format!("m_{label}"));
    }

    // Stickers, in selection order. Dimensions come from the file itself so
    // placement can use the true scaled height.
    for (i, sticker) in recipe.stickers.iter().enumerate() {
        let Some((scaled_w, scaled_h)) = sticker_dims(sticker, w) else {
            continue;
        };
        let idx = inputs.len();
        inputs.push(JobInput {
            path: sticker.asset_path.clone(),
            loop_forever: false,
        });
        let prep = format!("st{i}");
        let mut filters = vec![
            Filter::Scale {
                w: scaled_w as i32,
                h: -1,
            },
            Filter::FormatRgba,
        ];
        if sticker.opacity < 1.0 {
            filters.push(Filter::Alpha {
                opacity: sticker.opacity,
            });
        }
        graph.push(FilterChain::new(vec![StreamRef::Video(idx)], filters, &*prep));

        let (x, y) = placement::resolve(
            sticker.anchor,
            w,
            h,
            scaled_w,
            scaled_h,
            sticker.margin_px,
            sticker.custom_xy,
        );
        current = overlay(&mut graph, &current, &prep, (x, y), false, &format!("s_{i}"));
    }

    // Rename the last composite to the mapped output label.
    if let Some(last) = graph.chains.last_mut() {
        last.outputs = vec![VIDEO_OUT.to_string()];
    }

    // Rate change forces an audio transcode; otherwise the stream is copied
    // untouched.
    let audio_label = if let Some(speed) = recipe.speed {
        graph.push(FilterChain::new(
            vec![StreamRef::Audio(0)],
            vec![Filter::Atempo {
                rate: speed.audio_rate,
            }],
            AUDIO_OUT,
        ));
        if codec.audio == AudioMode::Copy {
            codec.audio = AudioMode::Encode { bitrate_kbps: 128 };
        }
        Some(AUDIO_OUT.to_string())
    } else {
        None
    };

    graph.validate(inputs.len())?;

    Ok(RenderJob {
        inputs,
        graph,
        video_label: VIDEO_OUT.to_string(),
        audio_label,
        codec,
        output_path: output.to_path_buf(),
    })
}

fn overlay(
    graph: &mut FilterGraph,
    base: &str,
    top: &str,
    (x, y): (i64, i64),
    shortest: bool,
    out: &str,
) -> String {
    graph.push(FilterChain::new(
        vec![
            StreamRef::Label(base.to_string()),
            StreamRef::Label(top.to_string()),
        ],
        vec![Filter::Overlay { x, y, shortest }],
        out,
    ));
    out.to_string()
}

/// Read the sticker's pixel dimensions and scale them to the target width.
/// `None` drops the layer (missing or unreadable file).
fn sticker_dims(sticker: &StickerPlacement, frame_w: u32) -> Option<(u32, u32)> {
    let (pw, ph) = match image::image_dimensions(&sticker.asset_path) {
        Ok(dims) => dims,
        Err(e) => {
            warn!(
                path = %sticker.asset_path.display(),
                error = %e,
                "dropping sticker layer"
            );
            return None;
        }
    };
    if pw == 0 || ph == 0 {
        return None;
    }
    let target_w = ((frame_w as f32 * sticker.width_frac) as u32).max(1);
    let target_h = ((u64::from(ph) * u64::from(target_w)) / u64::from(pw)).max(1) as u32;
    Some((target_w, target_h))
}

impl RenderJob {
    /// Full ffmpeg argv (without the leading program name).
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "error".into()];

        for input in &self.inputs {
            if input.loop_forever {
                args.push("-stream_loop".into());
                args.push("-1".into());
            }
            args.push("-i".into());
            args.push(input.path.display().to_string());
        }

        args.push("-filter_complex".into());
        args.push(self.graph.serialize());

        args.push("-map".into());
        args.push(format!("[{}]", self.video_label));
        match &self.audio_label {
            Some(label) => {
                args.push("-map".into());
                args.push(format!("[{label}]"));
            }
            None => {
                args.push("-map".into());
                args.push("0:a?".into());
            }
        }

        args.push("-c:v".into());
        args.push("libx264".into());
        args.push("-crf".into());
        args.push(self.codec.crf.to_string());
        args.push("-preset".into());
        args.push(self.codec.preset.clone());

        match self.codec.audio {
            AudioMode::Copy => {
                args.push("-c:a".into());
                args.push("copy".into());
            }
            AudioMode::Encode { bitrate_kbps } => {
                args.push("-c:a".into());
                args.push("aac".into());
                args.push("-b:a".into());
                args.push(format!("{bitrate_kbps}k"));
            }
        }

        args.push("-movflags".into());
        args.push("+faststart".into());
        args.push(self.output_path.display().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetCatalog;
    use crate::recipe::build_recipe;
    use std::path::PathBuf;

    fn fixture_catalog(tag: &str, with_overlay: bool, with_stickers: bool) -> AssetCatalog {
        let root = PathBuf::from("target").join("job_tests").join(tag);
        std::fs::create_dir_all(root.join("stickers")).unwrap();
        if with_stickers {
            for name in [
                "banner_1.png",
                "pattern_1.png",
                "bird_1.png",
                "flower_1.png",
            ] {
                image::RgbaImage::new(64, 32)
                    .save(root.join("stickers").join(name))
                    .unwrap();
            }
        }
        if with_overlay {
            let sparkle = root.join("overlays").join("sparkle");
            std::fs::create_dir_all(&sparkle).unwrap();
            std::fs::write(sparkle.join("shimmer.mp4"), b"mp4").unwrap();
        }
        AssetCatalog::new(root)
    }

    fn job_for(variant: usize, cat: &AssetCatalog) -> RenderJob {
        let recipe = build_recipe(0, variant, 1080, 1920, cat).unwrap();
        build_job(
            &recipe,
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            CodecParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn graph_references_stay_within_declared_inputs() {
        let cat = fixture_catalog("refs", true, true);
        for variant in 0..5 {
            let job = job_for(variant, &cat);
            assert!(job.graph.validate(job.inputs.len()).is_ok());
            assert!(job.graph.max_input_index().unwrap() < job.inputs.len());
        }
    }

    #[test]
    fn flicker_shape_declares_looped_second_input() {
        let cat = fixture_catalog("flicker", true, true);
        let job = job_for(0, &cat);
        assert!(job.inputs[1].loop_forever);
        assert!(job.inputs[1].path.ends_with("shimmer.mp4"));
        // Source + flicker + 4 stickers.
        assert_eq!(job.inputs.len(), 6);
        assert!(job.graph.serialize().contains("shortest=1"));
    }

    #[test]
    fn missing_stickers_are_dropped_not_fatal() {
        let cat = fixture_catalog("nostick", false, false);
        let job = job_for(1, &cat);
        assert_eq!(job.inputs.len(), 1);
        assert!(job.graph.validate(1).is_ok());
    }

    #[test]
    fn audio_is_copied_unless_rate_changed() {
        let cat = fixture_catalog("audio", false, false);

        let plain = job_for(1, &cat);
        assert_eq!(plain.codec.audio, AudioMode::Copy);
        assert!(plain.audio_label.is_none());
        let args = plain.to_ffmpeg_args();
        let copy_at = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(args[copy_at + 1], "copy");

        let mirrored = job_for(2, &cat);
        assert_eq!(
            mirrored.codec.audio,
            AudioMode::Encode { bitrate_kbps: 128 }
        );
        assert_eq!(mirrored.audio_label.as_deref(), Some("aout"));
        let graph = mirrored.graph.serialize();
        assert!(graph.contains("atempo=1.03"));
        assert!(graph.contains("hflip"));
        assert!(graph.contains("setpts=0.97*PTS"));
    }

    #[test]
    fn crop_shape_rescales_back_to_frame_size() {
        let cat = fixture_catalog("crop", true, false);
        let job = job_for(3, &cat);
        let graph = job.graph.serialize();
        // 2% margin on 1080x1920.
        assert!(graph.contains("crop=1038:1844:21:38"));
        assert!(graph.contains("scale=1080:1920"));
    }

    #[test]
    fn final_video_chain_is_the_mapped_label() {
        let cat = fixture_catalog("label", false, true);
        let job = job_for(4, &cat);
        let serialized = job.graph.serialize();
        assert!(serialized.ends_with("[vout]"));
        let args = job.to_ffmpeg_args();
        assert!(args.contains(&"[vout]".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn masks_are_always_present() {
        let cat = fixture_catalog("masks", false, false);
        for variant in 0..5 {
            let job = job_for(variant, &cat);
            let graph = job.graph.serialize();
            assert_eq!(graph.matches("geq=a=").count(), 2);
        }
    }
}
