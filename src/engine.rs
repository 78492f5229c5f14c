use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{
    error::{RemixError, RemixResult},
    job::RenderJob,
};

/// Probe result for one source video.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    pub has_audio: bool,
}

impl VideoInfo {
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

/// Seam between job assembly and the external media engine. The batch
/// orchestrator and the tests only ever see this trait; the real
/// implementation shells out to ffmpeg/ffprobe.
pub trait RenderEngine {
    fn probe(&self, source: &Path) -> RemixResult<VideoInfo>;
    fn execute(&self, job: &RenderJob) -> RemixResult<()>;
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> RemixResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// System-binary engine: `ffprobe` for probing, `ffmpeg` for execution.
/// Uses the system binaries rather than linked FFmpeg libraries to avoid
/// native dev header/lib requirements.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegEngine;

impl RenderEngine for FfmpegEngine {
    fn probe(&self, source: &Path) -> RemixResult<VideoInfo> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        let out = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(source)
            .output()
            .map_err(|e| RemixError::probe(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(RemixError::probe(format!(
                "ffprobe failed for '{}': {}",
                source.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
            .map_err(|e| RemixError::probe(format!("ffprobe json parse failed: {e}")))?;
        let video_stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                RemixError::probe(format!("no video stream in '{}'", source.display()))
            })?;
        let width = video_stream
            .width
            .ok_or_else(|| RemixError::probe("missing video width from ffprobe"))?;
        let height = video_stream
            .height
            .ok_or_else(|| RemixError::probe("missing video height from ffprobe"))?;
        let (fps_num, fps_den) =
            parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
                .ok_or_else(|| RemixError::probe("invalid video r_frame_rate"))?;
        let duration_sec = parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let has_audio = parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        Ok(VideoInfo {
            source_path: source.to_path_buf(),
            width,
            height,
            fps_num,
            fps_den,
            duration_sec,
            has_audio,
        })
    }

    fn execute(&self, job: &RenderJob) -> RemixResult<()> {
        ensure_parent_dir(&job.output_path)?;
        if !is_ffmpeg_on_path() {
            return Err(RemixError::engine(
                "ffmpeg is required but was not found on PATH",
            ));
        }

        let out = Command::new("ffmpeg")
            .args(job.to_ffmpeg_args())
            .output()
            .map_err(|e| RemixError::engine(format!("failed to spawn ffmpeg: {e}")))?;

        if !out.status.success() {
            return Err(RemixError::engine(format!(
                "ffmpeg exited with status {} for '{}': {}",
                out.status,
                job.output_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(())
    }
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
