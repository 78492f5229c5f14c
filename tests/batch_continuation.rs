use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vidremix::{
    batch::{BatchConfig, run_batch},
    engine::{RenderEngine, VideoInfo},
    error::{RemixError, RemixResult},
    job::RenderJob,
};

/// Engine double: probing fails for marked files, execution writes a
/// plausible output (or a truncated one for marked outputs).
struct FakeEngine {
    executed: Mutex<Vec<PathBuf>>,
}

impl FakeEngine {
    fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
        }
    }
}

impl RenderEngine for FakeEngine {
    fn probe(&self, source: &Path) -> RemixResult<VideoInfo> {
        let name = source.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.contains("broken") {
            return Err(RemixError::probe(format!(
                "no video stream in '{}'",
                source.display()
            )));
        }
        Ok(VideoInfo {
            source_path: source.to_path_buf(),
            width: 1080,
            height: 1920,
            fps_num: 30,
            fps_den: 1,
            duration_sec: 12.0,
            has_audio: true,
        })
    }

    fn execute(&self, job: &RenderJob) -> RemixResult<()> {
        self.executed.lock().unwrap().push(job.output_path.clone());
        let name = job
            .output_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        if name.contains("tiny") {
            std::fs::write(&job.output_path, b"stub").unwrap();
        } else {
            std::fs::write(&job.output_path, vec![0u8; 2048]).unwrap();
        }
        Ok(())
    }
}

fn setup(tag: &str, inputs: &[&str]) -> BatchConfig {
    let root = PathBuf::from("target").join("batch_itests").join(tag);
    let input_dir = root.join("in");
    let output_dir = root.join("out");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::create_dir_all(&output_dir).unwrap();
    for name in inputs {
        std::fs::write(input_dir.join(name), b"mp4").unwrap();
    }

    let mut config = BatchConfig::new(input_dir, output_dir, root.join("assets"));
    config.min_output_bytes = 1024;
    config
}

#[test]
fn failing_probe_skips_one_input_and_the_rest_render() {
    let config = setup("probe_skip", &["a.mp4", "broken.mp4", "c.mp4"]);
    let engine = FakeEngine::new();

    let report = run_batch(&engine, &config).unwrap();

    // Two good inputs times five variants; the broken input contributes no
    // jobs at all.
    assert_eq!(report.attempted, 10);
    assert_eq!(report.succeeded, 10);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped_inputs, 1);

    let executed = engine.executed.lock().unwrap();
    assert_eq!(executed.len(), 10);
    assert!(
        executed
            .iter()
            .all(|p| !p.to_string_lossy().contains("broken"))
    );
}

#[test]
fn undersized_output_counts_as_failed_without_stopping_the_batch() {
    // The output name embeds the input stem, so "tiny.mp4" marks its five
    // outputs for truncation in the fake engine.
    let config = setup("undersized", &["ok.mp4", "tiny.mp4"]);
    let engine = FakeEngine::new();

    let report = run_batch(&engine, &config).unwrap();
    assert_eq!(report.attempted, 10);
    assert_eq!(report.succeeded, 5);
    assert_eq!(report.failed, 5);
    assert_eq!(report.skipped_inputs, 0);
}

#[test]
fn inputs_sharing_a_stem_do_not_overwrite_each_other() {
    let config = setup("stem_collision", &["clip.mp4", "clip.MP4"]);
    let engine = FakeEngine::new();

    let report = run_batch(&engine, &config).unwrap();
    assert_eq!(report.attempted, 10);
    assert_eq!(report.succeeded, 10);

    let mut outputs = engine.executed.lock().unwrap().clone();
    outputs.sort();
    outputs.dedup();
    assert_eq!(outputs.len(), 10);
    assert!(outputs.iter().all(|p| p.exists()));
}

#[test]
fn outputs_are_named_per_input_and_variant() {
    let config = setup("naming", &["clip.mp4"]);
    let engine = FakeEngine::new();

    run_batch(&engine, &config).unwrap();

    for variant in 1..=5 {
        assert!(config.output_dir.join(format!("clip_v{variant}.mp4")).exists());
    }
}
