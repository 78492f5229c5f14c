use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::error::RemixResult;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Working directory for intermediate frames, removed recursively when the
/// guard drops. Drop runs on success, on error returns and on panic unwind
/// alike, so intermediates never outlive the operation that created them.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory under the system temp root. The name mixes
    /// pid, wall clock and a process-local counter so concurrent runs never
    /// collide.
    pub fn new(prefix: &str) -> RemixResult<Self> {
        use anyhow::Context as _;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "{prefix}-{}-{nanos}-{seq}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create scratch dir '{}'", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove scratch dir"
            );
        }
    }
}
