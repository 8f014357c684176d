use repoharvest_core::constants;
use repoharvest_core::error::MirrorError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Checkpoint file beside a mirror directory: `<location>.upstream_push_time`.
pub fn checkpoint_path(location: &Path) -> PathBuf {
    let mut raw = location.as_os_str().to_os_string();
    raw.push(constants::CHECKPOINT_SUFFIX);
    PathBuf::from(raw)
}

/// Record the remote's `pushed_at` (epoch seconds) as of a successful fetch.
pub fn write_checkpoint(location: &Path, pushed_at: i64) -> Result<(), MirrorError> {
    let path = checkpoint_path(location);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, pushed_at.to_string())?;
    debug!(path = %path.display(), pushed_at, "checkpoint written");
    Ok(())
}

/// Read back the recorded push time. Scanning without a prior update is a
/// typed error, not a default value.
pub fn read_checkpoint(location: &Path) -> Result<i64, MirrorError> {
    let path = checkpoint_path(location);
    if !path.exists() {
        return Err(MirrorError::CheckpointMissing {
            path: path.display().to_string(),
        });
    }
    let raw = std::fs::read_to_string(&path)?;
    raw.trim().parse().map_err(|e: std::num::ParseIntError| {
        MirrorError::checkpoint_corrupt(path.display().to_string(), e.to_string())
    })
}
