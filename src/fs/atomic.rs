//! Atomic file replacement.
//!
//! Content is written to a hidden temp file next to the target, synced, then
//! renamed over the target. Readers see either the old file or the new one,
//! never a partial write. Each write gets its own temp name
//! (`.{name}.{pid}.{n}.tmp`), so concurrent writers never share one. A crash
//! may leave a temp file behind.

use crate::error::{EngineError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically replace `path` with `content`, creating parent directories.
///
/// # Example
///
/// ```no_run
/// use clausekit::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("templates/nda.yaml"), "id: nda\n")?;
/// # Ok::<(), clausekit::error::EngineError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            EngineError::UserError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    if let Err(e) = write_synced(&temp_path, content.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    // std's rename replaces an existing target on every supported platform.
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        EngineError::UserError(format!(
            "failed to replace '{}': {}",
            path.display(),
            e
        ))
    })?;

    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            EngineError::UserError(format!("invalid file path '{}'", target.display()))
        })?;
    let parent = target.parent().unwrap_or(Path::new("."));
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    Ok(parent.join(format!(".{}.{}.{}.tmp", name, std::process::id(), n)))
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let io_err = |action: &str, e: std::io::Error| {
        EngineError::UserError(format!(
            "failed to {} temporary file '{}': {}",
            action,
            path.display(),
            e
        ))
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| io_err("create", e))?;
    file.write_all(content).map_err(|e| io_err("write", e))?;
    file.sync_all().map_err(|e| io_err("sync", e))?;
    Ok(())
}
