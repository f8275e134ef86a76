//! Per-template save locks.
//!
//! A save holds `templates/.{template_id}.lock` across its read-compare-write.
//! The file is created with `create_new`, so only one process can hold it; the
//! guard deletes it when dropped. The file records who took the lock.

use super::actor_string;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a save waits for a competing save to finish.
const LOCK_WAIT: Duration = Duration::from_secs(2);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Contents of a lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockMetadata {
    owner: String,
    pid: u32,
    created_at: DateTime<Utc>,
}

impl LockMetadata {
    fn current() -> Self {
        Self {
            owner: actor_string(),
            pid: std::process::id(),
            created_at: Utc::now(),
        }
    }

    fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// RAII guard for a template's save lock.
#[derive(Debug)]
pub(crate) struct SaveLock {
    path: PathBuf,
}

impl SaveLock {
    /// Lock file path for a template in `dir`.
    pub(crate) fn path_for(dir: &Path, template_id: &str) -> PathBuf {
        dir.join(format!(".{}.lock", template_id))
    }

    /// Acquire the save lock, waiting briefly for a competing save.
    ///
    /// # Returns
    ///
    /// * `Ok(SaveLock)` - The lock is held until the guard is dropped
    /// * `Err(EngineError::LockError)` - Another save still holds it after the wait
    pub(crate) fn acquire(dir: &Path, template_id: &str) -> Result<Self> {
        Self::acquire_within(dir, template_id, LOCK_WAIT)
    }

    pub(crate) fn acquire_within(dir: &Path, template_id: &str, wait: Duration) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            EngineError::UserError(format!(
                "failed to create directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let path = Self::path_for(dir, template_id);
        let deadline = Instant::now() + wait;
        loop {
            match Self::try_create(&path) {
                Ok(lock) => {
                    debug!(path = %path.display(), "acquired save lock");
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && Instant::now() < deadline => {
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let holder = match LockMetadata::read(&path) {
                        Some(meta) => format!(
                            " (held by {} pid {} since {})",
                            meta.owner,
                            meta.pid,
                            meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                        ),
                        None => String::new(),
                    };
                    return Err(EngineError::LockError(format!(
                        "template '{}' is being saved by another process{}\n\nFix: retry; if no save is running, delete '{}'",
                        template_id,
                        holder,
                        path.display()
                    )));
                }
                Err(e) => {
                    return Err(EngineError::LockError(format!(
                        "failed to create lock '{}': {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
    }

    fn try_create(path: &Path) -> std::io::Result<Self> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        let lock = Self {
            path: path.to_path_buf(),
        };

        // The lock is held from here on; metadata is informational only.
        if let Ok(json) = serde_json::to_string(&LockMetadata::current()) {
            let _ = file.write_all(json.as_bytes());
        }
        Ok(lock)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SaveLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release save lock");
        }
    }
}
