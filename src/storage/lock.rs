//! Lock files in the data directory
//!
//! Separate `splitpot` processes share nothing but the data directory, so
//! exclusion between them is a marker file created with `create_new`. The
//! marker is removed when the lock is dropped.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{SplitpotError, SplitpotResult};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A held lock file
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Create the marker, or return `None` if another holder has it
    pub fn try_acquire(path: impl Into<PathBuf>) -> SplitpotResult<Option<Self>> {
        let path = path.into();

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // The pid is informational only
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Some(Self { path }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(SplitpotError::Storage(format!(
                "Failed to create lock file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Wait up to `timeout` for the marker to become free
    pub fn acquire(path: impl Into<PathBuf>, timeout: Duration) -> SplitpotResult<Self> {
        let path = path.into();
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(lock) = Self::try_acquire(&path)? {
                return Ok(lock);
            }
            if Instant::now() >= deadline {
                return Err(SplitpotError::Storage(format!(
                    "Timed out waiting for {}. If no other splitpot process is running, remove it",
                    path.display()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove lock file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_holder_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lock");

        let lock = LockFile::try_acquire(&path).unwrap().unwrap();
        assert!(path.exists());
        assert!(LockFile::try_acquire(&path).unwrap().is_none());

        drop(lock);
        assert!(!path.exists());
        assert!(LockFile::try_acquire(&path).unwrap().is_some());
    }

    #[test]
    fn test_acquire_times_out_on_held_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lock");

        let _held = LockFile::try_acquire(&path).unwrap().unwrap();
        let err = LockFile::acquire(&path, Duration::from_millis(50)).unwrap_err();
        assert!(err.to_string().contains("Timed out"));
    }

    #[test]
    fn test_acquire_waits_for_release() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lock");

        let held = LockFile::try_acquire(&path).unwrap().unwrap();
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            drop(held);
        });

        let lock = LockFile::acquire(&path, Duration::from_secs(5)).unwrap();
        assert_eq!(lock.path(), path.as_path());
        releaser.join().unwrap();
    }
}
