//! Atomic I/O operations with file locking

use crate::{Error, NormalizedPath, Result};
use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Tuning for [`write_atomic`].
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long the final rename is retried before giving up.
    ///
    /// Virus scanners and indexers on Windows briefly hold freshly written
    /// manifests open, which makes the rename fail transiently.
    pub lock_timeout: Duration,
    /// Flush file contents to disk before the rename.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Writes to a sibling temp file and renames it over the target, so readers
/// see either the old or the new content, never a partial write.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = write_locked(&mut temp_file, content, config, &temp_path, &native_path);
    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(250))
        .with_max_elapsed_time(Some(config.lock_timeout))
        .build();

    let renamed = backoff::retry(policy, || {
        fs::rename(&temp_path, &native_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => backoff::Error::transient(e),
            _ => backoff::Error::permanent(e),
        })
    });

    match renamed {
        Ok(()) => Ok(()),
        Err(backoff::Error::Permanent(e)) | Err(backoff::Error::Transient { err: e, .. }) => {
            tracing::debug!(path = %native_path.display(), error = %e, "atomic rename failed");
            let _ = fs::remove_file(&temp_path);
            Err(Error::io(&native_path, e))
        }
    }
}

fn write_locked(
    file: &mut fs::File,
    content: &[u8],
    config: RobustnessConfig,
    temp_path: &Path,
    target: &Path,
) -> Result<()> {
    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;
    file.write_all(content).map_err(|e| Error::io(temp_path, e))?;
    if config.enable_fsync {
        file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    FileExt::unlock(&*file).map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically with default robustness settings.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

/// Copy a file atomically, so the destination never holds a partial copy.
pub fn copy_atomic(from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
    let native_from = from.to_native();
    let content = fs::read(&native_from).map_err(|e| Error::io(&native_from, e))?;
    write_atomic(to, &content, RobustnessConfig::default())
}
