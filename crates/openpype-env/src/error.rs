//! Error types for openpype-env

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop provisioning before an installer report exists.
///
/// Installer failures are not errors; they are carried by
/// [`ProvisionReport`](crate::ProvisionReport).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid target directory {path}: {reason}")]
    InvalidTarget { path: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse lock file {path}: {message}")]
    LockParse { path: String, message: String },

    #[error("Filesystem error: {0}")]
    Fs(#[from] openpype_fs::Error),

    #[error(transparent)]
    Deps(#[from] openpype_deps::Error),

    #[error("Failed to render manifest: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_target_display() {
        let err = Error::InvalidTarget {
            path: "/studio/envs/pyproject.toml".to_string(),
            reason: "exists and is not a directory".to_string(),
        };
        assert!(err.to_string().contains("/studio/envs/pyproject.toml"));
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_lock_parse_display() {
        let err = Error::LockParse {
            path: "poetry.lock".to_string(),
            message: "expected `=`".to_string(),
        };
        assert!(err.to_string().contains("poetry.lock"));
    }
}
