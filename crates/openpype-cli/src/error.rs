//! Error types for openpype-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from openpype-deps
    #[error(transparent)]
    Deps(#[from] openpype_deps::Error),

    /// Error from openpype-env
    #[error(transparent)]
    Env(#[from] openpype_env::Error),

    /// Error from openpype-fs
    #[error(transparent)]
    Fs(#[from] openpype_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deps_error_is_transparent() {
        let error: CliError = openpype_deps::Error::NotFound {
            location: "addons/ghost".to_string(),
        }
        .into();
        assert!(error.to_string().contains("addons/ghost"));
    }
}
