//! Error types for openpype-deps

use crate::platform::Platform;

/// Result type for openpype-deps operations
pub type Result<T> = std::result::Result<T, Error>;

fn at(location: &Option<String>) -> String {
    match location {
        Some(location) => format!(" in {location}"),
        None => String::new(),
    }
}

/// Errors that can occur while reading, validating, merging or resolving
/// configuration documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The location does not resolve to a readable document
    #[error("Configuration not found at {location}")]
    NotFound { location: String },

    /// The document exists but is not well-formed
    #[error("Failed to parse {format} configuration at {location}: {message}")]
    Parse {
        location: String,
        format: String,
        message: String,
    },

    /// A required key path is missing or has the wrong shape
    #[error("Invalid configuration{}: `{path}` {message}", at(.location))]
    Schema {
        path: String,
        message: String,
        location: Option<String>,
    },

    /// A third-party tool has no entry usable on the current platform
    #[error("Third-party tool `{tool}` has no version for platform `{platform}`")]
    MissingPlatform { tool: String, platform: Platform },

    /// An addon tried to redefine a pinned third-party value
    #[error("Addon{} redefines third-party pin `{path}`", at(.location))]
    ThirdpartyConflict {
        path: String,
        location: Option<String>,
    },

    /// The location uses a scheme that cannot be read locally
    #[error("Unsupported location {location}: `{scheme}` sources are not supported")]
    UnsupportedLocation { location: String, scheme: String },

    #[error("Invalid platform: {name}")]
    InvalidPlatform { name: String },

    #[error("Invalid conflict policy: {value}")]
    InvalidPolicy { value: String },

    /// Filesystem error from openpype-fs
    #[error(transparent)]
    Fs(#[from] openpype_fs::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn missing_key(path: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: "is missing".to_string(),
            location: None,
        }
    }

    pub(crate) fn not_a_table(path: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: "must be a table".to_string(),
            location: None,
        }
    }

    /// Attach the document location to errors that lack one.
    pub fn with_location(self, origin: Option<&str>) -> Self {
        let Some(origin) = origin else {
            return self;
        };
        match self {
            Self::Schema {
                path,
                message,
                location: None,
            } => Self::Schema {
                path,
                message,
                location: Some(origin.to_string()),
            },
            Self::ThirdpartyConflict {
                path,
                location: None,
            } => Self::ThirdpartyConflict {
                path,
                location: Some(origin.to_string()),
            },
            other => other,
        }
    }

    /// The key path an error refers to, when it has one.
    pub fn key_path(&self) -> Option<&str> {
        match self {
            Self::Schema { path, .. } | Self::ThirdpartyConflict { path, .. } => Some(path),
            _ => None,
        }
    }
}
