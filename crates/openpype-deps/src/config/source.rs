//! Reading configuration documents from locations
//!
//! A location is a file path, a directory holding a `pyproject.toml`
//! (how addons ship their requirements), or a `file://` URL.

use crate::config::document::Document;
use crate::{Error, Result};
use openpype_fs::{ConfigFormat, NormalizedPath, io};
use std::collections::HashMap;
use toml::Table;

/// File name looked up when a location is a directory
pub const PYPROJECT_FILE: &str = "pyproject.toml";

/// Anything that can turn a location into a [`Document`].
pub trait ConfigSource {
    /// Read and parse the document at `location`.
    ///
    /// Fails with [`Error::NotFound`] when nothing readable is there and
    /// with [`Error::Parse`] when the content is malformed.
    fn get_configuration(&self, location: &str) -> Result<Document>;
}

/// Reads documents from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConfigSource;

impl FileConfigSource {
    pub fn new() -> Self {
        Self
    }

    /// Map a location onto the file that will be read.
    pub fn resolve_location(location: &str) -> Result<NormalizedPath> {
        let path =
            NormalizedPath::from_location(location).map_err(|scheme| Error::UnsupportedLocation {
                location: location.to_string(),
                scheme,
            })?;
        if path.is_dir() {
            Ok(path.join(PYPROJECT_FILE))
        } else {
            Ok(path)
        }
    }
}

impl ConfigSource for FileConfigSource {
    fn get_configuration(&self, location: &str) -> Result<Document> {
        let path = Self::resolve_location(location)?;
        if !path.is_file() {
            return Err(Error::NotFound {
                location: path.to_string(),
            });
        }

        let format = ConfigFormat::detect(&path)?;
        let content = io::read_text(&path).map_err(|e| {
            tracing::debug!(%path, error = %e, "unreadable configuration");
            Error::NotFound {
                location: path.to_string(),
            }
        })?;

        let root: Table = format
            .parse(&content, &path.to_native())
            .map_err(|e| match e {
                openpype_fs::Error::ConfigParse {
                    format, message, ..
                } => Error::Parse {
                    location: path.to_string(),
                    format,
                    message,
                },
                other => Error::Fs(other),
            })?;

        tracing::debug!(%path, %format, keys = root.len(), "loaded configuration");
        Ok(Document::new(root).with_origin(path.to_string()))
    }
}

/// In-memory documents keyed by location, for tests and embedding callers.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigSource {
    documents: HashMap<String, Document>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, document: Document) -> Self {
        self.insert(location, document);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, document: Document) {
        self.documents.insert(location.into(), document);
    }
}

impl ConfigSource for MemoryConfigSource {
    fn get_configuration(&self, location: &str) -> Result<Document> {
        self.documents
            .get(location)
            .cloned()
            .map(|doc| doc.with_origin(location))
            .ok_or_else(|| Error::NotFound {
                location: location.to_string(),
            })
    }
}
