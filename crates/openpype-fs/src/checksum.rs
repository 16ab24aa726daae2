//! SHA-256 checksum utilities
//!
//! Checksums are rendered as `sha256:<hex>`. Third-party tool blocks in
//! `pyproject.toml` carry bare hex digests, so comparisons accept both.

use crate::{Error, NormalizedPath, Result};
use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

/// Compute the checksum of in-memory content.
pub fn content_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the checksum of a file's contents.
pub fn file_checksum(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let content = std::fs::read(&native).map_err(|e| Error::io(&native, e))?;
    Ok(content_checksum(&content))
}

/// Compare two digests, ignoring the `sha256:` prefix and hex case.
pub fn digests_match(expected: &str, actual: &str) -> bool {
    let strip = |s: &str| s.trim().trim_start_matches(PREFIX).to_ascii_lowercase();
    strip(expected) == strip(actual)
}

/// Check a file against an expected digest.
pub fn verify_file(path: &NormalizedPath, expected: &str) -> Result<bool> {
    Ok(digests_match(expected, &file_checksum(path)?))
}
