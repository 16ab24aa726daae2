//! Reading `poetry.lock`

use crate::{Error, Result};
use openpype_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

/// Lock file written by the lock step
pub const LOCK_FILE: &str = "poetry.lock";

/// One `[[package]]` entry of a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    /// `main` or `dev` in Poetry 1.x lock files; absent in newer ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Deserialize)]
struct LockFile {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

/// Parse lock file content into its packages, sorted by name.
pub fn parse_lock(content: &str, origin: &str) -> Result<Vec<LockedPackage>> {
    let lock: LockFile = toml::from_str(content).map_err(|e| Error::LockParse {
        path: origin.to_string(),
        message: e.message().to_string(),
    })?;
    let mut packages = lock.package;
    packages.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(packages)
}

pub fn read_lock(path: &NormalizedPath) -> Result<Vec<LockedPackage>> {
    let content = io::read_text(path)?;
    parse_lock(&content, path.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOCK: &str = r#"
[[package]]
name = "six"
version = "1.16.0"
description = "Python 2 and 3 compatibility utilities"
category = "main"
optional = false
python-versions = ">=2.7, !=3.0.*, !=3.1.*, !=3.2.*"

[[package]]
name = "aiohttp"
version = "3.6.3"
category = "main"
optional = false

[package.dependencies]
attrs = ">=17.3.0"

[metadata]
lock-version = "1.1"
python-versions = ">=3.7.1,<3.10"
content-hash = "4f1ad9a0c8d1f9e8a05b9a3aa0a4a46a"
"#;

    #[test]
    fn test_parse_packages_sorted() {
        let packages = parse_lock(LOCK, "poetry.lock").unwrap();

        assert_eq!(
            packages,
            vec![
                LockedPackage {
                    name: "aiohttp".into(),
                    version: "3.6.3".into(),
                    category: Some("main".into()),
                },
                LockedPackage {
                    name: "six".into(),
                    version: "1.16.0".into(),
                    category: Some("main".into()),
                },
            ]
        );
    }

    #[test]
    fn test_empty_lock() {
        assert!(parse_lock("[metadata]\nlock-version = \"2.0\"\n", "poetry.lock")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_malformed_lock() {
        let err = parse_lock("[[package]\n", "env/poetry.lock").unwrap_err();
        assert!(matches!(err, Error::LockParse { ref path, .. } if path == "env/poetry.lock"));
    }
}
