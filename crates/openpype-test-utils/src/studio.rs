//! [`TestStudio`] builder for base/addon layouts on disk.

use crate::fixtures;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary studio directory holding a base `pyproject.toml` and an
/// `addons/` tree.
///
/// # Example
///
/// ```rust
/// use openpype_test_utils::studio::TestStudio;
///
/// let studio = TestStudio::with_fixtures();
/// let base = studio.base_location();
/// let addons = studio.addon_locations();
/// assert!(std::path::Path::new(&base).is_file());
/// assert_eq!(addons.len(), 1);
/// ```
pub struct TestStudio {
    temp_dir: TempDir,
    addons: Vec<String>,
}

impl Default for TestStudio {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStudio {
    /// Create an empty studio directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            addons: Vec::new(),
        }
    }

    /// A studio with the checked-in base and the `example` addon.
    pub fn with_fixtures() -> Self {
        let mut studio = Self::new();
        studio.write_base(fixtures::BASE_PYPROJECT);
        studio.add_addon("example", fixtures::EXAMPLE_ADDON);
        studio
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write the base configuration to `<root>/pyproject.toml`.
    pub fn write_base(&self, content: &str) -> PathBuf {
        let path = self.root().join("pyproject.toml");
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `addons/<name>/pyproject.toml` and remember the addon in
    /// registration order.
    pub fn add_addon(&mut self, name: &str, content: &str) -> PathBuf {
        let dir = self.root().join("addons").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("pyproject.toml"), content).unwrap();
        self.addons.push(dir.to_string_lossy().into_owned());
        dir
    }

    /// Register a location that is never created on disk.
    pub fn add_missing_addon(&mut self, name: &str) -> PathBuf {
        let dir = self.root().join("addons").join(name);
        self.addons.push(dir.to_string_lossy().into_owned());
        dir
    }

    pub fn base_location(&self) -> String {
        self.root().join("pyproject.toml").to_string_lossy().into_owned()
    }

    /// Addon directories in registration order.
    pub fn addon_locations(&self) -> Vec<String> {
        self.addons.clone()
    }

    /// A fresh directory inside the studio for an environment target.
    pub fn target_dir(&self, name: &str) -> PathBuf {
        let dir = self.root().join("envs").join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Assert a file exists relative to the studio root.
    pub fn assert_file_exists(&self, rel: &str) {
        let path = self.root().join(rel);
        assert!(path.exists(), "expected file to exist: {}", path.display());
    }

    /// Read a file relative to the studio root.
    pub fn read_file(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel))
            .unwrap_or_else(|e| panic!("failed to read {rel}: {e}"))
    }
}
