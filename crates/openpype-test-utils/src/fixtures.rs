//! Checked-in configuration fixtures under `test-fixtures/`.
//!
//! The base pins `aiohttp = "3.6.*"` and per-platform `ffmpeg` (4.4) and
//! `oiio` (2.1.0) builds plus a platform-independent `ocioconfig` (1.0.0).
//! The `example` addon adds `new_dependency` (`^1.0.0` runtime, `^2.0.0`
//! dev), tries to repin linux `ffmpeg` to 5.0 and adds an `exr_tools` tool.

use std::path::PathBuf;

/// Base studio configuration.
pub const BASE_PYPROJECT: &str = include_str!("../../../test-fixtures/pyproject.toml");

/// Addon overlay with new dependencies and a conflicting third-party pin.
pub const EXAMPLE_ADDON: &str = include_str!("../../../test-fixtures/addons/example/pyproject.toml");

/// Addon with a single small dependency, suitable for provisioning runs.
pub const CLEAN_ADDON: &str = include_str!("../../../test-fixtures/addons/clean/pyproject.toml");

/// Root of the `test-fixtures` directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test-fixtures")
}

/// Path of the base `pyproject.toml`.
pub fn base_path() -> PathBuf {
    fixtures_dir().join("pyproject.toml")
}

/// Directory of a checked-in addon, usable directly as an addon location.
pub fn addon_dir(name: &str) -> PathBuf {
    fixtures_dir().join("addons").join(name)
}
