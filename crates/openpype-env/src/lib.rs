//! Environment materialization for resolved dependency sets
//!
//! Turns a [`DependencySet`](openpype_deps::DependencySet) into an installed
//! Poetry environment: a `pyproject.toml` manifest, a lock file produced in
//! a scratch directory and an install run in the target directory.

pub mod error;
pub mod installer;
pub mod lock;
pub mod manifest;
pub mod materializer;
pub mod report;

pub use error::{Error, Result};
pub use installer::{
    CommandInstaller, InstallStep, Installer, InstallerCommand, PoetryInstaller, StepOutput,
};
pub use lock::{LOCK_FILE, LockedPackage, parse_lock, read_lock};
pub use manifest::{MANIFEST_FILE, render_manifest};
pub use materializer::EnvironmentMaterializer;
pub use report::{ENVIRONMENT_RECORD, EnvironmentRecord, ProvisionReport, ProvisionStatus};
