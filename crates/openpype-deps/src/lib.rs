//! Configuration merge and dependency resolution for OpenPype
//!
//! A studio runs one base `pyproject.toml` and any number of addons, each
//! shipping its own requirements. This crate turns them into one resolved
//! configuration and a per-platform [`DependencySet`]:
//!
//! - **Documents**: [`Document`] wraps a TOML table with key-path access
//! - **Sources**: [`ConfigSource`] reads documents from paths, addon
//!   directories or `file://` URLs
//! - **Validation**: [`ConfigValidator`] checks the required sections
//! - **Merge**: [`ConfigMerger`] folds addons into the base; dependency
//!   tables take the addon's constraint, everything else keeps the base
//! - **Resolution**: [`DependencyResolver`] selects third-party pins for a
//!   [`Platform`]
//!
//! # Architecture
//!
//! ```text
//!        openpype-cli
//!         |        |
//!   openpype-env   |
//!         |        |
//!       openpype-deps
//!            |
//!       openpype-fs
//! ```
//!
//! # Example
//!
//! ```
//! use openpype_deps::{Context, DependencyResolver, Document, MemoryConfigSource, Platform};
//!
//! let base: Document = r#"
//! [tool.poetry.dependencies]
//! aiohttp = "3.6.*"
//! [tool.poetry.dev-dependencies]
//! [openpype.thirdparty.ocioconfig]
//! version = "1.0.0"
//! "#
//! .parse()
//! .unwrap();
//! let addon: Document = r#"
//! [tool.poetry.dependencies]
//! new_dependency = "^1.0.0"
//! [tool.poetry.dev-dependencies]
//! "#
//! .parse()
//! .unwrap();
//!
//! let context = Context::default().with_platform(Platform::Linux);
//! let source = MemoryConfigSource::new().with("addons/example", addon);
//! let resolved = openpype_deps::get_full_config(&context, &base, &["addons/example"], &source)
//!     .unwrap();
//! let set = DependencyResolver::new(context).resolve(&resolved).unwrap();
//!
//! assert_eq!(set.runtime["new_dependency"].constraint(), Some("^1.0.0"));
//! assert_eq!(set.thirdparty["ocioconfig"].version, "1.0.0");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod merge;
pub mod platform;
pub mod resolve;
pub mod settings;

pub use config::{
    ConfigSource, ConfigValidator, DependencySection, Document, FileConfigSource,
    MemoryConfigSource, ValidationProfile,
};
pub use context::{ConflictPolicy, Context, DEFAULT_PRODUCT};
pub use error::{Error, Result};
pub use merge::{ConfigMerger, MergeConflict, MergeReport, merge};
pub use platform::Platform;
pub use resolve::{DependencyResolver, DependencySet, DependencySpec, ThirdpartyTool};
pub use settings::{InstallerSettings, Settings, SettingsLoader};

/// Build the full configuration: the validated base with every addon
/// location merged in order.
///
/// Fails on the first addon that cannot be read, parsed or validated.
pub fn get_full_config<S, L>(
    context: &Context,
    base: &Document,
    addon_locations: &[L],
    source: &S,
) -> Result<Document>
where
    S: ConfigSource + ?Sized,
    L: AsRef<str>,
{
    context.validate_base(base)?;
    tracing::debug!(
        product = %context.product,
        addons = addon_locations.len(),
        "building full configuration"
    );
    ConfigMerger::new(context.clone()).merge_addons(base, addon_locations, source)
}

/// Load the base from `base_location` with `source`, then merge the addons.
pub fn load_full_config<S, L>(
    context: &Context,
    base_location: &str,
    addon_locations: &[L],
    source: &S,
) -> Result<Document>
where
    S: ConfigSource + ?Sized,
    L: AsRef<str>,
{
    let base = source.get_configuration(base_location)?;
    get_full_config(context, &base, addon_locations, source)
}
