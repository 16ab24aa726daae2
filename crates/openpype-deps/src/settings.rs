//! Tool settings with layered loading
//!
//! Settings are loaded from a hierarchy of TOML files:
//! 1. Global defaults (`<config_dir>/openpype-deps/config.toml`)
//! 2. An explicit file passed by the caller (`--config`)
//!
//! Later layers override earlier ones key by key. Missing layers are
//! skipped; malformed ones are errors.

use crate::context::{ConflictPolicy, Context, DEFAULT_PRODUCT};
use crate::platform::Platform;
use crate::{Error, Result};
use openpype_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use toml::{Table, Value};

/// Directory name under the platform config dir
pub const SETTINGS_DIR: &str = "openpype-deps";

/// File name of each settings layer
pub const SETTINGS_FILE: &str = "config.toml";

/// How environments are installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Program invoked for `lock` and `install`
    pub program: String,
    /// Per-step timeout; unbounded when unset
    pub timeout_secs: Option<u64>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            program: "poetry".to_string(),
            timeout_secs: None,
        }
    }
}

impl InstallerSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Effective settings after all layers are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub product: String,
    /// Target platform; the running platform when unset
    pub platform: Option<Platform>,
    pub conflict_policy: ConflictPolicy,
    pub installer: InstallerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            platform: None,
            conflict_policy: ConflictPolicy::default(),
            installer: InstallerSettings::default(),
        }
    }
}

impl Settings {
    /// Parse a single settings document.
    pub fn parse(content: &str) -> Result<Self> {
        let table: Table = content.parse().map_err(|e: toml::de::Error| Error::Parse {
            location: "<settings>".to_string(),
            format: "TOML".to_string(),
            message: e.message().to_string(),
        })?;
        Self::from_table(table, "<settings>")
    }

    fn from_table(table: Table, location: &str) -> Result<Self> {
        Value::Table(table)
            .try_into::<Settings>()
            .map_err(|e: toml::de::Error| Error::Parse {
                location: location.to_string(),
                format: "TOML".to_string(),
                message: e.message().to_string(),
            })
    }

    pub fn to_context(&self) -> Context {
        Context {
            product: self.product.clone(),
            platform: self.platform.unwrap_or_default(),
            conflict_policy: self.conflict_policy,
        }
    }
}

/// Loads [`Settings`] from the global layer and an optional explicit file.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,
    store: ConfigStore,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_config_dir(global_config_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir_override: Some(global_config_dir.into()),
            store: ConfigStore::new(),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR))
    }

    /// Layer files in load order.
    pub fn layers(&self, explicit: Option<&NormalizedPath>) -> Vec<NormalizedPath> {
        let mut layers = Vec::new();
        if let Some(global_dir) = self.global_config_dir() {
            layers.push(NormalizedPath::new(global_dir.join(SETTINGS_FILE)));
        }
        if let Some(explicit) = explicit {
            layers.push(explicit.clone());
        }
        layers
    }

    pub fn load(&self, explicit: Option<&NormalizedPath>) -> Result<Settings> {
        let mut merged = Table::new();
        for layer in self.layers(explicit) {
            if !layer.is_file() {
                tracing::debug!(%layer, "No settings layer found, skipping");
                continue;
            }
            tracing::debug!(%layer, "Loading settings layer");
            let table: Table = self.store.load(&layer).map_err(|e| match e {
                openpype_fs::Error::ConfigParse {
                    format, message, ..
                } => Error::Parse {
                    location: layer.to_string(),
                    format,
                    message,
                },
                other => Error::Fs(other),
            })?;
            overlay_table(&mut merged, table);
        }
        Settings::from_table(merged, "settings")
    }
}

fn overlay_table(target: &mut Table, layer: Table) {
    for (key, value) in layer {
        match (target.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                overlay_table(existing, incoming)
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}
