//! Extraction of the dependency set for one platform from a resolved
//! configuration

use crate::config::{DependencySection, Document, ValidationProfile, join_path};
use crate::context::Context;
use crate::platform::Platform;
use crate::{Error, Result};
use openpype_fs::{NormalizedPath, checksum};
use serde::Serialize;
use std::collections::BTreeMap;
use toml::{Table, Value};

const SOURCES_PATH: [&str; 3] = ["tool", "poetry", "source"];

/// A Poetry dependency requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// `aiohttp = "3.6.*"`
    Version(String),
    /// Inline tables (`{ version = "^1", extras = ["x"] }`, `{ git = "..." }`)
    /// and lists of them, kept verbatim for the installer
    Detailed(Value),
}

impl DependencySpec {
    fn from_value(key_path: String, value: &Value) -> Result<Self> {
        match value {
            Value::String(constraint) => Ok(Self::Version(constraint.clone())),
            Value::Table(_) | Value::Array(_) => Ok(Self::Detailed(value.clone())),
            _ => Err(Error::Schema {
                path: key_path,
                message: "must be a version string or a table".to_string(),
                location: None,
            }),
        }
    }

    /// The version constraint, when one is given.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::Version(constraint) => Some(constraint),
            Self::Detailed(Value::Table(table)) => table.get("version").and_then(Value::as_str),
            Self::Detailed(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Version(constraint) => Value::String(constraint.clone()),
            Self::Detailed(value) => value.clone(),
        }
    }
}

/// A binary tool pinned in the third-party block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThirdpartyTool {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Taken from a `<tool>.<platform>` block rather than the tool-level
    /// fallback
    pub platform_specific: bool,
}

impl ThirdpartyTool {
    /// Check a downloaded archive against the pinned hash.
    ///
    /// Returns `None` when the configuration pins no hash.
    pub fn verify_archive(&self, archive: &NormalizedPath) -> Result<Option<bool>> {
        match &self.hash {
            Some(expected) => Ok(Some(checksum::verify_file(archive, expected)?)),
            None => Ok(None),
        }
    }
}

/// Everything needed to build an environment on one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencySet {
    pub platform: Platform,
    pub runtime: BTreeMap<String, DependencySpec>,
    pub dev: BTreeMap<String, DependencySpec>,
    pub thirdparty: BTreeMap<String, ThirdpartyTool>,
    /// `[[tool.poetry.source]]` package indexes, in declaration order
    pub sources: Vec<Table>,
}

impl DependencySet {
    pub fn section(&self, section: DependencySection) -> &BTreeMap<String, DependencySpec> {
        match section {
            DependencySection::Runtime => &self.runtime,
            DependencySection::Dev => &self.dev,
        }
    }
}

/// Flattens a resolved [`Document`] into a [`DependencySet`].
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    context: Context,
}

impl DependencyResolver {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Resolve `document` for the context platform.
    ///
    /// Fails with [`Error::MissingPlatform`] when a third-party tool has
    /// neither a block for the platform nor a platform-independent version.
    pub fn resolve(&self, document: &Document) -> Result<DependencySet> {
        self.context
            .validator()
            .validate(document, ValidationProfile::Base)?;

        let runtime = self
            .collect_section(document, DependencySection::Runtime)
            .map_err(|e| e.with_location(document.origin()))?;
        let dev = self
            .collect_section(document, DependencySection::Dev)
            .map_err(|e| e.with_location(document.origin()))?;
        let thirdparty = self
            .collect_thirdparty(document)
            .map_err(|e| e.with_location(document.origin()))?;
        let sources = collect_sources(document).map_err(|e| e.with_location(document.origin()))?;

        tracing::debug!(
            platform = %self.context.platform,
            runtime = runtime.len(),
            dev = dev.len(),
            thirdparty = thirdparty.len(),
            "resolved dependency set"
        );

        Ok(DependencySet {
            platform: self.context.platform,
            runtime,
            dev,
            thirdparty,
            sources,
        })
    }

    fn collect_section(
        &self,
        document: &Document,
        section: DependencySection,
    ) -> Result<BTreeMap<String, DependencySpec>> {
        let Some(entries) = document.section(section) else {
            return Err(Error::missing_key(section.key_path()));
        };
        entries
            .iter()
            .map(|(name, value)| {
                let key_path = format!("{}.{}", section.key_path(), name);
                DependencySpec::from_value(key_path, value).map(|spec| (name.clone(), spec))
            })
            .collect()
    }

    fn collect_thirdparty(&self, document: &Document) -> Result<BTreeMap<String, ThirdpartyTool>> {
        let block_path = self.context.thirdparty_path();
        let Some(block) = document.get_table(&block_path) else {
            return Err(Error::missing_key(join_path(&block_path)));
        };

        let mut tools = BTreeMap::new();
        for (name, entry) in block {
            let tool_path = format!("{}.{}", join_path(&block_path), name);
            let Some(entry) = entry.as_table() else {
                return Err(Error::not_a_table(tool_path));
            };
            let tool = self.resolve_tool(name, &tool_path, entry)?;
            tools.insert(name.clone(), tool);
        }
        Ok(tools)
    }

    fn resolve_tool(&self, name: &str, tool_path: &str, entry: &Table) -> Result<ThirdpartyTool> {
        let platform = self.context.platform;
        let platform_block = match entry.get(platform.as_str()) {
            Some(Value::Table(block)) => Some(block),
            Some(_) => return Err(Error::not_a_table(format!("{tool_path}.{platform}"))),
            None => None,
        };

        let pinned = |key: &str, path: String| -> Result<Option<String>> {
            let value = platform_block
                .and_then(|block| block.get(key))
                .or_else(|| entry.get(key));
            scalar_string(value, path)
        };

        let version_path = match platform_block {
            Some(_) => format!("{tool_path}.{platform}.version"),
            None => format!("{tool_path}.version"),
        };
        let version = match pinned("version", version_path.clone())? {
            Some(version) => version,
            None if platform_block.is_none() => {
                return Err(Error::MissingPlatform {
                    tool: name.to_string(),
                    platform,
                });
            }
            None => return Err(Error::missing_key(version_path)),
        };

        Ok(ThirdpartyTool {
            name: name.to_string(),
            version,
            url: pinned("url", format!("{tool_path}.url"))?,
            hash: pinned("hash", format!("{tool_path}.hash"))?,
            platform_specific: platform_block.is_some_and(|block| block.contains_key("version")),
        })
    }
}

fn collect_sources(document: &Document) -> Result<Vec<Table>> {
    match document.get(&SOURCES_PATH) {
        None => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .as_table()
                    .cloned()
                    .ok_or_else(|| Error::not_a_table(format!("{}[{index}]", join_path(&SOURCES_PATH))))
            })
            .collect(),
        Some(_) => Err(Error::Schema {
            path: join_path(&SOURCES_PATH),
            message: "must be an array of tables".to_string(),
            location: None,
        }),
    }
}

/// Accept strings and bare numbers (`version = 4.4`) as pins.
fn scalar_string(value: Option<&Value>, path: String) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Integer(i)) => Ok(Some(i.to_string())),
        Some(Value::Float(f)) => Ok(Some(f.to_string())),
        Some(_) => Err(Error::Schema {
            path,
            message: "must be a string".to_string(),
            location: None,
        }),
    }
}
