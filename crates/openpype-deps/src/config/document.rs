//! Tagged configuration tree with typed accessors for the known sections
//!
//! A [`Document`] keeps TOML's dynamic shape (`toml::Value` is the
//! string/integer/float/boolean/datetime/array/table union) while exposing
//! the paths the pipeline cares about:
//!
//! ```text
//! [tool.poetry.dependencies]        runtime Python dependencies
//! [tool.poetry.dev-dependencies]    development Python dependencies
//! [<product>.thirdparty.<tool>]     binary tool pins, optionally per platform
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use toml::{Table, Value};

/// Path of the runtime dependency table
pub const DEPENDENCIES_PATH: [&str; 3] = ["tool", "poetry", "dependencies"];

/// Path of the development dependency table
pub const DEV_DEPENDENCIES_PATH: [&str; 3] = ["tool", "poetry", "dev-dependencies"];

/// Name of the third-party block under the product table
pub const THIRDPARTY_KEY: &str = "thirdparty";

/// The two Python dependency sections merged key by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencySection {
    Runtime,
    Dev,
}

impl DependencySection {
    pub const ALL: [DependencySection; 2] = [DependencySection::Runtime, DependencySection::Dev];

    pub fn path(&self) -> [&'static str; 3] {
        match self {
            DependencySection::Runtime => DEPENDENCIES_PATH,
            DependencySection::Dev => DEV_DEPENDENCIES_PATH,
        }
    }

    /// Dotted key path, e.g. `tool.poetry.dependencies`
    pub fn key_path(&self) -> String {
        join_path(&self.path())
    }
}

fn insert_at(table: &mut Table, parents: &[&str], last: &str, value: Value) -> Option<Value> {
    let Some((first, rest)) = parents.split_first() else {
        return table.insert(last.to_string(), value);
    };
    match table
        .entry((*first).to_string())
        .or_insert_with(|| Value::Table(Table::new()))
    {
        Value::Table(inner) => insert_at(inner, rest, last, value),
        other => {
            let mut inner = Table::new();
            insert_at(&mut inner, rest, last, value);
            *other = Value::Table(inner);
            None
        }
    }
}

/// Render a key path the way it would be written in TOML.
pub fn join_path(segments: &[&str]) -> String {
    segments.join(".")
}

/// A parsed configuration document.
///
/// Equality compares content only; the origin is diagnostic metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Table,
    #[serde(skip)]
    origin: Option<String>,
}

impl Document {
    pub fn new(root: Table) -> Self {
        Self { root, origin: None }
    }

    /// Record where this document was read from.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    pub fn into_table(self) -> Table {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up a value by key path.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.get(*first)?;
        for segment in rest {
            current = current.as_table()?.get(*segment)?;
        }
        Some(current)
    }

    /// Look up a table by key path; `None` if absent or not a table.
    pub fn get_table(&self, path: &[&str]) -> Option<&Table> {
        if path.is_empty() {
            return Some(&self.root);
        }
        self.get(path)?.as_table()
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    /// Remove the value at `path`, returning it.
    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut table = &mut self.root;
        for segment in parents {
            table = table.get_mut(*segment)?.as_table_mut()?;
        }
        table.remove(*last)
    }

    /// Insert `value` at `path`, creating intermediate tables, and return
    /// the value it replaced.
    ///
    /// A non-table value standing in the way of the path is replaced.
    pub fn insert(&mut self, path: &[&str], value: Value) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        insert_at(&mut self.root, parents, last, value)
    }

    pub(crate) fn root_mut(&mut self) -> &mut Table {
        &mut self.root
    }

    pub fn section(&self, section: DependencySection) -> Option<&Table> {
        self.get_table(&section.path())
    }

    /// `tool.poetry.dependencies`
    pub fn dependencies(&self) -> Option<&Table> {
        self.section(DependencySection::Runtime)
    }

    /// `tool.poetry.dev-dependencies`
    pub fn dev_dependencies(&self) -> Option<&Table> {
        self.section(DependencySection::Dev)
    }

    /// `<product>.thirdparty`
    pub fn thirdparty(&self, product: &str) -> Option<&Table> {
        self.get_table(&[product, THIRDPARTY_KEY])
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&self.root)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl From<Table> for Document {
    fn from(root: Table) -> Self {
        Self::new(root)
    }
}

impl FromStr for Document {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Table>().map(Self::new)
    }
}
