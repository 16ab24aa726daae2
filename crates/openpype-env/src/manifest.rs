//! Rendering a `pyproject.toml` for a resolved dependency set

use crate::Result;
use openpype_deps::{DependencySection, DependencySet, ThirdpartyTool};
use toml::{Table, Value};

/// Manifest file name in both the target and the scratch directory
pub const MANIFEST_FILE: &str = "pyproject.toml";

const ENVIRONMENT_NAME: &str = "openpype-environment";

fn string(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

fn section_table(set: &DependencySet, section: DependencySection) -> Table {
    set.section(section)
        .iter()
        .map(|(name, spec)| (name.clone(), spec.to_value()))
        .collect()
}

fn tool_table(tool: &ThirdpartyTool) -> Table {
    let mut table = Table::new();
    table.insert("version".into(), string(&tool.version));
    if let Some(url) = &tool.url {
        table.insert("url".into(), string(url));
    }
    if let Some(hash) = &tool.hash {
        table.insert("hash".into(), string(hash));
    }
    table
}

/// Render the manifest installed into an environment.
///
/// Dependencies and package sources are written as resolved. The selected
/// third-party pins are recorded under `[<product>.thirdparty]` with the
/// platform blocks already flattened.
pub fn render_manifest(set: &DependencySet, product: &str) -> Result<String> {
    let mut poetry = Table::new();
    poetry.insert("name".into(), string(ENVIRONMENT_NAME));
    poetry.insert("version".into(), string("0.1.0"));
    poetry.insert(
        "description".into(),
        string(format!("Resolved {product} environment for {}", set.platform)),
    );
    poetry.insert("authors".into(), Value::Array(Vec::new()));
    poetry.insert(
        "dependencies".into(),
        Value::Table(section_table(set, DependencySection::Runtime)),
    );
    poetry.insert(
        "dev-dependencies".into(),
        Value::Table(section_table(set, DependencySection::Dev)),
    );
    if !set.sources.is_empty() {
        poetry.insert(
            "source".into(),
            Value::Array(set.sources.iter().cloned().map(Value::Table).collect()),
        );
    }

    let mut tool = Table::new();
    tool.insert("poetry".into(), Value::Table(poetry));

    let thirdparty: Table = set
        .thirdparty
        .iter()
        .map(|(name, pin)| (name.clone(), Value::Table(tool_table(pin))))
        .collect();
    let mut product_table = Table::new();
    product_table.insert("platform".into(), string(set.platform.as_str()));
    product_table.insert("thirdparty".into(), Value::Table(thirdparty));

    let mut build_system = Table::new();
    build_system.insert(
        "requires".into(),
        Value::Array(vec![string("poetry-core>=1.0.0")]),
    );
    build_system.insert("build-backend".into(), string("poetry.core.masonry.api"));

    let mut root = Table::new();
    root.insert("tool".into(), Value::Table(tool));
    root.insert(product.to_string(), Value::Table(product_table));
    root.insert("build-system".into(), Value::Table(build_system));

    Ok(toml::to_string(&root)?)
}
