//! Structural validation of configuration documents

use crate::config::document::{DEPENDENCIES_PATH, DEV_DEPENDENCIES_PATH, Document, THIRDPARTY_KEY, join_path};
use crate::{Error, Result};

/// Which set of required sections a document must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationProfile {
    /// The base configuration: both dependency tables and the
    /// third-party block.
    #[default]
    Base,
    /// An addon overlay: both dependency tables only.
    Addon,
}

/// Checks that a document has the shape required to take part in a merge.
///
/// Only structure is checked; version strings are taken as-is.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    product: String,
}

impl ConfigValidator {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
        }
    }

    /// Key paths that must resolve to tables for `profile`, in check order.
    pub fn required_paths(&self, profile: ValidationProfile) -> Vec<Vec<&str>> {
        let mut paths = vec![DEPENDENCIES_PATH.to_vec(), DEV_DEPENDENCIES_PATH.to_vec()];
        if profile == ValidationProfile::Base {
            paths.push(vec![self.product.as_str(), THIRDPARTY_KEY]);
        }
        paths
    }

    /// Validate `document`, failing with [`Error::Schema`] on the first
    /// missing key path.
    ///
    /// The reported path stops at the first absent segment, so a document
    /// without any `tool` table is reported as missing `tool`.
    pub fn validate(&self, document: &Document, profile: ValidationProfile) -> Result<()> {
        for path in self.required_paths(profile) {
            check_table_path(document, &path).map_err(|e| e.with_location(document.origin()))?;
        }
        Ok(())
    }

    pub fn is_valid(&self, document: &Document, profile: ValidationProfile) -> bool {
        self.validate(document, profile).is_ok()
    }
}

fn check_table_path(document: &Document, path: &[&str]) -> Result<()> {
    for depth in 1..=path.len() {
        let prefix = &path[..depth];
        match document.get(prefix) {
            None => return Err(Error::missing_key(join_path(prefix))),
            Some(value) if !value.is_table() => return Err(Error::not_a_table(join_path(prefix))),
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Document {
        r#"
[tool.poetry.dependencies]
aiohttp = "3.6.*"

[tool.poetry.dev-dependencies]

[openpype.thirdparty.ocioconfig]
version = "1.0.0"
"#
        .parse()
        .unwrap()
    }

    #[test]
    fn test_valid_base() {
        let validator = ConfigValidator::new("openpype");
        assert!(validator.validate(&base(), ValidationProfile::Base).is_ok());
    }

    #[test]
    fn test_missing_tool_names_tool() {
        let mut doc = base().with_origin("pyproject.toml");
        doc.remove(&["tool"]);

        let err = ConfigValidator::new("openpype")
            .validate(&doc, ValidationProfile::Base)
            .unwrap_err();

        assert_eq!(err.key_path(), Some("tool"));
        assert!(err.to_string().contains("pyproject.toml"), "{err}");
    }

    #[test]
    fn test_scalar_in_place_of_table() {
        let doc: Document = r#"
[tool.poetry]
dependencies = "none"
"#
        .parse()
        .unwrap();

        let err = ConfigValidator::new("openpype")
            .validate(&doc, ValidationProfile::Addon)
            .unwrap_err();

        assert_eq!(err.key_path(), Some("tool.poetry.dependencies"));
        assert!(err.to_string().contains("must be a table"));
    }

    #[test]
    fn test_addon_profile_skips_thirdparty() {
        let mut doc = base();
        doc.remove(&["openpype"]);
        let validator = ConfigValidator::new("openpype");

        assert!(validator.is_valid(&doc, ValidationProfile::Addon));
        let err = validator.validate(&doc, ValidationProfile::Base).unwrap_err();
        assert_eq!(err.key_path(), Some("openpype"));
    }
}
