//! Configuration documents: the tree model, where documents come from,
//! and the structural checks they must pass before merging.
//!
//! # Example
//!
//! ```
//! use openpype_deps::config::{ConfigValidator, Document, ValidationProfile};
//!
//! let doc: Document = r#"
//! [tool.poetry.dependencies]
//! aiohttp = "3.6.*"
//!
//! [tool.poetry.dev-dependencies]
//! "#
//! .parse()
//! .unwrap();
//!
//! let validator = ConfigValidator::new("openpype");
//! assert!(validator.is_valid(&doc, ValidationProfile::Addon));
//! assert!(!validator.is_valid(&doc, ValidationProfile::Base));
//! ```

mod document;
mod source;
mod validator;

pub use document::{
    DEPENDENCIES_PATH, DEV_DEPENDENCIES_PATH, DependencySection, Document, THIRDPARTY_KEY,
    join_path,
};
pub use source::{ConfigSource, FileConfigSource, MemoryConfigSource, PYPROJECT_FILE};
pub use validator::{ConfigValidator, ValidationProfile};
