//! Filesystem layer for the OpenPype dependency tooling
//!
//! Provides location normalization, atomic I/O and format-detected
//! configuration loading shared by the resolver and the materializer.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
