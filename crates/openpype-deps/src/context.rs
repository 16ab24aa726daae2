//! Explicit pipeline context
//!
//! Every stage receives the product name, the target platform and the
//! conflict policy through a [`Context`] built by the caller, usually from
//! [`Settings`](crate::Settings).

use crate::config::{ConfigValidator, ValidationProfile};
use crate::error::Error;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product table that owns the third-party block (`[openpype.thirdparty]`)
pub const DEFAULT_PRODUCT: &str = "openpype";

/// What to do when an addon redefines a pinned third-party value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Keep the base pin and report the conflict
    #[default]
    KeepBase,
    /// Fail the merge
    Reject,
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep-base" | "base" => Ok(ConflictPolicy::KeepBase),
            "reject" | "strict" => Ok(ConflictPolicy::Reject),
            _ => Err(Error::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::KeepBase => write!(f, "keep-base"),
            ConflictPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Settings shared by one merge/resolve/provision run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub product: String,
    pub platform: Platform,
    pub conflict_policy: ConflictPolicy,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            platform: Platform::current(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl Context {
    pub fn new(product: impl Into<String>, platform: Platform) -> Self {
        Self {
            product: product.into(),
            platform,
            conflict_policy: ConflictPolicy::default(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Key path of the third-party block, e.g. `["openpype", "thirdparty"]`
    pub fn thirdparty_path(&self) -> [&str; 2] {
        [self.product.as_str(), crate::config::THIRDPARTY_KEY]
    }

    pub fn validator(&self) -> ConfigValidator {
        ConfigValidator::new(self.product.clone())
    }

    pub fn validate_base(&self, document: &crate::Document) -> crate::Result<()> {
        self.validator().validate(document, ValidationProfile::Base)
    }
}
