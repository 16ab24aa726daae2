//! Operating-system families used to key third-party tool blocks

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercased operating-system family, as used in
/// `<product>.thirdparty.<tool>.<platform>` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    /// macOS, named after its kernel like Python's `platform.system()`
    Darwin,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Darwin];

    /// The platform this binary is running on.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a Rust `target_os` name onto a block family.
    ///
    /// Third-party blocks only exist for the three families, so every other
    /// OS (`freebsd`, `netbsd`, `illumos`, ...) is treated as `linux` and
    /// uses the linux builds. Pass an explicit platform through the
    /// [`Context`](crate::Context) or `--platform` to pick another block.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" | "ios" => Platform::Darwin,
            _ => Platform::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" | "win32" | "win" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "darwin" | "macos" | "osx" => Ok(Platform::Darwin),
            _ => Err(Error::InvalidPlatform {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("Windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::Darwin);
        assert!("beos".parse::<Platform>().is_err());
    }

    #[test]
    fn test_display_matches_block_names() {
        for platform in Platform::ALL {
            assert_eq!(platform.to_string(), platform.as_str());
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_other_unix_flavours_use_linux_blocks() {
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("macos"), Platform::Darwin);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        for os in ["freebsd", "netbsd", "openbsd", "illumos", "android"] {
            assert_eq!(Platform::from_os(os), Platform::Linux, "{os}");
        }
    }

    #[test]
    fn test_current_is_lowercase_family() {
        let current = Platform::current().to_string();
        assert_eq!(current, current.to_lowercase());
        if cfg!(target_os = "macos") {
            assert_eq!(Platform::current(), Platform::Darwin);
        }
    }
}
