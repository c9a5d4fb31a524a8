//! DuckDB platform identifiers known to the provisioner.
//!
//! The DuckDB extension CI names its build targets with identifiers such as
//! `linux_amd64` or `osx_arm64`. Only the identifiers listed in [`Platform`]
//! have an installation routine, and of those only `linux_amd64` has a
//! published client library bundle so far.

use std::fmt;

/// A platform the provisioner knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux on `x86_64`.
    LinuxAmd64,
    /// Linux on ARM64. Reserved until a bundle is published.
    LinuxArm64,
}

impl Platform {
    /// Looks up a platform by its DuckDB identifier.
    ///
    /// Matching is exact; unknown identifiers return `None`.
    #[must_use]
    pub fn parse(identifier: &str) -> Option<Self> {
        match identifier {
            "linux_amd64" => Some(Self::LinuxAmd64),
            "linux_arm64" => Some(Self::LinuxArm64),
            _ => None,
        }
    }

    /// Returns the DuckDB identifier for this platform.
    #[must_use = "returns the platform string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "linux_amd64",
            Self::LinuxArm64 => "linux_arm64",
        }
    }

    /// Returns whether an installation routine exists for this platform.
    #[must_use = "returns platform check result without side effects"]
    pub fn is_installable(self) -> bool {
        matches!(self, Self::LinuxAmd64)
    }

    /// Returns whether installation must happen inside the CI build container.
    #[must_use = "returns platform check result without side effects"]
    pub fn requires_build_container(self) -> bool {
        matches!(self, Self::LinuxAmd64)
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
    fn parse_recognizes_linux_identifiers() {
        assert_eq!(Platform::parse("linux_amd64"), Some(Platform::LinuxAmd64));
        assert_eq!(Platform::parse("linux_arm64"), Some(Platform::LinuxArm64));
    }

    #[test]
    fn parse_rejects_other_identifiers() {
        for id in ["osx_arm64", "windows_amd64", "wasm_mvp", "LINUX_AMD64", ""] {
            assert_eq!(Platform::parse(id), None, "{id}");
        }
    }

    #[test]
    fn display_matches_identifier() {
        assert_eq!(Platform::LinuxAmd64.to_string(), "linux_amd64");
        assert_eq!(Platform::LinuxArm64.to_string(), "linux_arm64");
    }

    #[test]
    fn parse_round_trips_as_str() {
        for platform in [Platform::LinuxAmd64, Platform::LinuxArm64] {
            assert_eq!(Platform::parse(platform.as_str()), Some(platform));
        }
    }

    #[test]
    fn only_linux_amd64_is_installable() {
        assert!(Platform::LinuxAmd64.is_installable());
        assert!(!Platform::LinuxArm64.is_installable());
    }

    #[test]
    fn only_linux_amd64_requires_build_container() {
        assert!(Platform::LinuxAmd64.requires_build_container());
        assert!(!Platform::LinuxArm64.requires_build_container());
    }
}
