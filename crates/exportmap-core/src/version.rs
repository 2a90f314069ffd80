//! Build identity reported by `exportmap version`.

use serde::Serialize;
use std::fmt;

/// Package version, taken from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the JSON documents the CLI prints.
/// Bump this when a field is renamed or removed.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything `exportmap version` knows about the running build.
///
/// `git_hash` is only present when `EXPORTMAP_BUILD_GIT_HASH` was set while
/// compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<&'static str>,
}

impl VersionInfo {
    #[must_use]
    pub fn current() -> Self {
        Self {
            name: "exportmap",
            version: VERSION,
            schema_version: SCHEMA_VERSION,
            git_hash: option_env!("EXPORTMAP_BUILD_GIT_HASH"),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)?;
        if let Some(hash) = self.git_hash {
            write!(f, " ({hash})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_semver_triple() {
        let parts: Vec<&str> = VERSION.split(['.', '-', '+']).take(3).collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.parse::<u64>().is_ok()), "{VERSION}");
    }

    #[test]
    fn test_display_with_and_without_hash() {
        let mut info = VersionInfo {
            name: "exportmap",
            version: "1.2.3",
            schema_version: 1,
            git_hash: None,
        };
        assert_eq!(info.to_string(), "exportmap 1.2.3");

        info.git_hash = Some("abc123");
        assert_eq!(info.to_string(), "exportmap 1.2.3 (abc123)");
    }

    #[test]
    fn test_json_fields() {
        let info = VersionInfo {
            git_hash: None,
            ..VersionInfo::current()
        };
        let value = serde_json::to_value(info).unwrap();
        assert_eq!(value["name"], "exportmap");
        assert_eq!(value["version"], VERSION);
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert!(value.get("git_hash").is_none());
    }
}
