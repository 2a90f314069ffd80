//! Manifest location.
//!
//! Finds a package's `package.json` even when the package's export map does
//! not expose it, and detects packages that request themselves by name.

use super::host::{read_manifest_if_exists, LookupError, PackageHost, MANIFEST_FILE};
use super::manifest::Manifest;
use crate::diagnostics::Diagnostics;
use std::path::{Path, PathBuf};

const MANIFEST_UNAVAILABLE: &str = "Could not retrieve package.json neither through require \
     (package.json itself is not within \"exports\" field), nor through require.resolve \
     (package.json does not specify \"main\" field) - falling back to default resolver logic";

/// How a manifest was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Loaded as `<package>/package.json` through the host.
    Direct,
    /// Found by walking up from the package's main entry.
    MainEntry(PathBuf),
    /// Read from `<base>/../<package>/package.json`.
    Sibling(PathBuf),
}

impl ManifestSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::MainEntry(_) => "main_entry",
            Self::Sibling(_) => "sibling",
        }
    }
}

/// A manifest plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedManifest {
    pub manifest: Manifest,
    pub source: ManifestSource,
}

/// Locates package manifests through a [`PackageHost`].
pub struct ManifestLocator<'a, H: ?Sized> {
    host: &'a H,
    base_dir: &'a Path,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a, H: PackageHost + ?Sized> ManifestLocator<'a, H> {
    pub fn new(host: &'a H, base_dir: &'a Path, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            host,
            base_dir,
            diagnostics,
        }
    }

    /// Find the manifest for `package`, trying in order:
    /// 1. `<package>/package.json` through the host
    /// 2. on a not-exported failure, walking up from the package main entry
    /// 3. `<base>/../<package>/package.json` on disk
    ///
    /// Unexpected failures are reported and end the search.
    pub fn locate(&self, package: &str) -> Option<LocatedManifest> {
        match self.host.require_manifest(package) {
            Ok(manifest) => {
                return Some(LocatedManifest {
                    manifest,
                    source: ManifestSource::Direct,
                })
            }
            Err(e) if e.is_not_exported() => {}
            Err(e) => {
                self.diagnostics
                    .error(&format!("Unexpected error while requiring {package}: {e}"));
                return None;
            }
        }

        match self.host.resolve_main(package) {
            Ok(entry) => match find_main_manifest(&entry, package) {
                Ok(Some((path, manifest))) => {
                    return Some(LocatedManifest {
                        manifest,
                        source: ManifestSource::MainEntry(path),
                    })
                }
                Ok(None) => {}
                Err(e) => {
                    self.report_resolve_error(package, &e);
                    return None;
                }
            },
            Err(e) if e.is_not_exported() => {}
            Err(e) => {
                self.report_resolve_error(package, &e);
                return None;
            }
        }

        let sibling = self
            .base_dir
            .parent()
            .unwrap_or(self.base_dir)
            .join(package)
            .join(MANIFEST_FILE);
        match read_manifest_if_exists(&sibling) {
            Ok(Some(manifest)) => {
                return Some(LocatedManifest {
                    manifest,
                    source: ManifestSource::Sibling(sibling),
                })
            }
            Ok(None) => {}
            Err(e) => {
                self.diagnostics.error(&e.to_string());
                return None;
            }
        }

        self.diagnostics.warn(MANIFEST_UNAVAILABLE);
        None
    }

    fn report_resolve_error(&self, package: &str, error: &LookupError) {
        self.diagnostics.log(&format!(
            "Unexpected error while performing require.resolve({package}):"
        ));
        self.diagnostics.error(&error.to_string());
    }
}

/// Walk up from a package's entry file to the package's own manifest.
///
/// The package directory is the nearest ancestor whose trailing components
/// spell the package name (or, for a package rebound to a local directory,
/// that directory itself). Returns `Ok(None)` when no ancestor qualifies or
/// it has no manifest.
pub fn find_main_manifest(
    entry: &Path,
    package: &str,
) -> Result<Option<(PathBuf, Manifest)>, LookupError> {
    let Some(start) = entry.parent() else {
        return Ok(None);
    };

    let local = Path::new(package);
    let Some(dir) = start.ancestors().find(|dir| {
        if local.is_absolute() {
            *dir == local
        } else {
            exportmap_util::path::ends_with_segments(dir, package)
        }
    }) else {
        return Ok(None);
    };

    let path = dir.join(MANIFEST_FILE);
    Ok(read_manifest_if_exists(&path)?.map(|manifest| (path, manifest)))
}

/// Find the local directory of a package requesting itself.
///
/// Walks from `base_dir` to the filesystem root and returns the first
/// directory whose manifest declares `name == package`. Unreadable or
/// invalid manifests along the way are skipped.
#[must_use]
pub fn find_self_path(base_dir: &Path, package: &str) -> Option<PathBuf> {
    base_dir
        .ancestors()
        .find(|dir| {
            matches!(
                read_manifest_if_exists(&dir.join(MANIFEST_FILE)),
                Ok(Some(Manifest { name: Some(ref name), .. })) if name == package
            )
        })
        .map(Path::to_path_buf)
}
