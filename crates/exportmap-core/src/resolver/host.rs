//! Host package lookup.
//!
//! Models the host runtime's own package loading: loading
//! `<package>/package.json` the way `require` would (so a package's export
//! map can refuse it), and resolving a package's main entry the way
//! `require.resolve` would. [`NodeModulesHost`] implements both on top of
//! `node_modules` directories.

use super::exports::ExportResolver;
use super::fallback::probe_file;
use super::manifest::Manifest;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// Conditions used when resolving a package's main entry.
const MAIN_CONDITIONS: &[&str] = &["node", "require"];

/// Errors from the host package lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Cannot find module '{request}' from {}", from.display())]
    NotFound { request: String, from: PathBuf },

    #[error("Package subpath '{subpath}' is not defined by \"exports\" in {}", manifest.display())]
    PathNotExported { subpath: String, manifest: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LookupError {
    /// The manifest exists but its export map hides the requested subpath.
    #[must_use]
    pub fn is_not_exported(&self) -> bool {
        matches!(self, Self::PathNotExported { .. })
    }
}

/// The host's package loading primitives.
pub trait PackageHost {
    /// Load `<package>/package.json`, honouring the package's export map.
    fn require_manifest(&self, package: &str) -> Result<Manifest, LookupError>;

    /// Resolve the package's main entry file.
    fn resolve_main(&self, package: &str) -> Result<PathBuf, LookupError>;
}

impl<H: PackageHost + ?Sized> PackageHost for &H {
    fn require_manifest(&self, package: &str) -> Result<Manifest, LookupError> {
        (**self).require_manifest(package)
    }

    fn resolve_main(&self, package: &str) -> Result<PathBuf, LookupError> {
        (**self).resolve_main(package)
    }
}

/// Read and parse a manifest file directly, bypassing any export map.
pub fn read_manifest(path: &Path) -> Result<Manifest, LookupError> {
    read_manifest_if_exists(path)?.ok_or_else(|| LookupError::NotFound {
        request: path.to_string_lossy().into_owned(),
        from: path.parent().map(Path::to_path_buf).unwrap_or_default(),
    })
}

/// Like [`read_manifest`], but a missing file is `Ok(None)`.
pub fn read_manifest_if_exists(path: &Path) -> Result<Option<Manifest>, LookupError> {
    let Some(content) =
        exportmap_util::fs::read_if_exists(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?
    else {
        return Ok(None);
    };

    Manifest::parse(&content)
        .map(Some)
        .map_err(|source| LookupError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Package lookup through `node_modules` directories.
///
/// Bare package names are searched in `node_modules` of `base_dir` and each
/// of its ancestors. An absolute package path (what a self-reference is
/// rebound to) is used as the package directory directly, and like a path
/// require in Node it is not subject to the package's export map.
#[derive(Debug, Clone)]
pub struct NodeModulesHost {
    base_dir: PathBuf,
    extensions: &'static [&'static str],
    exports: ExportResolver,
}

impl NodeModulesHost {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, extensions: &'static [&'static str]) -> Self {
        Self {
            base_dir: base_dir.into(),
            extensions,
            exports: ExportResolver::default(),
        }
    }

    /// Resolve main entries through `exports` instead of the default
    /// condition priority and depth.
    #[must_use]
    pub fn with_exports(mut self, exports: ExportResolver) -> Self {
        self.exports = exports;
        self
    }

    /// Find the directory of an installed package.
    pub fn package_dir(&self, package: &str) -> Result<PathBuf, LookupError> {
        let as_path = Path::new(package);
        if as_path.is_absolute() {
            return if as_path.is_dir() {
                Ok(as_path.to_path_buf())
            } else {
                Err(self.not_found(package))
            };
        }

        self.base_dir
            .ancestors()
            // Node never looks for node_modules/node_modules
            .filter(|dir| dir.file_name().map_or(true, |name| name != "node_modules"))
            .map(|dir| dir.join("node_modules").join(package))
            .find(|candidate| candidate.is_dir())
            .ok_or_else(|| self.not_found(package))
    }

    fn not_found(&self, request: &str) -> LookupError {
        LookupError::NotFound {
            request: request.to_string(),
            from: self.base_dir.clone(),
        }
    }

    /// Resolve a target inside a package directory, probing extensions and
    /// `index` files.
    fn probe_in(&self, dir: &Path, target: &str) -> Option<PathBuf> {
        let base = dir.join(target.trim_start_matches("./"));
        probe_file(&base, self.extensions)
            .or_else(|| probe_file(&base.join("index"), self.extensions))
    }
}

impl PackageHost for NodeModulesHost {
    fn require_manifest(&self, package: &str) -> Result<Manifest, LookupError> {
        let dir = self.package_dir(package)?;
        let path = dir.join(MANIFEST_FILE);
        let manifest = read_manifest(&path)?;

        if Path::new(package).is_absolute() {
            return Ok(manifest);
        }

        if let Some(exports) = &manifest.exports {
            if !exports.exposes("./package.json") {
                return Err(LookupError::PathNotExported {
                    subpath: "./package.json".to_string(),
                    manifest: path,
                });
            }
        }

        Ok(manifest)
    }

    fn resolve_main(&self, package: &str) -> Result<PathBuf, LookupError> {
        let dir = self.package_dir(package)?;
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest = read_manifest_if_exists(&manifest_path)?.unwrap_or_default();

        if !Path::new(package).is_absolute() {
            if let Some(exports) = &manifest.exports {
                let conditions: Vec<String> =
                    MAIN_CONDITIONS.iter().map(|c| (*c).to_string()).collect();
                let export = self
                    .exports
                    .resolve(exports, ".", Some(&conditions))
                    .ok_or_else(|| LookupError::PathNotExported {
                        subpath: ".".to_string(),
                        manifest: manifest_path.clone(),
                    })?;

                return self
                    .probe_in(&dir, &export.target)
                    .ok_or_else(|| self.not_found(package));
            }
        }

        if let Some(main) = manifest.main.as_deref().filter(|m| !m.is_empty()) {
            if let Some(found) = self.probe_in(&dir, main) {
                return Ok(found);
            }
        }

        probe_file(&dir.join("index"), self.extensions).ok_or_else(|| self.not_found(package))
    }
}
