//! Filesystem default resolver.
//!
//! The resolver requests are handed to once export rewriting is done.
//! Supports:
//! - Relative specifiers: `./`, `../`
//! - Absolute filesystem specifiers
//! - Bare specifiers with `node_modules` lookup
//! - Extension probing
//! - Directory resolution (`package.json` main, `index.*`)
//!
//! It deliberately knows nothing about `exports`; that is handled before a
//! request gets here.

use super::host::{read_manifest_if_exists, MANIFEST_FILE};
use super::rewrite::{DefaultResolver, ResolveOptions};
use std::path::{Path, PathBuf};

/// Default extensions for probing.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".js", ".mjs", ".cjs", ".jsx", ".ts", ".tsx", ".json", ".node",
];

/// Maximum number of tried paths to record.
const MAX_TRIED_PATHS: usize = 20;

/// Resolution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    Resolved,
    Unresolved,
}

impl ResolveStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Reason codes for unresolved requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveReasonCode {
    SpecifierInvalid,
    UnsupportedScheme,
    NotFound,
    IsDirectory,
    NodeModulesNotFound,
}

impl std::fmt::Display for ResolveReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SpecifierInvalid => "SPECIFIER_INVALID",
            Self::UnsupportedScheme => "UNSUPPORTED_SCHEME",
            Self::NotFound => "NOT_FOUND",
            Self::IsDirectory => "IS_DIRECTORY",
            Self::NodeModulesNotFound => "NODE_MODULES_NOT_FOUND",
        };
        write!(f, "{s}")
    }
}

/// Resolution result.
#[derive(Debug, Clone)]
pub struct ResolveResult {
    /// Resolved absolute path (if successful).
    pub resolved: Option<PathBuf>,
    /// Status.
    pub status: ResolveStatus,
    /// Reason code if unresolved.
    pub reason: Option<ResolveReasonCode>,
    /// Candidate paths tried (capped).
    pub tried: Vec<PathBuf>,
}

impl ResolveResult {
    fn resolved(path: PathBuf, tried: Vec<PathBuf>) -> Self {
        Self {
            resolved: Some(path),
            status: ResolveStatus::Resolved,
            reason: None,
            tried,
        }
    }

    fn unresolved(reason: ResolveReasonCode, tried: Vec<PathBuf>) -> Self {
        Self {
            resolved: None,
            status: ResolveStatus::Unresolved,
            reason: Some(reason),
            tried,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status == ResolveStatus::Resolved
    }
}

/// Plain filesystem resolver used as the default resolver.
#[derive(Debug, Clone)]
pub struct FsResolver {
    extensions: &'static [&'static str],
}

impl Default for FsResolver {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl FsResolver {
    #[must_use]
    pub fn new(extensions: &'static [&'static str]) -> Self {
        Self { extensions }
    }

    /// Resolve `spec` relative to `basedir`.
    #[must_use]
    pub fn resolve_from(&self, spec: &str, basedir: &Path) -> ResolveResult {
        let mut tried = Vec::new();

        if spec.is_empty() {
            return ResolveResult::unresolved(ResolveReasonCode::SpecifierInvalid, tried);
        }

        if spec.contains("://") || spec.starts_with("node:") || spec.starts_with("data:") {
            return ResolveResult::unresolved(ResolveReasonCode::UnsupportedScheme, tried);
        }

        if is_relative(spec) {
            return self.resolve_path(&basedir.join(spec), &mut tried);
        }

        if Path::new(spec).is_absolute() {
            return self.resolve_path(Path::new(spec), &mut tried);
        }

        self.resolve_bare(spec, basedir, &mut tried)
    }

    /// Resolve a path (with extension probing and directory resolution).
    fn resolve_path(&self, base: &Path, tried: &mut Vec<PathBuf>) -> ResolveResult {
        add_tried(tried, base);
        if let Some(found) = probe_file_traced(base, self.extensions, tried) {
            return ResolveResult::resolved(found, tried.clone());
        }

        if base.is_dir() {
            return self.resolve_directory(base, tried);
        }

        ResolveResult::unresolved(ResolveReasonCode::NotFound, tried.clone())
    }

    /// Resolve a directory (package.json main > index.*).
    fn resolve_directory(&self, dir: &Path, tried: &mut Vec<PathBuf>) -> ResolveResult {
        let pkg_json_path = dir.join(MANIFEST_FILE);

        if pkg_json_path.is_file() {
            add_tried(tried, &pkg_json_path);

            if let Ok(Some(manifest)) = read_manifest_if_exists(&pkg_json_path) {
                if let Some(main) = manifest.main.as_deref().filter(|m| !m.is_empty()) {
                    let main_path = dir.join(main);
                    add_tried(tried, &main_path);

                    if let Some(found) = probe_file_traced(&main_path, self.extensions, tried) {
                        return ResolveResult::resolved(found, tried.clone());
                    }

                    let index = main_path.join("index");
                    if let Some(found) = probe_file_traced(&index, self.extensions, tried) {
                        return ResolveResult::resolved(found, tried.clone());
                    }
                }
            }
        }

        let index = dir.join("index");
        if let Some(found) = probe_file_traced(&index, self.extensions, tried) {
            return ResolveResult::resolved(found, tried.clone());
        }

        ResolveResult::unresolved(ResolveReasonCode::IsDirectory, tried.clone())
    }

    /// Resolve a bare specifier via `node_modules`.
    fn resolve_bare(&self, spec: &str, basedir: &Path, tried: &mut Vec<PathBuf>) -> ResolveResult {
        let mut found_node_modules = false;

        for dir in basedir.ancestors() {
            let node_modules = dir.join("node_modules");
            if !node_modules.is_dir() {
                continue;
            }
            found_node_modules = true;

            let result = self.resolve_path(&node_modules.join(spec), tried);
            if result.is_resolved() {
                return result;
            }
        }

        if found_node_modules {
            ResolveResult::unresolved(ResolveReasonCode::NotFound, tried.clone())
        } else {
            ResolveResult::unresolved(ResolveReasonCode::NodeModulesNotFound, tried.clone())
        }
    }
}

impl DefaultResolver for FsResolver {
    type Output = ResolveResult;

    fn resolve(&self, request: &str, options: &ResolveOptions<'_, Self>) -> ResolveResult {
        self.resolve_from(request, options.basedir)
    }
}

fn is_relative(spec: &str) -> bool {
    spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../")
}

/// Find an existing file at `base` or at `base` plus one of `extensions`.
///
/// Extensions are appended, so `lib/a.min` probes `lib/a.min.js`.
#[must_use]
pub fn probe_file(base: &Path, extensions: &[&str]) -> Option<PathBuf> {
    probe_file_traced(base, extensions, &mut Vec::new())
}

fn probe_file_traced(base: &Path, extensions: &[&str], tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
    if base.is_file() {
        return Some(canonical(base));
    }

    extensions.iter().find_map(|ext| {
        let mut candidate = base.as_os_str().to_os_string();
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        add_tried(tried, &candidate);
        candidate.is_file().then(|| canonical(&candidate))
    })
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Add a path to tried list (with cap).
fn add_tried(tried: &mut Vec<PathBuf>, path: &Path) {
    if tried.len() < MAX_TRIED_PATHS {
        tried.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn normalize_path_for_test(path: &Path) -> String {
        path.to_string_lossy().replace('\\', "/")
    }

    #[test]
    fn test_relative_file_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("foo.js"), "").unwrap();

        let result = FsResolver::default().resolve_from("./foo.js", dir.path());
        assert_eq!(result.status, ResolveStatus::Resolved);
        assert!(normalize_path_for_test(result.resolved.as_ref().unwrap()).ends_with("foo.js"));
    }

    #[test]
    fn test_relative_extension_probing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("foo.ts"), "").unwrap();

        let result = FsResolver::default().resolve_from("./foo", dir.path());
        assert!(result.is_resolved());
        assert!(normalize_path_for_test(result.resolved.as_ref().unwrap()).ends_with("foo.ts"));
    }

    #[test]
    fn test_extension_appended_not_replaced() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.min.js"), "").unwrap();

        let result = FsResolver::default().resolve_from("./a.min", dir.path());
        assert!(result.is_resolved());
    }

    #[test]
    fn test_relative_not_found() {
        let dir = tempdir().unwrap();

        let result = FsResolver::default().resolve_from("./nope", dir.path());
        assert_eq!(result.status, ResolveStatus::Unresolved);
        assert_eq!(result.reason, Some(ResolveReasonCode::NotFound));
        assert!(!result.tried.is_empty());
    }

    #[test]
    fn test_directory_index() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/index.js"), "").unwrap();

        let result = FsResolver::default().resolve_from("./lib", dir.path());
        assert!(result.is_resolved());
        assert!(normalize_path_for_test(result.resolved.as_ref().unwrap()).ends_with("lib/index.js"));
    }

    #[test]
    fn test_directory_without_entry() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let result = FsResolver::default().resolve_from("./empty", dir.path());
        assert_eq!(result.reason, Some(ResolveReasonCode::IsDirectory));
    }

    #[test]
    fn test_bare_specifier_main() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("node_modules/legacy");
        fs::create_dir_all(pkg.join("lib")).unwrap();
        fs::write(pkg.join("package.json"), r#"{"name":"legacy","main":"lib/entry"}"#).unwrap();
        fs::write(pkg.join("lib/entry.js"), "").unwrap();

        let result = FsResolver::default().resolve_from("legacy", dir.path());
        assert!(result.is_resolved());
        assert!(normalize_path_for_test(result.resolved.as_ref().unwrap()).ends_with("lib/entry.js"));
    }

    #[test]
    fn test_bare_specifier_subpath_from_nested_dir() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("node_modules/@scope/pkg");
        fs::create_dir_all(pkg.join("dist")).unwrap();
        fs::write(pkg.join("dist/feature.js"), "").unwrap();
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let result = FsResolver::default().resolve_from("@scope/pkg/dist/feature", &nested);
        assert!(result.is_resolved());
    }

    #[test]
    fn test_bare_specifier_no_node_modules() {
        let dir = tempdir().unwrap();
        let result = FsResolver::default().resolve_from("missing-pkg", dir.path());
        assert_eq!(result.status, ResolveStatus::Unresolved);
    }

    #[test]
    fn test_empty_specifier() {
        let dir = tempdir().unwrap();
        let result = FsResolver::default().resolve_from("", dir.path());
        assert_eq!(result.reason, Some(ResolveReasonCode::SpecifierInvalid));
    }

    #[test]
    fn test_node_builtin() {
        let dir = tempdir().unwrap();
        let result = FsResolver::default().resolve_from("node:fs", dir.path());
        assert_eq!(result.reason, Some(ResolveReasonCode::UnsupportedScheme));
    }

    #[test]
    fn test_reason_code_display() {
        assert_eq!(ResolveReasonCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(
            ResolveReasonCode::NodeModulesNotFound.to_string(),
            "NODE_MODULES_NOT_FOUND"
        );
    }
}
