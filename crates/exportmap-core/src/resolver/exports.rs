//! Package.json exports field evaluation.
//!
//! Turns a classified [`ExportsDecl`] plus a submodule subpath into the
//! target path the package exposes for it:
//! - String exports (whole package maps to one file)
//! - Exact subpath keys (`"./feature"`)
//! - Glob keys ending in `/`, `*`, `*.js` or `*.json`
//! - Nested condition objects, walked in a fixed priority order

use super::manifest::{ConditionMap, ExportTarget, ExportsDecl};

/// Condition names tried, in order, when a condition object is reached.
pub const DEFAULT_CONDITION_PRIORITY: &[&str] = &["node", "require", "default"];

/// Maximum nesting of condition objects followed before giving up.
pub const DEFAULT_MAX_CONDITION_DEPTH: usize = 16;

/// Glob key suffixes, longest first so `*.json` wins over `*`.
const GLOB_SUFFIXES: &[(&str, Option<&str>)] = &[
    ("*.json", Some(".json")),
    ("*.js", Some(".js")),
    ("*", None),
];

/// A successful export lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMatch {
    /// Matched subpath key. `None` for string exports.
    pub key: Option<String>,
    /// Target path, always starting with `./`.
    pub target: String,
    /// Condition names followed to reach the target, outermost first.
    pub conditions: Vec<String>,
}

/// Evaluates exports declarations.
#[derive(Debug, Clone)]
pub struct ExportResolver {
    priority: Vec<String>,
    max_depth: usize,
}

impl Default for ExportResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONDITION_PRIORITY.iter().map(|s| (*s).to_string()),
            DEFAULT_MAX_CONDITION_DEPTH,
        )
    }
}

impl ExportResolver {
    /// Create a resolver with a custom condition priority list.
    pub fn new(priority: impl IntoIterator<Item = String>, max_depth: usize) -> Self {
        Self {
            priority: priority.into_iter().collect(),
            max_depth,
        }
    }

    /// Resolve `subpath` (`"."` or `"./..."`) against an exports declaration.
    ///
    /// Condition objects are only entered when `conditions` is a non-empty
    /// set; the set gates the lookup but the priority list decides which
    /// branch is taken.
    #[must_use]
    pub fn resolve(
        &self,
        decl: &ExportsDecl,
        subpath: &str,
        conditions: Option<&[String]>,
    ) -> Option<ExportMatch> {
        match decl {
            ExportsDecl::Single(target) => Some(ExportMatch {
                key: None,
                target: validate_export_path(target)?,
                conditions: Vec::new(),
            }),
            ExportsDecl::SubpathMap(entries) => {
                let matched = match_subpath(entries, subpath)?;

                let (target, trail) = match matched.value {
                    ExportTarget::Path(target) => (target.clone(), Vec::new()),
                    ExportTarget::Conditions(map) if conditions.is_some_and(|c| !c.is_empty()) => {
                        self.resolve_conditions(map)?
                    }
                    ExportTarget::Conditions(_) | ExportTarget::Unsupported => return None,
                };

                let target = match &matched.wildcard {
                    Some(wildcard) => substitute_wildcard(&target, wildcard),
                    None => target,
                };

                Some(ExportMatch {
                    key: Some(matched.key.to_string()),
                    target: validate_export_path(&target)?,
                    conditions: trail,
                })
            }
            ExportsDecl::Unusable => None,
        }
    }

    /// Walk a condition object and return the first target found, plus the
    /// condition names followed to get there.
    #[must_use]
    pub fn resolve_conditions(&self, map: &ConditionMap) -> Option<(String, Vec<String>)> {
        let mut trail = Vec::new();
        let target = self.walk_conditions(map, &mut trail)?;
        Some((target, trail))
    }

    /// Depth-first over the priority list. `trail` doubles as the visited
    /// set: a condition already on the current path is never re-entered.
    fn walk_conditions(&self, map: &ConditionMap, trail: &mut Vec<String>) -> Option<String> {
        if trail.len() >= self.max_depth {
            return None;
        }

        for condition in &self.priority {
            let Some(value) = map.get(condition) else {
                continue;
            };

            if trail.contains(condition) {
                continue;
            }

            match value {
                ExportTarget::Path(target) if !target.is_empty() => {
                    trail.push(condition.clone());
                    return Some(target.clone());
                }
                ExportTarget::Conditions(nested) => {
                    trail.push(condition.clone());
                    if let Some(target) = self.walk_conditions(nested, trail) {
                        return Some(target);
                    }
                    trail.pop();
                }
                ExportTarget::Path(_) | ExportTarget::Unsupported => {}
            }
        }

        None
    }
}

/// A subpath map entry selected for a request.
#[derive(Debug)]
pub(crate) struct SubpathMatch<'m> {
    pub key: &'m str,
    pub value: &'m ExportTarget,
    /// Portion of the subpath captured by a glob key.
    pub wildcard: Option<String>,
}

/// Find the entry serving `subpath`.
///
/// An exact key always wins. Otherwise the first glob key in declaration
/// order whose fixed prefix starts the subpath is used; there is no
/// specificity ranking between glob keys.
pub(crate) fn match_subpath<'m>(
    entries: &'m [(String, ExportTarget)],
    subpath: &str,
) -> Option<SubpathMatch<'m>> {
    if let Some((key, value)) = entries.iter().find(|(key, _)| key == subpath) {
        return Some(SubpathMatch {
            key,
            value,
            wildcard: None,
        });
    }

    entries.iter().find_map(|(key, value)| {
        let wildcard = match_glob(key, subpath)?;
        Some(SubpathMatch {
            key,
            value,
            wildcard: Some(wildcard),
        })
    })
}

/// Split a glob key into its fixed prefix and the extension that follows
/// its wildcard, if any. Returns `None` for exact keys.
fn glob_parts(key: &str) -> Option<(&str, Option<&'static str>)> {
    for (suffix, ext) in GLOB_SUFFIXES {
        if let Some(prefix) = key.strip_suffix(suffix) {
            return Some((prefix, *ext));
        }
    }

    // Folder mapping: "./lib/" exposes everything below lib.
    if key.ends_with('/') {
        return Some((key, None));
    }

    None
}

/// Match a glob key against a subpath, returning the wildcard capture.
///
/// E.g. `"./utils/*"` with `"./utils/format"` captures `"format"`, and
/// `"./utils/*.js"` with `"./utils/format.js"` captures `"format"`.
fn match_glob(key: &str, subpath: &str) -> Option<String> {
    let (prefix, ext) = glob_parts(key)?;
    let rest = subpath.strip_prefix(prefix)?;

    let capture = match ext {
        Some(ext) => rest.strip_suffix(ext).unwrap_or(rest),
        None => rest,
    };

    // Reject empty captures
    if capture.is_empty() {
        return None;
    }

    Some(capture.to_string())
}

/// Substitute a glob capture into a target.
///
/// `*` in the target is replaced and a target ending in `/` gets the capture
/// appended. Any other target is used as is.
fn substitute_wildcard(target: &str, capture: &str) -> String {
    if target.contains('*') {
        target.replace('*', capture)
    } else if target.ends_with('/') {
        format!("{target}{capture}")
    } else {
        target.to_string()
    }
}

/// Validate that an export path starts with "./" and stays inside the
/// package: no `..` segment anywhere.
fn validate_export_path(path: &str) -> Option<String> {
    if path.starts_with("./") && !path.split('/').any(|segment| segment == "..") {
        Some(path.to_string())
    } else {
        None
    }
}
