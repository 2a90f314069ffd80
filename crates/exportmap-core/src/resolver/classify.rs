//! Request classification.
//!
//! Splits a request into package name and submodule subpath, or decides
//! the request is not a package request at all.

/// Request prefixes that never name a package.
pub const DEFAULT_RESERVED_PREFIXES: &[&str] = &["jest-sequencer"];

/// A request that names a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    /// `pkg` or `@scope/pkg`.
    pub name: String,
    /// `.` for the package root, otherwise `./` followed by the rest.
    pub subpath: String,
}

/// Why a request bypasses export handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThroughReason {
    /// Starts with `.` or `/`.
    Relative,
    /// Starts with a reserved prefix.
    Reserved,
    /// No usable package name (empty request, lone `@scope`, empty segment).
    Malformed,
}

impl PassThroughReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Reserved => "reserved",
            Self::Malformed => "malformed",
        }
    }
}

/// Result of classifying a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Package(PackageRequest),
    PassThrough(PassThroughReason),
}

/// Classify `request`.
///
/// ```
/// use exportmap_core::resolver::{classify, Classification};
///
/// let Classification::Package(req) = classify("@scope/pkg/a/b", &["jest-sequencer"]) else {
///     unreachable!()
/// };
/// assert_eq!(req.name, "@scope/pkg");
/// assert_eq!(req.subpath, "./a/b");
/// ```
#[must_use]
pub fn classify<S: AsRef<str>>(request: &str, reserved_prefixes: &[S]) -> Classification {
    if request.starts_with('.') || request.starts_with('/') {
        return Classification::PassThrough(PassThroughReason::Relative);
    }

    if reserved_prefixes
        .iter()
        .any(|prefix| request.starts_with(prefix.as_ref()))
    {
        return Classification::PassThrough(PassThroughReason::Reserved);
    }

    let segments: Vec<&str> = request.split('/').collect();
    let name_len = if request.starts_with('@') { 2 } else { 1 };

    if segments.len() < name_len || segments[..name_len].iter().any(|s| s.is_empty()) {
        return Classification::PassThrough(PassThroughReason::Malformed);
    }

    let name = segments[..name_len].join("/");
    let subpath = if segments.len() == name_len {
        ".".to_string()
    } else {
        format!("./{}", segments[name_len..].join("/"))
    };

    Classification::Package(PackageRequest { name, subpath })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(request: &str) -> PackageRequest {
        match classify(request, DEFAULT_RESERVED_PREFIXES) {
            Classification::Package(req) => req,
            other => panic!("expected package request for {request}, got {other:?}"),
        }
    }

    fn pass_through(request: &str) -> PassThroughReason {
        match classify(request, DEFAULT_RESERVED_PREFIXES) {
            Classification::PassThrough(reason) => reason,
            other => panic!("expected pass-through for {request}, got {other:?}"),
        }
    }

    #[test]
    fn test_unscoped_root() {
        let req = package("pkg");
        assert_eq!(req.name, "pkg");
        assert_eq!(req.subpath, ".");
    }

    #[test]
    fn test_unscoped_subpath() {
        let req = package("pkg/a/b");
        assert_eq!(req.name, "pkg");
        assert_eq!(req.subpath, "./a/b");
    }

    #[test]
    fn test_scoped_root() {
        let req = package("@scope/pkg");
        assert_eq!(req.name, "@scope/pkg");
        assert_eq!(req.subpath, ".");
    }

    #[test]
    fn test_scoped_subpath() {
        let req = package("@scope/pkg/a/b");
        assert_eq!(req.name, "@scope/pkg");
        assert_eq!(req.subpath, "./a/b");
    }

    #[test]
    fn test_trailing_slash_kept() {
        let req = package("pkg/");
        assert_eq!(req.subpath, "./");
    }

    #[test]
    fn test_relative_and_absolute() {
        assert_eq!(pass_through("./local"), PassThroughReason::Relative);
        assert_eq!(pass_through("../up"), PassThroughReason::Relative);
        assert_eq!(pass_through(".hidden"), PassThroughReason::Relative);
        assert_eq!(pass_through("/abs/path.js"), PassThroughReason::Relative);
    }

    #[test]
    fn test_reserved_prefix() {
        assert_eq!(pass_through("jest-sequencer"), PassThroughReason::Reserved);
        assert_eq!(
            pass_through("jest-sequencer-custom/index"),
            PassThroughReason::Reserved
        );
    }

    #[test]
    fn test_custom_reserved_prefixes() {
        let reserved = vec!["virtual:".to_string()];
        assert_eq!(
            classify("virtual:entry", reserved.as_slice()),
            Classification::PassThrough(PassThroughReason::Reserved)
        );
        assert!(matches!(
            classify("jest-sequencer", reserved.as_slice()),
            Classification::Package(_)
        ));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(pass_through("@scope"), PassThroughReason::Malformed);
        assert_eq!(pass_through("@scope/"), PassThroughReason::Malformed);
        assert_eq!(pass_through(""), PassThroughReason::Malformed);
    }
}
