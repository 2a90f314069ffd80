//! Package export-map resolution.
//!
//! A package request (`pkg`, `pkg/sub`, `@scope/pkg/sub`) is classified,
//! the package manifest is located (even when its export map hides
//! `package.json`), the `exports` field is evaluated for the requested
//! subpath, and the rewritten request is handed to a default resolver.

mod classify;
mod exports;
mod fallback;
mod host;
mod locate;
mod manifest;
mod rewrite;

pub use classify::{
    classify, Classification, PackageRequest, PassThroughReason, DEFAULT_RESERVED_PREFIXES,
};
pub use exports::{
    ExportMatch, ExportResolver, DEFAULT_CONDITION_PRIORITY, DEFAULT_MAX_CONDITION_DEPTH,
};
pub use fallback::{
    probe_file, FsResolver, ResolveReasonCode, ResolveResult, ResolveStatus, DEFAULT_EXTENSIONS,
};
pub use host::{
    read_manifest, read_manifest_if_exists, LookupError, NodeModulesHost, PackageHost,
    MANIFEST_FILE,
};
pub use locate::{
    find_main_manifest, find_self_path, LocatedManifest, ManifestLocator, ManifestSource,
};
pub use manifest::{ConditionMap, ExportTarget, ExportsDecl, Manifest};
pub use rewrite::{
    DefaultResolver, ExportsResolver, Outcome, ResolveOptions, ResolverConfig, Rewrite,
};
