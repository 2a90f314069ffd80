//! Request rewriting.
//!
//! Ties classification, manifest location and export evaluation together:
//! a package request is rewritten to the file its package exports for it,
//! and the result is handed to a default resolver.

use super::classify::{classify, Classification, PassThroughReason, DEFAULT_RESERVED_PREFIXES};
use super::exports::{
    ExportMatch, ExportResolver, DEFAULT_CONDITION_PRIORITY, DEFAULT_MAX_CONDITION_DEPTH,
};
use super::fallback::DEFAULT_EXTENSIONS;
use super::host::{NodeModulesHost, PackageHost};
use super::locate::{find_self_path, ManifestLocator, ManifestSource};
use crate::diagnostics::{Diagnostics, NoopDiagnostics};
use std::path::{Path, PathBuf};

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory self-reference detection and the sibling manifest fallback
    /// start from.
    pub base_dir: PathBuf,
    /// Request prefixes that bypass export handling.
    pub reserved_prefixes: Vec<String>,
    /// Condition names tried in condition objects, in order.
    pub condition_priority: Vec<String>,
    /// Maximum condition object nesting followed.
    pub max_condition_depth: usize,
    /// Extensions to probe (in order).
    pub extensions: &'static [&'static str],
}

impl ResolverConfig {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            condition_priority: DEFAULT_CONDITION_PRIORITY
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_condition_depth: DEFAULT_MAX_CONDITION_DEPTH,
            extensions: DEFAULT_EXTENSIONS,
        }
    }
}

impl ResolverConfig {
    /// Exports evaluator honouring the configured priority and depth.
    #[must_use]
    pub fn export_resolver(&self) -> ExportResolver {
        ExportResolver::new(
            self.condition_priority.iter().cloned(),
            self.max_condition_depth,
        )
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

/// Options for one resolution call.
#[derive(Debug)]
pub struct ResolveOptions<'a, D: ?Sized> {
    /// Resolver the (possibly rewritten) request is handed to.
    pub default_resolver: &'a D,
    /// Active export conditions, e.g. `["node", "require"]`.
    pub conditions: Option<&'a [String]>,
    /// Directory of the requesting module.
    pub basedir: &'a Path,
}

impl<D: ?Sized> Clone for ResolveOptions<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for ResolveOptions<'_, D> {}

/// The host's own resolver, invoked after rewriting.
pub trait DefaultResolver {
    type Output;

    fn resolve(&self, request: &str, options: &ResolveOptions<'_, Self>) -> Self::Output;
}

/// What the rewrite step decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a package request.
    PassThrough(PassThroughReason),
    /// No manifest could be found for the package.
    NoManifest { package: String },
    /// The manifest has no `exports` field.
    NoExports { package: String },
    /// `exports` exists but yields nothing for this subpath.
    NoMatch { package: String, subpath: String },
    /// The request was rewritten.
    Rewritten {
        package: String,
        subpath: String,
        export: ExportMatch,
    },
}

impl Outcome {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PassThrough(_) => "pass_through",
            Self::NoManifest { .. } => "no_manifest",
            Self::NoExports { .. } => "no_exports",
            Self::NoMatch { .. } => "no_match",
            Self::Rewritten { .. } => "rewritten",
        }
    }

    #[must_use]
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten { .. })
    }
}

/// Result of rewriting one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Request to hand to the default resolver.
    pub request: String,
    pub outcome: Outcome,
    /// Local directory the package name was rebound to, for self-references.
    pub self_reference: Option<PathBuf>,
    /// How the manifest was found, if it was.
    pub manifest_source: Option<ManifestSource>,
}

impl Rewrite {
    fn unchanged(request: &str, outcome: Outcome) -> Self {
        Self {
            request: request.to_string(),
            outcome,
            self_reference: None,
            manifest_source: None,
        }
    }
}

/// Rewrites package requests according to package `exports` maps.
#[derive(Debug)]
pub struct ExportsResolver<H = NodeModulesHost> {
    config: ResolverConfig,
    host: H,
    exports: ExportResolver,
    diagnostics: Box<dyn Diagnostics>,
}

impl ExportsResolver<NodeModulesHost> {
    /// Resolver looking packages up in `node_modules` from the base directory.
    #[must_use]
    pub fn new(mut config: ResolverConfig) -> Self {
        config.base_dir = exportmap_util::path::absolutize(&config.base_dir);
        let host = NodeModulesHost::new(&config.base_dir, config.extensions)
            .with_exports(config.export_resolver());
        Self::with_host(config, host)
    }
}

impl<H: PackageHost> ExportsResolver<H> {
    /// Resolver using a custom package host.
    ///
    /// A relative `base_dir` is taken from the process working directory.
    pub fn with_host(mut config: ResolverConfig, host: H) -> Self {
        config.base_dir = exportmap_util::path::absolutize(&config.base_dir);
        let exports = config.export_resolver();
        Self {
            config,
            host,
            exports,
            diagnostics: Box::new(NoopDiagnostics),
        }
    }

    /// Replace the diagnostics sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Replace the diagnostics sink with an already boxed one.
    #[must_use]
    pub fn with_boxed_diagnostics(mut self, diagnostics: Box<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Rewrite `request` to the file its package exports for it.
    ///
    /// Never fails: whenever a stage has nothing to offer, the request comes
    /// back unchanged with an [`Outcome`] saying why.
    pub fn rewrite(&self, request: &str, conditions: Option<&[String]>) -> Rewrite {
        let package_request = match classify(request, self.config.reserved_prefixes.as_slice()) {
            Classification::Package(req) => req,
            Classification::PassThrough(reason) => {
                return Rewrite::unchanged(request, Outcome::PassThrough(reason));
            }
        };

        let self_reference = find_self_path(&self.config.base_dir, &package_request.name);
        let package = self_reference
            .as_deref()
            .map_or_else(|| package_request.name.clone(), exportmap_util::path::to_slash_lossy);

        let locator =
            ManifestLocator::new(&self.host, &self.config.base_dir, self.diagnostics.as_ref());
        let located = locator.locate(&package);
        if located.is_none() {
            self.diagnostics
                .error(&format!("Failed to find package.json for {package}"));
        }

        let manifest_source = located.as_ref().map(|l| l.source.clone());
        let exports = located.and_then(|l| l.manifest.exports);

        let outcome = match exports {
            None if manifest_source.is_none() => Outcome::NoManifest {
                package: package.clone(),
            },
            None => Outcome::NoExports {
                package: package.clone(),
            },
            Some(decl) => match self
                .exports
                .resolve(&decl, &package_request.subpath, conditions)
            {
                Some(export) => Outcome::Rewritten {
                    package: package.clone(),
                    subpath: package_request.subpath.clone(),
                    export,
                },
                None => Outcome::NoMatch {
                    package: package.clone(),
                    subpath: package_request.subpath.clone(),
                },
            },
        };

        let request = match &outcome {
            Outcome::Rewritten { export, .. } => rewrite_target(&package, &export.target),
            _ => request.to_string(),
        };

        Rewrite {
            request,
            outcome,
            self_reference,
            manifest_source,
        }
    }

    /// Rewrite `request`, then hand it to the default resolver.
    ///
    /// The default resolver's output is returned as is.
    pub fn resolve<D: DefaultResolver + ?Sized>(
        &self,
        request: &str,
        options: &ResolveOptions<'_, D>,
    ) -> D::Output {
        let rewrite = self.rewrite(request, options.conditions);
        options.default_resolver.resolve(&rewrite.request, options)
    }
}

/// Replace the target's leading `./` with the package name.
fn rewrite_target(package: &str, target: &str) -> String {
    match target.strip_prefix("./") {
        Some(rest) => format!("{package}/{rest}"),
        None => format!("{package}/{target}"),
    }
}
