//! `exportmap resolve` command implementation.
//!
//! Rewrites the request through `exports`, then resolves the result with
//! the filesystem resolver.

use super::ResolveArgs;
use exportmap_core::resolver::{DefaultResolver, FsResolver, ResolveOptions, ResolveResult};
use exportmap_core::version::SCHEMA_VERSION;
use exportmap_core::Config;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// Filesystem resolver that also reports the request it was given.
#[derive(Debug)]
struct ReportingResolver(FsResolver);

impl DefaultResolver for ReportingResolver {
    type Output = (String, ResolveResult);

    fn resolve(&self, request: &str, options: &ResolveOptions<'_, Self>) -> Self::Output {
        (
            request.to_string(),
            self.0.resolve_from(request, options.basedir),
        )
    }
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    schema_version: u32,
    request: String,
    rewritten: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    tried: Vec<String>,
}

impl ResolveOutput {
    fn new(request: &str, rewritten: String, result: &ResolveResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            request: request.to_string(),
            rewritten,
            status: result.status.as_str(),
            resolved: result.resolved.as_deref().map(|p| p.display().to_string()),
            reason: result.reason.as_ref().map(ToString::to_string),
            tried: result
                .tried
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}

/// Returns whether the request resolved.
pub fn run(config: &Config, request: &str, args: &ResolveArgs, json: bool) -> Result<bool> {
    let resolver = args.exports_resolver(config);
    let default_resolver = ReportingResolver(FsResolver::new(resolver.config().extensions));
    let basedir = args.basedir(config);

    let options = ResolveOptions {
        default_resolver: &default_resolver,
        conditions: args.conditions(),
        basedir: &basedir,
    };
    let (rewritten, result) = resolver.resolve(request, &options);
    tracing::debug!(status = result.status.as_str(), rewritten = %rewritten, "resolve done");

    let output = ResolveOutput::new(request, rewritten, &result);
    if json {
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        return Ok(result.is_resolved());
    }

    match &output.resolved {
        Some(path) => println!("{path}"),
        None => {
            eprintln!(
                "error: cannot resolve '{}' ({})",
                output.rewritten,
                output.reason.as_deref().unwrap_or("unknown")
            );
            for tried in &output.tried {
                eprintln!("  tried: {tried}");
            }
        }
    }

    Ok(result.is_resolved())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reporting_resolver_passes_request_through() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("local.js"), "").unwrap();

        let resolver = ReportingResolver(FsResolver::default());
        let options = ResolveOptions {
            default_resolver: &resolver,
            conditions: None,
            basedir: dir.path(),
        };
        let (request, result) = resolver.resolve("./local", &options);
        assert_eq!(request, "./local");
        assert!(result.is_resolved());

        let output = ResolveOutput::new("./local", request, &result);
        assert_eq!(output.status, "resolved");
        assert!(output.reason.is_none());
    }
}
