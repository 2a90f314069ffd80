//! `exportmap rewrite` command implementation.

use super::ResolveArgs;
use exportmap_core::resolver::{ManifestSource, Outcome, Rewrite};
use exportmap_core::version::SCHEMA_VERSION;
use exportmap_core::Config;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// JSON view of a [`Rewrite`].
#[derive(Debug, Serialize)]
pub struct RewriteOutput {
    pub schema_version: u32,
    pub request: String,
    pub rewritten: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
}

impl RewriteOutput {
    pub fn new(request: &str, rewrite: &Rewrite) -> Self {
        let mut output = Self {
            schema_version: SCHEMA_VERSION,
            request: request.to_string(),
            rewritten: rewrite.request.clone(),
            outcome: rewrite.outcome.code(),
            reason: None,
            package: None,
            subpath: None,
            export_key: None,
            target: None,
            conditions: Vec::new(),
            self_reference: rewrite
                .self_reference
                .as_deref()
                .map(|p| p.display().to_string()),
            manifest_source: rewrite.manifest_source.as_ref().map(ManifestSource::as_str),
            manifest_path: match &rewrite.manifest_source {
                Some(ManifestSource::MainEntry(path) | ManifestSource::Sibling(path)) => {
                    Some(path.display().to_string())
                }
                Some(ManifestSource::Direct) | None => None,
            },
        };

        match &rewrite.outcome {
            Outcome::PassThrough(reason) => output.reason = Some(reason.as_str()),
            Outcome::NoManifest { package } | Outcome::NoExports { package } => {
                output.package = Some(package.clone());
            }
            Outcome::NoMatch { package, subpath } => {
                output.package = Some(package.clone());
                output.subpath = Some(subpath.clone());
            }
            Outcome::Rewritten {
                package,
                subpath,
                export,
            } => {
                output.package = Some(package.clone());
                output.subpath = Some(subpath.clone());
                output.export_key.clone_from(&export.key);
                output.target = Some(export.target.clone());
                output.conditions.clone_from(&export.conditions);
            }
        }

        output
    }
}

pub fn run(config: &Config, request: &str, args: &ResolveArgs, json: bool) -> Result<()> {
    let resolver = args.exports_resolver(config);
    let rewrite = resolver.rewrite(request, args.conditions());
    tracing::debug!(outcome = rewrite.outcome.code(), rewritten = %rewrite.request, "rewrite done");

    let output = RewriteOutput::new(request, &rewrite);
    if json {
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        return Ok(());
    }

    println!("{}", output.rewritten);
    print_details(&output);
    Ok(())
}

/// Human-readable explanation, one `key: value` per line, indented.
pub fn print_details(output: &RewriteOutput) {
    println!("  outcome: {}", output.outcome);
    let fields = [
        ("reason", output.reason.map(str::to_string)),
        ("package", output.package.clone()),
        ("subpath", output.subpath.clone()),
        ("export", output.export_key.clone()),
        ("target", output.target.clone()),
        (
            "conditions",
            (!output.conditions.is_empty()).then(|| output.conditions.join(" > ")),
        ),
        ("self", output.self_reference.clone()),
        ("manifest", output.manifest_source.map(str::to_string)),
        ("manifest path", output.manifest_path.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {label}: {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportmap_core::resolver::{ExportMatch, PassThroughReason};
    use std::path::PathBuf;

    #[test]
    fn test_output_for_rewritten() {
        let rewrite = Rewrite {
            request: "pkg/lib/feature.js".to_string(),
            outcome: Outcome::Rewritten {
                package: "pkg".to_string(),
                subpath: "./feature".to_string(),
                export: ExportMatch {
                    key: Some("./feature".to_string()),
                    target: "./lib/feature.js".to_string(),
                    conditions: vec!["node".to_string()],
                },
            },
            self_reference: None,
            manifest_source: Some(ManifestSource::Sibling(PathBuf::from(
                "/p/node_modules/pkg/package.json",
            ))),
        };

        let value = serde_json::to_value(RewriteOutput::new("pkg/feature", &rewrite)).unwrap();
        assert_eq!(value["outcome"], "rewritten");
        assert_eq!(value["rewritten"], "pkg/lib/feature.js");
        assert_eq!(value["export_key"], "./feature");
        assert_eq!(value["conditions"][0], "node");
        assert_eq!(value["manifest_source"], "sibling");
        assert!(value.get("self_reference").is_none());
    }

    #[test]
    fn test_output_for_pass_through() {
        let rewrite = Rewrite {
            request: "./x".to_string(),
            outcome: Outcome::PassThrough(PassThroughReason::Relative),
            self_reference: None,
            manifest_source: None,
        };

        let value = serde_json::to_value(RewriteOutput::new("./x", &rewrite)).unwrap();
        assert_eq!(value["outcome"], "pass_through");
        assert_eq!(value["reason"], "relative");
        assert!(value.get("conditions").is_none());
    }
}
