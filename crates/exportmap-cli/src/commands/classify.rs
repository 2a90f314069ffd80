//! `exportmap classify` command implementation.

use exportmap_core::resolver::{classify, Classification};
use exportmap_core::version::SCHEMA_VERSION;
use exportmap_core::Config;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    schema_version: u32,
    request: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subpath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

impl<'a> ClassifyOutput<'a> {
    fn new(request: &'a str, classification: Classification) -> Self {
        match classification {
            Classification::Package(req) => Self {
                schema_version: SCHEMA_VERSION,
                request,
                kind: "package",
                package: Some(req.name),
                subpath: Some(req.subpath),
                reason: None,
            },
            Classification::PassThrough(reason) => Self {
                schema_version: SCHEMA_VERSION,
                request,
                kind: "pass_through",
                package: None,
                subpath: None,
                reason: Some(reason.as_str()),
            },
        }
    }
}

pub fn run(config: &Config, request: &str, json: bool) -> Result<()> {
    let reserved = config.resolver_config().reserved_prefixes;
    let output = ClassifyOutput::new(request, classify(request, reserved.as_slice()));

    if json {
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        return Ok(());
    }

    match (&output.package, &output.subpath, output.reason) {
        (Some(package), Some(subpath), _) => {
            println!("package: {package}");
            println!("subpath: {subpath}");
        }
        (_, _, reason) => {
            println!("pass-through ({})", reason.unwrap_or("unknown"));
        }
    }
    Ok(())
}
