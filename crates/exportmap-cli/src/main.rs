#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use exportmap_core::Config;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "exportmap")]
#[command(author, version, about = "Rewrite package requests through package.json \"exports\"", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Split a request into package name and subpath
    Classify {
        /// The request, e.g. `@scope/pkg/sub`
        request: String,
    },

    /// Show what a request is rewritten to
    Rewrite {
        /// The request, e.g. `pkg/feature`
        request: String,

        #[command(flatten)]
        args: commands::ResolveArgs,
    },

    /// Rewrite a request and resolve the result on disk
    Resolve {
        /// The request, e.g. `pkg/feature`
        request: String,

        #[command(flatten)]
        args: commands::ResolveArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Relative `--cwd` values are anchored to the process directory
    let cwd = cli.cwd.as_deref().map_or_else(
        || std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        exportmap_util::path::absolutize,
    );

    logging::init(cli.verbose, cli.json);

    let mut config = Config::from_env()
        .with_cwd(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json)
        .load()
        .into_diagnostic()?;
    if config.verbosity > 0 {
        config = config.with_verbose_diagnostics(true);
    }

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Classify { request }) => {
            let span = tracing::info_span!("classify", cmd = "classify", request = %request);
            let _guard = span.enter();
            commands::classify::run(&config, &request, cli.json)
        }
        Some(Commands::Rewrite { request, args }) => {
            let span = tracing::info_span!("rewrite", cmd = "rewrite", request = %request);
            let _guard = span.enter();
            commands::rewrite::run(&config, &request, &args, cli.json)
        }
        Some(Commands::Resolve { request, args }) => {
            let span = tracing::info_span!("resolve", cmd = "resolve", request = %request);
            let _guard = span.enter();
            let resolved = commands::resolve::run(&config, &request, &args, cli.json)?;
            if !resolved {
                std::process::exit(2);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_conditions_repeatable_and_comma_separated() {
        let cli = Cli::parse_from([
            "exportmap",
            "rewrite",
            "pkg/sub",
            "--condition",
            "node,require",
            "--condition",
            "default",
        ]);
        let Some(Commands::Rewrite { args, .. }) = cli.command else {
            panic!("expected rewrite");
        };
        assert_eq!(args.conditions, vec!["node", "require", "default"]);
    }

    #[test]
    fn test_default_conditions() {
        let cli = Cli::parse_from(["exportmap", "resolve", "pkg"]);
        let Some(Commands::Resolve { args, .. }) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.conditions, vec!["node", "require"]);
        assert!(!args.no_conditions);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["exportmap", "classify", "pkg", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
