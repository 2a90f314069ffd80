pub mod classify;
pub mod resolve;
pub mod rewrite;
pub mod version;

use exportmap_core::{Config, ExportsResolver};
use std::path::PathBuf;

/// Options shared by `rewrite` and `resolve`.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Export conditions of the requesting environment (repeatable, comma
    /// separated). Condition objects are evaluated only when some are given;
    /// the branch taken follows the configured condition priority
    #[arg(
        long = "condition",
        value_name = "NAME",
        value_delimiter = ',',
        default_values = ["node", "require"]
    )]
    pub conditions: Vec<String>,

    /// Pass no conditions at all; condition objects in "exports" are then skipped
    #[arg(long, conflicts_with = "conditions")]
    pub no_conditions: bool,

    /// Directory self-references and the sibling manifest lookup start from
    /// (defaults to the config file's `baseDir`, then the working directory)
    #[arg(long, value_name = "PATH")]
    pub base_dir: Option<PathBuf>,

    /// Directory of the requesting module (defaults to the working directory)
    #[arg(long, value_name = "PATH")]
    pub basedir: Option<PathBuf>,
}

impl ResolveArgs {
    /// Conditions to hand to the resolver.
    pub fn conditions(&self) -> Option<&[String]> {
        if self.no_conditions || self.conditions.is_empty() {
            None
        } else {
            Some(self.conditions.as_slice())
        }
    }

    /// Directory of the requesting module.
    pub fn basedir(&self, config: &Config) -> PathBuf {
        self.basedir
            .as_ref()
            .map_or_else(|| config.cwd.clone(), |dir| config.cwd.join(dir))
    }

    /// Build the exports resolver for these options.
    pub fn exports_resolver(&self, config: &Config) -> ExportsResolver {
        let mut resolver_config = config.resolver_config();
        if let Some(dir) = &self.base_dir {
            resolver_config.base_dir = config.cwd.join(dir);
        }
        tracing::debug!(
            base_dir = %resolver_config.base_dir.display(),
            conditions = ?self.conditions(),
            "building exports resolver"
        );
        ExportsResolver::new(resolver_config).with_boxed_diagnostics(config.diagnostics())
    }
}
