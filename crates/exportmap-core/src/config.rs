use crate::diagnostics::{self, Diagnostics, NoopDiagnostics, TracingDiagnostics};
use crate::error::Error;
use crate::resolver::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional project config file.
pub const CONFIG_FILE: &str = "exportmap.json";

/// Runtime configuration for the exportmap CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = WARN, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Route resolver diagnostics to the log.
    pub verbose_diagnostics: bool,

    /// Settings read from [`CONFIG_FILE`].
    #[serde(default)]
    pub file: FileConfig,
}

/// Resolver settings from `exportmap.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_prefixes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_priority: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_condition_depth: Option<usize>,
}

impl FileConfig {
    /// Read a config file. A missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<Self>, Error> {
        let Some(content) =
            exportmap_util::fs::read_if_exists(path).map_err(|source| Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?
        else {
            return Ok(None);
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            verbose_diagnostics: false,
            file: FileConfig::default(),
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Default config, with diagnostics enabled by `EXPORTMAP_VERBOSE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            verbose_diagnostics: diagnostics::verbose_from_env(),
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    #[must_use]
    pub fn with_verbose_diagnostics(mut self, verbose: bool) -> Self {
        self.verbose_diagnostics = verbose;
        self
    }

    /// Merge `exportmap.json` from the working directory, if present.
    pub fn load(mut self) -> Result<Self, Error> {
        if let Some(file) = FileConfig::read(&self.cwd.join(CONFIG_FILE))? {
            self.file = file;
        }
        Ok(self)
    }

    /// Resolver settings. A relative `baseDir` is taken from the working
    /// directory; without one the working directory itself is used.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        let base_dir = match &self.file.base_dir {
            Some(dir) => self.cwd.join(dir),
            None => self.cwd.clone(),
        };

        let mut config = ResolverConfig::new(base_dir);
        if let Some(prefixes) = &self.file.reserved_prefixes {
            config.reserved_prefixes.clone_from(prefixes);
        }
        if let Some(priority) = &self.file.condition_priority {
            config.condition_priority.clone_from(priority);
        }
        if let Some(depth) = self.file.max_condition_depth {
            config.max_condition_depth = depth;
        }
        config
    }

    /// Diagnostics sink for the resolver.
    #[must_use]
    pub fn diagnostics(&self) -> Box<dyn Diagnostics> {
        if self.verbose_diagnostics {
            Box::new(TracingDiagnostics)
        } else {
            Box::new(NoopDiagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DEFAULT_CONDITION_PRIORITY, DEFAULT_RESERVED_PREFIXES};
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolver_config_defaults_to_cwd() {
        let config = Config::new(PathBuf::from("/work"));
        let resolver = config.resolver_config();
        assert_eq!(resolver.base_dir, PathBuf::from("/work"));
        assert_eq!(resolver.reserved_prefixes, DEFAULT_RESERVED_PREFIXES);
        assert_eq!(resolver.condition_priority, DEFAULT_CONDITION_PRIORITY);
    }

    #[test]
    fn test_load_file_overrides() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{
                "baseDir": "node_modules/tool",
                "reservedPrefixes": ["virtual:"],
                "conditionPriority": ["require", "default"],
                "maxConditionDepth": 4
            }"#,
        )
        .unwrap();

        let config = Config::new(dir.path().to_path_buf()).load().unwrap();
        let resolver = config.resolver_config();
        assert_eq!(resolver.base_dir, dir.path().join("node_modules/tool"));
        assert_eq!(resolver.reserved_prefixes, vec!["virtual:"]);
        assert_eq!(resolver.condition_priority, vec!["require", "default"]);
        assert_eq!(resolver.max_condition_depth, 4);
    }

    #[test]
    fn test_load_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf()).load().unwrap();
        assert_eq!(config.file, FileConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();

        let err = Config::new(dir.path().to_path_buf()).load().unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_verbosity(2)
            .with_json_logs(true)
            .with_verbose_diagnostics(true);
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
        assert!(config.verbose_diagnostics);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(diagnostics::VERBOSE_ENV, "1");
        assert!(Config::from_env().verbose_diagnostics);

        std::env::remove_var(diagnostics::VERBOSE_ENV);
        assert!(!Config::from_env().verbose_diagnostics);
    }
}
