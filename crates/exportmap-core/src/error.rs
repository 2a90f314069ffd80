use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading exportmap configuration.
///
/// Lookup failures during resolution are [`crate::resolver::LookupError`]s
/// and are reported through diagnostics rather than returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
