#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod resolver;
pub mod version;

pub use config::{Config, FileConfig, CONFIG_FILE};
pub use diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::Error;
pub use resolver::{
    DefaultResolver, ExportsResolver, FsResolver, Outcome, ResolveOptions, ResolveResult,
    ResolveStatus, ResolverConfig, Rewrite,
};
pub use version::VERSION;
