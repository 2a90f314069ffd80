//! Diagnostics sink for the resolver.
//!
//! Resolution never fails outright; anything worth telling a user goes
//! through a [`Diagnostics`] object handed to the resolver. The default sink
//! drops everything.

use std::cell::RefCell;
use std::rc::Rc;

/// Environment variable that turns resolver diagnostics on.
pub const VERBOSE_ENV: &str = "EXPORTMAP_VERBOSE";

/// Receives resolver diagnostics. Output never affects resolution results.
pub trait Diagnostics: std::fmt::Debug {
    fn log(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn log(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Forwards messages to `tracing` under the `exportmap` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log(&self, message: &str) {
        tracing::debug!(target: "exportmap", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "exportmap", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "exportmap", "{message}");
    }
}

/// Severity of a collected diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Log,
    Warn,
    Error,
}

impl Level {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// A single collected diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

/// Keeps messages in memory.
///
/// Clones share the same buffer, so a caller can keep one handle and give
/// another to the resolver.
#[derive(Debug, Clone, Default)]
pub struct CollectingDiagnostics {
    records: Rc<RefCell<Vec<Record>>>,
}

impl CollectingDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages collected so far.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    fn push(&self, level: Level, message: &str) {
        self.records.borrow_mut().push(Record {
            level,
            message: message.to_string(),
        });
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn log(&self, message: &str) {
        self.push(Level::Log, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// Interpret an environment toggle value.
///
/// Empty, `0`, `false`, `off` and `no` (any case) are off; anything else is on.
#[must_use]
pub fn flag_enabled(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "0"
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("no"))
}

/// Whether [`VERBOSE_ENV`] asks for diagnostics.
#[must_use]
pub fn verbose_from_env() -> bool {
    std::env::var(VERBOSE_ENV).is_ok_and(|v| flag_enabled(&v))
}
