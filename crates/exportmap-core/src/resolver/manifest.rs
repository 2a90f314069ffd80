//! Package manifest model.
//!
//! The `exports` field is classified once when the manifest is parsed, so
//! the resolver matches on a closed set of shapes instead of re-inspecting
//! JSON values on every request.

use serde_json::Value;

/// The parts of a `package.json` the resolver cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Declared package name.
    pub name: Option<String>,
    /// Classified `exports` field. `None` when the field is missing or `null`.
    pub exports: Option<ExportsDecl>,
    /// Legacy `main` entry.
    pub main: Option<String>,
    /// Module type (`"module"` or `"commonjs"`). Informational only.
    pub module_type: Option<String>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(&value))
    }

    /// Build a manifest from an already parsed JSON document.
    ///
    /// Fields with an unexpected type are treated as missing.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let string_field = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);

        Self {
            name: string_field("name"),
            exports: value.get("exports").and_then(ExportsDecl::from_value),
            main: string_field("main"),
            module_type: string_field("type"),
        }
    }
}

/// Shape of a package's `exports` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportsDecl {
    /// `"exports": "./index.js"`: the whole package maps to one file.
    Single(String),
    /// `"exports": { ".": ..., "./feature": ..., "./utils/*": ... }`.
    ///
    /// Entries keep their declaration order.
    SubpathMap(Vec<(String, ExportTarget)>),
    /// Anything else: root condition sugar, arrays, numbers, booleans.
    Unusable,
}

impl ExportsDecl {
    /// Classify a raw `exports` value. Returns `None` for `null`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Single(s.clone())),
            Value::Object(obj) if obj.keys().all(|k| k.starts_with('.')) => Some(Self::SubpathMap(
                obj.iter()
                    .map(|(k, v)| (k.clone(), ExportTarget::from_value(v)))
                    .collect(),
            )),
            _ => Some(Self::Unusable),
        }
    }

    /// Whether `subpath` is reachable through this declaration.
    ///
    /// Used by the package lookup to decide if a request such as
    /// `pkg/package.json` is allowed. Condition objects count as exposed
    /// regardless of which conditions are active.
    #[must_use]
    pub fn exposes(&self, subpath: &str) -> bool {
        match self {
            Self::Single(_) | Self::Unusable => subpath == ".",
            Self::SubpathMap(entries) => super::exports::match_subpath(entries, subpath)
                .is_some_and(|m| !matches!(m.value, ExportTarget::Unsupported)),
        }
    }
}

/// Value side of an exports entry or a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// A target path, normally starting with `./`.
    Path(String),
    /// A condition object such as `{ "node": ..., "default": ... }`.
    Conditions(ConditionMap),
    /// `null`, arrays and scalars. Never selected.
    Unsupported,
}

impl ExportTarget {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Path(s.clone()),
            Value::Object(obj) => Self::Conditions(ConditionMap(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Self::from_value(v)))
                    .collect(),
            )),
            _ => Self::Unsupported,
        }
    }
}

/// Ordered condition name to target mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionMap(pub Vec<(String, ExportTarget)>);

impl ConditionMap {
    /// Look up a condition by name.
    #[must_use]
    pub fn get(&self, condition: &str) -> Option<&ExportTarget> {
        self.0
            .iter()
            .find(|(name, _)| name == condition)
            .map(|(_, target)| target)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
