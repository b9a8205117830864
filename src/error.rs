//! Custom error types for configuration loading.
//!
//! This module defines the primary error type, `ConfigError`, covering every
//! way a configuration document can be rejected. Using the `thiserror` crate,
//! it provides a centralized and consistent way to surface the three loading
//! stages to the caller:
//!
//! - **`Io`** / **`Parse`**: the file could not be read, or the text is not
//!   well-formed YAML. Nothing else can be checked, so these fail fast.
//! - **`Schema`**: the YAML is well-formed but does not match the document
//!   schema (missing section, non-mapping section value, module entry without
//!   `module.Class`, unrecognized entry key). Every violation found in the
//!   document is collected before failing.
//! - **`Reference`**: the schema holds but one or more `connect` values name
//!   a module no registry declares. All dangling targets are collected.
//! - **`Cycle`**: the `connect` graph is circular, so no instantiation order
//!   exists for the consuming loader.
//!
//! None of these are recoverable by this crate; the caller is expected to
//! abort startup with the rendered message rather than proceed with a
//! partially valid module graph.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ModuleCategory;

/// Convenience alias for results using the crate error type.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Any failure while loading or validating a configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document text is not well-formed YAML.
    #[error("malformed YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document does not match the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// One or more `connect` targets resolve to no declared module.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// The `connect` graph is circular.
    #[error("circular module dependency: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// A structural problem at a specific location in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted path to the offending key (e.g. `gui.spectrometer`).
    pub path: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl SchemaViolation {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Schema check failure carrying every violation found in the document.
#[derive(Debug)]
pub struct SchemaError {
    /// All violations, in document order.
    pub violations: Vec<SchemaViolation>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schema check failed with {} violation(s)",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// A `connect` value naming a module that no registry declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingConnect {
    /// Registry of the module holding the bad `connect` entry.
    pub category: ModuleCategory,
    /// Name of the module holding the bad `connect` entry.
    pub module: String,
    /// Local role name under `connect`.
    pub role: String,
    /// The unresolved target module name.
    pub target: String,
}

impl fmt::Display for DanglingConnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: connect role `{}` references unknown module `{}`",
            self.category, self.module, self.role, self.target
        )
    }
}

/// Reference resolution failure carrying every dangling `connect` target.
#[derive(Debug)]
pub struct ReferenceError {
    /// All dangling targets, sorted by module then role.
    pub dangling: Vec<DanglingConnect>,
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "connect resolution failed with {} dangling reference(s)",
            self.dangling.len()
        )?;
        for dangling in &self.dangling {
            write!(f, "\n  - {dangling}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ReferenceError {}
