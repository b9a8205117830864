//! # labcfg
//!
//! Configuration schema and loader for a modular laboratory
//! instrument-control framework. A single YAML document (`.cfg` by
//! convention) declares the global runtime options and three registries of
//! modules (gui, logic, hardware), where each module names the class to
//! instantiate, free-form options for that class, and its `connect` wiring to
//! other named modules. This crate parses that document, checks it against
//! the schema, resolves every `connect` reference, and hands the consuming
//! loader an immutable, fully validated view plus the instantiation order the
//! connect graph implies.
//!
//! The module loader itself, the dependency-injection mechanism, GUI
//! rendering, and hardware drivers live outside this crate; nothing here has
//! execution semantics of its own.
//!
//! ## Crate Structure
//!
//! - **`schema`**: The typed document model ([`Config`], [`GlobalSettings`],
//!   [`ModuleEntry`], [`ModuleRegistry`], [`ModuleCategory`]) mirroring the
//!   YAML layout one-to-one.
//! - **`error`**: The [`ConfigError`] enum covering the loading stages:
//!   I/O, YAML parsing, schema checking, and connect-reference resolution.
//! - **`dependencies`**: [`DependencyGraph`] over the `connect` edges, with
//!   reverse lookups and a deterministic instantiation order.
//! - **`validation`**: Small value-level checks used by the schema pass.
//! - **`logging`**: Tracing subscriber setup for the `labcfg` CLI.

pub mod dependencies;
pub mod error;
mod loader;
pub mod logging;
pub mod schema;
pub mod validation;

pub use dependencies::DependencyGraph;
pub use error::{ConfigError, ConfigResult};
pub use schema::{
    Config, GlobalSettings, ModuleCategory, ModuleEntry, ModuleRegistry, RemoteModulesServer,
};
