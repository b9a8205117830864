//! Loading and validation of configuration documents.
//!
//! Loading runs in stages. The text is first parsed into a raw YAML value
//! tree; the tree is then checked against the document schema while every
//! violation is collected; finally all `connect` targets are resolved against
//! the declared module names and the connect graph is checked for cycles.
//! Later stages only run once the earlier ones have passed, so a schema
//! report never mixes with parse errors.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::dependencies::DependencyGraph;
use crate::error::{
    ConfigError, ConfigResult, DanglingConnect, ReferenceError, SchemaError, SchemaViolation,
};
use crate::schema::{Config, GlobalSettings, ModuleCategory, ModuleEntry, ModuleRegistry};
use crate::validation;

/// Top-level sections every document must carry.
const REQUIRED_SECTIONS: [&str; 4] = ["global", "gui", "logic", "hardware"];

impl Config {
    /// Loads and validates a configuration document from disk.
    ///
    /// The file is UTF-8 YAML, `.cfg` by convention.
    ///
    /// # Example
    /// ```no_run
    /// use labcfg::Config;
    ///
    /// # fn main() -> Result<(), labcfg::ConfigError> {
    /// let config = Config::load("config/spectrometer.cfg")?;
    /// println!("{} modules declared", config.module_count());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        debug!(
            "loaded {} module(s) from {}",
            config.module_count(),
            path.display()
        );
        Ok(config)
    }

    /// Parses and validates a configuration document from YAML text.
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        let config = build(&root)?;
        check_references(&config)?;
        DependencyGraph::from_config(&config).load_order()?;
        warn_advisories(&config);
        Ok(config)
    }

    /// Serializes the document back to YAML.
    ///
    /// Re-parsing the output yields an equivalent document; key order within
    /// mappings is not preserved and carries no meaning.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Schema stage: shape-checks the raw value tree and builds the typed
/// document, collecting every violation before failing.
fn build(root: &Value) -> ConfigResult<Config> {
    let Value::Mapping(map) = root else {
        return Err(SchemaError {
            violations: vec![SchemaViolation::new(".", "document root must be a mapping")],
        }
        .into());
    };

    let mut violations = Vec::new();
    let mut sections: HashMap<&str, &Value> = HashMap::new();
    for (key, value) in map {
        match key.as_str() {
            Some(name) if REQUIRED_SECTIONS.contains(&name) => {
                sections.insert(name, value);
            }
            Some(name) => {
                violations.push(SchemaViolation::new(name, "unknown top-level section"));
            }
            None => violations.push(SchemaViolation::new(".", "top-level keys must be strings")),
        }
    }
    for name in REQUIRED_SECTIONS {
        if !sections.contains_key(name) {
            violations.push(SchemaViolation::new(name, "missing required section"));
        }
    }

    let global = sections
        .get("global")
        .copied()
        .map(|value| parse_global(value, &mut violations))
        .unwrap_or_default();
    let gui = parse_registry(ModuleCategory::Gui, sections.get("gui").copied(), &mut violations);
    let logic = parse_registry(
        ModuleCategory::Logic,
        sections.get("logic").copied(),
        &mut violations,
    );
    let hardware = parse_registry(
        ModuleCategory::Hardware,
        sections.get("hardware").copied(),
        &mut violations,
    );

    if !violations.is_empty() {
        return Err(SchemaError { violations }.into());
    }
    Ok(Config {
        global,
        gui,
        logic,
        hardware,
    })
}

fn parse_global(value: &Value, violations: &mut Vec<SchemaViolation>) -> GlobalSettings {
    let global = match value {
        // An empty `global:` section takes every default.
        Value::Null => return GlobalSettings::default(),
        Value::Mapping(_) => match serde_yaml::from_value::<GlobalSettings>(value.clone()) {
            Ok(global) => global,
            Err(err) => {
                violations.push(SchemaViolation::new("global", err.to_string()));
                return GlobalSettings::default();
            }
        },
        _ => {
            violations.push(SchemaViolation::new("global", "section must be a mapping"));
            return GlobalSettings::default();
        }
    };

    if let Err(message) = validation::port_is_usable(global.namespace_server_port) {
        violations.push(SchemaViolation::new("global.namespace_server_port", message));
    }
    if let Some(server) = &global.remote_modules_server {
        if let Err(message) = validation::not_empty(&server.address) {
            violations.push(SchemaViolation::new(
                "global.remote_modules_server.address",
                message,
            ));
        }
        if let Err(message) = validation::port_is_usable(server.port) {
            violations.push(SchemaViolation::new(
                "global.remote_modules_server.port",
                message,
            ));
        }
    }
    if let Some(stylesheet) = &global.stylesheet {
        if let Err(message) = validation::not_empty(stylesheet) {
            violations.push(SchemaViolation::new("global.stylesheet", message));
        }
    }
    if let Some(dir) = &global.default_data_dir {
        if let Err(message) = validation::path_is_sane(dir) {
            violations.push(SchemaViolation::new("global.default_data_dir", message));
        }
    }
    global
}

fn parse_registry(
    category: ModuleCategory,
    section: Option<&Value>,
    violations: &mut Vec<SchemaViolation>,
) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    let map = match section {
        // A missing section is already a violation; `gui:` left empty is not.
        None | Some(Value::Null) => return registry,
        Some(Value::Mapping(map)) => map,
        Some(_) => {
            violations.push(SchemaViolation::new(
                category.as_str(),
                "section must be a mapping",
            ));
            return registry;
        }
    };

    for (key, entry_value) in map {
        let Some(name) = key.as_str() else {
            violations.push(SchemaViolation::new(
                category.as_str(),
                "module names must be strings",
            ));
            continue;
        };
        if name.is_empty() {
            violations.push(SchemaViolation::new(
                category.as_str(),
                "module names must not be empty",
            ));
            continue;
        }
        let path = format!("{category}.{name}");
        if !matches!(entry_value, Value::Mapping(_)) {
            violations.push(SchemaViolation::new(path, "module entry must be a mapping"));
            continue;
        }
        match serde_yaml::from_value::<ModuleEntry>(entry_value.clone()) {
            Ok(entry) => {
                if let Err(message) = validation::not_empty(&entry.module_class) {
                    violations.push(SchemaViolation::new(format!("{path}.module.Class"), message));
                }
                registry.insert(name.to_string(), entry);
            }
            Err(err) => violations.push(SchemaViolation::new(path, err.to_string())),
        }
    }
    registry
}

/// Reference stage: every `connect` value must name a declared module.
fn check_references(config: &Config) -> ConfigResult<()> {
    let mut dangling = Vec::new();
    for (category, name, entry) in config.modules() {
        for (role, target) in &entry.connect {
            if config.find_module(target).is_none() {
                dangling.push(DanglingConnect {
                    category,
                    module: name.to_string(),
                    role: role.clone(),
                    target: target.clone(),
                });
            }
        }
    }
    if dangling.is_empty() {
        return Ok(());
    }
    dangling.sort_by(|a, b| (&a.module, &a.role).cmp(&(&b.module, &b.role)));
    Err(ReferenceError { dangling }.into())
}

/// Conditions worth flagging that do not invalidate the document.
fn warn_advisories(config: &Config) {
    for name in &config.global.startup {
        if config.find_module(name).is_none() {
            warn!("startup module `{name}` is not declared in any registry");
        }
    }
    for key in config.global.extra.keys() {
        warn!("unrecognized global option `{key}` is passed through uninterpreted");
    }

    let mut seen: HashMap<&str, ModuleCategory> = HashMap::new();
    for (category, name, _) in config.modules() {
        match seen.entry(name) {
            Entry::Occupied(first) => {
                let first = first.get();
                warn!(
                    "module name `{name}` is declared in both {first} and {category}; \
                     connect targets resolve to {first}"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(category);
            }
        }
    }
}
