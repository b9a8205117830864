//! Typed schema for the configuration document.
//!
//! These types mirror the YAML layout of a `.cfg` document one-to-one: a
//! `global` section of flat runtime options and three module registries
//! (`gui`, `logic`, `hardware`). Module options are kept as raw YAML values;
//! interpreting them is the job of the module implementation the framework
//! instantiates, not of this crate.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// A parsed and validated configuration document.
///
/// Obtained from [`Config::load`] or [`Config::from_yaml`]; the document is
/// read once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Global runtime options.
    pub global: GlobalSettings,
    /// GUI module registry.
    pub gui: ModuleRegistry,
    /// Logic module registry.
    pub logic: ModuleRegistry,
    /// Hardware module registry.
    pub hardware: ModuleRegistry,
}

impl Config {
    /// Returns the registry for one category.
    pub fn registry(&self, category: ModuleCategory) -> &ModuleRegistry {
        match category {
            ModuleCategory::Gui => &self.gui,
            ModuleCategory::Logic => &self.logic,
            ModuleCategory::Hardware => &self.hardware,
        }
    }

    /// Looks up a module by name across all registries.
    ///
    /// Categories are searched hardware first, then logic, then gui; a name
    /// declared in several categories resolves to the first hit in that
    /// order.
    pub fn find_module(&self, name: &str) -> Option<(ModuleCategory, &ModuleEntry)> {
        ModuleCategory::ALL
            .iter()
            .find_map(|&category| self.registry(category).get(name).map(|entry| (category, entry)))
    }

    /// Iterates `(category, name, entry)` over every declared module,
    /// hardware registry first and gui last.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleCategory, &str, &ModuleEntry)> {
        ModuleCategory::ALL.iter().flat_map(move |&category| {
            self.registry(category)
                .iter()
                .map(move |(name, entry)| (category, name.as_str(), entry))
        })
    }

    /// Total number of declared modules across all registries.
    pub fn module_count(&self) -> usize {
        self.gui.len() + self.logic.len() + self.hardware.len()
    }
}

/// The registry a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleCategory {
    /// GUI panels; instantiated last.
    Gui,
    /// Logic controllers between GUI and hardware.
    Logic,
    /// Hardware drivers; the leaves of the connect graph.
    Hardware,
}

impl ModuleCategory {
    /// All categories, leaves first (hardware, logic, gui). Lookup and
    /// iteration order throughout the crate follows this.
    pub const ALL: [ModuleCategory; 3] = [
        ModuleCategory::Hardware,
        ModuleCategory::Logic,
        ModuleCategory::Gui,
    ];

    /// The top-level key of this registry in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleCategory::Gui => "gui",
            ModuleCategory::Logic => "logic",
            ModuleCategory::Hardware => "hardware",
        }
    }
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global runtime options for the framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Modules to auto-load at launch, by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub startup: Vec<String>,

    /// Server exposing the module namespace to remote clients; absent
    /// disables remote access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_modules_server: Option<RemoteModulesServer>,

    /// Port of the local namespace server.
    #[serde(default = "default_namespace_server_port")]
    pub namespace_server_port: u16,

    /// Serialize remote call arguments by value instead of by reference.
    #[serde(default)]
    pub force_remote_calls_by_value: bool,

    /// GUI appearance theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,

    /// Root directory for measurement data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_data_dir: Option<PathBuf>,

    /// Nest measurement data under daily subdirectories.
    #[serde(default = "default_daily_data_dirs")]
    pub daily_data_dirs: bool,

    /// Options this crate does not interpret, preserved for round-trips.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            startup: Vec::new(),
            remote_modules_server: None,
            namespace_server_port: default_namespace_server_port(),
            force_remote_calls_by_value: false,
            stylesheet: None,
            default_data_dir: None,
            daily_data_dirs: default_daily_data_dirs(),
            extra: HashMap::new(),
        }
    }
}

/// Endpoint settings for the remote module server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteModulesServer {
    /// Interface address to bind (hostname or IP).
    pub address: String,
    /// TCP port to listen on.
    pub port: u16,
    /// TLS certificate file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certfile: Option<PathBuf>,
    /// TLS key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyfile: Option<PathBuf>,
}

// Default value functions
fn default_namespace_server_port() -> u16 {
    18861
}

fn default_daily_data_dirs() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One module declaration within a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleEntry {
    /// Dotted path of the implementation the framework instantiates,
    /// e.g. `spectrometer.shamrock.Shamrock`.
    #[serde(rename = "module.Class")]
    pub module_class: String,

    /// Free-form configuration handed verbatim to the implementation.
    #[serde(default, skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub options: serde_yaml::Mapping,

    /// Declared dependencies: local role name to the target module's name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub connect: HashMap<String, String>,

    /// Whether remote clients may access this module.
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_remote: bool,
}

/// The modules declared for one category, keyed by unique module name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModuleRegistry(HashMap<String, ModuleEntry>);

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, entry: ModuleEntry) {
        self.0.insert(name, entry);
    }

    /// Returns the entry for `name`, if declared.
    pub fn get(&self, name: &str) -> Option<&ModuleEntry> {
        self.0.get(name)
    }

    /// Whether `name` is declared in this registry.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over `(name, entry)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModuleEntry)> {
        self.0.iter()
    }

    /// Iterates over the declared module names in unspecified order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of declared modules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the registry declares no modules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// An empty section is written as `gui:` (YAML null); treat it as an empty
// registry rather than a type mismatch.
impl<'de> Deserialize<'de> for ModuleRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Option::<HashMap<String, ModuleEntry>>::deserialize(deserializer)?;
        Ok(Self(entries.unwrap_or_default()))
    }
}
