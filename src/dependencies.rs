//! Dependency tracking over the `connect` wiring of a document.
//!
//! The loader that consumes a document must bring every `connect` target up
//! before its dependents, and tooling wants the reverse view: which modules
//! hang off a given target. This module provides both as a graph derived
//! from a validated [`Config`]:
//! - [`DependencyGraph::dependents`] answers "who connects to this module"
//! - [`DependencyGraph::load_order`] yields a deterministic instantiation
//!   order, hardware leaves first and GUI last, rejecting cyclic wiring.
//!
//! # Example
//!
//! ```rust
//! use labcfg::{Config, DependencyGraph};
//!
//! let config = Config::from_yaml(
//!     r#"
//!     global:
//!     gui:
//!     logic:
//!         scope_logic:
//!             module.Class: 'scope.ScopeLogic'
//!             connect:
//!                 scope: 'scope'
//!     hardware:
//!         scope:
//!             module.Class: 'scope.MockScope'
//!     "#,
//! )?;
//! let graph = DependencyGraph::from_config(&config);
//! assert_eq!(graph.load_order()?, vec!["scope", "scope_logic"]);
//! assert_eq!(graph.dependents("scope").len(), 1);
//! # Ok::<(), labcfg::ConfigError>(())
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{Config, ModuleCategory};

/// Reverse index and ordering over the declared `connect` edges.
pub struct DependencyGraph {
    /// Target module name to the set of `(dependent module, role)` pairs.
    dependents: HashMap<String, HashSet<(String, String)>>,
    /// Module name to its connect targets.
    connections: HashMap<String, Vec<String>>,
    /// Every declared module in canonical order: hardware, logic, gui,
    /// names sorted within each category.
    modules: Vec<String>,
}

impl DependencyGraph {
    /// Builds the graph from a document's `connect` declarations.
    ///
    /// A name declared in several categories contributes only its first
    /// resolution (hardware, then logic, then gui), matching
    /// [`Config::find_module`].
    pub fn from_config(config: &Config) -> Self {
        let mut graph = Self {
            dependents: HashMap::new(),
            connections: HashMap::new(),
            modules: Vec::new(),
        };
        for category in ModuleCategory::ALL {
            let mut entries: Vec<_> = config.registry(category).iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (name, entry) in entries {
                if graph.connections.contains_key(name) {
                    continue;
                }
                let mut targets: Vec<String> = entry.connect.values().cloned().collect();
                targets.sort_unstable();
                targets.dedup();
                graph.connections.insert(name.clone(), targets);
                graph.modules.push(name.clone());
                for (role, target) in &entry.connect {
                    graph
                        .dependents
                        .entry(target.clone())
                        .or_default()
                        .insert((name.clone(), role.clone()));
                }
            }
        }
        graph
    }

    /// Returns every `(module, role)` pair that connects to `target`,
    /// sorted for stable output.
    pub fn dependents(&self, target: &str) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .dependents
            .get(target)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Whether any module connects to `target`.
    pub fn is_required(&self, target: &str) -> bool {
        self.dependents
            .get(target)
            .is_some_and(|set| !set.is_empty())
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the graph holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Computes an instantiation order in which every module comes after
    /// all of its `connect` targets.
    ///
    /// Ties break toward the canonical order (hardware, logic, gui; names
    /// sorted within a category), so the result is stable for a given
    /// document. Targets no registry declares are ignored here; the
    /// reference check rejects them before a graph is normally built.
    pub fn load_order(&self) -> ConfigResult<Vec<String>> {
        let declared: HashSet<&str> = self.modules.iter().map(String::as_str).collect();
        let mut placed: HashSet<&str> = HashSet::new();
        let mut order: Vec<String> = Vec::with_capacity(self.modules.len());

        while order.len() < self.modules.len() {
            let mut advanced = false;
            for name in &self.modules {
                if placed.contains(name.as_str()) {
                    continue;
                }
                let ready = self.connections.get(name.as_str()).map_or(true, |targets| {
                    targets
                        .iter()
                        .all(|t| !declared.contains(t.as_str()) || placed.contains(t.as_str()))
                });
                if ready {
                    placed.insert(name.as_str());
                    order.push(name.clone());
                    advanced = true;
                }
            }
            if !advanced {
                return Err(ConfigError::Cycle(self.trace_cycle(&placed)));
            }
        }
        Ok(order)
    }

    // Walks unsatisfied connect targets from the first stuck module until a
    // name repeats, yielding the cycle path for the error message.
    fn trace_cycle(&self, placed: &HashSet<&str>) -> Vec<String> {
        let mut path: Vec<String> = Vec::new();
        let Some(start) = self.modules.iter().find(|m| !placed.contains(m.as_str())) else {
            return path;
        };
        let mut current = start.clone();
        loop {
            if let Some(pos) = path.iter().position(|m| *m == current) {
                let mut cycle = path.split_off(pos);
                cycle.push(current);
                return cycle;
            }
            path.push(current.clone());
            let next = self.connections.get(&current).and_then(|targets| {
                targets.iter().find(|t| {
                    !placed.contains(t.as_str()) && self.connections.contains_key(t.as_str())
                })
            });
            match next {
                Some(target) => current = target.clone(),
                // Every stuck module has an unsatisfied declared target, so
                // the walk only ends by revisiting one.
                None => return path,
            }
        }
    }
}
