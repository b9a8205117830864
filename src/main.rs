//! CLI entry point for the configuration tools.
//!
//! Provides command-line access to the document loader so a rig operator can
//! check a configuration before launching the framework:
//! - `validate` parses a document and reports every problem found
//! - `order` prints the module instantiation order implied by `connect`
//! - `modules` lists the declared modules by category
//!
//! # Usage
//!
//! Validate a document:
//! ```bash
//! labcfg validate config/spectrometer.cfg
//! ```
//!
//! Print the instantiation order:
//! ```bash
//! labcfg order config/spectrometer.cfg
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use labcfg::{Config, DependencyGraph, ModuleCategory};

#[derive(Parser)]
#[command(name = "labcfg")]
#[command(about = "Inspect and validate instrument-control configuration documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document and report every problem found
    Validate {
        /// Path to the .cfg document
        file: PathBuf,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the module instantiation order implied by the connect graph
    Order {
        /// Path to the .cfg document
        file: PathBuf,
    },

    /// List the declared modules by category
    Modules {
        /// Path to the .cfg document
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    labcfg::logging::init("info");
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { file, json } => validate(&file, json),
        Commands::Order { file } => order(&file),
        Commands::Modules { file } => modules(&file),
    }
}

fn validate(file: &Path, as_json: bool) -> ExitCode {
    let result = Config::load(file);
    if as_json {
        let report = match &result {
            Ok(config) => json!({
                "file": file.display().to_string(),
                "valid": true,
                "modules": config.module_count(),
            }),
            Err(err) => json!({
                "file": file.display().to_string(),
                "valid": false,
                "error": err.to_string(),
            }),
        };
        println!("{report:#}");
        return if result.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }
    match result {
        Ok(config) => {
            println!(
                "{}: OK ({} modules: {} hardware, {} logic, {} gui)",
                file.display(),
                config.module_count(),
                config.hardware.len(),
                config.logic.len(),
                config.gui.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {err}", file.display());
            ExitCode::FAILURE
        }
    }
}

fn order(file: &Path) -> ExitCode {
    let order = Config::load(file).and_then(|config| DependencyGraph::from_config(&config).load_order());
    match order {
        Ok(order) => {
            for (position, name) in order.iter().enumerate() {
                println!("{:>3}. {name}", position + 1);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {err}", file.display());
            ExitCode::FAILURE
        }
    }
}

fn modules(file: &Path) -> ExitCode {
    match Config::load(file) {
        Ok(config) => {
            for category in ModuleCategory::ALL {
                let registry = config.registry(category);
                println!("[{category}]");
                let mut names: Vec<&str> = registry.names().collect();
                names.sort_unstable();
                for name in names {
                    if let Some(entry) = registry.get(name) {
                        println!("  {name}  ({})", entry.module_class);
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {err}", file.display());
            ExitCode::FAILURE
        }
    }
}
