//! Tests for document parsing, schema checking, and reference resolution.

use std::fs;

use labcfg::{Config, ConfigError, ModuleCategory};

const SPECTROMETER_CFG: &str = include_str!("../config/spectrometer.cfg");

#[test]
fn well_formed_document_with_empty_sections_parses() {
    let config = Config::from_yaml(
        r#"
        global:
        gui:
        logic:
        hardware:
    "#,
    )
    .unwrap();
    assert!(config.gui.is_empty());
    assert!(config.logic.is_empty());
    assert!(config.hardware.is_empty());
    // empty global takes every default
    assert_eq!(config.global.namespace_server_port, 18861);
    assert!(config.global.daily_data_dirs);
    assert!(!config.global.force_remote_calls_by_value);
    assert!(config.global.startup.is_empty());
}

#[test]
fn example_document_parses_with_expected_content() {
    let config = Config::from_yaml(SPECTROMETER_CFG).unwrap();

    assert_eq!(config.global.namespace_server_port, 18861);
    assert!(config.global.force_remote_calls_by_value);
    assert_eq!(config.global.startup, vec!["spectrometer".to_string()]);
    assert_eq!(config.global.stylesheet.as_deref(), Some("qdark.qss"));
    let server = config.global.remote_modules_server.as_ref().unwrap();
    assert_eq!(server.address, "localhost");
    assert_eq!(server.port, 12345);

    assert_eq!(config.gui.len(), 1);
    let spectrometer = config.gui.get("spectrometer").unwrap();
    assert_eq!(
        spectrometer.connect.get("spectrometer_logic").map(String::as_str),
        Some("spectrometer_logic")
    );

    assert!(config.hardware.contains("shamrock"));
    assert!(config.hardware.contains("newton"));
    let newton = config.hardware.get("newton").unwrap();
    assert_eq!(newton.module_class, "camera.andor_camera.NewtonCamera");
    let dll_path = newton
        .options
        .get("dll_path")
        .and_then(serde_yaml::Value::as_str)
        .unwrap();
    assert!(dll_path.ends_with("atmcd64d.dll"));

    let (category, logic) = config.find_module("spectrometer_logic").unwrap();
    assert_eq!(category, ModuleCategory::Logic);
    assert_eq!(logic.connect.get("camera").map(String::as_str), Some("newton"));
}

#[test]
fn missing_module_class_is_a_schema_error() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
        logic:
            flaky:
                connect:
                    camera: 'newton'
        hardware:
            newton:
                module.Class: 'camera.Newton'
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            assert!(err
                .violations
                .iter()
                .any(|v| v.path == "logic.flaky" && v.message.contains("module.Class")));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn dangling_connect_target_is_a_reference_error() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
            spectrometer:
                module.Class: 'spectrometer.SpectrometerGui'
                connect:
                    spectrometer_logic: 'spectro_logic'
        logic:
        hardware:
    "#,
    );
    match result {
        Err(ConfigError::Reference(err)) => {
            assert_eq!(err.dangling.len(), 1);
            let dangling = &err.dangling[0];
            assert_eq!(dangling.category, ModuleCategory::Gui);
            assert_eq!(dangling.module, "spectrometer");
            assert_eq!(dangling.role, "spectrometer_logic");
            assert_eq!(dangling.target, "spectro_logic");
        }
        other => panic!("expected reference error, got {other:?}"),
    }
}

#[test]
fn cross_registry_references_resolve() {
    // gui -> logic -> hardware chain, all targets declared
    let config = Config::from_yaml(
        r#"
        global:
        gui:
            counter:
                module.Class: 'counter.CounterGui'
                connect:
                    counter_logic: 'counter_logic'
        logic:
            counter_logic:
                module.Class: 'counter_logic.CounterLogic'
                connect:
                    counter: 'nidaq'
        hardware:
            nidaq:
                module.Class: 'ni.NationalInstrumentsXSeries'
    "#,
    )
    .unwrap();
    assert_eq!(config.module_count(), 3);
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let result = Config::from_yaml("global: [unclosed\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = Config::load("/no/such/directory/rig.cfg");
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn non_mapping_section_is_a_schema_error() {
    let result = Config::from_yaml(
        r#"
        global:
        gui: 42
        logic:
        hardware:
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            assert!(err
                .violations
                .iter()
                .any(|v| v.path == "gui" && v.message.contains("must be a mapping")));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn missing_required_section_is_a_schema_error() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
        logic:
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            assert!(err
                .violations
                .iter()
                .any(|v| v.path == "hardware" && v.message.contains("missing required section")));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_a_schema_error() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
        logic:
        hardware:
        hardwre:
            typo:
                module.Class: 'x.Y'
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            assert!(err
                .violations
                .iter()
                .any(|v| v.path == "hardwre" && v.message.contains("unknown top-level section")));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn inline_option_outside_options_is_a_schema_error() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
        logic:
        hardware:
            newton:
                module.Class: 'camera.Newton'
                dll_path: 'atmcd64d.dll'
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            assert!(err
                .violations
                .iter()
                .any(|v| v.path == "hardware.newton" && v.message.contains("unknown field")));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn every_violation_is_collected_before_failing() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
            broken:
                connect:
                    logic: 'absent'
        logic: []
        hardware:
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            // one violation for the classless gui entry, one for the sequence
            assert!(err.violations.len() >= 2);
            assert!(err.violations.iter().any(|v| v.path == "gui.broken"));
            assert!(err.violations.iter().any(|v| v.path == "logic"));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn zero_port_is_a_schema_error() {
    let result = Config::from_yaml(
        r#"
        global:
            namespace_server_port: 0
        gui:
        logic:
        hardware:
    "#,
    );
    match result {
        Err(ConfigError::Schema(err)) => {
            assert!(err
                .violations
                .iter()
                .any(|v| v.path == "global.namespace_server_port"));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn connect_cycle_is_rejected_at_load() {
    let result = Config::from_yaml(
        r#"
        global:
        gui:
        logic:
            scanner_logic:
                module.Class: 'scanner.ScannerLogic'
                connect:
                    optimizer: 'optimizer_logic'
            optimizer_logic:
                module.Class: 'optimizer.OptimizerLogic'
                connect:
                    scanner: 'scanner_logic'
        hardware:
    "#,
    );
    match result {
        Err(ConfigError::Cycle(path)) => {
            assert_eq!(path.first(), path.last());
            assert!(path.iter().any(|m| m == "scanner_logic"));
            assert!(path.iter().any(|m| m == "optimizer_logic"));
        }
        other => panic!("expected cycle error, got {other:?}"),
    }
}

#[test]
fn unrecognized_global_options_are_preserved() {
    let config = Config::from_yaml(
        r#"
        global:
            extension_paths: ['/opt/extensions']
        gui:
        logic:
        hardware:
    "#,
    )
    .unwrap();
    assert!(config.global.extra.contains_key("extension_paths"));
}

#[test]
fn round_trip_preserves_the_document() {
    let config = Config::from_yaml(SPECTROMETER_CFG).unwrap();
    let serialized = config.to_yaml().unwrap();
    let reparsed = Config::from_yaml(&serialized).unwrap();
    assert_eq!(config, reparsed);
}

#[test]
fn documents_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rig.cfg");
    fs::write(&path, SPECTROMETER_CFG).unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.module_count(), 4);
}
