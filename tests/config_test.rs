//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run against temp project directories; a global config file on
//! the machine, if any, sits underneath the local layer.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use wbs_compare::application::ApplicationError;
use wbs_compare::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
snapshot = "/srv/bids/obra.json"

[tree]
depth = 4
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.snapshot, PathBuf::from("/srv/bids/obra.json"));
    assert_eq!(settings.tree.depth, 4);
}

#[test]
fn given_relative_snapshot_in_local_config_when_load_then_resolved_against_project_dir() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "snapshot = \"data/obra.json\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.snapshot, project.path().join("data/obra.json"));
}

#[test]
fn given_partial_display_section_when_load_then_other_fields_inherited() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "[display]\ndetail_decimals = 4\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.display.detail_decimals, 4);
    assert_eq!(settings.display.tree_decimals, 0);
}

#[test]
fn given_no_project_dir_when_load_then_succeeds() {
    let settings = Settings::load(None).expect("load settings");
    assert!(settings.snapshot.to_string_lossy().ends_with(".json"));
}

#[test]
fn given_snapshot_with_env_var_when_load_then_expanded() {
    let project = TempDir::new().unwrap();
    std::env::set_var("WBSCMP_TEST_DATA_DIR", "/data/expanded");
    fs::write(
        local_config_path(project.path()),
        "snapshot = \"$WBSCMP_TEST_DATA_DIR/snapshot.json\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.snapshot, PathBuf::from("/data/expanded/snapshot.json"));
}

#[test]
fn given_env_override_when_load_then_env_wins_over_local_file() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "[display]\ncurrency_symbol = \"BRL\"\n",
    )
    .unwrap();
    std::env::set_var("WBSCMP_DISPLAY__CURRENCY_SYMBOL", "US$");

    let settings = Settings::load(Some(project.path())).expect("load settings");
    std::env::remove_var("WBSCMP_DISPLAY__CURRENCY_SYMBOL");

    assert_eq!(settings.display.currency_symbol, "US$");
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "[tree\ndepth = ").unwrap();

    let result = Settings::load(Some(project.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_when_written_as_local_config_then_loads_defaults() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.tree.depth, 2);
    assert!(!settings.tree.show_empty);
}
