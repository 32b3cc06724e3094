//! Running the validation utility against scene directories

mod common;

use common::{build_sample_world, TestProject};
use std::process::{Command, Output};

fn validate(args: &[&std::path::Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_validate_scene"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn test_valid_scene_passes() {
    let project = TestProject::new();
    project.save(&build_sample_world());

    let output = validate(&[project.scene().as_path(), project.root()]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Scene loaded"));
    assert!(stdout.contains("Geometries: 2"));
}

#[test]
fn test_broken_descriptor_fails() {
    let project = TestProject::new();
    project.save(&build_sample_world());
    std::fs::write(project.scene().join("nodes/root.json"), "{ not json").unwrap();

    let output = validate(&[project.scene().as_path(), project.root()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("root.json"));
}

#[test]
fn test_directory_without_config_fails() {
    let project = TestProject::new();

    let output = validate(&[project.scene().as_path()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load scene"));
}
