//! Process-level checks against the `ddlsync` binary. `add`/`diff` against a
//! `connection` project only touch the registry (no network is ever
//! opened for `add`), and `diff`/`show` against `file` projects only touch
//! the filesystem, so these run without a real database.

use std::fs;
use std::path::Path;
use std::process::Command;

use ddlsync_core::{ObjectWriter, ProjectConfig, ProjectKind, ProjectsConfig, SchemaObject, Table};
use ddlsync_testkit::{engines_table, engines_table_with_volume};
use ddlsync_yaml::YamlWriter;
use tempfile::tempdir;

fn run_ddlsync(current_dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ddlsync"))
        .current_dir(current_dir)
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run ddlsync: {error}"))
}

fn write_file_project(root: &Path, name: &str, tables: Vec<Table>) {
    for table in tables {
        let object = SchemaObject::Table(table);
        let dir = root.join(name).join("tables");
        fs::create_dir_all(&dir).unwrap_or_else(|error| panic!("failed to create {}: {error}", dir.display()));
        let bytes = YamlWriter.serialize(&object).unwrap_or_else(|error| panic!("failed to serialize: {error}"));
        fs::write(dir.join(format!("{}.yml", object.name())), bytes).unwrap_or_else(|error| panic!("failed to write element: {error}"));
    }
}

fn write_config(root: &Path, project_names: &[&str]) {
    let mut config = ProjectsConfig::default();
    for name in project_names {
        let project = ProjectConfig::new(*name, "mysql5.6", ProjectKind::File).with_param("source", "unused");
        config.insert(project).unwrap_or_else(|error| panic!("failed to register {name}: {error}"));
    }
    config.save(&root.join("config.yml")).unwrap_or_else(|error| panic!("failed to save config.yml: {error}"));
}

#[test]
fn add_registers_a_connection_project_without_touching_the_network() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));

    let output = run_ddlsync(
        tempdir.path(),
        &[
            "add",
            "--name",
            "prod",
            "--engine",
            "mysql5.6",
            "--type",
            "connection",
            "host=db.internal",
            "port=3306",
            "database=app",
            "user=app",
            "password=secret",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let config = fs::read_to_string(tempdir.path().join("config.yml")).unwrap_or_else(|error| panic!("failed to read config.yml: {error}"));
    assert!(config.contains("prod"));
    assert!(config.contains("mysql5.6"));
}

#[test]
fn add_rejects_a_connection_project_missing_a_required_parameter() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));

    let output = run_ddlsync(
        tempdir.path(),
        &["add", "--name", "prod", "--engine", "mysql5.6", "--type", "connection"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "{stderr}");
    assert!(stderr.contains("required parameter"), "{stderr}");
}

#[test]
fn add_rejects_an_unknown_engine() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));

    let output = run_ddlsync(
        tempdir.path(),
        &["add", "--name", "prod", "--engine", "oracle11", "--type", "connection"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown engine"), "{stderr}");
}

#[test]
fn show_lists_registered_projects() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
    write_config(tempdir.path(), &["a", "b"]);

    let output = run_ddlsync(tempdir.path(), &["show"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('a'));
    assert!(stdout.contains('b'));
    assert!(stdout.contains("mysql5.6"));
}

#[test]
fn diff_between_two_file_projects_prints_a_colored_add_column_preview() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
    let root = tempdir.path();

    write_file_project(root, "source_project", vec![engines_table_with_volume()]);
    write_file_project(root, "target_project", vec![engines_table()]);
    write_config(root, &["source_project", "target_project"]);

    let output = run_ddlsync(root, &["diff", "--source", "source_project", "--target", "target_project"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Update table engines"), "{stdout}");
    assert!(stdout.contains("ALTER TABLE `engines` ADD COLUMN `volume` INTEGER NULL"), "{stdout}");
}

#[test]
fn diff_with_apply_rewrites_the_target_file_project() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
    let root = tempdir.path();

    write_file_project(root, "source_project", vec![engines_table_with_volume()]);
    write_file_project(root, "target_project", vec![engines_table()]);
    write_config(root, &["source_project", "target_project"]);

    let output = run_ddlsync(root, &["diff", "--source", "source_project", "--target", "target_project", "--apply"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let rewritten = fs::read_to_string(root.join("target_project/tables/engines.yml"))
        .unwrap_or_else(|error| panic!("failed to read the rewritten element: {error}"));
    assert!(rewritten.contains("volume"));
}

#[test]
fn diff_rejects_engine_mismatch() {
    let tempdir = tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
    let root = tempdir.path();

    write_file_project(root, "mysql_project", vec![engines_table()]);
    write_file_project(root, "firebird_project", vec![engines_table()]);

    let mut config = ProjectsConfig::default();
    config
        .insert(ProjectConfig::new("mysql_project", "mysql5.6", ProjectKind::File).with_param("source", "unused"))
        .unwrap();
    config
        .insert(ProjectConfig::new("firebird_project", "fb2.5", ProjectKind::File).with_param("source", "unused"))
        .unwrap();
    config.save(&root.join("config.yml")).unwrap();

    let output = run_ddlsync(root, &["diff", "--source", "mysql_project", "--target", "firebird_project"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not compatible"), "{stderr}");
}
