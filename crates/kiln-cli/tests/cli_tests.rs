//! End-to-end tests for the `kiln` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `kiln` command isolated from the user's config and environment.
fn kiln(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// `repo/App` and `repo/Lib`, each with one annotated type.
fn source_tree(temp: &TempDir) -> std::path::PathBuf {
    let root = temp.path().join("repo");
    for (project, ty) in [("App", "Order"), ("Lib", "Invoice")] {
        let dir = root.join(project);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("kiln.symbols.json"),
            format!(r#"{{ "types": [{{ "name": "{ty}", "attributes": ["Gen"] }}] }}"#),
        )
        .unwrap();
    }
    root
}

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_arguments_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path()).assert().code(2);
}

#[test]
fn generate_writes_per_project_files() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);

    kiln(temp.path())
        .arg("generate")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let app = fs::read_to_string(root.join("App/Generated/Generated.cs")).unwrap();
    assert!(app.contains("namespace App.Generated"));
    assert!(app.contains("\"Order\", // Gen"));

    let lib = fs::read_to_string(root.join("Lib/Generated/Generated.cs")).unwrap();
    assert!(lib.contains("\"Invoice\", // Gen"));

    let common = fs::read_to_string(root.join("Generated/Generated.cs")).unwrap();
    assert!(common.contains("IndexedAttribute"));
}

#[test]
fn generate_single_strategy_without_annotations() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);

    kiln(temp.path())
        .args(["generate", "--strategy", "single", "--no-annotations"])
        .arg(&root)
        .assert()
        .success();

    let single = fs::read_to_string(root.join("Generated/Generated.cs")).unwrap();
    assert!(single.contains("namespace App.Generated"));
    assert!(single.contains("namespace Lib.Generated"));
    assert!(!single.contains("IndexedAttribute"));
    assert!(!root.join("App/Generated").exists());
}

#[test]
fn generate_json_report() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);

    let assert = kiln(temp.path())
        .args(["--output-format", "json", "generate"])
        .arg(&root)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["strategy"], "per-project");
    assert_eq!(report["projects"], 2);
    assert_eq!(report["collected_projects"], 2);
    assert_eq!(report["administrators"][0]["name"], "tag-index");
    assert_eq!(report["administrators"][0]["state"], "done");
    assert_eq!(report["pool"]["outstanding"], 0);
    assert!(report["errors"].as_array().unwrap().is_empty());
}

#[test]
fn excluded_namespace_is_not_indexed() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("repo");
    fs::create_dir_all(root.join("App")).unwrap();
    fs::write(
        root.join("App/kiln.symbols.json"),
        r#"{
            "types": [{ "name": "Kept", "attributes": ["Gen"] }],
            "namespaces": [{ "name": "Tests", "types": [{ "name": "Dropped", "attributes": ["Gen"] }] }]
        }"#,
    )
    .unwrap();

    kiln(temp.path())
        .args(["generate", "--exclude", "Tests"])
        .arg(&root)
        .assert()
        .success();

    let app = fs::read_to_string(root.join("App/Generated/Generated.cs")).unwrap();
    assert!(app.contains("Kept"));
    assert!(!app.contains("Dropped"));
}

#[test]
fn malformed_manifest_fails_the_run_but_writes_the_rest() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);
    fs::write(root.join("Lib/kiln.symbols.json"), "{ \"types\": 7 }").unwrap();

    kiln(temp.path())
        .arg("generate")
        .arg(&root)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("component(s) failed"));

    assert!(root.join("App/Generated/Generated.cs").exists());
    assert!(!root.join("Lib/Generated").exists());
}

#[test]
fn unknown_plugin_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);

    kiln(temp.path())
        .args(["generate", "--plugin", "nope"])
        .arg(&root)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown plugin 'nope'"))
        .stderr(predicate::str::contains("tag-index"));
}

#[test]
fn missing_root_is_not_found() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["generate", "does-not-exist"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Source tree not found"));
}

#[test]
fn clean_removes_generated_output() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);

    kiln(temp.path()).arg("generate").arg(&root).assert().success();
    assert!(root.join("App/Generated").exists());

    kiln(temp.path()).arg("clean").arg(&root).assert().success();
    assert!(!root.join("App/Generated").exists());
    assert!(!root.join("Lib/Generated").exists());
    assert!(!root.join("Generated").exists());
    assert!(root.join("App/kiln.symbols.json").exists());
}

#[test]
fn config_file_sets_defaults_and_flags_win() {
    let temp = TempDir::new().unwrap();
    let root = source_tree(&temp);
    let config = temp.path().join("kiln.toml");
    fs::write(&config, "[output]\nstrategy = \"separate\"\nextension = \"txt\"\n").unwrap();

    kiln(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "output.strategy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("separate"));

    kiln(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("generate")
        .arg(&root)
        .assert()
        .success();
    assert!(root.join("App/Generated/TagIndex.txt").exists());

    kiln(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["generate", "--strategy", "per-project"])
        .arg(&root)
        .assert()
        .success();
    assert!(root.join("App/Generated/Generated.txt").exists());
}

#[test]
fn environment_overrides_config() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .env("KILN__OUTPUT__EXTENSION", "vb")
        .args(["config", "get", "output.extension"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vb"));
}

#[test]
fn missing_config_file_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["--config", "absent.toml", "config", "list"])
        .assert()
        .code(4);
}

#[test]
fn init_local_writes_default_config() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path()).args(["init", "--local"]).assert().success();

    let written = fs::read_to_string(temp.path().join(".kiln.toml")).unwrap();
    assert!(written.contains("[discovery]"));
    assert!(written.contains("kiln.symbols.json"));
}

#[test]
fn config_path_and_completions() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml").or(predicate::str::contains(".kiln.toml")));

    kiln(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kiln"));
}

#[test]
fn release_profile_unwinds_so_plugin_panics_are_reported() {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../Cargo.toml");
    let workspace: toml::Table = fs::read_to_string(manifest).unwrap().parse().unwrap();

    let panic = workspace["profile"]["release"]
        .get("panic")
        .and_then(toml::Value::as_str)
        .unwrap_or("unwind");
    assert_eq!(panic, "unwind");
}
