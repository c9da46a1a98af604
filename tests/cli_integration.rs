//! Integration tests for the sapling CLI
//!
//! These tests exercise the full CLI workflow using a temporary store.
//! They verify that commands work end-to-end without mocking.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run sapling inside `dir` with its own store
fn run_sapling(args: &[&str], dir: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sapling"))
        .args(args)
        .current_dir(dir)
        .env("SAPLING_DB_PATH", db_path(dir))
        .env("NO_COLOR", "1")
        .env_remove("SAPLING_LOG")
        .output()
        .expect("Failed to execute sapling")
}

fn db_path(dir: &Path) -> PathBuf {
    dir.join("test.db")
}

/// Helper to get stdout as string
fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Helper to get stderr as string
fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn list_json(dir: &Path) -> serde_json::Value {
    let output = run_sapling(&["list", "--all", "--json"], dir);
    assert!(output.status.success(), "list failed: {}", stderr(&output));
    serde_json::from_str(&stdout(&output)).expect("list --json is not JSON")
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_sapling"))
        .arg("--help")
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("sapling"));
    assert!(out.contains("roadmap"));
}

#[test]
fn test_version_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_sapling"))
        .arg("--version")
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    assert!(stdout(&output).contains("sapling"));
}

#[test]
fn test_completion_zsh() {
    let output = Command::new(env!("CARGO_BIN_EXE_sapling"))
        .args(["completion", "zsh"])
        .output()
        .expect("Failed to execute");

    assert!(
        output.status.success(),
        "completion zsh failed: {}",
        stderr(&output)
    );
    assert!(stdout(&output).contains("#compdef sapling"));
}

#[test]
fn test_completion_bash() {
    let output = Command::new(env!("CARGO_BIN_EXE_sapling"))
        .args(["completion", "bash"])
        .output()
        .expect("Failed to execute");

    assert!(output.status.success());
    assert!(stdout(&output).contains("_sapling"));
}

// =============================================================================
// Roadmap Commands
// =============================================================================

#[test]
fn test_list_shows_builtin_roadmap() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["list", "--all"], dir.path());
    assert!(output.status.success(), "list failed: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Half Moon Bay Retreat MVP"));
    assert!(out.contains("roadmap-6"));

    let json = list_json(dir.path());
    assert_eq!(json.as_array().unwrap().len(), 6);
}

#[test]
fn test_list_filters_by_category() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["list", "--all", "--category", "Market", "--json"], dir.path());
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let roots = json.as_array().unwrap();
    assert!(!roots.is_empty());
    assert!(roots.iter().all(|r| r["category"] == "Market"));
}

#[test]
fn test_add_root_and_child() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(
        &[
            "add",
            "--title",
            "Series A",
            "--category",
            "Finance",
            "--start",
            "2026-02-01",
            "--end",
            "2026-04-30",
            "--status",
            "in-progress",
        ],
        dir.path(),
    );
    assert!(output.status.success(), "add failed: {}", stderr(&output));
    assert!(stdout(&output).contains("Added Series A"));

    let output = run_sapling(
        &["add", "--parent", "roadmap-1", "--title", "Pick a CGM vendor", "--detail", "Libre 3"],
        dir.path(),
    );
    assert!(output.status.success(), "add child failed: {}", stderr(&output));

    let json = list_json(dir.path());
    let roots = json.as_array().unwrap();
    assert_eq!(roots.len(), 7);
    let last = &roots[6];
    assert_eq!(last["title"], "Series A");
    assert_eq!(last["status"], "in-progress");
    assert_eq!(last["startDate"], "2026-02-01");

    let child = &roots[0]["children"][0];
    assert_eq!(child["title"], "Pick a CGM vendor");
    assert_eq!(child["category"], "Product");
    assert_eq!(child["details"][0], "Libre 3");
    assert_eq!(child["startDate"], child["endDate"]);
}

#[test]
fn test_update_and_show() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(
        &["update", "roadmap-2", "--title", "Basel Showcase", "--status", "at-risk"],
        dir.path(),
    );
    assert!(output.status.success(), "update failed: {}", stderr(&output));

    let output = run_sapling(&["show", "roadmap-2", "--json"], dir.path());
    let node: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(node["title"], "Basel Showcase");
    assert_eq!(node["status"], "at-risk");
    assert_eq!(node["category"], "Product");
}

#[test]
fn test_update_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["update", "roadmap-2", "--start", "next week"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid date"));
    assert_eq!(list_json(dir.path())[1]["startDate"], "2026-01-19");
}

#[test]
fn test_delete_removes_subtree() {
    let dir = TempDir::new().unwrap();
    run_sapling(&["add", "--parent", "roadmap-3", "--title", "Clinic A"], dir.path());
    let output = run_sapling(&["delete", "roadmap-3"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("2 item(s)"));

    let json = list_json(dir.path());
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["roadmap-1", "roadmap-2", "roadmap-4", "roadmap-5", "roadmap-6"]);
}

#[test]
fn test_missing_id_is_a_warning() {
    let dir = TempDir::new().unwrap();
    for args in [
        vec!["show", "nope"],
        vec!["update", "nope", "--title", "X"],
        vec!["delete", "nope"],
        vec!["add", "--parent", "nope"],
    ] {
        let output = run_sapling(&args, dir.path());
        assert!(output.status.success(), "{:?} should exit 0", args);
        assert!(stdout(&output).contains("No item with id 'nope'"));
    }
    let output = run_sapling(&["reset"], dir.path());
    assert!(stdout(&output).contains("No saved roadmap"));
}

// =============================================================================
// Export / Import
// =============================================================================

#[test]
fn test_export_import_round_trip() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("exports");
    let output = run_sapling(&["export", "--dir", out_dir.to_str().unwrap()], dir.path());
    assert!(output.status.success(), "export failed: {}", stderr(&output));

    let file = std::fs::read_dir(&out_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let name = file.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("zoe-roadmap-") && name.ends_with(".json"));

    run_sapling(&["delete", "roadmap-1"], dir.path());
    assert_eq!(list_json(dir.path()).as_array().unwrap().len(), 5);

    let output = run_sapling(&["import", file.to_str().unwrap()], dir.path());
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert_eq!(list_json(dir.path()).as_array().unwrap().len(), 6);
}

#[test]
fn test_bad_import_leaves_store_alone() {
    let dir = TempDir::new().unwrap();
    run_sapling(&["delete", "roadmap-1"], dir.path());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"not": "a roadmap"}"#).unwrap();
    let output = run_sapling(&["import", bad.to_str().unwrap()], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to import roadmap data"));
    assert_eq!(list_json(dir.path()).as_array().unwrap().len(), 5);
}

#[test]
fn test_reset_restores_builtin() {
    let dir = TempDir::new().unwrap();
    run_sapling(&["delete", "roadmap-1"], dir.path());
    let output = run_sapling(&["reset"], dir.path());
    assert!(output.status.success());
    assert_eq!(list_json(dir.path()).as_array().unwrap().len(), 6);
}

// =============================================================================
// Check / Content / Init
// =============================================================================

#[test]
fn test_check_flags_inverted_ranges() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["check"], dir.path());
    assert!(output.status.success(), "builtin roadmap should pass: {}", stdout(&output));

    run_sapling(
        &["update", "roadmap-4", "--start", "2027-01-01", "--end", "2026-01-01"],
        dir.path(),
    );
    let output = run_sapling(&["check"], dir.path());
    assert!(!output.status.success());
    assert!(stdout(&output).contains("roadmap-4: ends before it starts"));
}

#[test]
fn test_content_override_lifecycle() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["content", "set", "values", "# Our Values"], dir.path());
    assert!(output.status.success());

    let output = run_sapling(&["content", "show", "values"], dir.path());
    assert!(stdout(&output).contains("# Our Values"));

    let output = run_sapling(&["content", "list"], dir.path());
    assert_eq!(stdout(&output).trim(), "values");

    let output = run_sapling(&["content", "reset", "values"], dir.path());
    assert!(stdout(&output).contains("Reset values"));
    let output = run_sapling(&["content", "show", "values"], dir.path());
    assert!(stdout(&output).contains("No override"));
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["init"], dir.path());
    assert!(output.status.success(), "init failed: {}", stderr(&output));
    let config = std::fs::read_to_string(dir.path().join(".sapling/config.toml")).unwrap();
    assert!(config.contains("[export]"));
    assert!(config.contains("zoe-roadmap"));
}

// =============================================================================
// Customer Segments
// =============================================================================

fn segments_json(dir: &Path) -> Vec<serde_json::Value> {
    let output = run_sapling(&["segments", "list", "--json"], dir);
    assert!(output.status.success(), "segments list failed: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    json.as_array().unwrap().clone()
}

#[test]
fn test_segments_list_shows_builtin_table() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(&["segments", "list"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("Sleep Sufferers"));

    let table = segments_json(dir.path());
    assert_eq!(table.len(), 4);
    assert_eq!(table[0]["id"], "1");
    assert_eq!(table[0]["incomeRange"], "$1M-$10M+/year");
}

#[test]
fn test_segments_add_update_delete() {
    let dir = TempDir::new().unwrap();
    let output = run_sapling(
        &["segments", "add", "--segment", "Clinics", "--demographic", "Sleep labs"],
        dir.path(),
    );
    assert!(output.status.success(), "segments add failed: {}", stderr(&output));

    let table = segments_json(dir.path());
    assert_eq!(table.len(), 5);
    let added = &table[4];
    assert_eq!(added["segment"], "Clinics");
    assert_eq!(added["demographics"][0], "Sleep labs");
    assert_eq!(added["psychographics"][0], "Add psychographics");
    assert_eq!(added["marketSize"], "0 individuals");
    let id = added["id"].as_str().unwrap().to_string();

    let output = run_sapling(
        &["segments", "update", &id, "--market-size", "~40K clinics"],
        dir.path(),
    );
    assert!(output.status.success());
    assert_eq!(segments_json(dir.path())[4]["marketSize"], "~40K clinics");

    let output = run_sapling(&["segments", "delete", "2"], dir.path());
    assert!(output.status.success());
    let ids: Vec<String> = segments_json(dir.path())
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["1", "3", "4", id.as_str()]);
}

#[test]
fn test_segments_missing_id_is_a_warning() {
    let dir = TempDir::new().unwrap();
    for args in [
        vec!["segments", "update", "nope", "--segment", "X"],
        vec!["segments", "delete", "nope"],
    ] {
        let output = run_sapling(&args, dir.path());
        assert!(output.status.success(), "{:?} should exit 0", args);
        assert!(stdout(&output).contains("No segment with id 'nope'"));
    }
    assert_eq!(segments_json(dir.path()).len(), 4);
}
