use std::path::Path;
use std::process::{Command, Output};

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carbon_cli"))
        .args(args)
        .env("CARBONTRACK_STORE_PATH", dir.join("tasks.json"))
        .env("CARBONTRACK_CONFIG_PATH", dir.join("config.json"))
        .env_remove("CARBONTRACK_LOG")
        .output()
        .expect("failed to run carbon_cli")
}

fn stored(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(dir.join("tasks.json")).unwrap()).unwrap()
}

#[test]
fn add_command_classifies_and_persists() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["--json", "add", "Flight to Berlin"]);

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["id"], 1);
    assert_eq!(parsed["name"], "Flight to Berlin");
    assert_eq!(parsed["category"], "travel");
    assert_eq!(parsed["carbon"], 90.0);
    assert_eq!(parsed["completed"], false);
    assert_eq!(
        parsed["suggestion"],
        "Try a train or video call instead of flying."
    );
    assert!(parsed["created_at"].is_string());

    let store = stored(dir.path());
    assert_eq!(store["schema_version"], 1);
    assert_eq!(store["next_id"], 2);
    assert_eq!(store["tasks"][0]["name"], "Flight to Berlin");
}

#[test]
fn add_command_with_carbon_override_is_custom() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["--json", "add", "car trip", "--carbon", "3.3"]);

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["category"], "custom");
    assert_eq!(parsed["carbon"], 3.3);
    assert_eq!(parsed["suggestion"], "Use public transport or carpool.");
}

#[test]
fn add_command_plain_text_output() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Vegan lunch"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Vegan lunch (1)"));
    assert!(stdout.contains("Food"));
}

#[test]
fn add_command_rejects_blank_name() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "   "]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(!dir.path().join("tasks.json").exists());
}

#[test]
fn add_command_requires_a_name() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - name is required"));
}

#[test]
fn add_command_rejects_negative_and_text_carbon() {
    let dir = tempfile::tempdir().unwrap();

    let negative = run(dir.path(), &["add", "car", "--carbon", "-2"]);
    let text = run(dir.path(), &["add", "car", "--carbon", "lots"]);

    assert!(!negative.status.success());
    assert!(String::from_utf8_lossy(&negative.stderr).contains("ERROR: invalid_input"));
    assert!(!text.status.success());
    assert!(String::from_utf8_lossy(&text.stderr).contains("ERROR: invalid_input"));
    assert!(!dir.path().join("tasks.json").exists());
}

#[test]
fn estimate_command_does_not_store() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["--json", "estimate", "server upgrade"]);

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["carbon"], 25.0);
    assert_eq!(parsed["category"], "office");
    assert_eq!(parsed["suggestion"], "Use renewable energy data centers.");
    assert!(!dir.path().join("tasks.json").exists());
}

#[test]
fn seed_command_inserts_samples() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["seed"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added 7 sample task(s)"));
    assert_eq!(stored(dir.path())["tasks"].as_array().unwrap().len(), 7);
}
