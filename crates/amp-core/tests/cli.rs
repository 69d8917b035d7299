//! CLI E2E tests for the `ampute` binary.
//!
//! Validates:
//! - `run` writes an amputed CSV and an optional JSON report
//! - `validate` prints the resolved pattern set
//! - `profile` summarizes missingness of an existing file
//! - Exit codes for configuration, data and I/O failures

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

// ============================================================================
// Helpers
// ============================================================================

fn ampute() -> Command {
    let mut cmd = cargo_bin_cmd!("ampute");
    cmd.timeout(Duration::from_secs(60));
    cmd.env_remove("AMPUTE_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_dataset(path: &Path, rows: usize) {
    let mut csv = String::from("id,a,b,c\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "r{},{},{},{}\n",
            i,
            i % 7,
            (i * 3) % 11,
            (i * 5) % 13
        ));
    }
    fs::write(path, csv).unwrap();
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_writes_output_and_report() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    let report = dir.path().join("report.json");
    let config = dir.path().join("config.json");
    write_dataset(&input, 300);
    fs::write(
        &config,
        r#"{"prop": 0.3, "uniform_probability": "target_proportion",
            "patterns": [{"incomplete_vars": ["a"], "mechanism": "MCAR"}]}"#,
    )
    .unwrap();

    ampute()
        .args(["run", "--row-labels", "--seed", "42"])
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-c")
        .arg(&config)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .code(0);

    let written = fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some(",a,b,c"));
    let empty_a = lines.filter(|l| l.split(',').nth(1) == Some("")).count();
    assert!(empty_a > 40 && empty_a < 140, "amputed {empty_a}");

    let json: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["seed"], 42);
    assert_eq!(json["n_samples"], 300);
    assert_eq!(json["patterns"][0]["mechanism"], "MCAR");
    assert!(json.get("profile").is_some());
}

#[test]
fn test_run_same_seed_same_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    write_dataset(&input, 100);

    let run = |name: &str| {
        let out = dir.path().join(name);
        ampute()
            .args(["run", "--row-labels", "--seed", "7", "--prop", "40"])
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&out)
            .assert()
            .success();
        fs::read_to_string(out).unwrap()
    };
    assert_eq!(run("one.csv"), run("two.csv"));
}

#[test]
fn test_run_invalid_prop_exit_10() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    write_dataset(&input, 20);

    ampute()
        .args(["run", "--row-labels", "--prop", "150"])
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("error[19]"));
}

#[test]
fn test_run_unknown_config_key_exit_10() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let config = dir.path().join("config.json");
    write_dataset(&input, 20);
    fs::write(&config, r#"{"proportion": 0.2}"#).unwrap();

    ampute()
        .args(["run", "--row-labels"])
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .arg("-c")
        .arg(&config)
        .assert()
        .code(10);
}

#[test]
fn test_run_malformed_pattern_exit_10() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let config = dir.path().join("config.json");
    write_dataset(&input, 20);
    fs::write(
        &config,
        r#"{"patterns": [{"incomplete_vars": ["a"]}, {"incomplete_vars": ["b"], "prob": 1}]}"#,
    )
    .unwrap();

    ampute()
        .args(["run", "--row-labels"])
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .arg("-c")
        .arg(&config)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("error[11]").and(predicate::str::contains("pattern 1")));
}

#[test]
fn test_run_infinite_scored_value_exit_11() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let config = dir.path().join("config.json");
    fs::write(&input, "a,b\n1,2\n2,inf\n3,4\n").unwrap();
    fs::write(&config, r#"{"patterns": [{"incomplete_vars": ["a"]}]}"#).unwrap();

    ampute()
        .arg("run")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .arg("-c")
        .arg(&config)
        .assert()
        .code(11)
        .stderr(predicate::str::contains("error[35]"));
}

#[test]
fn test_run_text_feature_exit_11() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let config = dir.path().join("config.json");
    fs::write(&input, "a,b\n1,x\n2,y\n3,z\n").unwrap();
    fs::write(&config, r#"{"patterns": [{"incomplete_vars": [0]}]}"#).unwrap();

    ampute()
        .arg("run")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .arg("-c")
        .arg(&config)
        .assert()
        .code(11);
}

#[test]
fn test_run_missing_input_exit_13() {
    let dir = tempdir().unwrap();
    ampute()
        .arg("run")
        .arg("-i")
        .arg(dir.path().join("absent.csv"))
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .assert()
        .code(13);
}

#[test]
fn test_config_from_environment() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let config = dir.path().join("config.json");
    write_dataset(&input, 20);
    fs::write(&config, r#"{"patterns": [{"incomplete_vars": ["zzz"]}]}"#).unwrap();

    ampute()
        .env("AMPUTE_CONFIG", &config)
        .args(["validate", "--row-labels"])
        .arg("-i")
        .arg(&input)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("zzz"));
}

// ============================================================================
// validate / profile
// ============================================================================

#[test]
fn test_validate_prints_resolved_patterns() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let config = dir.path().join("config.json");
    write_dataset(&input, 30);
    fs::write(
        &config,
        r#"{"prop": 25, "patterns": [
            {"incomplete_vars": ["a"], "weights": {"b": 2.0}, "freq": 0.5},
            {"incomplete_vars": ["c"], "mechanism": "MNAR", "freq": 0.5,
             "score_to_probability_func": "sigmoid-tail"}
        ]}"#,
    )
    .unwrap();

    let output = ampute()
        .args(["validate", "--row-labels"])
        .arg("-i")
        .arg(&input)
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("parse JSON");
    assert!(json.get("schema_version").is_some());
    assert_eq!(json["n_features"], 3);
    assert_eq!(json["prop"], 0.25);
    assert_eq!(json["patterns"]["weights"][0], serde_json::json!([0.0, 2.0, 0.0]));
    assert_eq!(json["patterns"]["weights"][1], serde_json::json!([0.0, 0.0, 1.0]));
    assert_eq!(json["patterns"]["score_to_probability"][1], "SIGMOID-TAIL");
    assert_eq!(
        json["patterns"]["observed_var_indicator"][0],
        serde_json::json!([false, true, true])
    );
}

#[test]
fn test_profile_counts_missing_masks() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, "a,b\n1,\nNA,2\n3,\n4,5\n").unwrap();

    let output = ampute()
        .arg("profile")
        .arg("-i")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("parse JSON");
    assert_eq!(json["n_rows"], 4);
    assert_eq!(json["masks"][0]["missing"], serde_json::json!([false, true]));
    assert_eq!(json["masks"][0]["rows"], 2);
    assert_eq!(json["columns"][1]["missing"], 2);
    assert_eq!(json["incomplete_row_fraction"], 0.75);
}

#[test]
fn test_help_lists_subcommands() {
    ampute()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("run")
                .and(predicate::str::contains("validate"))
                .and(predicate::str::contains("profile")),
        );
}
