use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[timing]\ncountdown_step_ms = 500\n").unwrap();
    path
}

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../demos")
        .join(name)
}

fn simulate_json(script: PathBuf) -> Vec<serde_json::Value> {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("simulate")
        .arg("--script")
        .arg(script);

    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&out)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON ({e}): {l}")))
        .collect()
}

/// Every stdout line is a JSON object with an event name; events carry times.
#[rstest]
fn jsonl_event_schema() {
    let lines = simulate_json(demo("full_cycle.csv"));
    assert!(!lines.is_empty());

    let mut last_t = 0;
    for v in &lines {
        let event = v.get("event").and_then(|x| x.as_str()).unwrap_or("");
        assert!(!event.is_empty(), "missing event name: {v}");
        if event == "summary" {
            continue;
        }
        let t = v.get("t_ms").and_then(|x| x.as_u64()).expect("t_ms");
        assert!(t >= last_t, "events out of order: {t} after {last_t}");
        last_t = t;
    }

    let started = lines
        .iter()
        .find(|v| v["event"] == "cycle_started")
        .expect("cycle_started event");
    assert_eq!(started["rpm"], 600);
    assert_eq!(started["temperature_c"], 40);
    assert_eq!(started["duration_min"], 30);

    let countdown: Vec<u64> = lines
        .iter()
        .filter(|v| v["event"] == "countdown_step")
        .filter_map(|v| v["remaining"].as_u64())
        .collect();
    assert_eq!(countdown, vec![3, 2, 1, 0]);

    // Completion pattern: three tones, none overlapping
    let complete: Vec<u64> = lines
        .iter()
        .filter(|v| v["event"] == "tone" && v["kind"] == "complete")
        .filter_map(|v| v["t_ms"].as_u64())
        .collect();
    assert_eq!(complete.len(), 3);
    assert!(complete.windows(2).all(|w| w[1] - w[0] >= 200));

    let summary = lines.last().unwrap();
    assert_eq!(summary["event"], "summary");
    assert_eq!(summary["cycles_completed"], 1);
    assert_eq!(summary["final_state"], "idle");
}

/// Sensor reports carry numbers or null, never strings.
#[rstest]
fn jsonl_sensor_report_fields() {
    let lines = simulate_json(demo("door_open_denied.csv"));
    let reports: Vec<_> = lines.iter().filter(|v| v["event"] == "sensors").collect();
    assert!(!reports.is_empty());
    for r in reports {
        for key in ["load", "water_temp_c", "light_pct"] {
            let ok = matches!(
                r.get(key),
                Some(serde_json::Value::Null) | Some(serde_json::Value::Number(_))
            );
            assert!(ok, "{key} should be number or null: {r}");
        }
        assert!(r["door_reads_open"].is_boolean());
    }

    let denied = lines
        .iter()
        .find(|v| v["event"] == "start_denied")
        .expect("start_denied event");
    assert_eq!(denied["reason"], "door_open");
}

/// Errors under --json are one JSON object on stderr with a stable exit code.
#[rstest]
fn jsonl_error_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let bad = dir.path().join("bad.csv");
    fs::write(&bad, "at_ms,input,value\n100,power,2\n").unwrap();

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("simulate")
        .arg("--script")
        .arg(&bad);

    let out = cmd.assert().code(3).get_output().stderr.clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or("")
        .to_string();
    assert!(!line.is_empty(), "no JSON error line; stderr was: {stderr}");

    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
    assert_eq!(v["reason"], "Scenario");
    assert_eq!(v["exit_code"], 3);
    assert!(v["message"].as_str().is_some_and(|m| m.contains("[0, 1]")));
}
