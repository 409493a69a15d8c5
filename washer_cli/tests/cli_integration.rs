use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid TOML: every section falls back to the stock machine
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[timing]
# short frames keep the sim fast
frame_interval_ms = 50

[cycle]
power_off_while_running = "abort"
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../demos")
        .join(name)
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["simulate"], 2, "--script", "stderr")]
#[case(&["simulate", "--script", "/nonexistent/scenario.csv"], 3, "Scenario script rejected", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("washer").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn shipped_config_passes_validation() {
    let shipped = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../etc/washer_config.toml");
    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config").arg(shipped).arg("self-check");
    cmd.assert().success();
}

#[rstest]
#[case("[safety]\ndebounce_count = 0\n", "safety.debounce_count")]
#[case("[alerts]\ncomplete_repeats = 0\n", "alerts.complete_repeats")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn invalid_config_exits_2(#[case] toml: &str, #[case] key: &str) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, toml).unwrap();

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config").arg(&cfg).arg("self-check");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration rejected"))
        .stderr(predicate::str::contains(key));
}

#[rstest]
fn unparsable_config_exits_2() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("broken.toml");
    fs::write(&cfg, "[cycle]\npower_off_while_running = \"pause\"\n").unwrap();

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config").arg(&cfg).arg("self-check");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("not valid TOML"));
}

#[rstest]
fn cli_reports_bad_scenario_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("scenario.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "time,button,value").unwrap();
    writeln!(f, "1000,power,1").unwrap();

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("simulate")
        .arg("--script")
        .arg(&bad_csv);

    cmd.assert()
        .code(3)
        .stderr(predicate::str::contains("at_ms,input,value"));
}

#[rstest]
fn full_cycle_demo_completes_one_cycle() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("simulate")
        .arg("--script")
        .arg(demo("full_cycle.csv"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("power on"))
        .stdout(predicate::str::contains("cycle started: 600 rpm, 40 °C, 30 min"))
        .stdout(predicate::str::contains("countdown: 1"))
        .stdout(predicate::str::contains("cycle complete"))
        .stdout(predicate::str::contains("1 cycle(s) completed, state idle"));
}

#[rstest]
fn open_door_denies_start_until_closed() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("simulate")
        .arg("--script")
        .arg(demo("door_open_denied.csv"));

    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&out);
    let denied = stdout.find("start denied: door_open").expect("denial line");
    let started = stdout.find("cycle started").expect("start line");
    assert!(denied < started, "stdout was: {stdout}");
    assert!(stdout.contains("door opened") && stdout.contains("door closed"));
}

#[rstest]
fn until_ms_cuts_the_replay_short() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("washer").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("simulate")
        .arg("--script")
        .arg(demo("full_cycle.csv"))
        .arg("--until-ms")
        .arg("3000");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cycle started"))
        .stdout(predicate::str::contains("cycle complete").not())
        .stdout(predicate::str::contains("state running"));
}

#[rstest]
fn console_quit_stops_the_loop() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = assert_cmd::Command::cargo_bin("washer").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("run")
        .write_stdin("load 0.4\nquit\n")
        .timeout(std::time::Duration::from_secs(10));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("stopped after"));
}

#[rstest]
fn console_rejects_unknown_commands_without_stopping() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = assert_cmd::Command::cargo_bin("washer").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("run")
        .arg("--until-ms")
        .arg("1200")
        .write_stdin("spin 0.5\nstatus\n")
        .timeout(std::time::Duration::from_secs(10));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("unknown command"))
        .stdout(predicate::str::contains("door lamp off"));
}
