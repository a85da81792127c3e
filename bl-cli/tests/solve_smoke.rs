use std::fs;
use std::process::Command;

fn bl_bin() -> String {
    env!("CARGO_BIN_EXE_bl").to_string()
}

/// One loaded jig, one rack, one line: solvable in four actions.
const TOY_SCENARIO: &str = r#"{
    "jigs": {"jig1": {"type": "typeA", "empty": false}},
    "flights": [{"incoming": ["jig1"], "outgoing": []}],
    "production_lines": [{"schedule": ["jig1"]}],
    "racks": [{"size": 10, "jigs": []}],
    "trailers_beluga": [null],
    "trailers_factory": [null],
    "hangars": [null]
}"#;

#[test]
fn help_runs() {
    let out = Command::new(bl_bin()).arg("--help").output().unwrap();
    assert!(out.status.success());
    let s = String::from_utf8_lossy(&out.stderr);
    assert!(s.contains("solve"));
    assert!(s.contains("collect"));
}

#[test]
fn solve_finishes_the_toy_scenario_and_logs_events() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("toy.json");
    fs::write(&scenario, TOY_SCENARIO).unwrap();
    let log = dir.path().join("events.ndjson");

    let out = Command::new(bl_bin())
        .args([
            "solve",
            "--scenario",
            scenario.to_str().unwrap(),
            "--sims",
            "150",
            "--depth",
            "5",
            "--threads",
            "1",
            "--seed",
            "7",
            "--log",
            log.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(
        out.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Solved in"), "stdout:\n{stdout}");

    // Every log line is a standalone JSON object.
    let events = fs::read_to_string(&log).unwrap();
    let mut step_events = 0;
    for line in events.lines().filter(|l| !l.trim().is_empty()) {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        if v["event"] == "step" {
            step_events += 1;
        }
    }
    assert!(step_events >= 4, "events:\n{events}");
}

#[test]
fn collect_writes_training_shards() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("toy.json");
    fs::write(&scenario, TOY_SCENARIO).unwrap();
    let out_dir = dir.path().join("shards");

    let out = Command::new(bl_bin())
        .args([
            "collect",
            "--scenario",
            scenario.to_str().unwrap(),
            "--out",
            out_dir.to_str().unwrap(),
            "--sims",
            "150",
            "--depth",
            "5",
            "--seed",
            "7",
            "--min-visits",
            "1",
        ])
        .output()
        .unwrap();

    assert!(
        out.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(out_dir.join("shard_000000.safetensors").exists());
    assert!(out_dir.join("shard_000000.meta.json").exists());
}

#[test]
fn unknown_scenario_fails_with_a_message() {
    let out = Command::new(bl_bin())
        .args(["solve", "--scenario", "/nonexistent/path.json"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to load scenario"), "{stderr}");
}
