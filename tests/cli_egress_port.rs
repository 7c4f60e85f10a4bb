use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "egress-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn egress_port(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_egress_port"))
        .args(args)
        .output()
        .expect("run egress_port")
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("read json output");
    serde_json::from_str(&raw).expect("parse json output")
}

#[test]
fn demo_writes_viz_json_with_meta_first() {
    let dir = unique_temp_dir("viz");
    let viz = dir.join("viz.json");

    let output = egress_port(&["--viz-json", viz.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "egress_port failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v = read_json(&viz);
    let arr = v.as_array().expect("viz.json must be a JSON array");
    assert!(arr.len() > 1, "expected queue events after meta");
    assert_eq!(arr[0].get("kind").and_then(|k| k.as_str()), Some("meta"));
    assert_eq!(
        arr[0].get("queues").and_then(|q| q.as_array()).map(|q| q.len()),
        Some(3)
    );
    for kind in ["enqueue", "dequeue", "drop", "tx_start", "pause"] {
        assert!(
            arr.iter()
                .any(|e| e.get("kind").and_then(|k| k.as_str()) == Some(kind)),
            "missing {kind} event"
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("queue=")).count(), 3);
    assert!(stdout.lines().any(|l| l.starts_with("done @ ")));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_file_produces_summary_json() {
    let dir = unique_temp_dir("summary");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "egress": {
        "kind": "nic",
        "queue_count": 4,
        "default_queue": { "mode": "packets", "max_pkts": 8 }
    },
    "link_gbps": 100,
    "classifier": "flow_id",
    "flows": [
        { "flow_id": 0, "pkts": 20, "gap_ns": 100 },
        { "flow_id": 1, "pkts": 20, "gap_ns": 100 },
        { "flow_id": 2, "pkts": 20, "gap_ns": 100 },
        { "flow_id": 3, "pkts": 20, "gap_ns": 100 }
    ]
}
        "#,
    );
    let summary = dir.join("summary.json");

    let output = egress_port(&[
        "--scenario",
        scenario.to_str().unwrap(),
        "--summary-json",
        summary.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "egress_port failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v = read_json(&summary);
    assert_eq!(v["port"]["arrived_pkts"].as_u64(), Some(80));
    assert!(v["fault"].is_null());
    let queues = v["queues"].as_array().expect("queues array");
    assert_eq!(queues.len(), 4);
    let transmitted = v["port"]["transmitted_pkts"].as_u64().expect("transmitted");
    let dropped: u64 = queues
        .iter()
        .map(|q| q["stats"]["dropped_pkts"].as_u64().unwrap_or(0))
        .sum();
    assert_eq!(transmitted + dropped, 80);
    assert_eq!(v["total_bytes"].as_u64(), Some(0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn until_ms_stops_early() {
    let dir = unique_temp_dir("until");
    let summary = dir.join("summary.json");

    let output = egress_port(&[
        "--until-ms",
        "0",
        "--summary-json",
        summary.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let v = read_json(&summary);
    assert_eq!(v["now_ns"].as_u64(), Some(0));
    let arrived = v["port"]["arrived_pkts"].as_u64().expect("arrived");
    assert!(arrived < 600, "demo should be cut short, arrived={arrived}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn oversized_switch_config_fails() {
    let dir = unique_temp_dir("invalid");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"{ "egress": { "kind": "switch", "queue_count": 9 } }"#,
    );

    let output = egress_port(&["--scenario", scenario.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("exceeds the limit of 8"),
        "unexpected stderr: {stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_scenario_file_fails() {
    let dir = unique_temp_dir("missing");
    let path = dir.join("nope.json");

    let output = egress_port(&["--scenario", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: read"));

    let _ = fs::remove_dir_all(&dir);
}
