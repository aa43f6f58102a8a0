use std::fs;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn torusd(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_torusd"));
    command
        .env("TORUSD_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null());
    command
}

fn read_summary(path: &std::path::Path) -> serde_json::Value {
    let contents = fs::read_to_string(path).expect("summary file");
    serde_json::from_str(&contents).expect("summary json")
}

#[test]
fn continuous_run_writes_summary() {
    let root = TempDir::new().unwrap();
    let summary = root.path().join("out/summary.json");

    let status = torusd(root.path())
        .args(["--fps", "30", "--refresh-rate", "120", "--duration", "300ms"])
        .arg("--summary")
        .arg(&summary)
        .status()
        .expect("failed to run torusd");
    assert!(status.success());

    let summary = read_summary(&summary);
    assert_eq!(summary["on_demand"], false);
    assert_eq!(summary["fps"], 30.0);
    let frames = summary["frames"].as_u64().unwrap();
    let rendered = summary["rendered"].as_u64().unwrap();
    assert!(rendered >= 1);
    assert!(rendered <= frames);
}

#[test]
fn on_demand_run_renders_only_requested_frames() {
    let root = TempDir::new().unwrap();
    let summary = root.path().join("summary.json");

    let status = torusd(root.path())
        .args(["--fps", "0", "--refresh-rate", "60", "--duration", "200ms"])
        .arg("--summary")
        .arg(&summary)
        .status()
        .expect("failed to run torusd");
    assert!(status.success());

    let summary = read_summary(&summary);
    assert_eq!(summary["on_demand"], true);
    // Only the request queued by resume is honoured.
    assert_eq!(summary["rendered"].as_u64(), Some(1));
}

#[test]
fn reads_default_config_file() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("torusd.toml"),
        r#"
version = 1

[render]
fps = 12
refresh_rate = 90

[wallpaper]
width = 8
height = 8
curve = "linear"
"#,
    )
    .unwrap();
    let summary = root.path().join("summary.json");

    let status = torusd(root.path())
        .args(["--duration", "150ms"])
        .arg("--summary")
        .arg(&summary)
        .status()
        .expect("failed to run torusd");
    assert!(status.success());

    let summary = read_summary(&summary);
    assert_eq!(summary["fps"], 12.0);
    assert_eq!(summary["refresh_rate"], 90.0);
}

#[test]
fn config_check_rejects_invalid_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("bad.toml");
    fs::write(&path, "version = 3\n").unwrap();

    let output = torusd(root.path())
        .args(["config", "check"])
        .arg(&path)
        .output()
        .expect("failed to run torusd config check");
    assert!(!output.status.success());

    let good = root.path().join("good.toml");
    fs::write(&good, "version = 1\n[render]\nfps = 0\n").unwrap();
    let output = torusd(root.path())
        .args(["config", "check"])
        .arg(&good)
        .output()
        .expect("failed to run torusd config check");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("on-demand"));
}
