// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const HW: &str = "../../hw/mtkcpu.yaml";

fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push("mtk-tests");
    let _ = std::fs::create_dir_all(&dir);

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.join(format!("{}-{}.{}", prefix, nonce, ext))
}

fn mtk(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mtk"))
        .args(args)
        .output()
        .expect("Failed to execute mtk")
}

#[test]
fn test_help_lists_commands() {
    let output = mtk(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["check", "gen", "sim"] {
        assert!(stdout.contains(cmd), "missing {} in {}", cmd, stdout);
    }
}

#[test]
fn test_check_shipped_description() {
    let output = mtk(&["check", "--hw", HW]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mtkcpu-icebreaker"));
}

#[test]
fn test_gen_writes_table() {
    let out = temp_path("periph-map", "rs");
    let output = mtk(&["gen", "--hw", HW, "--out", out.to_str().unwrap()]);
    assert!(output.status.success());

    let table = std::fs::read_to_string(&out).unwrap();
    assert!(table.starts_with("// Code automatically generated by mtk-codegen"));
    assert!(table.contains("pub mod uart"));
    assert!(table.contains("TX_DATA_OFFSET"));
    assert!(table.contains("LED_R_0"));

    let _ = std::fs::remove_file(&out);
}

#[test]
fn test_gen_to_stdout() {
    let output = mtk(&["gen", "--hw", HW]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pub mod gpio"));
}

#[test]
fn test_sim_blink_report() {
    let report_path = temp_path("blink-report", "json");
    let output = mtk(&[
        "sim",
        "--hw",
        HW,
        "--report",
        report_path.to_str().unwrap(),
        "blink",
        "--half-periods",
        "3",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["stop_reason"], "completed");
    assert_eq!(report["scenario"]["kind"], "blink");

    let trace = report["led_trace"].as_array().unwrap();
    assert_eq!(trace.len(), 3);
    assert_eq!(trace[0]["green"], true);
    assert_eq!(trace[0]["red"], false);
    assert_eq!(trace[1]["green"], false);
    assert_eq!(trace[1]["red"], true);

    let _ = std::fs::remove_file(&report_path);
}

#[test]
fn test_sim_print() {
    let output = mtk(&["sim", "--hw", HW, "print", "hello"]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello\n");
}

#[test]
fn test_sim_gpio_out_of_range_halts() {
    let output = mtk(&["sim", "--hw", HW, "gpio", "--offset", "32"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.ends_with(" assertion failed: offset < GPIO_LINES\n"),
        "{}",
        stdout
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Halt"));
}

#[test]
fn test_missing_description() {
    let output = mtk(&["check", "--hw", "does-not-exist.yaml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open hardware description"));
}
