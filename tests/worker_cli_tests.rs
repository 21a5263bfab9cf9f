//! Worker binary behavior: argument validation and clean lifecycle.

use std::io::Write;
use std::process::{Command, Stdio};

fn worker() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tailwind-resolver-worker"))
}

#[test]
fn test_serve_requires_operation_and_major() {
    let output = worker().arg("serve").output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--operation"), "stderr: {stderr}");
}

#[test]
fn test_unknown_operation_is_rejected() {
    let output = worker()
        .args(["serve", "--operation", "read-tea-leaves", "--major", "4"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_worker_exits_cleanly_on_stdin_close() {
    let mut child = worker()
        .args(["serve", "--operation", "class-order", "--major", "4"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Closing stdin without sending a frame ends the serve loop.
    drop(child.stdin.take());
    let status = child.wait().unwrap();
    assert!(status.success());
}

#[test]
fn test_unsupported_major_fails_before_serving() {
    let mut child = worker()
        .args(["serve", "--operation", "class-order", "--major", "2"])
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    drop(child.stdin.take());
    let output = child.wait_with_output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains('2'), "error must name the version: {stderr}");
}

#[test]
fn test_malformed_frame_gets_error_response_and_loop_survives() {
    let mut child = worker()
        .args(["serve", "--operation", "prefix", "--major", "4"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    // A frame whose payload is not JSON.
    let garbage = b"this is not json";
    stdin.write_all(&(garbage.len() as u32).to_be_bytes()).unwrap();
    stdin.write_all(garbage).unwrap();
    stdin.flush().unwrap();
    drop(stdin);

    let output = child.wait_with_output().unwrap();
    // The loop answered with an error frame and then exited cleanly on EOF.
    assert!(output.status.success());
    assert!(output.stdout.len() > 4, "an error response frame was written");

    let len = u32::from_be_bytes(output.stdout[0..4].try_into().unwrap()) as usize;
    let body: serde_json::Value = serde_json::from_slice(&output.stdout[4..4 + len]).unwrap();
    assert_eq!(body["ok"], false);
}
