//! CLI Integration Tests
//!
//! Drives the built `centerctl` binary against in-process fake services.
//!
//! Test Scenarios:
//! 1. One-shot commands send the right request and print request and reply
//! 2. Service refusals, unreachable services and bad arguments exit with 1
//!    and name the kind of failure
//! 3. The demo walks both services and tolerates the expected refusals
//!
//! All endpoints use `127.0.0.1` with an explicit port so no name resolution
//! is involved.

#[path = "../../centerctl-client/tests/fake_service/mod.rs"]
mod fake_service;

use std::net::TcpListener;
use std::process::{Command, Output};

use centerctl_common::protocol::{StructBuilder, Value};
use fake_service::{Answer, FakeService};

// ============================================================================
// Test Helpers
// ============================================================================

fn centerctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_centerctl"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CENTERCTL_HOST")
        .output()
        .expect("failed to run centerctl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn denied() -> Answer {
    Answer::ServiceException(1, StructBuilder::new().string(1, "access denied").build())
}

fn ok() -> Answer {
    Answer::Reply(StructBuilder::new().build())
}

/// A port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// One-shot Commands
// ============================================================================

#[test]
fn test_create_volume_sends_bytes_and_prints_reply() {
    let service = FakeService::spawn(1, |_, _| {
        Answer::Reply(StructBuilder::new().i64(1, 555).build())
    });
    let endpoint = service.endpoint.to_string();

    let output = centerctl(&["create-volume", &endpoint, "vol123", "16", "1", "42"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains(">>> createVolume"));
    assert!(out.contains("\"volumeSize\": 16777216"));
    assert!(out.contains("<<< createVolume"));
    assert!(out.contains("\"1\": 555"));

    let calls = service.join();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "createVolume");
    let request = &calls[0].request;
    assert_eq!(request.field(1), Some(&Value::String("vol123".into())));
    assert_eq!(request.field(2), Some(&Value::I64(16_777_216)));
    assert_eq!(request.field(3), Some(&Value::I32(1)));
    assert_eq!(request.field(4), Some(&Value::I64(42)));
    assert!(calls[0].closed_by_client);
}

#[test]
fn test_update_account_without_old_password() {
    let service = FakeService::spawn(1, |_, _| ok());
    let endpoint = service.endpoint.to_string();

    let output = centerctl(&["update-account", &endpoint, "alice", "345678", "2"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stdout(&output).contains("oldPassword"));

    let calls = service.join();
    let request = &calls[0].request;
    assert_eq!(calls[0].method, "updateAccount");
    assert!(request.field(2).is_none());
    assert_eq!(request.field(3), Some(&Value::String("345678".into())));
    assert_eq!(request.field(4), Some(&Value::I64(2)));
}

#[test]
fn test_quiet_prints_reply_only() {
    let service = FakeService::spawn(1, |_, _| {
        Answer::Reply(StructBuilder::new().i64(1, 9).build())
    });
    let endpoint = service.endpoint.to_string();

    let output = centerctl(&["--quiet", "list-accounts", &endpoint, "2"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json, serde_json::json!({"1": 9}));
    service.join();
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_service_refusal_exits_with_service_error() {
    let service = FakeService::spawn(1, |_, _| denied());
    let endpoint = service.endpoint.to_string();

    let output = centerctl(&["get-volume", &endpoint, "1", "4"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.starts_with("service error: "), "stderr: {}", err);
    assert!(err.contains("access denied"));
    // the request was echoed, the reply never printed
    assert!(stdout(&output).contains(">>> getVolume"));
    assert!(!stdout(&output).contains("<<<"));

    let calls = service.join();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].closed_by_client);
}

#[test]
fn test_unreachable_service_exits_with_transport_error() {
    let endpoint = format!("127.0.0.1:{}", closed_port());

    let output = centerctl(&["--timeout-ms", "2000", "list-volumes", &endpoint, "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("transport error: "), "stderr: {}", stderr(&output));
}

#[test]
fn test_service_hang_up_exits_with_transport_error() {
    let service = FakeService::spawn(1, |_, _| Answer::HangUp);
    let endpoint = service.endpoint.to_string();

    let output = centerctl(&["--timeout-ms", "5000", "list-volumes", &endpoint, "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("transport error: "), "stderr: {}", stderr(&output));
    service.join();
}

#[test]
fn test_bad_argument_exits_before_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let output = centerctl(&["get-volume", &endpoint, "not-a-number", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("invalid input: "), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let accepted = listener.accept();
    assert!(accepted.is_err(), "no connection should have been opened");
}

#[test]
fn test_zero_timeout_is_invalid_input() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let output = centerctl(&["--timeout-ms", "0", "list-volumes", &endpoint, "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("invalid input: "), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("--timeout-ms"));
    assert!(listener.accept().is_err(), "no connection should have been opened");
}

#[test]
fn test_negative_id_after_separator() {
    let service = FakeService::spawn(1, |_, _| ok());
    let endpoint = service.endpoint.to_string();

    let output = centerctl(&["get-volume", "--", &endpoint, "-5", "1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let calls = service.join();
    assert_eq!(calls[0].request.field(1), Some(&Value::I64(-5)));
}

#[test]
fn test_update_account_wrong_arity() {
    let output = centerctl(&["update-account", "8020", "alice", "2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("invalid input: "));
}

#[test]
fn test_missing_positional_is_rejected() {
    let output = centerctl(&["create-volume", "8010", "vol123"]);
    assert!(!output.status.success());
}

// ============================================================================
// Demo
// ============================================================================

#[test]
fn test_demo_walks_both_services() {
    const SUPER_ADMIN: i64 = 1;
    const ADMIN: i64 = 2;
    const REGULAR1: i64 = 3;
    const REGULAR2: i64 = 4;
    const VOLUME: i64 = 100;

    let mut next_account = SUPER_ADMIN;
    let info_center = FakeService::spawn(11, move |method, request| {
        let account = request.field(4).or(request.field(1)).and_then(Value::as_i64);
        match method {
            "createAccount" => {
                let id = next_account;
                next_account += 1;
                Answer::Reply(StructBuilder::new().i64(1, id).build())
            }
            "listAccounts" if account == Some(REGULAR1) => denied(),
            "authenticateAccount" if request.field(2).and_then(Value::as_str) != Some("123456") => {
                denied()
            }
            "updateAccount" if account == Some(REGULAR2) => denied(),
            _ => ok(),
        }
    });
    let control_center = FakeService::spawn(9, |method, request| {
        let account = request.field(2).and_then(Value::as_i64);
        match method {
            "createVolume" => Answer::Reply(StructBuilder::new().i64(1, VOLUME).build()),
            "getVolume" | "deleteVolume" if account == Some(REGULAR2) => denied(),
            _ => ok(),
        }
    });

    let output = centerctl(&[
        "--timeout-ms",
        "5000",
        "demo",
        "--host",
        "127.0.0.1",
        "--info-center-port",
        &info_center.endpoint.port.to_string(),
        "--control-center-port",
        &control_center.endpoint.port.to_string(),
        "--settle-secs",
        "0",
        "--seed",
        "42",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert_eq!(out.matches("service error: ").count(), 5, "stdout: {}", out);
    assert!(out.contains("regular-account142"));

    let ic_calls = info_center.join();
    let ic_methods: Vec<&str> = ic_calls.iter().map(|c| c.method.as_str()).collect();
    assert_eq!(
        ic_methods,
        [
            "createAccount",
            "createAccount",
            "createAccount",
            "createAccount",
            "listAccounts",
            "listAccounts",
            "authenticateAccount",
            "authenticateAccount",
            "updateAccount",
            "updateAccount",
            "updateAccount",
        ]
    );
    let account_types: Vec<Option<&Value>> =
        ic_calls[..4].iter().map(|c| c.request.field(3)).collect();
    assert_eq!(
        account_types,
        [
            Some(&Value::I32(1)),
            Some(&Value::I32(2)),
            Some(&Value::I32(3)),
            Some(&Value::I32(3))
        ]
    );
    // admin reset carries no old password
    assert!(ic_calls[9].request.field(2).is_none());
    assert_eq!(ic_calls[9].request.field(4), Some(&Value::I64(ADMIN)));

    let cc_calls = control_center.join();
    let cc_methods: Vec<&str> = cc_calls.iter().map(|c| c.method.as_str()).collect();
    assert_eq!(
        cc_methods,
        [
            "createVolume",
            "listVolumes",
            "listVolumes",
            "getVolume",
            "getVolume",
            "getVolume",
            "deleteVolume",
            "deleteVolume",
            "getVolume",
        ]
    );
    assert_eq!(cc_calls[0].request.field(2), Some(&Value::I64(16_777_216)));
    assert_eq!(cc_calls[0].request.field(4), Some(&Value::I64(REGULAR1)));
    assert_eq!(cc_calls[7].request.field(1), Some(&Value::I64(VOLUME)));
    assert_eq!(cc_calls[7].request.field(2), Some(&Value::I64(REGULAR1)));

    assert!(ic_calls.iter().chain(&cc_calls).all(|c| c.closed_by_client));
}

#[test]
fn test_demo_aborts_on_unexpected_failure() {
    let info_center = FakeService::spawn(1, |_, _| denied());
    let control_port = closed_port();

    let output = centerctl(&[
        "demo",
        "--host",
        "127.0.0.1",
        "--info-center-port",
        &info_center.endpoint.port.to_string(),
        "--control-center-port",
        &control_port.to_string(),
        "--settle-secs",
        "0",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("service error: "), "stderr: {}", stderr(&output));
    assert_eq!(info_center.join().len(), 1);
}
