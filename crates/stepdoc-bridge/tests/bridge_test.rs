//! Integration tests for ScriptBridge using `sh` as the interpreter.

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use stepdoc_bridge::{BridgeConfig, BridgeStatus, ScriptBridge, TransportError};

/// Write an entry script into a temp dir and build a bridge that runs it with `sh`.
fn create_bridge(script: &str, timeout: Option<Duration>) -> (ScriptBridge, tempfile::TempDir) {
  let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
  let entry = temp_dir.path().join("entry.sh");
  std::fs::write(&entry, script).expect("failed to write entry script");

  let config = BridgeConfig {
    interpreter: PathBuf::from("sh"),
    interpreter_args: Vec::new(),
    entry_script: entry,
    timeout,
  };

  (ScriptBridge::new(config), temp_dir)
}

#[tokio::test]
async fn test_call_returns_last_line_payload() {
  let (bridge, _dir) = create_bridge(
    r#"echo "loading $1"
echo "calling $2"
echo "{\"status\": \"SUCCESS\", \"Payload\": $3}"
"#,
    None,
  );

  let response = bridge
    .call("handlers.py", "main", &json!({ "count": 3 }))
    .await
    .unwrap();

  assert_eq!(response.status, BridgeStatus::Success);
  assert_eq!(response.payload, json!({ "count": 3 }));
}

#[tokio::test]
async fn test_domain_failure_is_not_a_transport_error() {
  let (bridge, _dir) = create_bridge(
    r#"echo '{"status": "FAILURE", "Payload": "ValueError: bad input"}'"#,
    None,
  );

  let response = bridge.call("handlers.py", "main", &json!({})).await.unwrap();

  assert_eq!(response.status, BridgeStatus::Failure);
  assert_eq!(response.payload, json!("ValueError: bad input"));
}

#[tokio::test]
async fn test_non_zero_exit_is_transport_error() {
  let (bridge, _dir) = create_bridge("echo oops >&2\nexit 3\n", None);

  let err = bridge.call("handlers.py", "main", &json!({})).await.unwrap_err();

  match err {
    TransportError::ProcessFailed { exit_code, stderr } => {
      assert_eq!(exit_code, Some(3));
      assert!(stderr.contains("oops"));
    }
    other => panic!("expected ProcessFailed, got {:?}", other),
  }
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
  let (bridge, _dir) = create_bridge("sleep 5\n", Some(Duration::from_millis(100)));

  let err = bridge.call("handlers.py", "main", &json!({})).await.unwrap_err();

  assert!(matches!(err, TransportError::Timeout(_)));
}

#[tokio::test]
async fn test_missing_interpreter_is_transport_error() {
  let bridge = ScriptBridge::new(BridgeConfig {
    interpreter: PathBuf::from("/nonexistent/interpreter"),
    interpreter_args: Vec::new(),
    entry_script: PathBuf::from("entry.sh"),
    timeout: None,
  });

  let err = bridge.call("handlers.py", "main", &json!({})).await.unwrap_err();

  assert!(matches!(err, TransportError::Spawn { .. }));
}

#[tokio::test]
async fn test_silent_script_is_transport_error() {
  let (bridge, _dir) = create_bridge("true\n", None);

  let err = bridge.call("handlers.py", "main", &json!({})).await.unwrap_err();

  assert!(matches!(err, TransportError::EmptyOutput));
}
