//! Bridge response parsing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeStatus {
  Success,
  Failure,
}

/// Result written by the entry script on its last output line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
  pub status: BridgeStatus,
  /// Function return value, or the error it reported.
  #[serde(rename = "Payload", default)]
  pub payload: serde_json::Value,
}

impl BridgeResponse {
  pub fn success(payload: serde_json::Value) -> Self {
    Self {
      status: BridgeStatus::Success,
      payload,
    }
  }

  pub fn failure(payload: serde_json::Value) -> Self {
    Self {
      status: BridgeStatus::Failure,
      payload,
    }
  }

  pub fn is_success(&self) -> bool {
    self.status == BridgeStatus::Success
  }
}

/// Parse interpreter stdout.
///
/// The last non-blank line is the response; every earlier line is
/// diagnostic output and is only logged.
pub fn parse_output(stdout: &str) -> Result<BridgeResponse, TransportError> {
  let mut lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
  let last = lines.pop().ok_or(TransportError::EmptyOutput)?;

  for line in lines {
    debug!(line = %line, "bridge diagnostic output");
  }

  serde_json::from_str(last.trim()).map_err(|source| TransportError::InvalidResponse {
    line: last.to_string(),
    source,
  })
}
