//! Request and response types passed across the environment boundary.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One command line for a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellCommand {
  pub command: String,
  pub working_directory: Option<String>,
  pub timeout: Option<Duration>,
}

impl ShellCommand {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      working_directory: None,
      timeout: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
  pub stdout: String,
  pub exit_code: i32,
}

impl CommandOutput {
  pub fn success(stdout: impl Into<String>) -> Self {
    Self {
      stdout: stdout.into(),
      exit_code: 0,
    }
  }
}

/// A request to run a command document on remote targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendCommandRequest {
  pub document_name: String,
  /// Instance ids (string list) or target maps (map list).
  pub targets: serde_json::Value,
  /// Every other resolved property, keyed by entry name.
  pub options: BTreeMap<String, serde_json::Value>,
}

/// A request to run a script function through the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRequest {
  pub step_name: String,
  pub runtime: String,
  pub handler: String,
  /// Inline script source.
  pub script: Option<String>,
  pub payload: serde_json::Value,
}
