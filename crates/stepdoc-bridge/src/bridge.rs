//! Interpreter process bridge.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error, info, instrument};

use crate::error::TransportError;
use crate::response::{BridgeResponse, parse_output};

/// Configuration for the interpreter process.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
  /// Interpreter executable.
  pub interpreter: PathBuf,
  /// Arguments passed before the entry script.
  pub interpreter_args: Vec<String>,
  /// Script that dispatches `(script, function, argument)` and prints the response.
  pub entry_script: PathBuf,
  /// Upper bound for one call. `None` waits indefinitely.
  pub timeout: Option<Duration>,
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      interpreter: PathBuf::from("python3"),
      interpreter_args: vec!["-u".to_string()],
      entry_script: PathBuf::from("script_entry.py"),
      timeout: None,
    }
  }
}

/// Calls functions in external scripts through an interpreter process.
#[derive(Debug, Clone)]
pub struct ScriptBridge {
  config: BridgeConfig,
}

impl ScriptBridge {
  pub fn new(config: BridgeConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &BridgeConfig {
    &self.config
  }

  /// Run `function_name` from `script_location` with `argument`.
  ///
  /// A `FAILURE` status is returned as `Ok`; only transport problems are
  /// errors.
  #[instrument(
    name = "bridge_call",
    skip(self, argument),
    fields(interpreter = %self.config.interpreter.display())
  )]
  pub async fn call(
    &self,
    script_location: &str,
    function_name: &str,
    argument: &serde_json::Value,
  ) -> Result<BridgeResponse, TransportError> {
    let encoded = serde_json::to_string(argument)
      .map_err(|source| TransportError::ArgumentEncoding { source })?;

    let mut cmd = Command::new(&self.config.interpreter);
    cmd
      .args(&self.config.interpreter_args)
      .arg(&self.config.entry_script)
      .arg(script_location)
      .arg(function_name)
      .arg(&encoded)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| TransportError::Spawn {
      interpreter: self.config.interpreter.display().to_string(),
      source,
    })?;

    let output = match self.config.timeout {
      Some(duration) => match tokio::time::timeout(duration, child.wait_with_output()).await {
        Ok(result) => result,
        Err(_) => {
          error!(timeout = ?duration, "bridge_call_timed_out");
          return Err(TransportError::Timeout(duration));
        }
      },
      None => child.wait_with_output().await,
    }
    .map_err(|source| TransportError::Wait {
      interpreter: self.config.interpreter.display().to_string(),
      source,
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stderr.trim().is_empty() {
      debug!(stderr = %stderr.trim(), "bridge stderr");
    }

    if !output.status.success() {
      error!(exit_code = ?output.status.code(), "bridge_process_failed");
      return Err(TransportError::ProcessFailed {
        exit_code: output.status.code(),
        stderr,
      });
    }

    let response = parse_output(&String::from_utf8_lossy(&output.stdout))?;
    info!(status = ?response.status, "bridge_call_completed");

    Ok(response)
  }
}
