//! Local environment: runs shell commands on this host.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use stepdoc_bridge::{BridgeResponse, ScriptBridge};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::environment::Environment;
use crate::error::EnvironmentError;
use crate::request::{CommandOutput, ScriptRequest, ShellCommand};

#[derive(Debug, Clone)]
pub struct ShellConfig {
  /// Shell invoked as `<shell> -c <command>`.
  pub shell: PathBuf,
  /// Applied when a command carries no timeout of its own.
  pub default_timeout: Option<Duration>,
  /// Where inline scripts are written before being handed to the bridge.
  pub script_dir: PathBuf,
}

impl Default for ShellConfig {
  fn default() -> Self {
    Self {
      shell: PathBuf::from("bash"),
      default_timeout: None,
      script_dir: std::env::temp_dir(),
    }
  }
}

/// Runs shell commands through a local shell and scripts through a bridge.
///
/// `send_command` keeps the trait's default: there is no remote service
/// to reach from here.
pub struct ShellEnvironment {
  config: ShellConfig,
  bridge: Option<ScriptBridge>,
}

impl ShellEnvironment {
  pub fn new(config: ShellConfig) -> Self {
    Self {
      config,
      bridge: None,
    }
  }

  pub fn with_bridge(mut self, bridge: ScriptBridge) -> Self {
    self.bridge = Some(bridge);
    self
  }

  pub fn config(&self) -> &ShellConfig {
    &self.config
  }
}

#[async_trait]
impl Environment for ShellEnvironment {
  async fn run_shell_command(
    &mut self,
    command: ShellCommand,
  ) -> Result<CommandOutput, EnvironmentError> {
    let mut cmd = Command::new(&self.config.shell);
    cmd
      .arg("-c")
      .arg(&command.command)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    if let Some(dir) = &command.working_directory {
      cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|source| EnvironmentError::Io {
      operation: "run_shell_command",
      source,
    })?;

    let output = match command.timeout.or(self.config.default_timeout) {
      Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| EnvironmentError::Timeout {
          operation: "run_shell_command",
          timeout: limit,
        })?,
      None => child.wait_with_output().await,
    }
    .map_err(|source| EnvironmentError::Io {
      operation: "run_shell_command",
      source,
    })?;

    let exit_code = output.status.code().unwrap_or(-1);
    if exit_code != 0 {
      warn!(
        command = %command.command,
        exit_code,
        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
        "shell_command_failed"
      );
    } else {
      debug!(command = %command.command, "shell_command_succeeded");
    }

    Ok(CommandOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      exit_code,
    })
  }

  async fn sleep(&mut self, duration: Duration) -> Result<(), EnvironmentError> {
    tokio::time::sleep(duration).await;
    Ok(())
  }

  async fn execute_script(
    &mut self,
    request: ScriptRequest,
  ) -> Result<BridgeResponse, EnvironmentError> {
    let bridge = self.bridge.as_ref().ok_or(EnvironmentError::Unsupported {
      operation: "execute_script",
    })?;
    let source = request.script.as_ref().ok_or_else(|| EnvironmentError::Rejected {
      operation: "execute_script",
      message: format!("step '{}' has no inline script", request.step_name),
    })?;

    // Unique per call and removed when `script` drops, error paths included.
    let script = tempfile::Builder::new()
      .prefix("stepdoc-")
      .suffix(".py")
      .tempfile_in(&self.config.script_dir)
      .map_err(|source| EnvironmentError::Io {
        operation: "execute_script",
        source,
      })?;
    tokio::fs::write(script.path(), source)
      .await
      .map_err(|source| EnvironmentError::Io {
        operation: "execute_script",
        source,
      })?;
    debug!(step = %request.step_name, script = %script.path().display(), "script_written");

    let response = bridge
      .call(
        &script.path().to_string_lossy(),
        &request.handler,
        &request.payload,
      )
      .await?;
    Ok(response)
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  fn sh() -> ShellEnvironment {
    ShellEnvironment::new(ShellConfig {
      shell: PathBuf::from("sh"),
      ..Default::default()
    })
  }

  #[tokio::test]
  async fn test_runs_command_and_captures_stdout() {
    let mut env = sh();
    let out = env
      .run_shell_command(ShellCommand::new("echo hello"))
      .await
      .unwrap();

    assert_eq!(out.exit_code, 0);
    assert_eq!(out.stdout.trim(), "hello");
  }

  #[tokio::test]
  async fn test_reports_exit_code() {
    let mut env = sh();
    let out = env.run_shell_command(ShellCommand::new("exit 7")).await.unwrap();
    assert_eq!(out.exit_code, 7);
  }

  #[tokio::test]
  async fn test_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = sh();
    let mut command = ShellCommand::new("touch marker");
    command.working_directory = Some(dir.path().to_string_lossy().into_owned());

    env.run_shell_command(command).await.unwrap();
    assert!(dir.path().join("marker").exists());
  }

  #[tokio::test]
  async fn test_timeout() {
    let mut env = sh();
    let mut command = ShellCommand::new("sleep 5");
    command.timeout = Some(Duration::from_millis(100));

    let err = env.run_shell_command(command).await.unwrap_err();
    assert!(matches!(err, EnvironmentError::Timeout { .. }));
  }

  #[tokio::test]
  async fn test_scripts_need_a_bridge() {
    let mut env = sh();
    let err = env
      .execute_script(ScriptRequest {
        step_name: "Run".to_string(),
        runtime: "python3.8".to_string(),
        handler: "main".to_string(),
        script: Some("def main(e, c): return 1".to_string()),
        payload: serde_json::json!({}),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, EnvironmentError::Unsupported { .. }));
  }

  fn script_request(step_name: &str) -> ScriptRequest {
    ScriptRequest {
      step_name: step_name.to_string(),
      runtime: "python3.8".to_string(),
      handler: "main".to_string(),
      script: Some("def main(e, c): return 1".to_string()),
      payload: serde_json::json!({}),
    }
  }

  /// Environment whose bridge runs `entry` with `sh`, writing scripts into `script_dir`.
  fn bridged(entry: &str, dir: &tempfile::TempDir) -> ShellEnvironment {
    let entry_script = dir.path().join("entry.sh");
    std::fs::write(&entry_script, entry).unwrap();
    let script_dir = dir.path().join("scripts");
    std::fs::create_dir(&script_dir).unwrap();

    ShellEnvironment::new(ShellConfig {
      shell: PathBuf::from("sh"),
      script_dir,
      ..Default::default()
    })
    .with_bridge(ScriptBridge::new(stepdoc_bridge::BridgeConfig {
      interpreter: PathBuf::from("sh"),
      interpreter_args: Vec::new(),
      entry_script,
      timeout: None,
    }))
  }

  fn leftover_scripts(env: &ShellEnvironment) -> Vec<String> {
    std::fs::read_dir(&env.config().script_dir)
      .unwrap()
      .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
      .collect()
  }

  #[tokio::test]
  async fn test_inline_script_is_removed_after_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = bridged(
      r#"test -f "$1" || exit 9
echo '{"status": "SUCCESS", "Payload": 1}'
"#,
      &dir,
    );

    let response = env.execute_script(script_request("Run")).await.unwrap();

    assert_eq!(response.payload, serde_json::json!(1));
    assert!(leftover_scripts(&env).is_empty());
  }

  #[tokio::test]
  async fn test_inline_script_is_removed_after_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = bridged("exit 3\n", &dir);

    let err = env.execute_script(script_request("Run")).await.unwrap_err();

    assert!(matches!(err, EnvironmentError::Transport(_)));
    assert!(leftover_scripts(&env).is_empty());
  }

  #[tokio::test]
  async fn test_same_step_gets_distinct_script_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = bridged(r#"echo "{\"status\": \"SUCCESS\", \"Payload\": \"$1\"}""#, &dir);

    let first = env.execute_script(script_request("Run")).await.unwrap();
    let second = env.execute_script(script_request("Run")).await.unwrap();

    assert_ne!(first.payload, second.payload);
  }

  #[tokio::test]
  async fn test_send_command_unsupported() {
    let mut env = sh();
    let err = env
      .send_command(crate::SendCommandRequest {
        document_name: "doc".to_string(),
        targets: serde_json::json!(["i-1"]),
        options: Default::default(),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, EnvironmentError::Unsupported { operation: "send_command" }));
  }
}
