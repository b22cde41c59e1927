use std::time::Duration;

use async_trait::async_trait;
use stepdoc_bridge::BridgeResponse;

use crate::error::EnvironmentError;
use crate::request::{CommandOutput, ScriptRequest, SendCommandRequest, ShellCommand};

/// One operation per supported step action.
///
/// Only shell commands are mandatory; the other operations default to
/// [`EnvironmentError::Unsupported`]. An environment is owned by a single
/// simulation run at a time, hence `&mut self`.
#[async_trait]
pub trait Environment: Send {
  /// Run one command line and report its output and exit code.
  async fn run_shell_command(
    &mut self,
    command: ShellCommand,
  ) -> Result<CommandOutput, EnvironmentError>;

  /// Send a command document to remote targets and return the service's record.
  async fn send_command(
    &mut self,
    _request: SendCommandRequest,
  ) -> Result<serde_json::Value, EnvironmentError> {
    Err(EnvironmentError::Unsupported {
      operation: "send_command",
    })
  }

  async fn sleep(&mut self, _duration: Duration) -> Result<(), EnvironmentError> {
    Err(EnvironmentError::Unsupported { operation: "sleep" })
  }

  /// Run a script function and return its bridge response.
  async fn execute_script(
    &mut self,
    _request: ScriptRequest,
  ) -> Result<BridgeResponse, EnvironmentError> {
    Err(EnvironmentError::Unsupported {
      operation: "execute_script",
    })
  }
}
