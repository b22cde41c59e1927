//! Recording environment for simulations and tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use stepdoc_bridge::BridgeResponse;
use tracing::debug;

use crate::environment::Environment;
use crate::error::EnvironmentError;
use crate::request::{CommandOutput, ScriptRequest, SendCommandRequest, ShellCommand};

/// An environment that performs no side effects.
///
/// Every call is recorded in order. Shell commands succeed with empty output
/// unless configured otherwise; `send_command` answers with queued responses
/// and falls back to a deterministic successful record (`CommandId`
/// `mock-command-<n>`); scripts answer with queued bridge responses and fall
/// back to a successful `null` payload. Sleeps return immediately.
#[derive(Debug, Default)]
pub struct MockEnvironment {
  previous_commands: Vec<String>,
  sent_commands: Vec<SendCommandRequest>,
  sleeps: Vec<Duration>,
  scripts: Vec<ScriptRequest>,
  command_outputs: HashMap<String, CommandOutput>,
  failing_commands: HashSet<String>,
  send_command_responses: VecDeque<Result<serde_json::Value, String>>,
  script_responses: VecDeque<BridgeResponse>,
}

impl MockEnvironment {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer `command` with the given stdout and exit code 0.
  pub fn with_command_output(mut self, command: impl Into<String>, stdout: impl Into<String>) -> Self {
    self
      .command_outputs
      .insert(command.into(), CommandOutput::success(stdout));
    self
  }

  /// Make `command` exit with code 1.
  pub fn with_failing_command(mut self, command: impl Into<String>) -> Self {
    self.failing_commands.insert(command.into());
    self
  }

  /// Queue the record returned by the next `send_command` call.
  pub fn with_send_command_response(mut self, response: serde_json::Value) -> Self {
    self.send_command_responses.push_back(Ok(response));
    self
  }

  /// Queue a rejection for the next `send_command` call.
  pub fn with_send_command_error(mut self, message: impl Into<String>) -> Self {
    self.send_command_responses.push_back(Err(message.into()));
    self
  }

  /// Queue the response returned by the next `execute_script` call.
  pub fn with_script_response(mut self, response: BridgeResponse) -> Self {
    self.script_responses.push_back(response);
    self
  }

  /// Shell command lines in the order they were run.
  pub fn previous_commands(&self) -> &[String] {
    &self.previous_commands
  }

  pub fn sent_commands(&self) -> &[SendCommandRequest] {
    &self.sent_commands
  }

  pub fn sleeps(&self) -> &[Duration] {
    &self.sleeps
  }

  pub fn scripts(&self) -> &[ScriptRequest] {
    &self.scripts
  }

  /// True when nothing at all has been called.
  pub fn is_untouched(&self) -> bool {
    self.previous_commands.is_empty()
      && self.sent_commands.is_empty()
      && self.sleeps.is_empty()
      && self.scripts.is_empty()
  }
}

#[async_trait]
impl Environment for MockEnvironment {
  async fn run_shell_command(
    &mut self,
    command: ShellCommand,
  ) -> Result<CommandOutput, EnvironmentError> {
    debug!(command = %command.command, "mock_shell_command");
    self.previous_commands.push(command.command.clone());

    if self.failing_commands.contains(&command.command) {
      return Ok(CommandOutput {
        stdout: String::new(),
        exit_code: 1,
      });
    }

    Ok(
      self
        .command_outputs
        .get(&command.command)
        .cloned()
        .unwrap_or_else(|| CommandOutput::success("")),
    )
  }

  async fn send_command(
    &mut self,
    request: SendCommandRequest,
  ) -> Result<serde_json::Value, EnvironmentError> {
    debug!(document_name = %request.document_name, "mock_send_command");
    self.sent_commands.push(request);
    let sequence = self.sent_commands.len();

    match self.send_command_responses.pop_front() {
      Some(Ok(response)) => Ok(response),
      Some(Err(message)) => Err(EnvironmentError::Rejected {
        operation: "send_command",
        message,
      }),
      None => Ok(json!({
        "CommandId": format!("mock-command-{sequence}"),
        "Status": "Success",
        "ResponseCode": 0,
        "Output": "",
      })),
    }
  }

  async fn sleep(&mut self, duration: Duration) -> Result<(), EnvironmentError> {
    debug!(?duration, "mock_sleep");
    self.sleeps.push(duration);
    Ok(())
  }

  async fn execute_script(
    &mut self,
    request: ScriptRequest,
  ) -> Result<BridgeResponse, EnvironmentError> {
    debug!(handler = %request.handler, "mock_execute_script");
    self.scripts.push(request);
    Ok(
      self
        .script_responses
        .pop_front()
        .unwrap_or_else(|| BridgeResponse::success(serde_json::Value::Null)),
    )
  }
}
