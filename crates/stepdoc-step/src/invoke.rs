//! Maps a step action onto its environment call.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Value, json};
use stepdoc_environment::{
  BridgeStatus, Environment, InvocationResult, ScriptRequest, SendCommandRequest, ShellCommand,
};
use tracing::{debug, warn};

use crate::action::{StepAction, parse_duration};

type Resolved = BTreeMap<String, Value>;

pub(crate) async fn invoke(
  action: StepAction,
  step: &str,
  resolved: &Resolved,
  env: &mut dyn Environment,
) -> InvocationResult {
  match action {
    StepAction::RunShellScript => run_shell_script(step, resolved, env).await,
    StepAction::RunCommand => run_command(step, resolved, env).await,
    StepAction::Sleep => sleep(step, resolved, env).await,
    StepAction::ExecuteScript => execute_script(step, resolved, env).await,
  }
}

fn string_input<'a>(resolved: &'a Resolved, property: &str) -> Option<&'a str> {
  resolved.get(property).and_then(Value::as_str)
}

fn error_result(message: impl Into<String>) -> InvocationResult {
  InvocationResult::failure(json!({ "Error": message.into() }))
}

async fn run_shell_script(
  step: &str,
  resolved: &Resolved,
  env: &mut dyn Environment,
) -> InvocationResult {
  let Some(commands) = resolved.get("runCommand").and_then(Value::as_array) else {
    return error_result("runCommand is not a list of strings");
  };
  let working_directory = string_input(resolved, "workingDirectory").map(str::to_string);
  let timeout = resolved
    .get("timeoutSeconds")
    .and_then(Value::as_u64)
    .map(Duration::from_secs);

  let mut output = String::new();
  for command in commands {
    let Some(command) = command.as_str() else {
      return error_result(format!("command {command} is not a string"));
    };

    let result = env
      .run_shell_command(ShellCommand {
        command: command.to_string(),
        working_directory: working_directory.clone(),
        timeout,
      })
      .await;

    match result {
      Ok(out) => {
        output.push_str(&out.stdout);
        if out.exit_code != 0 {
          warn!(step, command, exit_code = out.exit_code, "shell_command_nonzero_exit");
          return InvocationResult::failure(json!({
            "Output": output,
            "ExitCode": out.exit_code,
          }));
        }
      }
      Err(e) => {
        warn!(step, command, error = %e, "shell_command_error");
        return InvocationResult::failure(json!({
          "Output": output,
          "Error": e.to_string(),
        }));
      }
    }
  }

  InvocationResult::success(json!({ "Output": output, "ExitCode": 0 }))
}

async fn run_command(step: &str, resolved: &Resolved, env: &mut dyn Environment) -> InvocationResult {
  let Some(document_name) = string_input(resolved, "documentName") else {
    return error_result("documentName is not a string");
  };
  let targets = resolved.get("targets").cloned().unwrap_or(Value::Null);

  let options = StepAction::RunCommand
    .properties()
    .iter()
    .filter(|spec| !matches!(spec.name, "documentName" | "targets"))
    .filter_map(|spec| {
      resolved
        .get(spec.name)
        .map(|value| (spec.entry_key.to_string(), value.clone()))
    })
    .collect();

  let request = SendCommandRequest {
    document_name: document_name.to_string(),
    targets,
    options,
  };

  match env.send_command(request).await {
    Ok(record) => {
      let status = record.get("Status").and_then(Value::as_str);
      match status {
        Some(status) if status != "Success" => {
          warn!(step, status, "run_command_not_successful");
          InvocationResult::failure(record)
        }
        _ => InvocationResult::success(record),
      }
    }
    Err(e) => {
      warn!(step, error = %e, "run_command_error");
      InvocationResult::failure(json!({ "Error": e.to_string(), "Status": "Failed" }))
    }
  }
}

async fn sleep(step: &str, resolved: &Resolved, env: &mut dyn Environment) -> InvocationResult {
  let Some(text) = string_input(resolved, "duration") else {
    return error_result("duration is not a string");
  };
  let Some(duration) = parse_duration(text) else {
    return error_result(format!("'{text}' is not an ISO-8601 duration"));
  };

  debug!(step, ?duration, "sleeping");
  match env.sleep(duration).await {
    Ok(()) => InvocationResult::success(json!({})),
    Err(e) => error_result(e.to_string()),
  }
}

async fn execute_script(
  step: &str,
  resolved: &Resolved,
  env: &mut dyn Environment,
) -> InvocationResult {
  let (Some(runtime), Some(handler)) = (
    string_input(resolved, "runtime"),
    string_input(resolved, "handler"),
  ) else {
    return error_result("runtime and handler must be strings");
  };

  let request = ScriptRequest {
    step_name: step.to_string(),
    runtime: runtime.to_string(),
    handler: handler.to_string(),
    script: string_input(resolved, "script").map(str::to_string),
    payload: resolved
      .get("inputPayload")
      .cloned()
      .unwrap_or_else(|| json!({})),
  };

  match env.execute_script(request).await {
    Ok(response) => {
      let status = match response.status {
        BridgeStatus::Success => "Success",
        BridgeStatus::Failure => "Failed",
      };
      let success = response.is_success();
      let raw = json!({ "Payload": response.payload, "Status": status });
      if success {
        InvocationResult::success(raw)
      } else {
        warn!(step, "script_reported_failure");
        InvocationResult::failure(raw)
      }
    }
    Err(e) => {
      warn!(step, error = %e, "script_transport_error");
      InvocationResult::failure(json!({ "Error": e.to_string(), "Status": "Failed" }))
    }
  }
}
