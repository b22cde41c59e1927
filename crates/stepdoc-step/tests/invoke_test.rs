use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;
use stepdoc_environment::{BridgeResponse, MockEnvironment, ResponseCode};
use stepdoc_step::{OutputDescriptor, Step, StepAction};
use stepdoc_variable::{DataType, OutputTable, Variable};

fn shell_step() -> Step {
  Step::builder("MyShellScript", StepAction::RunShellScript)
    .input_list(
      "runCommand",
      vec![
        Variable::string("mkdir asdf"),
        Variable::format("some %s string", vec![Variable::parameter("MyVar", DataType::String)])
          .unwrap(),
      ],
    )
    .build()
    .unwrap()
}

#[tokio::test]
async fn test_shell_script_records_resolved_commands() {
  let step = shell_step();
  let table = OutputTable::from_parameters([("MyVar", json!("amazing"))]);
  let mut env = MockEnvironment::new();

  let resolved = step.resolve_inputs(&table).unwrap();
  let result = step.invoke(&resolved, &mut env).await;

  assert!(result.is_success());
  assert_eq!(env.previous_commands(), ["mkdir asdf", "some amazing string"]);
  assert_eq!(result.raw_result, json!({"Output": "", "ExitCode": 0}));
}

#[tokio::test]
async fn test_shell_script_stops_at_first_failure() {
  let step = Step::builder("S", StepAction::RunShellScript)
    .input_list(
      "runCommand",
      vec![
        Variable::string("echo one"),
        Variable::string("false"),
        Variable::string("echo never"),
      ],
    )
    .build()
    .unwrap();
  let mut env = MockEnvironment::new()
    .with_command_output("echo one", "one\n")
    .with_failing_command("false");

  let resolved = step.resolve_inputs(&OutputTable::new()).unwrap();
  let result = step.invoke(&resolved, &mut env).await;

  assert_eq!(result.response_code, ResponseCode::Failure);
  assert_eq!(result.raw_result, json!({"Output": "one\n", "ExitCode": 1}));
  assert_eq!(env.previous_commands(), ["echo one", "false"]);
}

#[tokio::test]
async fn test_run_command_sends_entry_keyed_options() {
  let step = Step::builder("A", StepAction::RunCommand)
    .input("documentName", Variable::string("AWS-RunShellScript"))
    .input("targets", Variable::string_list(["i-1", "i-2"]))
    .input("commandTimeoutSeconds", Variable::integer(30))
    .input("comment", Variable::string("hello"))
    .build()
    .unwrap();
  let mut env = MockEnvironment::new();

  let resolved = step.resolve_inputs(&OutputTable::new()).unwrap();
  let result = step.invoke(&resolved, &mut env).await;
  assert!(result.is_success());

  let sent = &env.sent_commands()[0];
  assert_eq!(sent.document_name, "AWS-RunShellScript");
  assert_eq!(sent.targets, json!(["i-1", "i-2"]));
  assert_eq!(
    sent.options,
    BTreeMap::from([
      ("Comment".to_string(), json!("hello")),
      ("TimeoutSeconds".to_string(), json!(30)),
    ])
  );

  let outputs = step.extract_outputs(&result.raw_result).unwrap();
  assert_eq!(outputs["CommandId"], json!("mock-command-1"));
}

#[tokio::test]
async fn test_run_command_status_and_errors_become_failures() {
  let step = Step::builder("A", StepAction::RunCommand)
    .input("documentName", Variable::string("doc"))
    .input("targets", Variable::string_list(["i-1"]))
    .build()
    .unwrap();
  let resolved = step.resolve_inputs(&OutputTable::new()).unwrap();

  let mut env = MockEnvironment::new()
    .with_send_command_response(json!({"CommandId": "c", "Status": "TimedOut"}))
    .with_send_command_error("throttled");

  let timed_out = step.invoke(&resolved, &mut env).await;
  assert!(!timed_out.is_success());
  assert_eq!(timed_out.raw_result["Status"], "TimedOut");

  let rejected = step.invoke(&resolved, &mut env).await;
  assert!(!rejected.is_success());
  assert_eq!(rejected.raw_result["Status"], "Failed");
}

#[tokio::test]
async fn test_sleep_uses_environment() {
  let step = Step::builder("Wait", StepAction::Sleep)
    .input("duration", Variable::string("PT1M5S"))
    .build()
    .unwrap();
  let mut env = MockEnvironment::new();

  let resolved = step.resolve_inputs(&OutputTable::new()).unwrap();
  let result = step.invoke(&resolved, &mut env).await;

  assert!(result.is_success());
  assert_eq!(env.sleeps(), [Duration::from_secs(65)]);
}

#[tokio::test]
async fn test_execute_script_payload_and_outputs() {
  let step = Step::builder("Run", StepAction::ExecuteScript)
    .input("runtime", Variable::string("python3.8"))
    .input("handler", Variable::string("main"))
    .input("script", Variable::string("def main(events, context):\n  return {'id': 'x'}"))
    .input(
      "inputPayload",
      Variable::literal(json!({"Name": "value"})).unwrap(),
    )
    .output(OutputDescriptor::new("Id", DataType::String, "$.Payload.id").unwrap())
    .build()
    .unwrap();
  let mut env = MockEnvironment::new().with_script_response(BridgeResponse::success(json!({"id": "x"})));

  let resolved = step.resolve_inputs(&OutputTable::new()).unwrap();
  let result = step.invoke(&resolved, &mut env).await;

  assert!(result.is_success());
  assert_eq!(result.raw_result, json!({"Payload": {"id": "x"}, "Status": "Success"}));
  assert_eq!(env.scripts()[0].payload, json!({"Name": "value"}));
  assert_eq!(env.scripts()[0].step_name, "Run");
  assert_eq!(step.extract_outputs(&result.raw_result).unwrap()["Id"], json!("x"));
}

#[tokio::test]
async fn test_execute_script_domain_failure() {
  let step = Step::builder("Run", StepAction::ExecuteScript)
    .input("runtime", Variable::string("python3.8"))
    .input("handler", Variable::string("main"))
    .build()
    .unwrap();
  let mut env = MockEnvironment::new().with_script_response(BridgeResponse::failure(json!("boom")));

  let resolved = step.resolve_inputs(&OutputTable::new()).unwrap();
  let result = step.invoke(&resolved, &mut env).await;

  assert_eq!(result.response_code, ResponseCode::Failure);
  assert_eq!(result.raw_result, json!({"Payload": "boom", "Status": "Failed"}));
}
