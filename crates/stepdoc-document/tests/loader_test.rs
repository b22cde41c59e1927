use serde_json::json;
use stepdoc_config::DocumentDef;
use stepdoc_document::{DocumentError, load_document};
use stepdoc_step::StepError;
use stepdoc_variable::{DataType, ReferenceKey};

fn def(value: serde_json::Value) -> DocumentDef {
  serde_json::from_value(value).unwrap()
}

#[test]
fn test_loads_shell_script_document() {
  let document = load_document(def(json!({
    "description": "demo",
    "parameters": { "MyVar": { "type": "String" } },
    "steps": [
      {
        "name": "MyShellScript",
        "action": "aws:runShellScript",
        "inputs": {
          "runCommand": ["mkdir asdf", { "format": "some %s string", "args": [{ "ref": "MyVar" }] }]
        }
      }
    ]
  })))
  .unwrap();

  let entry = serde_json::to_value(document.steps()[0].to_entry()).unwrap();
  assert_eq!(
    entry,
    json!({
      "action": "aws:runShellScript",
      "inputs": { "runCommand": ["mkdir asdf", "some {{MyVar}} string"] },
      "name": "MyShellScript"
    })
  );
  assert_eq!(document.parameters()["MyVar"].data_type(), DataType::String);
}

#[test]
fn test_reference_types_come_from_targets() {
  let document = load_document(def(json!({
    "outputs": ["A.CommandId"],
    "steps": [
      { "name": "A", "action": "aws:runCommand",
        "inputs": { "documentName": "AWS-RunShellScript", "targets": ["i-1"] } },
      { "name": "B", "action": "aws:runCommand",
        "inputs": { "documentName": { "ref": "A.CommandId" }, "targets": ["i-2"],
                    "commandTimeoutSeconds": { "ref": "A.ResponseCode" } } }
    ]
  })))
  .unwrap();

  assert_eq!(document.outputs(), [ReferenceKey::step_output("A", "CommandId")]);
  assert_eq!(document.steps()[1].list_required_inputs().len(), 2);
}

#[test]
fn test_forward_reference_reported() {
  let err = load_document(def(json!({
    "steps": [
      { "name": "B", "action": "aws:runShellScript",
        "inputs": { "runCommand": [{ "format": "echo %s", "args": [{ "ref": "A.CommandId" }] }] } },
      { "name": "A", "action": "aws:runCommand",
        "inputs": { "documentName": "doc", "targets": ["i-1"] } }
    ]
  })))
  .unwrap_err();

  assert!(matches!(
    err,
    DocumentError::ForwardReference { ref step, ref target } if step == "B" && target == "A"
  ));
}

#[test]
fn test_execute_script_outputs() {
  let document = load_document(def(json!({
    "documentType": "Automation",
    "steps": [
      { "name": "Run", "action": "aws:executeScript",
        "inputs": { "runtime": "python3.8", "handler": "main", "script": "def main(e, c): ..." },
        "outputs": [{ "name": "Id", "type": "String", "selector": "$.Payload.id" }] },
      { "name": "Use", "action": "aws:runShellScript",
        "inputs": { "runCommand": [{ "format": "echo %s", "args": [{ "ref": "Run.Id" }] }] } }
    ]
  })))
  .unwrap();

  assert_eq!(document.schema_version(), "0.3");
  assert_eq!(document.step("Run").unwrap().list_outputs().len(), 1);
}

#[test]
fn test_definition_errors() {
  let err = load_document(def(json!({ "steps": [] }))).unwrap_err();
  assert!(matches!(err, DocumentError::EmptyDocument));

  let err = load_document(def(json!({
    "steps": [{ "name": "A", "action": "aws:approve" }]
  })))
  .unwrap_err();
  assert!(matches!(err, DocumentError::Step(StepError::UnknownAction { .. })));

  let err = load_document(def(json!({
    "steps": [{ "name": "Run", "action": "aws:executeScript",
      "inputs": { "runtime": "python3.8", "handler": "main" },
      "outputs": [{ "name": "X", "type": "String", "selector": "$..x" }] }]
  })))
  .unwrap_err();
  assert!(matches!(err, DocumentError::Selector { .. }));

  let err = load_document(def(json!({
    "steps": [{ "name": "S", "action": "aws:runShellScript",
      "inputs": { "runCommand": [{ "format": "%s %s", "args": ["one"] }] } }]
  })))
  .unwrap_err();
  assert!(matches!(err, DocumentError::Variable { ref property, .. } if property == "runCommand"));

  let err = load_document(def(json!({
    "steps": [{ "name": "A", "action": "aws:runCommand",
      "inputs": { "documentName": "doc", "targets": ["i-1"] },
      "outputs": [{ "name": "X", "type": "String", "selector": "$.X" }] }]
  })))
  .unwrap_err();
  assert!(matches!(
    err,
    DocumentError::Step(StepError::CustomOutputsUnsupported { .. })
  ));

  let err = load_document(def(json!({
    "parameters": { "Count": { "type": "Integer", "default": "lots" } },
    "steps": [{ "name": "W", "action": "aws:sleep", "inputs": { "duration": "PT1S" } }]
  })))
  .unwrap_err();
  assert!(matches!(err, DocumentError::InvalidParameter { .. }));
}
