use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{DataType, DocumentType};
use crate::step::StepDef;

/// A document as written by its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDef {
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub document_type: DocumentType,
  /// Defaults to the document type's schema version.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub schema_version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assume_role: Option<String>,
  #[serde(default)]
  pub parameters: BTreeMap<String, ParameterDef>,
  /// Document outputs as `Step.Output` keys.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub outputs: Vec<String>,
  pub steps: Vec<StepDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDef {
  #[serde(rename = "type")]
  pub param_type: DataType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub allowed_values: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::variable::VariableDef;
  use serde_json::json;

  #[test]
  fn test_parse_minimal_document() {
    let def: DocumentDef = serde_json::from_value(json!({
      "steps": [
        { "name": "MyShellScript", "action": "aws:runShellScript", "inputs": { "runCommand": ["mkdir asdf"] } }
      ]
    }))
    .unwrap();

    assert_eq!(def.document_type, DocumentType::Command);
    assert_eq!(def.description, "");
    assert!(def.schema_version.is_none());
    assert!(def.parameters.is_empty());
    assert_eq!(def.steps.len(), 1);
    assert_eq!(def.steps[0].name, "MyShellScript");
    assert_eq!(
      def.steps[0].inputs["runCommand"],
      VariableDef::Literal(json!(["mkdir asdf"]))
    );
  }

  #[test]
  fn test_parse_full_document() {
    let def: DocumentDef = serde_json::from_value(json!({
      "description": "Restart the fleet",
      "documentType": "Automation",
      "schemaVersion": "0.3",
      "assumeRole": "{{AutomationAssumeRole}}",
      "parameters": {
        "Fleet": { "type": "StringList", "description": "Instances", "allowedValues": [] },
        "Retries": { "type": "Integer", "default": 3 }
      },
      "outputs": ["Run.CommandId"],
      "steps": [
        {
          "name": "Script",
          "action": "aws:executeScript",
          "inputs": { "runtime": "python3.8", "handler": "main" },
          "outputs": [{ "name": "Count", "type": "Integer", "selector": "$.Payload.count" }]
        }
      ]
    }))
    .unwrap();

    assert_eq!(def.document_type, DocumentType::Automation);
    assert_eq!(def.assume_role.as_deref(), Some("{{AutomationAssumeRole}}"));
    assert_eq!(def.parameters["Fleet"].param_type, DataType::StringList);
    assert_eq!(def.parameters["Retries"].default, Some(json!(3)));
    assert_eq!(def.outputs, vec!["Run.CommandId".to_string()]);
    assert_eq!(def.steps[0].outputs[0].output_type, DataType::Integer);
    assert_eq!(def.steps[0].outputs[0].selector, "$.Payload.count");
  }

  #[test]
  fn test_default_schema_versions() {
    assert_eq!(DocumentType::Command.default_schema_version(), "2.2");
    assert_eq!(DocumentType::Automation.default_schema_version(), "0.3");
  }
}
