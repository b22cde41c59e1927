use std::collections::BTreeMap;

use serde::Serialize;
use stepdoc_config::DocumentType;
use stepdoc_step::{Step, StepEntry};
use stepdoc_variable::ReferenceKey;

use crate::error::DocumentError;
use crate::parameter::{Parameter, ParameterEntry};

/// A validated, immutable document.
///
/// Every step-output reference targets a strictly earlier step and an output
/// that step declares; every parameter reference names a declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub(crate) description: String,
  pub(crate) document_type: DocumentType,
  pub(crate) schema_version: String,
  pub(crate) assume_role: Option<String>,
  pub(crate) parameters: BTreeMap<String, Parameter>,
  pub(crate) outputs: Vec<ReferenceKey>,
  pub(crate) steps: Vec<Step>,
}

/// The JSON shape consumed by the execution service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDocument {
  pub description: String,
  pub schema_version: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assume_role: Option<String>,
  pub parameters: BTreeMap<String, ParameterEntry>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub outputs: Vec<String>,
  pub main_steps: Vec<StepEntry>,
}

impl Document {
  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn document_type(&self) -> DocumentType {
    self.document_type
  }

  pub fn schema_version(&self) -> &str {
    &self.schema_version
  }

  pub fn assume_role(&self) -> Option<&str> {
    self.assume_role.as_deref()
  }

  pub fn parameters(&self) -> &BTreeMap<String, Parameter> {
    &self.parameters
  }

  /// Document-level outputs, each a `Step.Output` key.
  pub fn outputs(&self) -> &[ReferenceKey] {
    &self.outputs
  }

  /// Steps in declaration (and execution) order.
  pub fn steps(&self) -> &[Step] {
    &self.steps
  }

  pub fn step(&self, name: &str) -> Option<&Step> {
    self.steps.iter().find(|s| s.name() == name)
  }

  pub fn to_serialized(&self) -> SerializedDocument {
    SerializedDocument {
      description: self.description.clone(),
      schema_version: self.schema_version.clone(),
      assume_role: self.assume_role.clone(),
      parameters: self
        .parameters
        .iter()
        .map(|(name, parameter)| (name.clone(), parameter.to_entry()))
        .collect(),
      outputs: self.outputs.iter().map(ReferenceKey::to_string).collect(),
      main_steps: self.steps.iter().map(Step::to_entry).collect(),
    }
  }

  /// Pretty-printed JSON with sorted keys. Printing twice yields identical
  /// bytes.
  pub fn print(&self) -> Result<String, DocumentError> {
    // Going through `Value` sorts struct fields along with map keys.
    let value = serde_json::to_value(self.to_serialized())?;
    Ok(serde_json::to_string_pretty(&value)?)
  }
}
