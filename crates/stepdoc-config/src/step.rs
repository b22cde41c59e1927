use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::DataType;
use crate::variable::VariableDef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub name: String,
  /// Action discriminator, e.g. "aws:runShellScript".
  pub action: String,
  #[serde(default)]
  pub inputs: BTreeMap<String, VariableDef>,
  /// Author-declared outputs, only for actions that accept them.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub outputs: Vec<OutputDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
  pub name: String,
  #[serde(rename = "type")]
  pub output_type: DataType,
  pub selector: String,
}
