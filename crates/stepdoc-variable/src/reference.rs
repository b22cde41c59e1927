use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariableError;

/// Target of a reference: a document parameter or a step's declared output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceKey {
  Parameter(String),
  StepOutput { step: String, output: String },
}

impl ReferenceKey {
  pub fn parameter(name: impl Into<String>) -> Self {
    ReferenceKey::Parameter(name.into())
  }

  pub fn step_output(step: impl Into<String>, output: impl Into<String>) -> Self {
    ReferenceKey::StepOutput {
      step: step.into(),
      output: output.into(),
    }
  }

  /// The step this key points at, if any.
  pub fn step(&self) -> Option<&str> {
    match self {
      ReferenceKey::Parameter(_) => None,
      ReferenceKey::StepOutput { step, .. } => Some(step),
    }
  }

  /// Serialized placeholder, e.g. `{{Step.Output}}`.
  pub fn placeholder(&self) -> String {
    format!("{{{{{}}}}}", self)
  }
}

impl fmt::Display for ReferenceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReferenceKey::Parameter(name) => f.write_str(name),
      ReferenceKey::StepOutput { step, output } => write!(f, "{}.{}", step, output),
    }
  }
}

/// Parses `Name` as a parameter and `Step.Output` as a step output.
impl FromStr for ReferenceKey {
  type Err = VariableError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || VariableError::InvalidReference {
      reference: s.to_string(),
    };

    match s.split_once('.') {
      None if !s.is_empty() => Ok(ReferenceKey::parameter(s)),
      None => Err(invalid()),
      Some((step, output)) => {
        if step.is_empty() || output.is_empty() || output.contains('.') {
          return Err(invalid());
        }
        Ok(ReferenceKey::step_output(step, output))
      }
    }
  }
}
