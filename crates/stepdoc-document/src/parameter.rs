use serde::Serialize;
use serde_json::Value;
use stepdoc_step::is_valid_name;
use stepdoc_variable::{DataType, coerce};

use crate::error::DocumentError;

/// A typed document input, referenced as `{{Name}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  name: String,
  data_type: DataType,
  description: Option<String>,
  default: Option<Value>,
  allowed_values: Vec<String>,
}

/// Serialized form of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterEntry {
  #[serde(rename = "type")]
  pub param_type: DataType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub allowed_values: Vec<String>,
}

impl Parameter {
  pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
    Self {
      name: name.into(),
      data_type,
      description: None,
      default: None,
      allowed_values: Vec::new(),
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_default(mut self, default: Value) -> Self {
    self.default = Some(default);
    self
  }

  pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.allowed_values = values.into_iter().map(Into::into).collect();
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn data_type(&self) -> DataType {
    self.data_type
  }

  pub fn default(&self) -> Option<&Value> {
    self.default.as_ref()
  }

  pub fn allowed_values(&self) -> &[String] {
    &self.allowed_values
  }

  /// Coerce a supplied value to this parameter's type and check it against
  /// the allowed values.
  pub fn accept(&self, value: &Value) -> Result<Value, String> {
    let coerced = coerce(value, self.data_type).map_err(|e| e.to_string())?;
    if let Some(text) = coerced.as_str() {
      if !self.allowed_values.is_empty() && !self.allowed_values.iter().any(|a| a == text) {
        return Err(format!(
          "'{text}' is not one of {}",
          self.allowed_values.join(", ")
        ));
      }
    }
    Ok(coerced)
  }

  /// Check the name and default, normalizing the default to the declared type.
  pub(crate) fn validated(mut self) -> Result<Self, DocumentError> {
    let invalid = |name: &str, reason: String| DocumentError::InvalidParameter {
      parameter: name.to_string(),
      reason,
    };

    if !is_valid_name(&self.name) {
      return Err(invalid(
        &self.name,
        "names may only contain ASCII letters, digits, '_' and '-'".to_string(),
      ));
    }
    if let Some(default) = &self.default {
      let coerced = self
        .accept(default)
        .map_err(|reason| invalid(&self.name, format!("default {reason}")))?;
      self.default = Some(coerced);
    }
    Ok(self)
  }

  pub fn to_entry(&self) -> ParameterEntry {
    ParameterEntry {
      param_type: self.data_type,
      description: self.description.clone(),
      default: self.default.clone(),
      allowed_values: self.allowed_values.clone(),
    }
  }
}
