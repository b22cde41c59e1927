use serde::Serialize;
use serde_json::Value;
use stepdoc_variable::{DataType, coerce};

use crate::error::{ExtractError, SelectorError};
use crate::selector::Selector;

/// A named, typed value extracted from a step's raw result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
  name: String,
  output_type: DataType,
  selector: Selector,
}

impl OutputDescriptor {
  pub fn new(
    name: impl Into<String>,
    output_type: DataType,
    selector: &str,
  ) -> Result<Self, SelectorError> {
    Ok(Self {
      name: name.into(),
      output_type,
      selector: Selector::parse(selector)?,
    })
  }

  /// Output read from the top-level field of the same name.
  pub(crate) fn top_level(name: &str, output_type: DataType) -> Self {
    Self {
      name: name.to_string(),
      output_type,
      selector: Selector::field(name),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn output_type(&self) -> DataType {
    self.output_type
  }

  pub fn selector(&self) -> &Selector {
    &self.selector
  }

  /// Select and coerce this output's value from `raw`.
  pub fn extract(&self, raw: &Value) -> Result<Value, ExtractError> {
    let selected = self
      .selector
      .select(raw)
      .ok_or_else(|| ExtractError::SelectorNotFound {
        output: self.name.clone(),
        selector: self.selector.to_string(),
      })?;

    coerce(selected, self.output_type).map_err(|source| ExtractError::TypeCoercion {
      output: self.name.clone(),
      source,
    })
  }

  pub fn to_entry(&self) -> OutputEntry {
    OutputEntry {
      name: self.name.clone(),
      selector: self.selector.to_string(),
      output_type: self.output_type,
    }
  }
}

/// Serialized form of an author-declared output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEntry {
  #[serde(rename = "Name")]
  pub name: String,
  #[serde(rename = "Selector")]
  pub selector: String,
  #[serde(rename = "Type")]
  pub output_type: DataType,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_extract_and_coerce() {
    let raw = json!({"Payload": {"count": "42", "names": ["a", "b"]}});

    let count = OutputDescriptor::new("Count", DataType::Integer, "$.Payload.count").unwrap();
    assert_eq!(count.extract(&raw).unwrap(), json!(42));

    let names = OutputDescriptor::new("Names", DataType::StringList, "$.Payload.names").unwrap();
    assert_eq!(names.extract(&raw).unwrap(), json!(["a", "b"]));
  }

  #[test]
  fn test_selector_not_found() {
    let output = OutputDescriptor::new("Id", DataType::String, "$.Payload.id").unwrap();
    let err = output.extract(&json!({"Payload": {}})).unwrap_err();

    assert_eq!(
      err,
      ExtractError::SelectorNotFound {
        output: "Id".to_string(),
        selector: "$.Payload.id".to_string(),
      }
    );
  }

  #[test]
  fn test_type_coercion_failure() {
    let output = OutputDescriptor::new("Count", DataType::Integer, "$.count").unwrap();
    let err = output.extract(&json!({"count": "many"})).unwrap_err();
    assert!(matches!(err, ExtractError::TypeCoercion { ref output, .. } if output == "Count"));
  }

  #[test]
  fn test_entry_shape() {
    let output = OutputDescriptor::new("Id", DataType::String, "$.Payload.id").unwrap();
    assert_eq!(
      serde_json::to_value(output.to_entry()).unwrap(),
      json!({"Name": "Id", "Selector": "$.Payload.id", "Type": "String"})
    );
  }
}
