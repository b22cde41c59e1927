//! Property declarations and values.

use std::collections::BTreeSet;

use serde_json::Value;
use stepdoc_variable::{DataType, OutputTable, ReferenceKey, Variable, VariableError};

/// Whether a property holds one value or a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
  Single,
  /// Each element is its own variable of one of the property's types. A
  /// single `StringList` variable may stand in for the whole list.
  List,
}

/// Extra constraint checked on literal string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
  /// ISO-8601 duration, `PT#H#M#S`.
  IsoDuration,
}

/// Declaration of one property an action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
  pub name: &'static str,
  /// Key used in the serialized entry.
  pub entry_key: &'static str,
  pub types: &'static [DataType],
  pub required: bool,
  pub shape: PropertyShape,
  /// Non-empty when only these literal values are allowed.
  pub allowed_values: &'static [&'static str],
  pub format: Option<ValueFormat>,
  /// Entry key overrides keyed by the value's data type.
  pub typed_entry_keys: &'static [(DataType, &'static str)],
}

impl PropertySpec {
  pub(crate) const fn new(
    name: &'static str,
    entry_key: &'static str,
    types: &'static [DataType],
  ) -> Self {
    Self {
      name,
      entry_key,
      types,
      required: false,
      shape: PropertyShape::Single,
      allowed_values: &[],
      format: None,
      typed_entry_keys: &[],
    }
  }

  pub(crate) const fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub(crate) const fn list(mut self) -> Self {
    self.shape = PropertyShape::List;
    self
  }

  pub(crate) const fn allowed(mut self, values: &'static [&'static str]) -> Self {
    self.allowed_values = values;
    self
  }

  pub(crate) const fn formatted(mut self, format: ValueFormat) -> Self {
    self.format = Some(format);
    self
  }

  pub(crate) const fn keyed_by_type(mut self, keys: &'static [(DataType, &'static str)]) -> Self {
    self.typed_entry_keys = keys;
    self
  }

  /// Entry key for a value of `data_type`.
  pub fn entry_key_for(&self, data_type: DataType) -> &'static str {
    self
      .typed_entry_keys
      .iter()
      .find(|(t, _)| *t == data_type)
      .map(|(_, key)| *key)
      .unwrap_or(self.entry_key)
  }

  /// Human-readable description of the accepted types.
  pub(crate) fn expected(&self) -> String {
    let names: Vec<&str> = self.types.iter().map(|t| t.as_str()).collect();
    match self.shape {
      PropertyShape::Single => names.join(" or "),
      PropertyShape::List => format!("a list of {} or a StringList", names.join(" or ")),
    }
  }
}

/// The value bound to a step property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
  Single(Variable),
  List(Vec<Variable>),
}

impl PropertyValue {
  /// Data type used to pick the entry key. Lists count as `StringList`.
  pub fn data_type(&self) -> DataType {
    match self {
      PropertyValue::Single(variable) => variable.data_type(),
      PropertyValue::List(_) => DataType::StringList,
    }
  }

  pub fn print(&self) -> Value {
    match self {
      PropertyValue::Single(variable) => variable.print(),
      PropertyValue::List(items) => Value::Array(items.iter().map(Variable::print).collect()),
    }
  }

  pub fn required_inputs(&self) -> BTreeSet<ReferenceKey> {
    match self {
      PropertyValue::Single(variable) => variable.required_inputs(),
      PropertyValue::List(items) => items.iter().flat_map(Variable::required_inputs).collect(),
    }
  }

  pub fn resolve(&self, table: &OutputTable) -> Result<Value, VariableError> {
    match self {
      PropertyValue::Single(variable) => variable.resolve(table),
      PropertyValue::List(items) => items
        .iter()
        .map(|item| item.resolve(table))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array),
    }
  }

  pub fn variables(&self) -> &[Variable] {
    match self {
      PropertyValue::Single(variable) => std::slice::from_ref(variable),
      PropertyValue::List(items) => items,
    }
  }
}

impl From<Variable> for PropertyValue {
  fn from(variable: Variable) -> Self {
    PropertyValue::Single(variable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_list_prints_and_resolves_elementwise() {
    let value = PropertyValue::List(vec![
      Variable::string("mkdir asdf"),
      Variable::format("some %s string", vec![Variable::parameter("MyVar", DataType::String)])
        .unwrap(),
    ]);

    assert_eq!(value.print(), json!(["mkdir asdf", "some {{MyVar}} string"]));
    assert_eq!(
      value.required_inputs().into_iter().collect::<Vec<_>>(),
      vec![ReferenceKey::parameter("MyVar")]
    );

    let table = OutputTable::from_parameters([("MyVar", json!("amazing"))]);
    assert_eq!(
      value.resolve(&table).unwrap(),
      json!(["mkdir asdf", "some amazing string"])
    );
  }

  #[test]
  fn test_entry_key_for_type() {
    const KEYS: &[(DataType, &str)] = &[(DataType::MapList, "Targets")];
    let spec = PropertySpec::new("targets", "InstanceIds", &[DataType::StringList, DataType::MapList])
      .keyed_by_type(KEYS);

    assert_eq!(spec.entry_key_for(DataType::StringList), "InstanceIds");
    assert_eq!(spec.entry_key_for(DataType::MapList), "Targets");
  }
}
