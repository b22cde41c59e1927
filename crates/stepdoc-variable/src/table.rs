use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::VariableError;
use crate::reference::ReferenceKey;

/// Values available to references during a simulation run.
///
/// Seeded with parameter values, then extended with each executed step's
/// outputs. Keys are written once and never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
  values: BTreeMap<ReferenceKey, Value>,
}

impl OutputTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a table holding only parameter values.
  pub fn from_parameters<I, K>(parameters: I) -> Self
  where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
  {
    let values = parameters
      .into_iter()
      .map(|(name, value)| (ReferenceKey::parameter(name), value))
      .collect();
    Self { values }
  }

  /// Insert a value, failing if the key is already present.
  pub fn insert(&mut self, key: ReferenceKey, value: Value) -> Result<(), VariableError> {
    if self.values.contains_key(&key) {
      return Err(VariableError::AlreadyWritten { key });
    }
    self.values.insert(key, value);
    Ok(())
  }

  pub fn get(&self, key: &ReferenceKey) -> Option<&Value> {
    self.values.get(key)
  }

  pub fn contains(&self, key: &ReferenceKey) -> bool {
    self.values.contains_key(key)
  }

  /// Flatten to a JSON object keyed by the reference's printed form.
  pub fn to_json(&self) -> Value {
    let map: serde_json::Map<String, Value> = self
      .values
      .iter()
      .map(|(key, value)| (key.to_string(), value.clone()))
      .collect();
    Value::Object(map)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_insert_is_write_once() {
    let mut table = OutputTable::new();
    let key = ReferenceKey::step_output("A", "CommandId");

    table.insert(key.clone(), json!("cmd-1")).unwrap();
    let err = table.insert(key.clone(), json!("cmd-2")).unwrap_err();

    assert_eq!(err, VariableError::AlreadyWritten { key: key.clone() });
    assert_eq!(table.get(&key), Some(&json!("cmd-1")));
  }

  #[test]
  fn test_from_parameters() {
    let table = OutputTable::from_parameters([("MyVar", json!("amazing"))]);
    assert_eq!(
      table.get(&ReferenceKey::parameter("MyVar")),
      Some(&json!("amazing"))
    );
    assert!(table.contains(&ReferenceKey::parameter("MyVar")));
    assert!(!table.contains(&ReferenceKey::step_output("MyVar", "Out")));
  }

  #[test]
  fn test_to_json() {
    let mut table = OutputTable::from_parameters([("P", json!(1))]);
    table
      .insert(ReferenceKey::step_output("A", "Out"), json!("x"))
      .unwrap();

    assert_eq!(table.to_json(), json!({ "P": 1, "A.Out": "x" }));
  }
}
