//! Data type inference and coercion.
//!
//! Coercion is used in two places: extracting a declared output from a raw
//! invocation result, and accepting externally supplied parameter values.
//! Both accept a value when it already has the target shape, and a few
//! lossless conversions (`"42"` to `Integer`, `"TRUE"` to `Boolean`, `7` to
//! `String`).

use serde_json::Value;
use stepdoc_config::DataType;

use crate::error::CoercionError;

/// Infer the data type of a literal value.
///
/// Returns `None` for values with no matching type: null, non-integral
/// numbers, and lists mixing strings and maps. An empty list is a
/// `StringList`.
pub fn infer_type(value: &Value) -> Option<DataType> {
  match value {
    Value::String(_) => Some(DataType::String),
    Value::Bool(_) => Some(DataType::Boolean),
    Value::Number(n) if n.is_i64() || n.is_u64() => Some(DataType::Integer),
    Value::Object(_) => Some(DataType::StringMap),
    Value::Array(items) if items.iter().all(Value::is_string) => Some(DataType::StringList),
    Value::Array(items) if items.iter().all(Value::is_object) => Some(DataType::MapList),
    _ => None,
  }
}

/// Coerce a value to the given data type.
pub fn coerce(value: &Value, data_type: DataType) -> Result<Value, CoercionError> {
  let fail = || CoercionError {
    expected: data_type,
    value: value.clone(),
  };

  match data_type {
    DataType::String => match value {
      Value::String(_) => Ok(value.clone()),
      Value::Bool(b) => Ok(Value::String(b.to_string())),
      Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
      _ => Err(fail()),
    },

    DataType::Integer => match value {
      Value::Number(n) => {
        if let Some(i) = n.as_i64() {
          Ok(Value::from(i))
        } else {
          match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
            _ => Err(fail()),
          }
        }
      }
      Value::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| fail()),
      _ => Err(fail()),
    },

    DataType::Boolean => match value {
      Value::Bool(_) => Ok(value.clone()),
      Value::String(s) => match s.to_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(fail()),
      },
      _ => Err(fail()),
    },

    DataType::StringList => match value {
      Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
      _ => Err(fail()),
    },

    DataType::StringMap => match value {
      Value::Object(_) => Ok(value.clone()),
      _ => Err(fail()),
    },

    DataType::MapList => match value {
      Value::Array(items) if items.iter().all(Value::is_object) => Ok(value.clone()),
      _ => Err(fail()),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_infer_scalars() {
    assert_eq!(infer_type(&json!("x")), Some(DataType::String));
    assert_eq!(infer_type(&json!(42)), Some(DataType::Integer));
    assert_eq!(infer_type(&json!(true)), Some(DataType::Boolean));
  }

  #[test]
  fn test_infer_collections() {
    assert_eq!(infer_type(&json!(["a", "b"])), Some(DataType::StringList));
    assert_eq!(infer_type(&json!([])), Some(DataType::StringList));
    assert_eq!(infer_type(&json!({ "a": 1 })), Some(DataType::StringMap));
    assert_eq!(infer_type(&json!([{ "Key": "tag:Env" }])), Some(DataType::MapList));
  }

  #[test]
  fn test_infer_unsupported() {
    assert_eq!(infer_type(&json!(null)), None);
    assert_eq!(infer_type(&json!(1.5)), None);
    assert_eq!(infer_type(&json!(["a", { "b": 1 }])), None);
  }

  #[test]
  fn test_coerce_string() {
    assert_eq!(coerce(&json!("abc"), DataType::String).unwrap(), json!("abc"));
    assert_eq!(coerce(&json!(7), DataType::String).unwrap(), json!("7"));
    assert_eq!(coerce(&json!(false), DataType::String).unwrap(), json!("false"));
    assert!(coerce(&json!(["a"]), DataType::String).is_err());
  }

  #[test]
  fn test_coerce_integer() {
    assert_eq!(coerce(&json!(42), DataType::Integer).unwrap(), json!(42));
    assert_eq!(coerce(&json!("42"), DataType::Integer).unwrap(), json!(42));
    assert_eq!(coerce(&json!(3.0), DataType::Integer).unwrap(), json!(3));
    assert!(coerce(&json!(3.5), DataType::Integer).is_err());
  }

  #[test]
  fn test_coerce_invalid_integer() {
    let err = coerce(&json!("not a number"), DataType::Integer).unwrap_err();
    assert_eq!(err.expected, DataType::Integer);
    assert_eq!(err.value, json!("not a number"));
  }

  #[test]
  fn test_coerce_boolean() {
    assert_eq!(coerce(&json!(true), DataType::Boolean).unwrap(), json!(true));
    assert_eq!(coerce(&json!("TRUE"), DataType::Boolean).unwrap(), json!(true));
    assert_eq!(coerce(&json!("false"), DataType::Boolean).unwrap(), json!(false));
    assert!(coerce(&json!("yes"), DataType::Boolean).is_err());
  }

  #[test]
  fn test_coerce_collections() {
    assert!(coerce(&json!(["a", "b"]), DataType::StringList).is_ok());
    assert!(coerce(&json!(["a", 1]), DataType::StringList).is_err());
    assert!(coerce(&json!({ "k": "v" }), DataType::StringMap).is_ok());
    assert!(coerce(&json!("k=v"), DataType::StringMap).is_err());
    assert!(coerce(&json!([{ "k": "v" }]), DataType::MapList).is_ok());
    assert!(coerce(&json!(["k"]), DataType::MapList).is_err());
  }
}
