use std::collections::BTreeSet;

use serde_json::Value;
use stepdoc_config::DataType;

use crate::coerce::infer_type;
use crate::error::VariableError;
use crate::reference::ReferenceKey;
use crate::table::OutputTable;

const PLACEHOLDER: &str = "%s";

/// A typed value source held by a step property.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
  Literal(Literal),
  Template(Template),
  Reference(Reference),
}

/// A value known at definition time.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
  value: Value,
  data_type: DataType,
}

impl Literal {
  pub fn value(&self) -> &Value {
    &self.value
  }

  pub fn data_type(&self) -> DataType {
    self.data_type
  }
}

/// A `%s` format string over nested variables, substituted positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
  format: String,
  args: Vec<Variable>,
}

impl Template {
  pub fn format(&self) -> &str {
    &self.format
  }

  pub fn args(&self) -> &[Variable] {
    &self.args
  }
}

/// A pointer to a parameter or to an earlier step's output.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
  key: ReferenceKey,
  data_type: DataType,
}

impl Reference {
  pub fn key(&self) -> &ReferenceKey {
    &self.key
  }

  pub fn data_type(&self) -> DataType {
    self.data_type
  }
}

impl Variable {
  /// Literal whose type is inferred from the value.
  pub fn literal(value: impl Into<Value>) -> Result<Self, VariableError> {
    let value = value.into();
    let data_type = infer_type(&value).ok_or_else(|| VariableError::UnsupportedLiteral {
      value: value.to_string(),
    })?;
    Ok(Variable::Literal(Literal { value, data_type }))
  }

  pub fn string(value: impl Into<String>) -> Self {
    Variable::Literal(Literal {
      value: Value::String(value.into()),
      data_type: DataType::String,
    })
  }

  pub fn integer(value: i64) -> Self {
    Variable::Literal(Literal {
      value: Value::from(value),
      data_type: DataType::Integer,
    })
  }

  pub fn boolean(value: bool) -> Self {
    Variable::Literal(Literal {
      value: Value::Bool(value),
      data_type: DataType::Boolean,
    })
  }

  pub fn string_list<I, S>(items: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let items = items
      .into_iter()
      .map(|s| Value::String(s.into()))
      .collect();
    Variable::Literal(Literal {
      value: Value::Array(items),
      data_type: DataType::StringList,
    })
  }

  pub fn string_map(map: serde_json::Map<String, Value>) -> Self {
    Variable::Literal(Literal {
      value: Value::Object(map),
      data_type: DataType::StringMap,
    })
  }

  /// Template over `args`; the number of `%s` placeholders must match.
  pub fn format(format: impl Into<String>, args: Vec<Variable>) -> Result<Self, VariableError> {
    let format = format.into();
    let placeholders = format.matches(PLACEHOLDER).count();
    if placeholders != args.len() {
      return Err(VariableError::TemplateArity {
        format,
        placeholders,
        args: args.len(),
      });
    }
    Ok(Variable::Template(Template { format, args }))
  }

  /// Reference to a document parameter.
  pub fn parameter(name: impl Into<String>, data_type: DataType) -> Self {
    Self::reference(ReferenceKey::parameter(name), data_type)
  }

  /// Reference to another step's declared output.
  pub fn step_output(
    step: impl Into<String>,
    output: impl Into<String>,
    data_type: DataType,
  ) -> Self {
    Self::reference(ReferenceKey::step_output(step, output), data_type)
  }

  pub fn reference(key: ReferenceKey, data_type: DataType) -> Self {
    Variable::Reference(Reference { key, data_type })
  }

  pub fn data_type(&self) -> DataType {
    match self {
      Variable::Literal(literal) => literal.data_type,
      Variable::Template(_) => DataType::String,
      Variable::Reference(reference) => reference.data_type,
    }
  }

  /// Serialized form: the literal value, the interpolated template, or the
  /// reference placeholder.
  pub fn print(&self) -> Value {
    match self {
      Variable::Literal(literal) => literal.value.clone(),
      Variable::Template(template) => {
        let printed: Vec<Value> = template.args.iter().map(Variable::print).collect();
        Value::String(interpolate(&template.format, &printed))
      }
      Variable::Reference(reference) => Value::String(reference.key.placeholder()),
    }
  }

  /// Every reference this variable depends on, transitively.
  pub fn required_inputs(&self) -> BTreeSet<ReferenceKey> {
    let mut keys = BTreeSet::new();
    self.collect_required_inputs(&mut keys);
    keys
  }

  fn collect_required_inputs(&self, keys: &mut BTreeSet<ReferenceKey>) {
    match self {
      Variable::Literal(_) => {}
      Variable::Template(template) => {
        for arg in &template.args {
          arg.collect_required_inputs(keys);
        }
      }
      Variable::Reference(reference) => {
        keys.insert(reference.key.clone());
      }
    }
  }

  /// Every reference held by this variable, with its expected type.
  pub fn references(&self) -> Vec<&Reference> {
    match self {
      Variable::Literal(_) => Vec::new(),
      Variable::Template(template) => template.args.iter().flat_map(Variable::references).collect(),
      Variable::Reference(reference) => vec![reference],
    }
  }

  /// Resolve against the values captured so far in a simulation run.
  pub fn resolve(&self, table: &OutputTable) -> Result<Value, VariableError> {
    match self {
      Variable::Literal(literal) => Ok(literal.value.clone()),
      Variable::Template(template) => {
        let resolved = template
          .args
          .iter()
          .map(|arg| arg.resolve(table))
          .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::String(interpolate(&template.format, &resolved)))
      }
      Variable::Reference(reference) => {
        table
          .get(&reference.key)
          .cloned()
          .ok_or_else(|| VariableError::UnresolvedReference {
            key: reference.key.clone(),
          })
      }
    }
  }
}

/// Substitute each `%s` with the rendered value at the same position.
fn interpolate(format: &str, values: &[Value]) -> String {
  let mut pieces = format.split(PLACEHOLDER);
  let mut out = String::with_capacity(format.len());

  if let Some(first) = pieces.next() {
    out.push_str(first);
  }
  for (value, piece) in values.iter().zip(pieces) {
    match value {
      Value::String(s) => out.push_str(s),
      other => out.push_str(&other.to_string()),
    }
    out.push_str(piece);
  }

  out
}
