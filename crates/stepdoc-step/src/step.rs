use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use serde_json::Value;
use stepdoc_environment::{Environment, InvocationResult};
use stepdoc_variable::{DataType, OutputTable, ReferenceKey, Variable};
use tracing::debug;

use crate::action::{StepAction, parse_duration};
use crate::error::StepError;
use crate::invoke::invoke;
use crate::output::{OutputDescriptor, OutputEntry};
use crate::property::{PropertyShape, PropertySpec, PropertyValue, ValueFormat};

/// Whether `name` can be used for a step or parameter.
///
/// Names must be non-empty and use only ASCII alphanumerics, `_` and `-`, so
/// `{{Step.Output}}` tokens split unambiguously.
pub fn is_valid_name(name: &str) -> bool {
  !name.is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A validated, immutable step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
  name: String,
  action: StepAction,
  inputs: BTreeMap<String, PropertyValue>,
  outputs: Vec<OutputDescriptor>,
}

/// The serialized form of a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepEntry {
  pub name: String,
  pub action: String,
  /// Entry key to printed value. Unset optional properties are absent.
  pub inputs: BTreeMap<String, Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub outputs: Option<Vec<OutputEntry>>,
}

impl Step {
  pub fn builder(name: impl Into<String>, action: StepAction) -> StepBuilder {
    StepBuilder {
      name: name.into(),
      action,
      inputs: Vec::new(),
      outputs: Vec::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn action(&self) -> StepAction {
    self.action
  }

  pub fn inputs(&self) -> &BTreeMap<String, PropertyValue> {
    &self.inputs
  }

  pub fn list_outputs(&self) -> &[OutputDescriptor] {
    &self.outputs
  }

  pub fn output(&self, name: &str) -> Option<&OutputDescriptor> {
    self.outputs.iter().find(|o| o.name() == name)
  }

  /// Every reference this step's inputs depend on.
  pub fn list_required_inputs(&self) -> BTreeSet<ReferenceKey> {
    self
      .inputs
      .values()
      .flat_map(PropertyValue::required_inputs)
      .collect()
  }

  pub fn to_entry(&self) -> StepEntry {
    let inputs = self
      .inputs
      .iter()
      .map(|(property, value)| {
        let key = self
          .action
          .property(property)
          .map(|spec| spec.entry_key_for(value.data_type()).to_string())
          .unwrap_or_else(|| property.clone());
        (key, value.print())
      })
      .collect();

    let outputs = (self.action.accepts_custom_outputs() && !self.outputs.is_empty())
      .then(|| self.outputs.iter().map(OutputDescriptor::to_entry).collect());

    StepEntry {
      name: self.name.clone(),
      action: self.action.name().to_string(),
      inputs,
      outputs,
    }
  }

  /// Resolve every input against `table`, keyed by property name.
  pub fn resolve_inputs(&self, table: &OutputTable) -> Result<BTreeMap<String, Value>, StepError> {
    self
      .inputs
      .iter()
      .map(|(property, value)| {
        value
          .resolve(table)
          .map(|resolved| (property.clone(), resolved))
          .map_err(|source| StepError::Resolution {
            step: self.name.clone(),
            property: property.clone(),
            source,
          })
      })
      .collect()
  }

  /// Run the action against `env`.
  ///
  /// Environment errors are reported as a `Failure` result, never as `Err`.
  pub async fn invoke(
    &self,
    resolved: &BTreeMap<String, Value>,
    env: &mut dyn Environment,
  ) -> InvocationResult {
    debug!(step = %self.name, action = %self.action, "invoking_step");
    invoke(self.action, &self.name, resolved, env).await
  }

  /// Apply every output descriptor to `raw`.
  pub fn extract_outputs(&self, raw: &Value) -> Result<BTreeMap<String, Value>, StepError> {
    self
      .outputs
      .iter()
      .map(|output| {
        output
          .extract(raw)
          .map(|value| (output.name().to_string(), value))
          .map_err(|source| StepError::Extraction {
            step: self.name.clone(),
            source,
          })
      })
      .collect()
  }
}

/// Collects a step's properties and outputs; `build` validates them.
#[derive(Debug, Clone)]
pub struct StepBuilder {
  name: String,
  action: StepAction,
  inputs: Vec<(String, PropertyValue)>,
  outputs: Vec<OutputDescriptor>,
}

impl StepBuilder {
  pub fn input(mut self, property: impl Into<String>, variable: Variable) -> Self {
    self
      .inputs
      .push((property.into(), PropertyValue::Single(variable)));
    self
  }

  pub fn input_list(mut self, property: impl Into<String>, items: Vec<Variable>) -> Self {
    self.inputs.push((property.into(), PropertyValue::List(items)));
    self
  }

  pub fn output(mut self, output: OutputDescriptor) -> Self {
    self.outputs.push(output);
    self
  }

  pub fn build(self) -> Result<Step, StepError> {
    let StepBuilder {
      name,
      action,
      inputs: raw_inputs,
      outputs: declared_outputs,
    } = self;

    if !is_valid_name(&name) {
      return Err(StepError::InvalidStepName { name });
    }

    let mut inputs = BTreeMap::new();
    for (property, value) in raw_inputs {
      let spec = action
        .property(&property)
        .ok_or_else(|| StepError::UnknownProperty {
          step: name.clone(),
          property: property.clone(),
        })?;
      if inputs.contains_key(&property) {
        return Err(StepError::DuplicateProperty {
          step: name,
          property,
        });
      }
      check_type(&name, spec, &value)?;
      check_literals(&name, spec, &value)?;
      inputs.insert(property, value);
    }

    if let Some(missing) = action
      .properties()
      .iter()
      .find(|spec| spec.required && !inputs.contains_key(spec.name))
    {
      return Err(StepError::MissingRequiredProperty {
        step: name,
        property: missing.name.to_string(),
      });
    }

    let outputs = if action.accepts_custom_outputs() {
      let mut seen = HashSet::new();
      for output in &declared_outputs {
        if !seen.insert(output.name()) {
          return Err(StepError::DuplicateOutput {
            step: name,
            output: output.name().to_string(),
          });
        }
      }
      declared_outputs
    } else if declared_outputs.is_empty() {
      action.fixed_outputs()
    } else {
      return Err(StepError::CustomOutputsUnsupported {
        step: name,
        action: action.name().to_string(),
      });
    };

    Ok(Step {
      name,
      action,
      inputs,
      outputs,
    })
  }
}

fn check_type(step: &str, spec: &PropertySpec, value: &PropertyValue) -> Result<(), StepError> {
  let mismatch = |found: String| StepError::TypeMismatch {
    step: step.to_string(),
    property: spec.name.to_string(),
    expected: spec.expected(),
    found,
  };

  match (spec.shape, value) {
    (PropertyShape::Single, PropertyValue::Single(variable)) => {
      let found = variable.data_type();
      if spec.types.contains(&found) {
        Ok(())
      } else {
        Err(mismatch(found.to_string()))
      }
    }
    (PropertyShape::Single, PropertyValue::List(_)) => Err(mismatch("a list".to_string())),
    (PropertyShape::List, PropertyValue::Single(variable)) => {
      let found = variable.data_type();
      if found == DataType::StringList {
        Ok(())
      } else {
        Err(mismatch(found.to_string()))
      }
    }
    (PropertyShape::List, PropertyValue::List(items)) => {
      match items.iter().map(Variable::data_type).find(|t| !spec.types.contains(t)) {
        Some(found) => Err(mismatch(format!("a list containing {found}"))),
        None => Ok(()),
      }
    }
  }
}

fn check_literals(step: &str, spec: &PropertySpec, value: &PropertyValue) -> Result<(), StepError> {
  for variable in value.variables() {
    let Variable::Literal(literal) = variable else {
      continue;
    };
    let Some(text) = literal.value().as_str() else {
      continue;
    };

    let reason = if !spec.allowed_values.is_empty() && !spec.allowed_values.contains(&text) {
      Some(format!("expected one of {}", spec.allowed_values.join(", ")))
    } else if spec.format == Some(ValueFormat::IsoDuration) && parse_duration(text).is_none() {
      Some("expected an ISO-8601 duration such as PT10S".to_string())
    } else {
      None
    };

    if let Some(reason) = reason {
      return Err(StepError::InvalidPropertyValue {
        step: step.to_string(),
        property: spec.name.to_string(),
        value: text.to_string(),
        reason,
      });
    }
  }
  Ok(())
}
