//! Turns an authored [`DocumentDef`] into a validated [`Document`].
//!
//! Loading runs in two passes. The first collects the type of every output
//! each step declares, so that the second can give references the type of
//! their target even when the target comes later in the document. Ordering,
//! declaration and type checks are then left to [`DocumentBuilder::build`].

use std::collections::HashMap;

use serde_json::Value;
use stepdoc_config::{DocumentDef, StepDef, VariableDef};
use stepdoc_step::{OutputDescriptor, PropertyShape, Step, StepAction, StepError};
use stepdoc_variable::{DataType, ReferenceKey, Variable, VariableError};
use tracing::debug;

use crate::builder::DocumentBuilder;
use crate::document::Document;
use crate::error::DocumentError;
use crate::parameter::Parameter;

/// Types of everything a reference may point at.
struct TypeIndex {
  parameters: HashMap<String, DataType>,
  outputs: HashMap<(String, String), DataType>,
}

impl TypeIndex {
  /// Type of the reference's target. Unknown targets get `String`; the
  /// builder reports them precisely.
  fn lookup(&self, key: &ReferenceKey) -> DataType {
    let found = match key {
      ReferenceKey::Parameter(name) => self.parameters.get(name),
      ReferenceKey::StepOutput { step, output } => {
        self.outputs.get(&(step.clone(), output.clone()))
      }
    };
    found.copied().unwrap_or(DataType::String)
  }
}

pub fn load_document(def: DocumentDef) -> Result<Document, DocumentError> {
  let mut builder = DocumentBuilder::new(def.document_type);
  builder.description(def.description);
  if let Some(version) = def.schema_version {
    builder.schema_version(version);
  }
  if let Some(role) = def.assume_role {
    builder.assume_role(role);
  }

  let mut index = TypeIndex {
    parameters: HashMap::new(),
    outputs: HashMap::new(),
  };

  for (name, parameter_def) in def.parameters {
    index
      .parameters
      .insert(name.clone(), parameter_def.param_type);

    let mut parameter = Parameter::new(name, parameter_def.param_type)
      .with_allowed_values(parameter_def.allowed_values);
    if let Some(description) = parameter_def.description {
      parameter = parameter.with_description(description);
    }
    if let Some(default) = parameter_def.default {
      parameter = parameter.with_default(default);
    }
    builder.add_parameter(parameter)?;
  }

  let mut steps = Vec::with_capacity(def.steps.len());
  for step_def in def.steps {
    let action = StepAction::from_name(&step_def.action).ok_or_else(|| StepError::UnknownAction {
      step: step_def.name.clone(),
      action: step_def.action.clone(),
    })?;

    let declared = step_def
      .outputs
      .iter()
      .map(|o| {
        OutputDescriptor::new(&o.name, o.output_type, &o.selector).map_err(|source| {
          DocumentError::Selector {
            step: step_def.name.clone(),
            source,
          }
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    let exposed = if action.accepts_custom_outputs() {
      declared.clone()
    } else {
      action.fixed_outputs()
    };
    for output in &exposed {
      index.outputs.insert(
        (step_def.name.clone(), output.name().to_string()),
        output.output_type(),
      );
    }

    steps.push((step_def, action, declared));
  }

  for (step_def, action, declared) in steps {
    let step = build_step(step_def, action, declared, &index)?;
    builder.add_step(step)?;
  }

  for output in def.outputs {
    let key = output
      .parse::<ReferenceKey>()
      .map_err(|e| DocumentError::InvalidDocumentOutput {
        output: output.clone(),
        reason: e.to_string(),
      })?;
    builder.add_output(key);
  }

  let document = builder.build()?;
  debug!(steps = document.steps().len(), "document_loaded");
  Ok(document)
}

fn build_step(
  step_def: StepDef,
  action: StepAction,
  declared: Vec<OutputDescriptor>,
  index: &TypeIndex,
) -> Result<Step, DocumentError> {
  let StepDef { name, inputs, .. } = step_def;
  let mut builder = Step::builder(name.clone(), action);

  for (property, variable_def) in inputs {
    let variable_error = |source: VariableError| DocumentError::Variable {
      step: name.clone(),
      property: property.clone(),
      source,
    };

    let is_list = action
      .property(&property)
      .is_some_and(|spec| spec.shape == PropertyShape::List);

    builder = match variable_def {
      VariableDef::Literal(Value::Array(items)) if is_list => {
        let items = items
          .into_iter()
          .map(|item| to_variable(element_def(item), index))
          .collect::<Result<Vec<_>, _>>()
          .map_err(variable_error)?;
        builder.input_list(property, items)
      }
      other => {
        let variable = to_variable(other, index).map_err(variable_error)?;
        builder.input(property, variable)
      }
    };
  }

  // Declared outputs always reach the step builder, which rejects them for
  // actions with fixed outputs.
  for output in declared {
    builder = builder.output(output);
  }

  Ok(builder.build()?)
}

/// Element of a list property: a nested reference or template object, or a
/// literal.
fn element_def(item: Value) -> VariableDef {
  match serde_json::from_value(item.clone()) {
    Ok(def) => def,
    Err(_) => VariableDef::Literal(item),
  }
}

fn to_variable(def: VariableDef, index: &TypeIndex) -> Result<Variable, VariableError> {
  match def {
    VariableDef::Reference { reference } => {
      let key: ReferenceKey = reference.parse()?;
      let data_type = index.lookup(&key);
      Ok(Variable::reference(key, data_type))
    }
    VariableDef::Template { format, args } => {
      let args = args
        .into_iter()
        .map(|arg| to_variable(arg, index))
        .collect::<Result<Vec<_>, _>>()?;
      Variable::format(format, args)
    }
    VariableDef::Literal(value) => Variable::literal(value),
  }
}
