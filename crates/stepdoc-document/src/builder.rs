use std::collections::BTreeMap;

use stepdoc_config::DocumentType;
use stepdoc_step::Step;
use stepdoc_variable::ReferenceKey;
use tracing::debug;

use crate::document::Document;
use crate::error::DocumentError;
use crate::parameter::Parameter;

/// Accumulates parameters, steps and outputs, then checks every reference.
///
/// Steps can only be appended; there is no removal or reordering.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
  description: String,
  document_type: DocumentType,
  schema_version: Option<String>,
  assume_role: Option<String>,
  parameters: BTreeMap<String, Parameter>,
  outputs: Vec<ReferenceKey>,
  steps: Vec<Step>,
}

impl Default for DocumentBuilder {
  fn default() -> Self {
    Self::new(DocumentType::Command)
  }
}

impl DocumentBuilder {
  pub fn new(document_type: DocumentType) -> Self {
    Self {
      description: String::new(),
      document_type,
      schema_version: None,
      assume_role: None,
      parameters: BTreeMap::new(),
      outputs: Vec::new(),
      steps: Vec::new(),
    }
  }

  pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
    self.description = description.into();
    self
  }

  /// Override the document type's default schema version.
  pub fn schema_version(&mut self, version: impl Into<String>) -> &mut Self {
    self.schema_version = Some(version.into());
    self
  }

  pub fn assume_role(&mut self, role: impl Into<String>) -> &mut Self {
    self.assume_role = Some(role.into());
    self
  }

  pub fn add_parameter(&mut self, parameter: Parameter) -> Result<&mut Self, DocumentError> {
    if self.parameters.contains_key(parameter.name()) {
      return Err(DocumentError::DuplicateParameter {
        parameter: parameter.name().to_string(),
      });
    }
    let parameter = parameter.validated()?;
    self
      .parameters
      .insert(parameter.name().to_string(), parameter);
    Ok(self)
  }

  pub fn add_step(&mut self, step: Step) -> Result<&mut Self, DocumentError> {
    if self.steps.iter().any(|s| s.name() == step.name()) {
      return Err(DocumentError::DuplicateStepName {
        step: step.name().to_string(),
      });
    }
    self.steps.push(step);
    Ok(self)
  }

  /// Expose a step output at document level. Checked by `build`.
  pub fn add_output(&mut self, key: ReferenceKey) -> &mut Self {
    self.outputs.push(key);
    self
  }

  pub fn build(self) -> Result<Document, DocumentError> {
    if self.steps.is_empty() {
      return Err(DocumentError::EmptyDocument);
    }

    for (index, step) in self.steps.iter().enumerate() {
      self.validate_references(index, step)?;
    }
    for (index, output) in self.outputs.iter().enumerate() {
      if self.outputs[..index].contains(output) {
        return Err(DocumentError::InvalidDocumentOutput {
          output: output.to_string(),
          reason: "declared more than once".to_string(),
        });
      }
      self.validate_output(output)?;
    }

    debug!(
      steps = self.steps.len(),
      parameters = self.parameters.len(),
      "document_built"
    );

    Ok(Document {
      description: self.description,
      schema_version: self
        .schema_version
        .unwrap_or_else(|| self.document_type.default_schema_version().to_string()),
      document_type: self.document_type,
      assume_role: self.assume_role,
      parameters: self.parameters,
      outputs: self.outputs,
      steps: self.steps,
    })
  }

  /// Check every reference held by the step at `index`.
  fn validate_references(&self, index: usize, step: &Step) -> Result<(), DocumentError> {
    let references = step
      .inputs()
      .values()
      .flat_map(|value| value.variables())
      .flat_map(|variable| variable.references());

    for reference in references {
      let declared = match reference.key() {
        ReferenceKey::Parameter(name) => {
          let parameter =
            self
              .parameters
              .get(name)
              .ok_or_else(|| DocumentError::UndeclaredParameter {
                step: step.name().to_string(),
                parameter: name.clone(),
              })?;
          parameter.data_type()
        }
        ReferenceKey::StepOutput {
          step: target,
          output,
        } => {
          let position = self
            .steps
            .iter()
            .position(|s| s.name() == target.as_str())
            .ok_or_else(|| DocumentError::UnknownStep {
              step: step.name().to_string(),
              reference: reference.key().placeholder(),
            })?;
          if position >= index {
            return Err(DocumentError::ForwardReference {
              step: step.name().to_string(),
              target: target.clone(),
            });
          }
          let descriptor = self.steps[position].output(output).ok_or_else(|| {
            DocumentError::UnknownOutput {
              step: step.name().to_string(),
              target: target.clone(),
              output: output.clone(),
            }
          })?;
          descriptor.output_type()
        }
      };

      if declared != reference.data_type() {
        return Err(DocumentError::ReferenceTypeMismatch {
          step: step.name().to_string(),
          reference: reference.key().placeholder(),
          expected: declared,
          found: reference.data_type(),
        });
      }
    }

    Ok(())
  }

  fn validate_output(&self, output: &ReferenceKey) -> Result<(), DocumentError> {
    let invalid = |reason: String| DocumentError::InvalidDocumentOutput {
      output: output.to_string(),
      reason,
    };

    match output {
      ReferenceKey::Parameter(_) => Err(invalid("expected a Step.Output key".to_string())),
      ReferenceKey::StepOutput {
        step,
        output: name,
      } => {
        let target = self
          .steps
          .iter()
          .find(|s| s.name() == step.as_str())
          .ok_or_else(|| invalid(format!("no step named '{step}'")))?;
        if target.output(name).is_none() {
          return Err(invalid(format!("step '{step}' declares no output '{name}'")));
        }
        Ok(())
      }
    }
  }
}
