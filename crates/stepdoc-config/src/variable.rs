//! Variable definitions in the authoring format.
//!
//! A variable is written in one of three shapes:
//!
//! ```json
//! { "ref": "FetchInstance.CommandId" }
//! { "format": "echo %s > %s", "args": ["hello", { "ref": "TargetFile" }] }
//! "any other JSON value is a literal"
//! ```
//!
//! A reference with a dot names a step output (`Step.Output`); without a dot
//! it names a document parameter. An object literal that happens to carry a
//! `ref` or `format` key is read as a reference or template.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableDef {
  Reference {
    #[serde(rename = "ref")]
    reference: String,
  },
  Template {
    format: String,
    #[serde(default)]
    args: Vec<VariableDef>,
  },
  Literal(serde_json::Value),
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_reference() {
    let def: VariableDef = serde_json::from_value(json!({ "ref": "A.CommandId" })).unwrap();
    assert_eq!(
      def,
      VariableDef::Reference {
        reference: "A.CommandId".to_string()
      }
    );
  }

  #[test]
  fn test_parse_template_with_nested_args() {
    let def: VariableDef = serde_json::from_value(json!({
      "format": "some %s string",
      "args": [{ "ref": "MyVar" }]
    }))
    .unwrap();

    match def {
      VariableDef::Template { format, args } => {
        assert_eq!(format, "some %s string");
        assert_eq!(
          args,
          vec![VariableDef::Reference {
            reference: "MyVar".to_string()
          }]
        );
      }
      other => panic!("expected template, got {:?}", other),
    }
  }

  #[test]
  fn test_parse_literals() {
    let def: VariableDef = serde_json::from_value(json!("mkdir asdf")).unwrap();
    assert_eq!(def, VariableDef::Literal(json!("mkdir asdf")));

    let def: VariableDef = serde_json::from_value(json!({ "Key": ["a"] })).unwrap();
    assert_eq!(def, VariableDef::Literal(json!({ "Key": ["a"] })));
  }
}
