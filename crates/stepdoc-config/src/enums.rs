use std::fmt;

use serde::{Deserialize, Serialize};

/// Value types understood by the execution service.
///
/// `StringMap` is a JSON object and `MapList` a list of JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
  String,
  Integer,
  Boolean,
  StringList,
  StringMap,
  MapList,
}

impl DataType {
  pub fn as_str(&self) -> &'static str {
    match self {
      DataType::String => "String",
      DataType::Integer => "Integer",
      DataType::Boolean => "Boolean",
      DataType::StringList => "StringList",
      DataType::StringMap => "StringMap",
      DataType::MapList => "MapList",
    }
  }
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Kind of document, which decides the default schema version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
  #[default]
  Command,
  Automation,
}

impl DocumentType {
  pub fn default_schema_version(&self) -> &'static str {
    match self {
      DocumentType::Command => "2.2",
      DocumentType::Automation => "0.3",
    }
  }
}
