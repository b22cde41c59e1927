//! Single-valued JSON path selectors.
//!
//! Supported syntax: `$`, `.field`, `['field']` and `[index]`, chained.
//! Wildcards, recursive descent and filters can match several values and are
//! rejected when the selector is parsed.

use std::fmt;

use serde_json::Value;

use crate::error::SelectorError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Field(String),
  Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
  expression: String,
  segments: Vec<Segment>,
}

impl Selector {
  pub fn parse(expression: &str) -> Result<Self, SelectorError> {
    let invalid = |reason: &str| SelectorError {
      selector: expression.to_string(),
      reason: reason.to_string(),
    };

    let mut rest = expression
      .strip_prefix('$')
      .ok_or_else(|| invalid("must start with '$'"))?;
    let mut segments = Vec::new();

    while !rest.is_empty() {
      if rest.starts_with("..") {
        return Err(invalid("recursive descent is not supported"));
      }

      if let Some(after_dot) = rest.strip_prefix('.') {
        let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
        let field = &after_dot[..end];
        if field.is_empty() {
          return Err(invalid("empty field name"));
        }
        if field == "*" {
          return Err(invalid("wildcards are not supported"));
        }
        if field.contains([']', '\'', '"']) {
          return Err(invalid("unexpected character in field name"));
        }
        segments.push(Segment::Field(field.to_string()));
        rest = &after_dot[end..];
      } else if let Some(after_bracket) = rest.strip_prefix('[') {
        let inner = after_bracket.trim_start();
        if let Some(quote) = inner.chars().next().filter(|c| *c == '\'' || *c == '"') {
          let body = &inner[1..];
          let close = body
            .find(quote)
            .ok_or_else(|| invalid("unterminated quoted field"))?;
          let field = &body[..close];
          if field.is_empty() {
            return Err(invalid("empty field name"));
          }
          rest = body[close + 1..]
            .trim_start()
            .strip_prefix(']')
            .ok_or_else(|| invalid("expected ']' after quoted field"))?;
          segments.push(Segment::Field(field.to_string()));
          continue;
        }

        let end = inner.find(']').ok_or_else(|| invalid("unterminated '['"))?;
        let index = inner[..end].trim();
        if index == "*" {
          return Err(invalid("wildcards are not supported"));
        }
        if index.starts_with('?') {
          return Err(invalid("filters are not supported"));
        }
        let index = index
          .parse::<usize>()
          .map_err(|_| invalid("index must be a non-negative integer"))?;
        segments.push(Segment::Index(index));
        rest = &inner[end + 1..];
      } else {
        return Err(invalid("expected '.' or '['"));
      }
    }

    Ok(Self {
      expression: expression.to_string(),
      segments,
    })
  }

  /// `$.<name>`, for fields known to be valid identifiers.
  pub fn field(name: &str) -> Self {
    Self {
      expression: format!("$.{name}"),
      segments: vec![Segment::Field(name.to_string())],
    }
  }

  pub fn as_str(&self) -> &str {
    &self.expression
  }

  /// The value at this path, if every segment matches.
  pub fn select<'a>(&self, value: &'a Value) -> Option<&'a Value> {
    self
      .segments
      .iter()
      .try_fold(value, |current, segment| match segment {
        Segment::Field(name) => current.get(name.as_str()),
        Segment::Index(index) => current.as_array().and_then(|items| items.get(*index)),
      })
  }
}

impl fmt::Display for Selector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.expression)
  }
}
