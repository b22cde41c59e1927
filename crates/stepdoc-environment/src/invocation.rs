use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
  Success,
  Failure,
}

/// Envelope shared by every step action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
  pub response_code: ResponseCode,
  /// Structured record the step's output selectors are applied to.
  pub raw_result: serde_json::Value,
}

impl InvocationResult {
  pub fn success(raw_result: serde_json::Value) -> Self {
    Self {
      response_code: ResponseCode::Success,
      raw_result,
    }
  }

  pub fn failure(raw_result: serde_json::Value) -> Self {
    Self {
      response_code: ResponseCode::Failure,
      raw_result,
    }
  }

  pub fn is_success(&self) -> bool {
    self.response_code == ResponseCode::Success
  }
}
