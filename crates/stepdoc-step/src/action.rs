use std::fmt;
use std::time::Duration;

use stepdoc_variable::DataType;

use crate::output::OutputDescriptor;
use crate::property::{PropertySpec, ValueFormat};

/// The supported step actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepAction {
  RunShellScript,
  RunCommand,
  Sleep,
  ExecuteScript,
}

const STRING: &[DataType] = &[DataType::String];
const INTEGER: &[DataType] = &[DataType::Integer];
const STRING_MAP: &[DataType] = &[DataType::StringMap];

const RUN_SHELL_SCRIPT_PROPERTIES: &[PropertySpec] = &[
  PropertySpec::new("runCommand", "runCommand", STRING)
    .required()
    .list(),
  PropertySpec::new("workingDirectory", "workingDirectory", STRING),
  PropertySpec::new("timeoutSeconds", "timeoutSeconds", INTEGER),
];

const RUN_COMMAND_PROPERTIES: &[PropertySpec] = &[
  PropertySpec::new("documentName", "DocumentName", STRING).required(),
  PropertySpec::new(
    "targets",
    "InstanceIds",
    &[DataType::StringList, DataType::MapList],
  )
  .required()
  .keyed_by_type(&[(DataType::MapList, "Targets")]),
  PropertySpec::new("parameters", "Parameters", STRING_MAP),
  PropertySpec::new("cloudWatchOutputConfig", "CloudWatchOutputConfig", STRING_MAP),
  PropertySpec::new("comment", "Comment", STRING),
  PropertySpec::new("documentHash", "DocumentHash", STRING),
  PropertySpec::new("documentHashType", "DocumentHashType", STRING).allowed(&["Sha256", "Sha1"]),
  PropertySpec::new("notificationConfig", "NotificationConfig", STRING_MAP),
  PropertySpec::new("outputS3BucketName", "OutputS3BucketName", STRING),
  PropertySpec::new("outputS3KeyPrefix", "OutputS3KeyPrefix", STRING),
  PropertySpec::new("serviceRoleArn", "ServiceRoleArn", STRING),
  PropertySpec::new("commandTimeoutSeconds", "TimeoutSeconds", INTEGER),
  PropertySpec::new("maxConcurrency", "MaxConcurrency", INTEGER),
  PropertySpec::new("maxErrors", "MaxErrors", INTEGER),
];

const SLEEP_PROPERTIES: &[PropertySpec] = &[
  PropertySpec::new("duration", "Duration", STRING)
    .required()
    .formatted(ValueFormat::IsoDuration),
];

const EXECUTE_SCRIPT_PROPERTIES: &[PropertySpec] = &[
  PropertySpec::new("runtime", "Runtime", STRING).required(),
  PropertySpec::new("handler", "Handler", STRING).required(),
  PropertySpec::new("script", "Script", STRING),
  PropertySpec::new("inputPayload", "InputPayload", STRING_MAP),
];

impl StepAction {
  pub const ALL: [StepAction; 4] = [
    StepAction::RunShellScript,
    StepAction::RunCommand,
    StepAction::Sleep,
    StepAction::ExecuteScript,
  ];

  /// Action discriminator as it appears in the serialized entry.
  pub fn name(self) -> &'static str {
    match self {
      StepAction::RunShellScript => "aws:runShellScript",
      StepAction::RunCommand => "aws:runCommand",
      StepAction::Sleep => "aws:sleep",
      StepAction::ExecuteScript => "aws:executeScript",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|action| action.name() == name)
  }

  pub fn properties(self) -> &'static [PropertySpec] {
    match self {
      StepAction::RunShellScript => RUN_SHELL_SCRIPT_PROPERTIES,
      StepAction::RunCommand => RUN_COMMAND_PROPERTIES,
      StepAction::Sleep => SLEEP_PROPERTIES,
      StepAction::ExecuteScript => EXECUTE_SCRIPT_PROPERTIES,
    }
  }

  pub fn property(self, name: &str) -> Option<&'static PropertySpec> {
    self.properties().iter().find(|p| p.name == name)
  }

  /// Outputs every step of this action exposes.
  pub fn fixed_outputs(self) -> Vec<OutputDescriptor> {
    match self {
      StepAction::RunCommand => vec![
        OutputDescriptor::top_level("CommandId", DataType::String),
        OutputDescriptor::top_level("Status", DataType::String),
        OutputDescriptor::top_level("ResponseCode", DataType::Integer),
        OutputDescriptor::top_level("Output", DataType::String),
      ],
      _ => Vec::new(),
    }
  }

  /// Whether authors declare this action's outputs themselves.
  pub fn accepts_custom_outputs(self) -> bool {
    matches!(self, StepAction::ExecuteScript)
  }
}

impl fmt::Display for StepAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Parse an ISO-8601 time duration of the form `PT#H#M#S`.
///
/// Each component is optional but at least one must be present, and they
/// must appear in that order.
pub fn parse_duration(text: &str) -> Option<Duration> {
  let mut rest = text.strip_prefix("PT")?;
  if rest.is_empty() {
    return None;
  }

  let mut total: u64 = 0;
  let mut last_rank = 0;
  while !rest.is_empty() {
    let digits = rest.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 {
      return None;
    }
    let amount: u64 = rest[..digits].parse().ok()?;
    let (rank, unit_seconds) = match rest[digits..].chars().next()? {
      'H' => (1, 3600),
      'M' => (2, 60),
      'S' => (3, 1),
      _ => return None,
    };
    if rank <= last_rank {
      return None;
    }
    last_rank = rank;
    total = total.checked_add(amount.checked_mul(unit_seconds)?)?;
    rest = &rest[digits + 1..];
  }

  Some(Duration::from_secs(total))
}
