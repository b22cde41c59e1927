use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use stepdoc_bridge::{BridgeConfig, ScriptBridge};
use stepdoc_config::DocumentDef;
use stepdoc_document::{Document, load_document};
use stepdoc_environment::{Environment, MockEnvironment, ShellConfig, ShellEnvironment};
use stepdoc_simulation::Simulation;
use stepdoc_variable::{OutputTable, ReferenceKey};

/// Stepdoc - author step documents, print them, and simulate them locally
#[derive(Parser)]
#[command(name = "stepdoc")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Enable verbose output (-v for debug, -vv for trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the serialized document as JSON
  Print {
    /// Path to the document definition (JSON)
    document_file: PathBuf,
  },

  /// Check a document definition without printing it
  Validate {
    /// Path to the document definition (JSON)
    document_file: PathBuf,
  },

  /// Simulate a document; parameter values are read from stdin as a JSON object
  Simulate {
    /// Path to the document definition (JSON)
    document_file: PathBuf,

    /// Run only this step. Stdin may then also hold "Step.Output" values.
    #[arg(long)]
    step: Option<String>,

    #[command(flatten)]
    environment: EnvironmentArgs,
  },
}

#[derive(Args)]
struct EnvironmentArgs {
  /// Environment the steps run against
  #[arg(long, value_enum, default_value_t = EnvironmentKind::Mock)]
  environment: EnvironmentKind,

  /// Shell used for shell script steps (local environment)
  #[arg(long, default_value = "bash")]
  shell: PathBuf,

  /// Default timeout for each shell command, in seconds
  #[arg(long)]
  command_timeout_secs: Option<u64>,

  /// Entry script for the script bridge; enables script steps locally
  #[arg(long)]
  bridge_entry: Option<PathBuf>,

  /// Interpreter that runs the bridge entry script
  #[arg(long, default_value = "python3")]
  interpreter: PathBuf,

  /// Timeout for each bridge call, in seconds
  #[arg(long)]
  bridge_timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EnvironmentKind {
  /// Record every call without side effects
  Mock,
  /// Run shell commands on this machine
  Local,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let log_level = match cli.verbose {
    0 => "info",
    1 => "debug",
    _ => "trace",
  };
  tracing_subscriber::fmt()
    .with_env_filter(log_level)
    .with_target(cli.verbose >= 2)
    .with_writer(io::stderr)
    .init();

  match cli.command {
    Some(Commands::Print { document_file }) => {
      let document = read_document(&document_file)?;
      println!("{}", document.print().context("failed to print document")?);
    }
    Some(Commands::Validate { document_file }) => {
      let document = read_document(&document_file)?;
      eprintln!(
        "{} is valid: {} step(s), {} parameter(s)",
        document_file.display(),
        document.steps().len(),
        document.parameters().len()
      );
    }
    Some(Commands::Simulate {
      document_file,
      step,
      environment,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { simulate(document_file, step, environment).await })?;
    }
    None => {
      println!("stepdoc - use --help to see available commands");
    }
  }

  Ok(())
}

fn read_document(document_file: &Path) -> Result<Document> {
  let content = std::fs::read_to_string(document_file)
    .with_context(|| format!("failed to read document file: {}", document_file.display()))?;

  let def: DocumentDef = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse document file: {}", document_file.display()))?;

  load_document(def)
    .with_context(|| format!("invalid document: {}", document_file.display()))
}

async fn simulate(
  document_file: PathBuf,
  step: Option<String>,
  args: EnvironmentArgs,
) -> Result<()> {
  let document = read_document(&document_file)?;
  let inputs = read_payload_from_stdin()?;
  debug!(inputs = %serde_json::Value::Object(inputs.clone()), "simulation_inputs");

  let simulation = Simulation::new(document);

  match args.environment {
    EnvironmentKind::Mock => {
      let mut env = MockEnvironment::new();
      run(&simulation, &mut env, &inputs, step.as_deref()).await?;
      eprintln!("Recorded commands: {:?}", env.previous_commands());
    }
    EnvironmentKind::Local => {
      let mut env = ShellEnvironment::new(ShellConfig {
        shell: args.shell,
        default_timeout: args.command_timeout_secs.map(Duration::from_secs),
        ..Default::default()
      });
      if let Some(entry_script) = args.bridge_entry {
        env = env.with_bridge(ScriptBridge::new(BridgeConfig {
          interpreter: args.interpreter,
          entry_script,
          timeout: args.bridge_timeout_secs.map(Duration::from_secs),
          ..Default::default()
        }));
      }
      run(&simulation, &mut env, &inputs, step.as_deref()).await?;
    }
  }

  Ok(())
}

async fn run(
  simulation: &Simulation,
  env: &mut dyn Environment,
  inputs: &serde_json::Map<String, serde_json::Value>,
  step: Option<&str>,
) -> Result<()> {
  let output = match step {
    Some(name) => {
      let table = step_table(simulation, inputs)?;
      let result = simulation
        .run_step(name, env, &table)
        .await
        .with_context(|| format!("step '{}' failed", name))?;
      serde_json::to_value(result)?
    }
    None => {
      let result = simulation
        .run(env, inputs)
        .await
        .context("simulation aborted")?;
      eprintln!("Simulation completed: {}", result.execution_id);
      eprintln!("Steps executed: {}", result.step_results.len());
      serde_json::to_value(result)?
    }
  };

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

/// Parameter values plus any `Step.Output` values supplied for a single-step run.
fn step_table(
  simulation: &Simulation,
  inputs: &serde_json::Map<String, serde_json::Value>,
) -> Result<OutputTable> {
  let parameters: serde_json::Map<String, serde_json::Value> = inputs
    .iter()
    .filter(|(key, _)| !key.contains('.'))
    .map(|(key, value)| (key.clone(), value.clone()))
    .collect();
  let mut table = simulation
    .initial_table(&parameters)
    .context("invalid simulation inputs")?;

  for (key, value) in inputs.iter().filter(|(key, _)| key.contains('.')) {
    let key: ReferenceKey = key.parse().context("invalid step output key")?;
    table
      .insert(key, value.clone())
      .context("duplicate step output value")?;
  }
  debug!(table = %table.to_json(), "step_table_seeded");

  Ok(table)
}

fn read_payload_from_stdin() -> Result<serde_json::Map<String, serde_json::Value>> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, no inputs
    return Ok(serde_json::Map::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read inputs from stdin")?;

  if input.trim().is_empty() {
    Ok(serde_json::Map::new())
  } else {
    serde_json::from_str(&input).context("failed to parse inputs JSON object from stdin")
  }
}
