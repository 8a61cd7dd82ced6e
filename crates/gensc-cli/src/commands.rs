use std::path::Path;

use anyhow::bail;
use colored::Colorize;
use gensc_asset::AssetStore;
use gensc_contract::commands::{CREATE_GEN_ASSETS, LIST_GEN_ASSETS, STATUS_CHECK};
use gensc_contract::{Dispatcher, Response};
use gensc_state::{InMemoryState, MemoryStateConfig};
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;
use crate::config::HarnessConfig;

/// What one harness command produced.
#[derive(Debug)]
pub enum Outcome {
    Invoked { function: String, response: Response },
    Record(Vec<u8>),
}

pub fn run_command(cli: Cli, config: &HarnessConfig) -> anyhow::Result<()> {
    let state = open_state(cli.state.as_deref(), &config.state)?;
    let outcome = execute(cli.command, &state, config)?;
    println!("{}", render(&outcome, &cli.format));

    if let Outcome::Invoked { response, .. } = &outcome {
        if !response.is_ok() {
            bail!("{}", response.message);
        }
        if let Some(path) = &cli.state {
            state.save_to(path)?;
            debug!(path = %path.display(), "state saved");
        }
    }
    Ok(())
}

fn open_state(path: Option<&Path>, config: &MemoryStateConfig) -> anyhow::Result<InMemoryState> {
    Ok(match path {
        Some(path) => InMemoryState::load_from(path, config.clone())?,
        None => InMemoryState::with_config(config.clone()),
    })
}

pub fn execute(command: Command, state: &InMemoryState, config: &HarnessConfig) -> anyhow::Result<Outcome> {
    let (function, args) = match command {
        Command::Get(args) => {
            let record = AssetStore::new(state).read(&args.asset_name, &args.parts)?;
            return Ok(Outcome::Record(record));
        }
        Command::Status(_) => (STATUS_CHECK.to_string(), Vec::new()),
        Command::Invoke(args) => (args.function, args.args),
        Command::Create(args) => (CREATE_GEN_ASSETS.to_string(), vec![args.envelope]),
        Command::List(args) => (LIST_GEN_ASSETS.to_string(), vec![args.envelope]),
    };

    let dispatcher = Dispatcher::with_builtin_commands(config.contract.clone());
    let response = dispatcher.invoke(state, &function, &args);
    Ok(Outcome::Invoked { function, response })
}

pub fn render(outcome: &Outcome, format: &OutputFormat) -> String {
    match (outcome, format) {
        (Outcome::Record(record), OutputFormat::Text) => String::from_utf8_lossy(record).into_owned(),
        (Outcome::Record(record), OutputFormat::Json) => json!({ "record": as_json(record) }).to_string(),
        (Outcome::Invoked { function, response }, OutputFormat::Text) => {
            if response.is_ok() {
                format!(
                    "{} {}\n{}",
                    "✓".green().bold(),
                    function.bold(),
                    String::from_utf8_lossy(&response.payload)
                )
            } else {
                format!("{} {} ({})", "✗".red().bold(), function.bold(), response.status)
            }
        }
        (Outcome::Invoked { function, response }, OutputFormat::Json) => json!({
            "function": function,
            "status": response.status,
            "message": response.message,
            "payload": as_json(&response.payload),
        })
        .to_string(),
    }
}

/// Parsed JSON when the bytes are JSON, a string otherwise.
fn as_json(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
