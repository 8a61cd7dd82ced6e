use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gensc",
    about = "Local harness for the GenSC generic asset contract",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// State snapshot, loaded before and saved after a successful call
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the contract is running
    Status(StatusArgs),
    /// Invoke any contract function by name
    Invoke(InvokeArgs),
    /// Create assets from a request envelope
    Create(EnvelopeArgs),
    /// List or query assets with a request envelope
    List(EnvelopeArgs),
    /// Print one stored record
    Get(GetArgs),
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct EnvelopeArgs {
    /// Request envelope as JSON
    pub envelope: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub asset_name: String,
    /// Key components, in key order
    #[arg(required = true)]
    pub parts: Vec<String>,
}
