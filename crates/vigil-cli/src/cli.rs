//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use vigil_schemas::{Context, Draft};

/// Vigil - validate and normalize JSON or YAML documents against JSON Schemas
///
/// Supports draft-07, 2019-09 and 2020-12 schemas, with optional default
/// materialization, additional property removal and read/write contexts.
#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a data document against a schema
    Validate(ValidateArgs),

    /// List the keywords understood by a draft
    Keywords(KeywordsArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

/// Arguments for the validate command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the schema document (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Path to the data document (JSON or YAML)
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Draft to validate with, instead of detecting it from `$schema`
    #[arg(long, value_parser = parse_draft)]
    pub draft: Option<Draft>,

    /// Fill in missing properties from schema defaults
    #[arg(long)]
    pub set_default: bool,

    /// Drop properties rejected by additionalProperties instead of failing
    #[arg(long)]
    pub remove_additional: bool,

    /// Suppress default materialization even when --set-default is given
    #[arg(long)]
    pub no_annotate: bool,

    /// Read/write context for readOnly and writeOnly properties
    #[arg(long, value_parser = parse_context)]
    pub context: Option<Context>,

    /// Print the validated (and possibly transformed) data
    #[arg(long)]
    pub print_data: bool,
}

/// Arguments for the keywords command
#[derive(Args, Debug, Clone)]
pub struct KeywordsArgs {
    /// Draft whose profile to list (defaults to the configured draft)
    #[arg(long, value_parser = parse_draft)]
    pub draft: Option<Draft>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
}

fn parse_draft(value: &str) -> Result<Draft, String> {
    value.parse::<Draft>().map_err(|e| e.to_string())
}

fn parse_context(value: &str) -> Result<Context, String> {
    value.parse::<Context>()
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
