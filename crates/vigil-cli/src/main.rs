//! Vigil CLI - Command-line interface for JSON Schema validation
//!
//! This is the main entry point for the Vigil CLI application, providing
//! commands for validating documents and inspecting draft profiles.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::LogSettings;
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
fn run(cli: Cli) -> Result<()> {
    let config = Config::load_with_file(cli.config.as_deref())?;

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    execute(cli, &config)
}

#[instrument(skip_all, fields(command = ?cli.command))]
fn execute(cli: Cli, config: &Config) -> Result<()> {
    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, config, &mut output),
        Commands::Keywords(args) => handlers::handle_keywords(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut settings = LogSettings::from_verbosity(cli.verbosity_level());
    settings.merge_config(&config.logging, cli.verbosity_level());
    settings.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        settings.level = "error".to_string();
    }

    logging::init_logging(settings)
}
