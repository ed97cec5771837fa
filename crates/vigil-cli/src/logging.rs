//! Logging setup for the Vigil CLI
//!
//! Installs a `tracing-subscriber` fmt subscriber. The level comes from
//! `RUST_LOG` when set, otherwise from the configuration or the `-v` count.
//! The output format is compact, full or JSON.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for everyday use
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!("invalid log format '{}'", other))),
        }
    }
}

/// Effective logging settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Log level filter
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LogSettings {
    /// Create settings from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut settings = Self::default();

        match verbosity {
            0 => {}
            1 => {
                settings.level = "info".to_string();
            }
            2 => {
                settings.level = "debug".to_string();
                settings.source_location = true;
            }
            _ => {
                settings.level = "trace".to_string();
                settings.format = LogFormat::Full;
                settings.source_location = true;
                settings.thread_ids = true;
            }
        }

        settings
    }

    /// Apply the configuration file; a `-v` flag outranks the configured level
    pub fn merge_config(&mut self, config: &LoggingConfig, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &config.level {
                self.level = level.clone();
            }
        }
        match config.format.parse() {
            Ok(format) => self.format = format,
            Err(e) => eprintln!("Warning: {}, using {:?}", e, self.format),
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        if let Ok(format) = std::env::var("VIGIL_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => eprintln!("Warning: {}, using {:?}", e, self.format),
            }
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(settings: LogSettings) -> Result<()> {
    // RUST_LOG takes precedence
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| Error::config(format!("invalid log level '{}': {}", settings.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(settings.thread_ids)
        .with_file(settings.source_location)
        .with_line_number(settings.source_location);

    let installed = match settings.format {
        LogFormat::Compact => builder
            .with_ansi(std::io::stderr().is_terminal())
            .compact()
            .try_init(),
        LogFormat::Full => builder
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
        LogFormat::Json => builder.with_ansi(false).json().try_init(),
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(settings = ?settings, "Logging system initialized");
    Ok(())
}
