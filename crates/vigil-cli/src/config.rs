//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments

use crate::cli::ValidateArgs;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use vigil_schemas::{Context, Draft, ValidationOptions};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation defaults
    pub validation: ValidationConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Defaults applied to every `validate` run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Draft to use instead of detecting it from `$schema`
    pub draft: Option<Draft>,

    /// Fill in missing properties from schema defaults
    pub set_default: bool,

    /// Drop properties rejected by additionalProperties
    pub remove_additional: bool,

    /// Suppress default materialization
    pub do_not_annotate: bool,

    /// Read/write context for readOnly and writeOnly properties
    pub context: Option<Context>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
        }
    }
}

impl ValidationConfig {
    /// Overlay command-line flags; a flag that is set always wins
    pub fn merge_args(&mut self, args: &ValidateArgs) {
        if args.draft.is_some() {
            self.draft = args.draft;
        }
        if args.context.is_some() {
            self.context = args.context;
        }
        self.set_default |= args.set_default;
        self.remove_additional |= args.remove_additional;
        self.do_not_annotate |= args.no_annotate;
    }

    /// Engine options for these settings
    pub fn options(&self) -> ValidationOptions {
        let options = ValidationOptions::new()
            .with_set_default(self.set_default)
            .with_remove_additional(self.remove_additional)
            .with_do_not_annotate(self.do_not_annotate);

        match self.context {
            Some(context) => options.with_context(context),
            None => options,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".vigil.yaml"),
            PathBuf::from(".vigil.json"),
            PathBuf::from("vigil.yaml"),
            PathBuf::from("vigil.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let vigil_dir = config_dir.join("vigil");
            paths.push(vigil_dir.join("config.yaml"));
            paths.push(vigil_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".vigil.yaml"));
            paths.push(home_dir.join(".vigil.json"));
        }

        paths
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
