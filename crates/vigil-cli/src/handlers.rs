//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod config;
mod keywords;
mod validate;

pub use config::handle_config;
pub use keywords::handle_keywords;
pub use validate::handle_validate;
