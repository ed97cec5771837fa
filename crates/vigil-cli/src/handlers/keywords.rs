//! `vigil keywords`: list the keyword profile of a draft

use crate::cli::KeywordsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use vigil_schemas::profile_for;

/// Handle the keywords command
pub fn handle_keywords(args: KeywordsArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let draft = args.draft.or(config.validation.draft).unwrap_or_default();
    let keywords: Vec<&str> = profile_for(draft).into_iter().collect();

    tracing::debug!(draft = %draft, count = keywords.len(), "Listing keywords");
    output.list(&format!("Keywords for {}", draft), &keywords)
}
