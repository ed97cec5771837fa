//! Draft version identification and detection
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DRAFT_2020_12_URI: &str = "https://json-schema.org/draft/2020-12/schema";
const DRAFT_2019_09_URI: &str = "https://json-schema.org/draft/2019-09/schema";
const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Supported JSON Schema drafts, ordered oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Draft {
    /// Draft-07 and earlier keyword sets
    #[serde(rename = "draft-07")]
    Draft07,
    #[serde(rename = "2019-09")]
    Draft201909,
    #[serde(rename = "2020-12")]
    Draft202012,
}

/// Error parsing a draft identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown draft version '{0}', expected draft-07, 2019-09 or 2020-12")]
pub struct UnknownDraft(pub String);

impl Draft {
    /// Every supported draft, oldest first
    pub const ALL: [Draft; 3] = [Draft::Draft07, Draft::Draft201909, Draft::Draft202012];

    /// Short identifier, e.g. `2020-12`
    pub fn as_str(&self) -> &'static str {
        match self {
            Draft::Draft07 => "draft-07",
            Draft::Draft201909 => "2019-09",
            Draft::Draft202012 => "2020-12",
        }
    }

    /// Canonical meta-schema URI
    pub fn meta_schema_uri(&self) -> &'static str {
        match self {
            Draft::Draft07 => DRAFT_07_URI,
            Draft::Draft201909 => DRAFT_2019_09_URI,
            Draft::Draft202012 => DRAFT_2020_12_URI,
        }
    }

    /// Detect the draft a document declares through `$schema`
    ///
    /// The comparison is case-insensitive and matches the canonical 2020-12
    /// and 2019-09 URIs as substrings (ignoring the URI scheme). Anything
    /// else, including a missing `$schema` or a boolean document, is
    /// draft-07.
    pub fn detect(document: &Value) -> Draft {
        let Some(declared) = document.get("$schema").and_then(Value::as_str) else {
            return Draft::Draft07;
        };
        let declared = declared.to_ascii_lowercase();

        if declared.contains(strip_scheme(DRAFT_2020_12_URI)) {
            Draft::Draft202012
        } else if declared.contains(strip_scheme(DRAFT_2019_09_URI)) {
            Draft::Draft201909
        } else {
            Draft::Draft07
        }
    }
}

fn strip_scheme(uri: &str) -> &str {
    uri.split_once("://").map_or(uri, |(_, rest)| rest)
}

impl Default for Draft {
    fn default() -> Self {
        Draft::Draft07
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Draft {
    type Err = UnknownDraft;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft-07" | "draft7" | "draft-7" | "7" => Ok(Draft::Draft07),
            "2019-09" | "draft2019-09" | "draft-2019-09" => Ok(Draft::Draft201909),
            "2020-12" | "draft2020-12" | "draft-2020-12" => Ok(Draft::Draft202012),
            _ => Err(UnknownDraft(s.to_string())),
        }
    }
}
