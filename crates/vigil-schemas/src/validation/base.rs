//! Validation options and location helpers
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Read/write context used to exempt or strip `readOnly`/`writeOnly` properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Data produced by the system; `writeOnly` properties are stripped
    Read,
    /// Data submitted to the system; `readOnly` properties are stripped
    Write,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Read => write!(f, "read"),
            Context::Write => write!(f, "write"),
        }
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Context::Read),
            "write" => Ok(Context::Write),
            other => Err(format!("unknown validation context '{}', expected read or write", other)),
        }
    }
}

/// Options passed unchanged down every recursive validation call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Suppress default materialization
    pub do_not_annotate: bool,
    /// Copy declared `default` values into absent properties
    pub set_default: bool,
    /// Delete properties rejected by `additionalProperties` instead of failing
    pub remove_additional: bool,
    /// Read/write context, if any
    pub context: Option<Context>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable default materialization
    pub fn with_set_default(mut self, set_default: bool) -> Self {
        self.set_default = set_default;
        self
    }

    /// Enable removal of additional properties
    pub fn with_remove_additional(mut self, remove_additional: bool) -> Self {
        self.remove_additional = remove_additional;
        self
    }

    /// Suppress annotations
    pub fn with_do_not_annotate(mut self, do_not_annotate: bool) -> Self {
        self.do_not_annotate = do_not_annotate;
        self
    }

    /// Set the read/write context
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Whether defaults should be written into the data
    pub fn should_set_default(&self) -> bool {
        self.set_default && !self.do_not_annotate
    }

    /// Copy of these options with annotations suppressed
    pub fn without_annotations(&self) -> Self {
        Self {
            do_not_annotate: true,
            ..*self
        }
    }
}

/// Escape a segment for use in a JSON-pointer-like location
fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Location of a named property below `path`
pub fn child_path(path: &str, key: &str) -> String {
    format!("{}/{}", path, escape_segment(key))
}

/// Location of an array element below `path`
pub fn child_index(path: &str, index: usize) -> String {
    format!("{}/{}", path, index)
}

/// Schema location of a keyword, optionally followed by further segments
pub fn child_scope(scope: &str, segments: &[&str]) -> String {
    let mut result = scope.to_string();
    for segment in segments {
        result.push('/');
        result.push_str(&escape_segment(segment));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "a"), "/a");
        assert_eq!(child_path("/a", "b"), "/a/b");
        assert_eq!(child_path("", "a/b~c"), "/a~1b~0c");
    }

    #[test]
    fn test_child_index() {
        let path = child_path("", "array");
        assert_eq!(child_index(&path, 0), "/array/0");
    }

    #[test]
    fn test_child_scope() {
        assert_eq!(child_scope("#", &["properties", "name"]), "#/properties/name");
        assert_eq!(child_scope("#", &["allOf", "1"]), "#/allOf/1");
    }

    #[test]
    fn test_options_builders() {
        let options = ValidationOptions::new()
            .with_set_default(true)
            .with_context(Context::Write);
        assert!(options.should_set_default());
        assert_eq!(options.context, Some(Context::Write));

        let suppressed = options.without_annotations();
        assert!(!suppressed.should_set_default());
        assert_eq!(suppressed.context, Some(Context::Write));
    }

    #[test]
    fn test_context_from_str() {
        assert_eq!("READ".parse::<Context>().unwrap(), Context::Read);
        assert_eq!("write".parse::<Context>().unwrap(), Context::Write);
        assert!("none".parse::<Context>().is_err());
    }
}
