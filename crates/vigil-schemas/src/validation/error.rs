//! Error types for schema validation
//!
//! Two disjoint failure kinds exist. A [`SchemaError`] means the schema
//! document itself is malformed for some keyword; it is a defect the schema
//! author must fix and is never recovered from inside the engine. A
//! [`ValidationError`] means the data does not satisfy an otherwise
//! well-formed schema; it carries nested causes so callers can render the
//! full diagnostic tree.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Kind used when several independent keyword failures are aggregated at one node
pub const MULTIPLE: &str = "multiple";

/// Kind used when data meets the literal `false` schema
pub const FALSE_SCHEMA: &str = "false";

/// The schema document is malformed for a keyword
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Schema error at '{scope}': invalid '{kind}' keyword ({info})")]
pub struct SchemaError {
    /// Location of the offending schema node
    pub scope: String,
    /// Keyword whose argument is malformed
    pub kind: String,
    /// The offending keyword argument
    pub info: Value,
}

impl SchemaError {
    /// Create a new schema error
    pub fn new<S, K>(scope: S, kind: K, info: Value) -> Self
    where
        S: Into<String>,
        K: Into<String>,
    {
        Self {
            scope: scope.into(),
            kind: kind.into(),
            info,
        }
    }

    /// Canonical JSON projection of this error
    pub fn info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind.clone(),
            path: None,
            scope: Some(self.scope.clone()),
            info: Some(self.info.clone()),
            errors: None,
        }
    }
}

/// The data failed a constraint
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    /// Location within the data
    pub path: String,
    /// Location of the schema node that rejected the data
    pub scope: String,
    /// Keyword name, `multiple`, or `false`
    pub kind: String,
    /// Per-property, per-item or per-branch causes
    pub nested: Vec<ValidationError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "Validation failed at '{}': '{}' ({})", path, self.kind, self.scope)?;

        if !self.nested.is_empty() {
            write!(f, " with {} nested error(s)", self.nested.len())?;
        }

        Ok(())
    }
}

impl ValidationError {
    /// Create a validation error without nested causes
    pub fn new<P, S, K>(path: P, scope: S, kind: K) -> Self
    where
        P: Into<String>,
        S: Into<String>,
        K: Into<String>,
    {
        Self {
            path: path.into(),
            scope: scope.into(),
            kind: kind.into(),
            nested: Vec::new(),
        }
    }

    /// Create a validation error wrapping nested causes
    pub fn with_nested<P, S, K>(path: P, scope: S, kind: K, nested: Vec<ValidationError>) -> Self
    where
        P: Into<String>,
        S: Into<String>,
        K: Into<String>,
    {
        Self {
            path: path.into(),
            scope: scope.into(),
            kind: kind.into(),
            nested,
        }
    }

    /// Number of errors in this tree that have no nested causes
    pub fn leaf_count(&self) -> usize {
        if self.nested.is_empty() {
            1
        } else {
            self.nested.iter().map(ValidationError::leaf_count).sum()
        }
    }

    /// Canonical JSON projection of this error and its causes
    pub fn info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind.clone(),
            path: Some(self.path.clone()),
            scope: Some(self.scope.clone()),
            info: None,
            errors: if self.nested.is_empty() {
                None
            } else {
                Some(self.nested.iter().map(ValidationError::info).collect())
            },
        }
    }
}

/// Any failure the engine can raise
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The schema is malformed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The data is invalid
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EngineError {
    /// Canonical JSON projection of this error
    pub fn info(&self) -> ErrorInfo {
        match self {
            Self::Schema(error) => error.info(),
            Self::Validation(error) => error.info(),
        }
    }

    /// Keyword (or aggregate) kind of this error
    pub fn kind(&self) -> &str {
        match self {
            Self::Schema(error) => &error.kind,
            Self::Validation(error) => &error.kind,
        }
    }

    /// Whether this is a data validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the schema itself is at fault
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Borrow the validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Schema(_) => None,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Canonical, serializable shape of an error for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Keyword kind, or the message of a foreign error
    #[serde(rename = "type")]
    pub kind: String,
    /// Location within the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Location within the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Offending keyword argument of a schema error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    /// Nested causes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorInfo>>,
}

/// Canonicalize any error into an [`ErrorInfo`]
///
/// Engine errors keep their full location and cause tree; any other error
/// becomes `{ "type": <message> }`.
pub fn error_info(error: &(dyn std::error::Error + 'static)) -> ErrorInfo {
    if let Some(engine) = error.downcast_ref::<EngineError>() {
        return engine.info();
    }
    if let Some(validation) = error.downcast_ref::<ValidationError>() {
        return validation.info();
    }
    if let Some(schema) = error.downcast_ref::<SchemaError>() {
        return schema.info();
    }

    ErrorInfo {
        kind: error.to_string(),
        path: None,
        scope: None,
        info: None,
        errors: None,
    }
}
