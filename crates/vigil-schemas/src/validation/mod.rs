//! Keyword-dispatch validation
//!
//! A [`Schema`] walks a resolved schema document and a [`DataValue`] in
//! lock-step. Each keyword present on a node and known to the locked
//! [`VersionProfile`](crate::versioning::VersionProfile) is applied in
//! document order. The result is either the transformed data (defaults
//! materialized, dates coerced, contextual properties stripped) or an
//! [`EngineError`].
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod keywords;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use base::{child_index, child_path, child_scope, Context, ValidationOptions};
pub use error::{
    error_info, EngineError, EngineResult, ErrorInfo, SchemaError, ValidationError, FALSE_SCHEMA, MULTIPLE,
};
pub use keywords::{Frame, Keyword, KeywordValidator};
pub use schema::{Schema, SchemaBuilder, ROOT_SCOPE};
pub use value::{DataMap, DataValue};

use serde_json::Value;

/// Validate JSON data against a resolved document with default options
///
/// # Examples
///
/// ```rust
/// use vigil_schemas::validation::validate;
/// use serde_json::json;
///
/// let schema = json!({"type": "integer", "multipleOf": 3});
/// assert!(validate(&schema, &json!(9)).is_ok());
/// assert_eq!(validate(&schema, &json!(10)).unwrap_err().kind(), "multipleOf");
/// ```
pub fn validate(document: &Value, data: &Value) -> EngineResult<Value> {
    Schema::new(document.clone()).validate_value(data, &ValidationOptions::default())
}

/// Whether JSON data satisfies a resolved document
pub fn is_valid(document: &Value, data: &Value) -> bool {
    validate(document, data).is_ok()
}
