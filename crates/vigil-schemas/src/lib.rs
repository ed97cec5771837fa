//! Vigil Schemas - keyword-dispatch JSON Schema validation
//!
//! This crate validates structured data against an already-resolved JSON
//! Schema document (draft-07, 2019-09 or 2020-12) and returns either the
//! transformed data or a structured error.
//!
//! ## Features
//!
//! - **Per-draft keyword profiles**: the draft is detected from `$schema`
//!   once per [`Schema`] and never changes afterwards
//! - **Speculative composition**: `allOf`/`anyOf`/`oneOf`/`not`/`if` branches
//!   run on cloned data, so failed branches leave no trace
//! - **Annotations**: default materialization, `date`/`date-time` coercion
//!   and `readOnly`/`writeOnly` stripping under a read/write context
//! - **Extensible**: extra keywords and formats can be registered per schema
//! - **Detailed error reporting**: every failure keeps its data path, schema
//!   scope and nested causes
//!
//! ## Quick Start
//!
//! ```rust
//! use vigil_schemas::{Context, DataValue, Schema, ValidationOptions};
//! use serde_json::json;
//!
//! let schema = Schema::new(json!({
//!     "type": "object",
//!     "required": ["id", "name"],
//!     "properties": {
//!         "id": {"type": "integer", "readOnly": true},
//!         "name": {"type": "string"}
//!     }
//! }));
//!
//! // `id` is assigned by the server, so a write may omit it.
//! let options = ValidationOptions::new().with_context(Context::Write);
//! let data = DataValue::from(&json!({"name": "probe"}));
//! assert!(schema.validate(data, &options, "").is_ok());
//! ```
//!
//! Reference resolution (`$ref`, `$id`) is out of scope: callers hand the
//! engine a fully dereferenced document.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

pub mod formats;
pub mod validation;
pub mod versioning;

// Re-export commonly used types for convenience
pub use formats::{FormatChecker, FormatRegistry};
pub use validation::{
    error_info, is_valid, validate, Context, DataMap, DataValue, EngineError, EngineResult, ErrorInfo, Frame,
    Keyword, KeywordValidator, Schema, SchemaBuilder, SchemaError, ValidationError, ValidationOptions, FALSE_SCHEMA,
    MULTIPLE,
};
pub use versioning::{profile_for, Draft, ProfileExtension, VersionProfile};
