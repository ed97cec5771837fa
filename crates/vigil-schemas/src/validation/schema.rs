//! Validation driver
//!
//! A [`Schema`] wraps an already-resolved schema document and is reused
//! across many calls. The first call locks the draft (detected from
//! `$schema` unless one was configured) and builds the keyword profile;
//! every later call, including concurrent first calls, sees that same
//! profile.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use crate::formats::FormatRegistry;
use crate::validation::base::ValidationOptions;
use crate::validation::error::{EngineResult, SchemaError, ValidationError, FALSE_SCHEMA, MULTIPLE};
use crate::validation::keywords::{collect, context_excluded, Frame, KeywordValidator};
use crate::validation::value::DataValue;
use crate::versioning::{build_profile, Draft, Handler, ProfileExtension, VersionProfile};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Default scope label of a schema root
pub const ROOT_SCOPE: &str = "#";

/// Recursive walker over schema nodes under one locked profile
pub(crate) struct Walker<'a> {
    profile: &'a VersionProfile,
    formats: &'a FormatRegistry,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(profile: &'a VersionProfile, formats: &'a FormatRegistry) -> Self {
        Self { profile, formats }
    }

    pub(crate) fn draft(&self) -> Draft {
        self.profile.draft()
    }

    pub(crate) fn formats(&self) -> &FormatRegistry {
        self.formats
    }

    /// Apply one schema node to `data`
    ///
    /// Keywords run in document order and each sees the output of the
    /// previous one. Validation failures are collected: one failure is
    /// returned as is, several are wrapped in a `multiple` error. Schema
    /// errors abort immediately.
    pub(crate) fn validate_node(
        &self,
        node: &Value,
        scope: &str,
        path: &str,
        data: &mut DataValue,
        options: &ValidationOptions,
    ) -> EngineResult<()> {
        let schema = match node {
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => return Err(ValidationError::new(path, scope, FALSE_SCHEMA).into()),
            Value::Object(schema) => schema,
            other => return Err(SchemaError::new(scope, "schema", other.clone()).into()),
        };

        if options.should_set_default() {
            materialize_defaults(schema, data, options);
        }

        let frame = Frame::new(self, schema, scope, path, options);
        let mut errors = Vec::new();
        for (name, arg) in schema {
            let Some(handler) = self.profile.handler(name) else {
                continue;
            };
            trace!(keyword = %name, scope, path, "applying keyword");

            let result = match handler {
                Handler::Builtin(keyword) => keyword.apply(&frame, arg, data),
                Handler::Custom(validator) => validator.validate(&frame, data),
            };
            collect(result, &mut errors)?;
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0).into()),
            _ => Err(ValidationError::with_nested(path, scope, MULTIPLE, errors).into()),
        }
    }
}

/// Fill absent declared properties from their `default` annotations
///
/// Properties stripped by the read/write context are never defaulted.
fn materialize_defaults(schema: &Map<String, Value>, data: &mut DataValue, options: &ValidationOptions) {
    let Some(object) = data.as_object_mut() else {
        return;
    };
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (name, property) in properties {
        if object.contains_key(name) || context_excluded(property, options.context) {
            continue;
        }
        if let Some(default) = find_default(property) {
            object.insert(name.clone(), DataValue::from(default));
        }
    }
}

/// First `default` declared by a schema or, failing that, by its composition branches
fn find_default(schema: &Value) -> Option<&Value> {
    let schema = schema.as_object()?;
    if let Some(default) = schema.get("default") {
        return Some(default);
    }

    ["allOf", "anyOf", "oneOf"]
        .iter()
        .filter_map(|keyword| schema.get(*keyword).and_then(Value::as_array))
        .flatten()
        .find_map(find_default)
}

/// A resolved schema document ready to validate data
///
/// # Examples
///
/// ```rust
/// use vigil_schemas::{DataValue, Schema, ValidationOptions};
/// use serde_json::json;
///
/// let schema = Schema::new(json!({
///     "type": "object",
///     "properties": {"retries": {"type": "integer", "default": 3}}
/// }));
///
/// let options = ValidationOptions::new().with_set_default(true);
/// let data = schema.validate(DataValue::from(&json!({})), &options, "").unwrap();
/// assert_eq!(data.to_json(), json!({"retries": 3}));
/// ```
pub struct Schema {
    document: Arc<Value>,
    scope: String,
    configured: Option<Draft>,
    profile: OnceLock<Arc<VersionProfile>>,
    extensions: Vec<Arc<dyn ProfileExtension>>,
    formats: Arc<FormatRegistry>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("scope", &self.scope)
            .field("configured", &self.configured)
            .field("version", &self.version())
            .field("extensions", &self.extensions.len())
            .field("formats", &self.formats)
            .finish()
    }
}

impl Schema {
    /// Wrap a resolved document with default settings
    pub fn new(document: Value) -> Self {
        Self::builder(document).build()
    }

    pub fn builder(document: Value) -> SchemaBuilder {
        SchemaBuilder::new(document)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Scope label of the document root
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Locked draft, or `None` before the first validation
    pub fn version(&self) -> Option<Draft> {
        self.profile.get().map(|profile| profile.draft())
    }

    /// The locked keyword profile, locking it on first use
    pub fn profile(&self) -> &VersionProfile {
        self.profile.get_or_init(|| {
            let draft = Draft::detect(&self.document);
            debug!(draft = %draft, scope = %self.scope, explicit = false, "locked schema version");
            Arc::new(build_profile(draft, &self.extensions))
        })
    }

    /// Validate `data`, returning the annotated and coerced result
    ///
    /// `path` locates `data` in error reports and is empty at the top level.
    pub fn validate(&self, data: DataValue, options: &ValidationOptions, path: &str) -> EngineResult<DataValue> {
        let mut data = data;
        let walker = Walker::new(self.profile(), &self.formats);
        walker.validate_node(&self.document, &self.scope, path, &mut data, options)?;
        Ok(data)
    }

    /// Validate JSON data, returning the result as JSON
    pub fn validate_value(&self, data: &Value, options: &ValidationOptions) -> EngineResult<Value> {
        self.validate(DataValue::from(data), options, "")
            .map(|data| data.to_json())
    }

    /// Whether a copy of `data` passes with default options
    pub fn is_valid(&self, data: &DataValue) -> bool {
        self.validate(data.clone(), &ValidationOptions::default(), "").is_ok()
    }
}

/// Builder for [`Schema`]
pub struct SchemaBuilder {
    document: Value,
    scope: String,
    version: Option<Draft>,
    formats: FormatRegistry,
    extensions: Vec<Arc<dyn ProfileExtension>>,
}

impl SchemaBuilder {
    pub fn new(document: Value) -> Self {
        Self {
            document,
            scope: ROOT_SCOPE.to_string(),
            version: None,
            formats: FormatRegistry::new(),
            extensions: Vec::new(),
        }
    }

    /// Use `draft` instead of detecting it from `$schema`
    pub fn with_version(mut self, draft: Draft) -> Self {
        self.version = Some(draft);
        self
    }

    /// Label the document root in error reports
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Add or override a format predicate for this schema only
    pub fn with_format<F>(mut self, name: impl Into<String>, checker: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.register(name, checker);
        self
    }

    /// Apply `extension` to the profile when the version locks
    pub fn with_extension<E>(mut self, extension: E) -> Self
    where
        E: ProfileExtension + 'static,
    {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Register a single extra keyword in whichever profile gets locked
    pub fn with_keyword<V>(self, name: impl Into<String>, validator: V) -> Self
    where
        V: KeywordValidator + 'static,
    {
        let name = name.into();
        let validator: Arc<dyn KeywordValidator> = Arc::new(validator);
        self.with_extension(move |profile: &mut VersionProfile| {
            profile.register_shared(name.clone(), Arc::clone(&validator));
        })
    }

    pub fn build(self) -> Schema {
        let profile = OnceLock::new();
        if let Some(draft) = self.version {
            debug!(draft = %draft, scope = %self.scope, explicit = true, "locked schema version");
            // A fresh cell cannot already be set.
            let _ = profile.set(Arc::new(build_profile(draft, &self.extensions)));
        }

        Schema {
            document: Arc::new(self.document),
            scope: self.scope,
            configured: self.version,
            profile,
            extensions: self.extensions,
            formats: Arc::new(self.formats),
        }
    }
}
