//! Keyword validators
//!
//! Every keyword the engine understands is a variant of the closed
//! [`Keyword`] enum. The driver looks a keyword name up in the active
//! [`VersionProfile`](crate::versioning::VersionProfile) and calls
//! [`Keyword::apply`] with a [`Frame`] describing the schema node being
//! evaluated. Keywords added through a profile extension implement
//! [`KeywordValidator`] instead.
//!
//! Validators receive the data by mutable reference. A validator may only
//! leave a mutation behind when it succeeds; speculative evaluation always
//! happens on a cloned working copy that is moved back on success.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

mod array;
mod composition;
mod object;
mod primitive;

use crate::formats::FormatRegistry;
use crate::validation::base::{child_scope, Context, ValidationOptions};
use crate::validation::error::{EngineError, EngineResult, SchemaError, ValidationError};
use crate::validation::schema::Walker;
use crate::validation::value::{day_string, iso_string, DataValue};
use crate::versioning::Draft;
use serde_json::{Map, Value};
use tracing::warn;

/// Validator for a keyword registered through a profile extension
///
/// The keyword's argument is available through [`Frame::arg`] under the
/// name it was registered with.
pub trait KeywordValidator: Send + Sync {
    fn validate(&self, frame: &Frame<'_>, data: &mut DataValue) -> EngineResult<()>;
}

impl<F> KeywordValidator for F
where
    F: Fn(&Frame<'_>, &mut DataValue) -> EngineResult<()> + Send + Sync,
{
    fn validate(&self, frame: &Frame<'_>, data: &mut DataValue) -> EngineResult<()> {
        self(frame, data)
    }
}

macro_rules! keywords {
    ($($variant:ident => $name:literal since $draft:ident,)*) => {
        /// Built-in keywords
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Every built-in keyword
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant,)*];

            /// Name of the keyword as it appears in a schema document
            pub fn name(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $name,)*
                }
            }

            /// Oldest draft that dispatches this keyword
            pub fn since(self) -> Draft {
                match self {
                    $(Keyword::$variant => Draft::$draft,)*
                }
            }

            /// Look a keyword up by its schema name
            pub fn from_name(name: &str) -> Option<Keyword> {
                match name {
                    $($name => Some(Keyword::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

keywords! {
    Type => "type" since Draft07,
    Enum => "enum" since Draft07,
    Const => "const" since Draft07,
    MultipleOf => "multipleOf" since Draft07,
    Maximum => "maximum" since Draft07,
    ExclusiveMaximum => "exclusiveMaximum" since Draft07,
    Minimum => "minimum" since Draft07,
    ExclusiveMinimum => "exclusiveMinimum" since Draft07,
    MaxLength => "maxLength" since Draft07,
    MinLength => "minLength" since Draft07,
    Pattern => "pattern" since Draft07,
    Format => "format" since Draft07,
    Items => "items" since Draft07,
    AdditionalItems => "additionalItems" since Draft07,
    MaxItems => "maxItems" since Draft07,
    MinItems => "minItems" since Draft07,
    UniqueItems => "uniqueItems" since Draft07,
    Contains => "contains" since Draft07,
    MaxProperties => "maxProperties" since Draft07,
    MinProperties => "minProperties" since Draft07,
    Required => "required" since Draft07,
    Properties => "properties" since Draft07,
    PatternProperties => "patternProperties" since Draft07,
    AdditionalProperties => "additionalProperties" since Draft07,
    Dependencies => "dependencies" since Draft07,
    PropertyNames => "propertyNames" since Draft07,
    If => "if" since Draft07,
    AllOf => "allOf" since Draft07,
    AnyOf => "anyOf" since Draft07,
    OneOf => "oneOf" since Draft07,
    Not => "not" since Draft07,
    Title => "title" since Draft07,
    Description => "description" since Draft07,
    Default => "default" since Draft07,
    Examples => "examples" since Draft07,
    ReadOnly => "readOnly" since Draft07,
    WriteOnly => "writeOnly" since Draft07,
    ContentEncoding => "contentEncoding" since Draft07,
    ContentMediaType => "contentMediaType" since Draft07,
    Comment => "$comment" since Draft07,
    Definitions => "definitions" since Draft07,
    DependentSchemas => "dependentSchemas" since Draft201909,
    DependentRequired => "dependentRequired" since Draft201909,
    UnevaluatedProperties => "unevaluatedProperties" since Draft201909,
    UnevaluatedItems => "unevaluatedItems" since Draft201909,
    Defs => "$defs" since Draft201909,
    Deprecated => "deprecated" since Draft201909,
    MinContains => "minContains" since Draft201909,
    MaxContains => "maxContains" since Draft201909,
    PrefixItems => "prefixItems" since Draft202012,
}

impl Keyword {
    /// Apply the keyword with argument `arg` to `data`
    pub fn apply(self, frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
        match self {
            Keyword::Type => primitive::validate_type(frame, arg, data),
            Keyword::Enum => primitive::validate_enum(frame, arg, data),
            Keyword::Const => primitive::validate_const(frame, arg, data),
            Keyword::MultipleOf => primitive::validate_multiple_of(frame, arg, data),
            Keyword::Maximum
            | Keyword::ExclusiveMaximum
            | Keyword::Minimum
            | Keyword::ExclusiveMinimum => primitive::validate_bound(frame, self, arg, data),
            Keyword::MaxLength | Keyword::MinLength => primitive::validate_length(frame, self, arg, data),
            Keyword::Pattern => primitive::validate_pattern(frame, arg, data),
            Keyword::Format => primitive::validate_format(frame, arg, data),
            Keyword::Items => array::validate_items(frame, arg, data),
            Keyword::PrefixItems => array::validate_prefix_items(frame, arg, data),
            Keyword::AdditionalItems => array::validate_additional_items(frame, arg, data),
            Keyword::UnevaluatedItems => array::validate_unevaluated_items(frame, arg, data),
            Keyword::MaxItems | Keyword::MinItems => array::validate_item_count(frame, self, arg, data),
            Keyword::UniqueItems => array::validate_unique_items(frame, arg, data),
            Keyword::Contains => array::validate_contains(frame, arg, data),
            Keyword::MaxProperties | Keyword::MinProperties => {
                object::validate_property_count(frame, self, arg, data)
            }
            Keyword::Required => object::validate_required(frame, arg, data),
            Keyword::Properties => object::validate_properties(frame, arg, data),
            Keyword::PatternProperties => object::validate_pattern_properties(frame, arg, data),
            Keyword::AdditionalProperties => {
                object::validate_extra_properties(frame, "additionalProperties", arg, data)
            }
            Keyword::UnevaluatedProperties => {
                // Simplified: only sibling keywords count as evaluating a property.
                if frame.arg("additionalProperties").is_some() {
                    return Ok(());
                }
                object::validate_extra_properties(frame, "unevaluatedProperties", arg, data)
            }
            Keyword::Dependencies => object::validate_dependencies(frame, arg, data),
            Keyword::DependentRequired => object::validate_dependent_required(frame, arg, data),
            Keyword::DependentSchemas => object::validate_dependent_schemas(frame, arg, data),
            Keyword::PropertyNames => object::validate_property_names(frame, arg, data),
            Keyword::If => composition::validate_if(frame, arg, data),
            Keyword::AllOf => composition::validate_all_of(frame, arg, data),
            Keyword::AnyOf => composition::validate_any_of(frame, arg, data),
            Keyword::OneOf => composition::validate_one_of(frame, arg, data),
            Keyword::Not => composition::validate_not(frame, arg, data),
            Keyword::Defs => {
                if frame.arg("definitions").is_some() && frame.draft() != Draft::Draft07 {
                    warn!(
                        scope = frame.scope(),
                        draft = %frame.draft(),
                        "both '$defs' and legacy 'definitions' are present; 'definitions' is not used by this draft"
                    );
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// One schema node being applied at one data location
pub struct Frame<'a> {
    walker: &'a Walker<'a>,
    schema: &'a Map<String, Value>,
    scope: &'a str,
    path: &'a str,
    options: &'a ValidationOptions,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        walker: &'a Walker<'a>,
        schema: &'a Map<String, Value>,
        scope: &'a str,
        path: &'a str,
        options: &'a ValidationOptions,
    ) -> Self {
        Self {
            walker,
            schema,
            scope,
            path,
            options,
        }
    }

    /// Argument of a keyword on this node
    pub fn arg(&self, name: &str) -> Option<&'a Value> {
        self.schema.get(name)
    }

    /// The whole schema node
    pub fn schema(&self) -> &'a Map<String, Value> {
        self.schema
    }

    /// Schema location of this node
    pub fn scope(&self) -> &'a str {
        self.scope
    }

    /// Data location being validated
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn options(&self) -> &'a ValidationOptions {
        self.options
    }

    /// Draft of the active profile
    pub fn draft(&self) -> Draft {
        self.walker.draft()
    }

    pub fn formats(&self) -> &FormatRegistry {
        self.walker.formats()
    }

    /// Schema location of a keyword on this node
    pub fn keyword_scope(&self, segments: &[&str]) -> String {
        child_scope(self.scope, segments)
    }

    /// Validation failure of `kind` at this location
    pub fn fail(&self, kind: &str) -> EngineError {
        ValidationError::new(self.path, self.keyword_scope(&[kind]), kind).into()
    }

    /// Validation failure of `kind` wrapping nested causes
    pub fn fail_nested(&self, kind: &str, nested: Vec<ValidationError>) -> EngineError {
        ValidationError::with_nested(self.path, self.keyword_scope(&[kind]), kind, nested).into()
    }

    /// Schema error for a malformed keyword argument
    pub fn malformed(&self, kind: &str, arg: &Value) -> EngineError {
        SchemaError::new(self.keyword_scope(&[kind]), kind, arg.clone()).into()
    }

    /// Fail with the collected causes, if any
    pub fn finish(&self, kind: &str, errors: Vec<ValidationError>) -> EngineResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(self.fail_nested(kind, errors))
        }
    }

    /// Validate `data` against a sub-schema with this frame's options
    ///
    /// `segments` extend this node's scope to locate the sub-schema.
    pub fn descend(&self, schema: &Value, segments: &[&str], path: &str, data: &mut DataValue) -> EngineResult<()> {
        self.descend_with(schema, segments, path, data, self.options)
    }

    /// Validate `data` against a sub-schema with explicit options
    pub fn descend_with(
        &self,
        schema: &Value,
        segments: &[&str],
        path: &str,
        data: &mut DataValue,
        options: &ValidationOptions,
    ) -> EngineResult<()> {
        let scope = self.keyword_scope(segments);
        self.walker.validate_node(schema, &scope, path, data, options)
    }
}

/// Separate a validation failure from a schema error
///
/// Schema errors stay in the outer `Err` so `?` aborts the call; data
/// failures move into the inner result for the caller to inspect.
pub fn attempt(result: EngineResult<()>) -> EngineResult<Result<(), ValidationError>> {
    match result {
        Ok(()) => Ok(Ok(())),
        Err(EngineError::Validation(error)) => Ok(Err(error)),
        Err(error) => Err(error),
    }
}

/// Push a validation failure onto `errors`, propagating schema errors
pub fn collect(result: EngineResult<()>, errors: &mut Vec<ValidationError>) -> EngineResult<()> {
    if let Err(error) = attempt(result)? {
        errors.push(error);
    }
    Ok(())
}

/// Structural equality between data and a JSON literal
///
/// Numbers compare as doubles and dates or days compare by their ISO-8601 text.
pub fn deep_equals(data: &DataValue, value: &Value) -> bool {
    match (data, value) {
        (DataValue::Null, Value::Null) => true,
        (DataValue::Bool(a), Value::Bool(b)) => a == b,
        (DataValue::Number(a), Value::Number(b)) => b.as_f64().is_some_and(|b| *a == b),
        (DataValue::String(a), Value::String(b)) => a == b,
        (DataValue::Date(date), Value::String(b)) => iso_string(date) == *b,
        (DataValue::Day(day), Value::String(b)) => day_string(day) == *b,
        (DataValue::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equals(x, y))
        }
        (DataValue::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equals(x, y)))
        }
        _ => false,
    }
}

/// Whether a property schema is stripped rather than validated in `context`
///
/// `readOnly` properties are stripped on write and `writeOnly` properties on
/// read. Without a context nothing is stripped.
pub fn context_excluded(schema: &Value, context: Option<Context>) -> bool {
    let flag = match context {
        Some(Context::Write) => "readOnly",
        Some(Context::Read) => "writeOnly",
        None => return false,
    };
    schema.get(flag).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_names_round_trip() {
        for keyword in Keyword::ALL {
            assert_eq!(Keyword::from_name(keyword.name()), Some(*keyword));
        }
        assert_eq!(Keyword::from_name("then"), None);
    }

    #[test]
    fn test_deep_equals() {
        let data = DataValue::from(&json!({"a": [1, 2.5, "x"], "b": null}));
        assert!(deep_equals(&data, &json!({"b": null, "a": [1.0, 2.5, "x"]})));
        assert!(!deep_equals(&data, &json!({"a": [1, 2.5, "x"]})));
        assert!(!deep_equals(&DataValue::from(1i64), &json!("1")));
    }

    #[test]
    fn test_deep_equals_date() {
        let date = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert!(deep_equals(
            &DataValue::Date(date),
            &json!("2024-02-29T00:00:00.000Z")
        ));
    }

    #[test]
    fn test_deep_equals_day() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert!(deep_equals(&DataValue::Day(day), &json!("2024-02-29")));
        assert!(!deep_equals(&DataValue::Day(day), &json!("2024-02-29T00:00:00.000Z")));
    }

    #[test]
    fn test_context_excluded() {
        let schema = json!({"readOnly": true});
        assert!(context_excluded(&schema, Some(Context::Write)));
        assert!(!context_excluded(&schema, Some(Context::Read)));
        assert!(!context_excluded(&schema, None));
        assert!(!context_excluded(&json!(false), Some(Context::Write)));
    }
}
