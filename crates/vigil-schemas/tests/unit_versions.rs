//! Unit tests for draft profiles, version locking and extensions

use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use vigil_schemas::{
    profile_for, DataValue, Draft, EngineResult, Frame, Schema, ValidationOptions, VersionProfile,
};

const DRAFT_2019_09: &str = "https://json-schema.org/draft/2019-09/schema";
const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

fn check(schema: Value, data: Value) -> EngineResult<Value> {
    Schema::new(schema).validate_value(&data, &ValidationOptions::default())
}

#[cfg(test)]
mod profiles {
    use super::*;

    #[test]
    fn test_base_keywords_in_every_draft() {
        for draft in Draft::ALL {
            let keywords = profile_for(draft);
            for name in ["type", "properties", "allOf", "if", "readOnly", "default"] {
                assert!(keywords.contains(name), "{} missing from {}", name, draft);
            }
            assert!(!keywords.contains("then"));
        }
    }

    #[test]
    fn test_later_drafts_add_keywords() {
        let draft07 = profile_for(Draft::Draft07);
        let draft2019 = profile_for(Draft::Draft201909);
        let added: Vec<&str> = draft2019.difference(&draft07).copied().collect();
        for name in ["dependentSchemas", "dependentRequired", "unevaluatedProperties", "unevaluatedItems", "$defs", "deprecated"] {
            assert!(added.contains(&name), "{} not added by 2019-09", name);
        }
    }

    #[test]
    fn test_draft_07_ignores_newer_keywords() {
        assert!(check(json!({"dependentRequired": {"a": ["b"]}}), json!({"a": 1})).is_ok());
        assert!(check(json!({"prefixItems": [{"type": "string"}]}), json!([1])).is_ok());
        assert!(check(json!({"unevaluatedProperties": false}), json!({"a": 1})).is_ok());
    }
}

#[cfg(test)]
mod newer_keywords {
    use super::*;

    #[test]
    fn test_dependent_required() {
        let schema = json!({"$schema": DRAFT_2019_09, "dependentRequired": {"a": ["b", "c"]}});
        let error = check(schema.clone(), json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(error.kind(), "dependentRequired");
        assert_eq!(error.as_validation().unwrap().nested[0].path, "/c");
        assert!(check(schema, json!({"b": 2})).is_ok());
    }

    #[test]
    fn test_dependent_schemas() {
        let schema = json!({
            "$schema": DRAFT_2019_09,
            "dependentSchemas": {"a": {"properties": {"b": {"type": "string"}}}}
        });
        assert_eq!(check(schema.clone(), json!({"a": 1, "b": 2})).unwrap_err().kind(), "dependentSchemas");
        assert!(check(schema, json!({"b": 2})).is_ok());
    }

    #[test]
    fn test_unevaluated_properties() {
        let schema = json!({
            "$schema": DRAFT_2019_09,
            "properties": {"a": {}},
            "patternProperties": {"^x-": {}},
            "unevaluatedProperties": false
        });
        assert!(check(schema.clone(), json!({"a": 1, "x-b": 2})).is_ok());
        let error = check(schema, json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(error.kind(), "unevaluatedProperties");
    }

    #[test]
    fn test_unevaluated_properties_defers_to_additional_properties() {
        let schema = json!({
            "$schema": DRAFT_2019_09,
            "additionalProperties": true,
            "unevaluatedProperties": false
        });
        assert!(check(schema, json!({"a": 1})).is_ok());
    }

    #[test]
    fn test_unevaluated_items() {
        let schema = json!({
            "$schema": DRAFT_2019_09,
            "items": [{"type": "integer"}],
            "unevaluatedItems": false
        });
        assert!(check(schema.clone(), json!([1])).is_ok());
        assert_eq!(check(schema, json!([1, 2])).unwrap_err().kind(), "unevaluatedItems");

        let whole = json!({"$schema": DRAFT_2019_09, "items": {}, "unevaluatedItems": false});
        assert!(check(whole, json!([1, 2])).is_ok());
    }

    #[test]
    fn test_prefix_items() {
        let schema = json!({
            "$schema": DRAFT_2020_12,
            "prefixItems": [{"type": "integer"}],
            "items": {"type": "string"}
        });
        assert!(check(schema.clone(), json!([1, "a", "b"])).is_ok());
        assert_eq!(check(schema.clone(), json!(["a"])).unwrap_err().kind(), "prefixItems");
        assert_eq!(check(schema, json!([1, 2])).unwrap_err().kind(), "items");
    }

    #[test]
    fn test_contains_bounds() {
        let schema = json!({
            "$schema": DRAFT_2019_09,
            "contains": {"type": "integer"},
            "minContains": 2,
            "maxContains": 3
        });
        assert!(check(schema.clone(), json!([1, "a", 2])).is_ok());
        assert_eq!(check(schema.clone(), json!([1, "a"])).unwrap_err().kind(), "contains");
        assert_eq!(check(schema, json!([1, 2, 3, 4])).unwrap_err().kind(), "maxContains");

        let optional = json!({"$schema": DRAFT_2019_09, "contains": {"type": "integer"}, "minContains": 0});
        assert!(check(optional, json!([])).is_ok());
    }

    #[test]
    fn test_contains_bounds_ignored_by_draft_07() {
        let schema = json!({"contains": {"type": "integer"}, "maxContains": 1});
        assert!(check(schema, json!([1, 2])).is_ok());
    }

    #[test]
    fn test_defs_alongside_definitions_is_not_fatal() {
        let schema = json!({
            "$schema": DRAFT_2020_12,
            "$defs": {"a": {"type": "string"}},
            "definitions": {"a": {"type": "string"}},
            "type": "integer"
        });
        assert!(check(schema, json!(1)).is_ok());
    }
}

#[cfg(test)]
mod version_locking {
    use super::*;

    #[test]
    fn test_detection_happens_on_first_validation() {
        let schema = Schema::new(json!({"$schema": DRAFT_2020_12}));
        assert_eq!(schema.version(), None);
        assert!(schema.is_valid(&DataValue::Null));
        assert_eq!(schema.version(), Some(Draft::Draft202012));
        assert_eq!(schema.profile().draft(), Draft::Draft202012);
    }

    #[test]
    fn test_explicit_version_wins_over_detection() {
        let schema = Schema::builder(json!({"$schema": DRAFT_2020_12, "prefixItems": [{"type": "string"}]}))
            .with_version(Draft::Draft07)
            .build();
        assert_eq!(schema.version(), Some(Draft::Draft07));
        assert!(schema.is_valid(&DataValue::from(&json!([1]))));
        assert_eq!(schema.version(), Some(Draft::Draft07));
    }

    #[test]
    fn test_concurrent_first_calls_agree() {
        let schema = Arc::new(Schema::new(json!({
            "$schema": DRAFT_2019_09,
            "dependentRequired": {"a": ["b"]}
        })));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let schema = Arc::clone(&schema);
                thread::spawn(move || {
                    let result = schema.validate_value(&json!({"a": 1}), &ValidationOptions::default());
                    (schema.version(), result.map_err(|error| error.kind().to_string()))
                })
            })
            .collect();

        for handle in handles {
            let (version, result) = handle.join().unwrap();
            assert_eq!(version, Some(Draft::Draft201909));
            assert_eq!(result.unwrap_err(), "dependentRequired");
        }
    }
}

#[cfg(test)]
mod extensions {
    use super::*;

    fn discriminated(document: Value) -> Schema {
        Schema::builder(document)
            .with_keyword("discriminator", |frame: &Frame<'_>, data: &mut DataValue| -> EngineResult<()> {
                let Some(property) = frame
                    .arg("discriminator")
                    .and_then(|arg| arg.get("propertyName"))
                    .and_then(Value::as_str)
                else {
                    return Err(frame.malformed("discriminator", frame.arg("discriminator").unwrap_or(&Value::Null)));
                };
                match data.get(property) {
                    Some(DataValue::String(_)) => Ok(()),
                    _ => Err(frame.fail("discriminator")),
                }
            })
            .build()
    }

    #[test]
    fn test_custom_keyword_is_dispatched() {
        let schema = discriminated(json!({
            "type": "object",
            "discriminator": {"propertyName": "petType"}
        }));
        assert!(schema.validate_value(&json!({"petType": "cat"}), &ValidationOptions::default()).is_ok());

        let error = schema.validate_value(&json!({"name": "rex"}), &ValidationOptions::default()).unwrap_err();
        assert_eq!(error.kind(), "discriminator");
        assert_eq!(error.as_validation().unwrap().scope, "#/discriminator");
        assert!(schema.profile().is_custom("discriminator"));
    }

    #[test]
    fn test_custom_keyword_reaches_nested_schemas() {
        let schema = discriminated(json!({
            "properties": {"pet": {"discriminator": {"propertyName": "petType"}}}
        }));
        let error = schema
            .validate_value(&json!({"pet": {}}), &ValidationOptions::default())
            .unwrap_err();
        assert_eq!(error.as_validation().unwrap().nested[0].path, "/pet");
    }

    #[test]
    fn test_custom_keyword_malformed_argument() {
        let schema = discriminated(json!({"discriminator": "petType"}));
        let error = schema.validate_value(&json!({}), &ValidationOptions::default()).unwrap_err();
        assert!(error.is_schema());
    }

    #[test]
    fn test_base_keywords_unaffected() {
        let schema = discriminated(json!({"type": "string", "minLength": 2}));
        assert!(schema.is_valid(&DataValue::from("ok")));
        assert!(!schema.is_valid(&DataValue::from("x")));
    }

    #[test]
    fn test_extension_cannot_replace_builtin() {
        let schema = Schema::builder(json!({"type": "string"}))
            .with_keyword("type", |_frame: &Frame<'_>, _data: &mut DataValue| -> EngineResult<()> { Ok(()) })
            .build();
        assert!(!schema.is_valid(&DataValue::from(1i64)));
        assert!(!schema.profile().is_custom("type"));
    }

    #[test]
    fn test_extension_sees_draft() {
        let schema = Schema::builder(json!({"$schema": DRAFT_2020_12, "x-even": true}))
            .with_extension(|profile: &mut VersionProfile| {
                if profile.draft() >= Draft::Draft201909 {
                    profile.register("x-even", |frame: &Frame<'_>, data: &mut DataValue| -> EngineResult<()> {
                        match data.as_number() {
                            Some(n) if n % 2.0 != 0.0 => Err(frame.fail("x-even")),
                            _ => Ok(()),
                        }
                    });
                }
            })
            .build();
        assert!(schema.is_valid(&DataValue::from(4i64)));
        assert!(!schema.is_valid(&DataValue::from(3i64)));
        assert!(schema.profile().contains("x-even"));
    }
}
