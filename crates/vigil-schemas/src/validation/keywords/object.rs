//! Keywords that inspect object data
//!
//! Property-level failures are collected and raised together under the
//! keyword that found them. Properties whose schema is excluded by the
//! read/write context are deleted instead of validated.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use super::{attempt, collect, context_excluded, Frame, Keyword};
use crate::formats::cache;
use crate::validation::base::child_path;
use crate::validation::error::{EngineResult, ValidationError};
use crate::validation::value::{DataMap, DataValue};
use fancy_regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;

pub(super) fn validate_property_count(
    frame: &Frame<'_>,
    keyword: Keyword,
    arg: &Value,
    data: &mut DataValue,
) -> EngineResult<()> {
    let kind = keyword.name();
    let Some(limit) = arg.as_u64() else {
        return Err(frame.malformed(kind, arg));
    };
    let Some(object) = data.as_object() else {
        return Ok(());
    };

    let count = object.len() as u64;
    let within = match keyword {
        Keyword::MaxProperties => count <= limit,
        _ => count >= limit,
    };

    if within {
        Ok(())
    } else {
        Err(frame.fail(kind))
    }
}

/// Parse a list of property names
fn name_list<'v>(frame: &Frame<'_>, kind: &str, arg: &'v Value) -> EngineResult<Vec<&'v str>> {
    let Some(items) = arg.as_array() else {
        return Err(frame.malformed(kind, arg));
    };
    items
        .iter()
        .map(|item| item.as_str().ok_or_else(|| frame.malformed(kind, arg)))
        .collect()
}

/// One nested failure per name in `names` absent from `object`
fn missing_names(
    frame: &Frame<'_>,
    kind: &str,
    scope: &str,
    names: &[&str],
    object: &DataMap,
) -> Vec<ValidationError> {
    names
        .iter()
        .filter(|name| !object.contains_key(**name))
        .map(|name| ValidationError::new(child_path(frame.path(), name), scope, kind))
        .collect()
}

pub(super) fn validate_required(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let names = name_list(frame, "required", arg)?;
    let Some(object) = data.as_object() else {
        return Ok(());
    };

    let context = frame.options().context;
    let declared = frame.arg("properties");
    let enforced: Vec<&str> = names
        .into_iter()
        .filter(|name| {
            !declared
                .and_then(|properties| properties.get(*name))
                .is_some_and(|schema| context_excluded(schema, context))
        })
        .collect();

    let scope = frame.keyword_scope(&["required"]);
    let errors = missing_names(frame, "required", &scope, &enforced, object);
    frame.finish("required", errors)
}

pub(super) fn validate_properties(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(schemas) = arg.as_object() else {
        return Err(frame.malformed("properties", arg));
    };
    let Some(object) = data.as_object_mut() else {
        return Ok(());
    };

    let context = frame.options().context;
    let mut errors = Vec::new();
    for (name, schema) in schemas {
        if context_excluded(schema, context) {
            object.remove(name);
            continue;
        }
        if let Some(value) = object.get_mut(name) {
            let path = child_path(frame.path(), name);
            collect(frame.descend(schema, &["properties", name.as_str()], &path, value), &mut errors)?;
        }
    }

    frame.finish("properties", errors)
}

/// Compile every `patternProperties` key on this node
fn compiled_patterns<'s>(
    frame: &Frame<'_>,
    schemas: &'s Map<String, Value>,
) -> EngineResult<Vec<(&'s str, Arc<Regex>, &'s Value)>> {
    schemas
        .iter()
        .map(|(pattern, schema)| {
            cache::compiled(pattern)
                .map(|regex| (pattern.as_str(), regex, schema))
                .map_err(|_| frame.malformed("patternProperties", &Value::String(pattern.clone())))
        })
        .collect()
}

pub(super) fn validate_pattern_properties(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(schemas) = arg.as_object() else {
        return Err(frame.malformed("patternProperties", arg));
    };
    let patterns = compiled_patterns(frame, schemas)?;
    let Some(object) = data.as_object_mut() else {
        return Ok(());
    };

    let context = frame.options().context;
    let names: Vec<String> = object.keys().cloned().collect();
    let mut errors = Vec::new();
    for name in names {
        for (pattern, regex, schema) in &patterns {
            if !cache::matches(regex, &name) {
                continue;
            }
            if context_excluded(schema, context) {
                object.remove(&name);
                break;
            }
            if let Some(value) = object.get_mut(&name) {
                let path = child_path(frame.path(), &name);
                collect(
                    frame.descend(schema, &["patternProperties", *pattern], &path, value),
                    &mut errors,
                )?;
            }
        }
    }

    frame.finish("patternProperties", errors)
}

/// Property names not covered by sibling `properties` or `patternProperties`
fn unmatched_names(frame: &Frame<'_>, object: &DataMap) -> EngineResult<Vec<String>> {
    let declared = frame.arg("properties").and_then(Value::as_object);
    let patterns = match frame.arg("patternProperties").and_then(Value::as_object) {
        Some(schemas) => compiled_patterns(frame, schemas)?,
        None => Vec::new(),
    };

    Ok(object
        .keys()
        .filter(|name| !declared.is_some_and(|declared| declared.contains_key(*name)))
        .filter(|name| !patterns.iter().any(|(_, regex, _)| cache::matches(regex, name)))
        .cloned()
        .collect())
}

/// Shared body of `additionalProperties` and `unevaluatedProperties`
pub(super) fn validate_extra_properties(
    frame: &Frame<'_>,
    kind: &str,
    arg: &Value,
    data: &mut DataValue,
) -> EngineResult<()> {
    if arg == &Value::Bool(true) {
        return Ok(());
    }
    let Some(object) = data.as_object_mut() else {
        return Ok(());
    };

    let context = frame.options().context;
    let remove_additional = frame.options().remove_additional;
    let mut errors = Vec::new();
    for name in unmatched_names(frame, object)? {
        if context_excluded(arg, context) {
            object.remove(&name);
            continue;
        }
        let Some(current) = object.get(&name) else {
            continue;
        };

        let mut trial = current.clone();
        let path = child_path(frame.path(), &name);
        match attempt(frame.descend(arg, &[kind], &path, &mut trial))? {
            Ok(()) => {
                object.insert(name, trial);
            }
            Err(_) if remove_additional => {
                object.remove(&name);
            }
            Err(error) => errors.push(error),
        }
    }

    frame.finish(kind, errors)
}

pub(super) fn validate_dependencies(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(dependencies) = arg.as_object() else {
        return Err(frame.malformed("dependencies", arg));
    };

    let mut errors = Vec::new();
    for (trigger, dependency) in dependencies {
        if data.get(trigger).is_none() {
            continue;
        }
        match dependency {
            Value::Array(_) => {
                let names = name_list(frame, "dependencies", dependency)?;
                if let Some(object) = data.as_object() {
                    let scope = frame.keyword_scope(&["dependencies", trigger.as_str()]);
                    errors.extend(missing_names(frame, "dependencies", &scope, &names, object));
                }
            }
            Value::Object(_) | Value::Bool(_) => {
                collect(
                    frame.descend(dependency, &["dependencies", trigger.as_str()], frame.path(), data),
                    &mut errors,
                )?;
            }
            _ => return Err(frame.malformed("dependencies", arg)),
        }
    }

    frame.finish("dependencies", errors)
}

pub(super) fn validate_dependent_required(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(dependencies) = arg.as_object() else {
        return Err(frame.malformed("dependentRequired", arg));
    };

    let mut errors = Vec::new();
    for (trigger, dependency) in dependencies {
        let names = name_list(frame, "dependentRequired", dependency)?;
        let Some(object) = data.as_object() else {
            continue;
        };
        if !object.contains_key(trigger) {
            continue;
        }
        let scope = frame.keyword_scope(&["dependentRequired", trigger.as_str()]);
        errors.extend(missing_names(frame, "dependentRequired", &scope, &names, object));
    }

    frame.finish("dependentRequired", errors)
}

pub(super) fn validate_dependent_schemas(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(dependencies) = arg.as_object() else {
        return Err(frame.malformed("dependentSchemas", arg));
    };

    let mut errors = Vec::new();
    for (trigger, schema) in dependencies {
        if data.get(trigger).is_none() {
            continue;
        }
        collect(
            frame.descend(schema, &["dependentSchemas", trigger.as_str()], frame.path(), data),
            &mut errors,
        )?;
    }

    frame.finish("dependentSchemas", errors)
}

pub(super) fn validate_property_names(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(object) = data.as_object() else {
        return Ok(());
    };

    let mut errors = Vec::new();
    for name in object.keys() {
        let mut candidate = DataValue::String(name.clone());
        let path = child_path(frame.path(), name);
        collect(frame.descend(arg, &["propertyNames"], &path, &mut candidate), &mut errors)?;
    }

    frame.finish("propertyNames", errors)
}
