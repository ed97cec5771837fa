//! Keywords that inspect array data
//!
//! Per-index failures are collected and raised together under the keyword
//! that found them.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use super::{attempt, collect, Frame, Keyword};
use crate::validation::base::child_index;
use crate::validation::error::EngineResult;
use crate::validation::value::DataValue;
use crate::versioning::Draft;
use serde_json::Value;

/// Number of positions covered by `prefixItems` on this node
fn prefix_len(frame: &Frame<'_>) -> usize {
    if frame.draft() < Draft::Draft202012 {
        return 0;
    }
    frame
        .arg("prefixItems")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Validate each element against the positional schema at the same index
fn validate_positional(
    frame: &Frame<'_>,
    kind: &str,
    schemas: &[Value],
    items: &mut [DataValue],
) -> EngineResult<()> {
    let mut errors = Vec::new();
    for (index, (schema, item)) in schemas.iter().zip(items.iter_mut()).enumerate() {
        let position = index.to_string();
        let path = child_index(frame.path(), index);
        collect(frame.descend(schema, &[kind, position.as_str()], &path, item), &mut errors)?;
    }
    frame.finish(kind, errors)
}

/// Validate every element from `start` onwards against one schema
fn validate_tail(
    frame: &Frame<'_>,
    kind: &str,
    schema: &Value,
    start: usize,
    items: &mut [DataValue],
) -> EngineResult<()> {
    let mut errors = Vec::new();
    for (index, item) in items.iter_mut().enumerate().skip(start) {
        let path = child_index(frame.path(), index);
        collect(frame.descend(schema, &[kind], &path, item), &mut errors)?;
    }
    frame.finish(kind, errors)
}

pub(super) fn validate_items(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(items) = data.as_array_mut() else {
        return Ok(());
    };

    match arg {
        Value::Array(schemas) => validate_positional(frame, "items", schemas, items),
        schema => validate_tail(frame, "items", schema, prefix_len(frame), items),
    }
}

pub(super) fn validate_prefix_items(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(schemas) = arg.as_array() else {
        return Err(frame.malformed("prefixItems", arg));
    };
    let Some(items) = data.as_array_mut() else {
        return Ok(());
    };

    validate_positional(frame, "prefixItems", schemas, items)
}

pub(super) fn validate_additional_items(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    // Only meaningful after a positional `items` array.
    let Some(positional) = frame.arg("items").and_then(Value::as_array) else {
        return Ok(());
    };
    let Some(items) = data.as_array_mut() else {
        return Ok(());
    };

    validate_tail(frame, "additionalItems", arg, positional.len(), items)
}

pub(super) fn validate_unevaluated_items(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    if frame.arg("additionalItems").is_some() {
        return Ok(());
    }

    let positional = match frame.arg("items") {
        Some(Value::Array(schemas)) => schemas.len(),
        // A single `items` schema already evaluates every element.
        Some(_) => return Ok(()),
        None => 0,
    };
    let Some(items) = data.as_array_mut() else {
        return Ok(());
    };

    let start = positional.max(prefix_len(frame));
    validate_tail(frame, "unevaluatedItems", arg, start, items)
}

pub(super) fn validate_item_count(
    frame: &Frame<'_>,
    keyword: Keyword,
    arg: &Value,
    data: &mut DataValue,
) -> EngineResult<()> {
    let kind = keyword.name();
    let Some(limit) = arg.as_u64() else {
        return Err(frame.malformed(kind, arg));
    };
    let Some(items) = data.as_array() else {
        return Ok(());
    };

    let count = items.len() as u64;
    let within = match keyword {
        Keyword::MaxItems => count <= limit,
        _ => count >= limit,
    };

    if within {
        Ok(())
    } else {
        Err(frame.fail(kind))
    }
}

pub(super) fn validate_unique_items(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(unique) = arg.as_bool() else {
        return Err(frame.malformed("uniqueItems", arg));
    };
    let Some(items) = data.as_array() else {
        return Ok(());
    };
    if !unique {
        return Ok(());
    }

    let duplicated = items
        .iter()
        .enumerate()
        .any(|(index, item)| items[index + 1..].contains(item));

    if duplicated {
        Err(frame.fail("uniqueItems"))
    } else {
        Ok(())
    }
}

/// Bounds on the number of `contains` matches
fn contains_bounds(frame: &Frame<'_>) -> EngineResult<(u64, Option<u64>)> {
    if frame.draft() < Draft::Draft201909 {
        return Ok((1, None));
    }

    let bound = |name: &str| -> EngineResult<Option<u64>> {
        match frame.arg(name) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| frame.malformed(name, value)),
        }
    };

    Ok((bound("minContains")?.unwrap_or(1), bound("maxContains")?))
}

pub(super) fn validate_contains(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let (min, max) = contains_bounds(frame)?;
    let Some(items) = data.as_array_mut() else {
        return Ok(());
    };

    let mut matched = 0u64;
    let mut errors = Vec::new();
    for (index, item) in items.iter_mut().enumerate() {
        // Non-matching elements must come back untouched, so each trial runs
        // on a copy that replaces the element only on success.
        let mut trial = item.clone();
        let path = child_index(frame.path(), index);
        match attempt(frame.descend(arg, &["contains"], &path, &mut trial))? {
            Ok(()) => {
                *item = trial;
                matched += 1;
            }
            Err(error) => errors.push(error),
        }
    }

    if matched < min {
        return Err(frame.fail_nested("contains", errors));
    }
    if max.is_some_and(|max| matched > max) {
        return Err(frame.fail("maxContains"));
    }

    Ok(())
}
