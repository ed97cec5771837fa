//! Composition keywords
//!
//! Every branch runs on its own clone of the data. Only a branch that is
//! kept (the `if` trial that passed, every successful `allOf` branch, the
//! first successful `anyOf`/`oneOf` branch) is moved back into the caller's
//! value, so a failed branch never leaves a partial mutation behind.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use super::{attempt, Frame};
use crate::validation::error::EngineResult;
use crate::validation::value::DataValue;
use serde_json::Value;

fn branches<'v>(frame: &Frame<'_>, kind: &str, arg: &'v Value) -> EngineResult<&'v Vec<Value>> {
    match arg {
        Value::Array(branches) if !branches.is_empty() => Ok(branches),
        _ => Err(frame.malformed(kind, arg)),
    }
}

pub(super) fn validate_if(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let then_schema = frame.arg("then");
    let else_schema = frame.arg("else");
    let path = frame.path();

    let mut trial = data.clone();
    let passed = attempt(frame.descend(arg, &["if"], path, &mut trial))?.is_ok();

    if passed {
        if let Some(then_schema) = then_schema {
            if let Err(error) = attempt(frame.descend(then_schema, &["then"], path, &mut trial))? {
                return Err(frame.fail_nested("then", vec![error]));
            }
            *data = trial;
        } else if else_schema.is_some() {
            *data = trial;
        }
    } else if let Some(else_schema) = else_schema {
        let mut trial = data.clone();
        if let Err(error) = attempt(frame.descend(else_schema, &["else"], path, &mut trial))? {
            return Err(frame.fail_nested("else", vec![error]));
        }
        *data = trial;
    }

    Ok(())
}

pub(super) fn validate_all_of(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let branches = branches(frame, "allOf", arg)?;

    let mut errors = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let position = index.to_string();
        let mut trial = data.clone();
        match attempt(frame.descend(branch, &["allOf", position.as_str()], frame.path(), &mut trial))? {
            Ok(()) => *data = trial,
            Err(error) => errors.push(error),
        }
    }

    frame.finish("allOf", errors)
}

pub(super) fn validate_any_of(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let branches = branches(frame, "anyOf", arg)?;

    let mut errors = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let position = index.to_string();
        let mut trial = data.clone();
        match attempt(frame.descend(branch, &["anyOf", position.as_str()], frame.path(), &mut trial))? {
            Ok(()) => {
                *data = trial;
                return Ok(());
            }
            Err(error) => errors.push(error),
        }
    }

    Err(frame.fail_nested("anyOf", errors))
}

pub(super) fn validate_one_of(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let branches = branches(frame, "oneOf", arg)?;

    let mut winner = None;
    let mut matched = 0usize;
    let mut errors = Vec::new();
    for (index, branch) in branches.iter().enumerate() {
        let position = index.to_string();
        let mut trial = data.clone();
        match attempt(frame.descend(branch, &["oneOf", position.as_str()], frame.path(), &mut trial))? {
            Ok(()) => {
                matched += 1;
                if matched > 1 {
                    // Exclusivity is already lost.
                    return Err(frame.fail("oneOf"));
                }
                winner = Some(trial);
            }
            Err(error) => errors.push(error),
        }
    }

    match winner {
        Some(trial) => {
            *data = trial;
            Ok(())
        }
        None => Err(frame.fail_nested("oneOf", errors)),
    }
}

pub(super) fn validate_not(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let options = frame.options().without_annotations();
    let mut trial = data.clone();

    match attempt(frame.descend_with(arg, &["not"], frame.path(), &mut trial, &options))? {
        Ok(()) => Err(frame.fail("not")),
        Err(_) => Ok(()),
    }
}
