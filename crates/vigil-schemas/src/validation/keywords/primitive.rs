//! Keywords that inspect scalar data
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use super::{deep_equals, Frame, Keyword};
use crate::formats::{self, cache};
use crate::validation::error::EngineResult;
use crate::validation::value::{day_string, iso_string, DataValue};
use serde_json::Value;
use tracing::debug;

/// Tolerance for the quotient of `multipleOf` against its nearest integer
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

const TYPE_NAMES: [&str; 7] = ["null", "boolean", "object", "array", "number", "integer", "string"];

fn matches_type(name: &str, data: &DataValue) -> bool {
    match name {
        "null" => data.is_null(),
        "boolean" => matches!(data, DataValue::Bool(_)),
        "object" => matches!(data, DataValue::Object(_)),
        "array" => matches!(data, DataValue::Array(_)),
        "number" => data.as_number().is_some(),
        "integer" => data.is_integer(),
        "string" => matches!(data, DataValue::String(_) | DataValue::Date(_) | DataValue::Day(_)),
        _ => false,
    }
}

pub(super) fn validate_type(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let names: Vec<&str> = match arg {
        Value::String(name) => vec![name.as_str()],
        Value::Array(items) if !items.is_empty() => items.iter().filter_map(Value::as_str).collect(),
        _ => return Err(frame.malformed("type", arg)),
    };

    let well_formed = arg.as_array().map_or(true, |items| items.len() == names.len())
        && names.iter().all(|name| TYPE_NAMES.contains(name));
    if !well_formed {
        return Err(frame.malformed("type", arg));
    }

    if names.iter().any(|name| matches_type(name, data)) {
        Ok(())
    } else {
        Err(frame.fail("type"))
    }
}

pub(super) fn validate_enum(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let options = match arg {
        Value::Array(options) if !options.is_empty() => options,
        _ => return Err(frame.malformed("enum", arg)),
    };

    if options.iter().any(|option| deep_equals(data, option)) {
        Ok(())
    } else {
        Err(frame.fail("enum"))
    }
}

pub(super) fn validate_const(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    if deep_equals(data, arg) {
        Ok(())
    } else {
        Err(frame.fail("const"))
    }
}

pub(super) fn validate_multiple_of(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let divisor = match arg.as_f64() {
        Some(divisor) if divisor > 0.0 => divisor,
        _ => return Err(frame.malformed("multipleOf", arg)),
    };

    let Some(value) = data.as_number() else {
        return Ok(());
    };

    // Compare the quotient to its rounded value instead of using `%`, which
    // reports 0.3 % 0.1 as 0.09999999999999998.
    let quotient = value / divisor;
    if quotient.is_finite() && (quotient - quotient.round()).abs() <= MULTIPLE_OF_EPSILON {
        Ok(())
    } else {
        Err(frame.fail("multipleOf"))
    }
}

pub(super) fn validate_bound(
    frame: &Frame<'_>,
    keyword: Keyword,
    arg: &Value,
    data: &mut DataValue,
) -> EngineResult<()> {
    let kind = keyword.name();
    let Some(limit) = arg.as_f64() else {
        return Err(frame.malformed(kind, arg));
    };
    let Some(value) = data.as_number() else {
        return Ok(());
    };

    let within = match keyword {
        Keyword::Maximum => value <= limit,
        Keyword::ExclusiveMaximum => value < limit,
        Keyword::Minimum => value >= limit,
        Keyword::ExclusiveMinimum => value > limit,
        _ => true,
    };

    if within {
        Ok(())
    } else {
        Err(frame.fail(kind))
    }
}

pub(super) fn validate_length(
    frame: &Frame<'_>,
    keyword: Keyword,
    arg: &Value,
    data: &mut DataValue,
) -> EngineResult<()> {
    let kind = keyword.name();
    let Some(limit) = arg.as_u64() else {
        return Err(frame.malformed(kind, arg));
    };
    let Some(text) = data.as_text() else {
        return Ok(());
    };

    let length = text.chars().count() as u64;
    let within = match keyword {
        Keyword::MaxLength => length <= limit,
        _ => length >= limit,
    };

    if within {
        Ok(())
    } else {
        Err(frame.fail(kind))
    }
}

pub(super) fn validate_pattern(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(pattern) = arg.as_str() else {
        return Err(frame.malformed("pattern", arg));
    };
    let regex = cache::compiled(pattern).map_err(|_| frame.malformed("pattern", arg))?;

    match data.as_text() {
        Some(text) if !cache::matches(&regex, &text) => Err(frame.fail("pattern")),
        _ => Ok(()),
    }
}

pub(super) fn validate_format(frame: &Frame<'_>, arg: &Value, data: &mut DataValue) -> EngineResult<()> {
    let Some(format) = arg.as_str() else {
        return Err(frame.malformed("format", arg));
    };

    let text = match data {
        DataValue::String(text) => text.clone(),
        DataValue::Date(date) => {
            let iso = iso_string(date);
            match format {
                "date" => iso.chars().take(10).collect(),
                _ => iso,
            }
        }
        DataValue::Day(day) => day_string(day),
        _ => return Ok(()),
    };

    if !frame.formats().is_known(format) {
        debug!(format, scope = frame.scope(), "unknown format treated as annotation");
    }

    if !frame.formats().test(format, &text) {
        return Err(frame.fail("format"));
    }

    if matches!(data, DataValue::String(_)) && formats::is_date_format(format) {
        if let Some(date) = formats::parse_date(format, &text) {
            *data = match format {
                "date" => DataValue::Day(date.date_naive()),
                _ => DataValue::Date(date),
            };
        }
    }

    Ok(())
}
