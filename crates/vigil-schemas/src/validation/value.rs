//! The data value under validation
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Map type used for object data
pub type DataMap = BTreeMap<String, DataValue>;

/// A value under validation
///
/// Mirrors JSON with two additions: numbers are plain doubles (so `NaN` and
/// infinities can be represented and rejected), and strings accepted by the
/// `date-time` format is promoted to [`DataValue::Date`] and strings accepted
/// by the `date` format to [`DataValue::Day`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Day(NaiveDate),
    Array(Vec<DataValue>),
    Object(DataMap),
}

impl DataValue {
    /// JSON Schema type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Number(n) if is_integral(*n) => "integer",
            DataValue::Number(_) => "number",
            DataValue::String(_) | DataValue::Date(_) | DataValue::Day(_) => "string",
            DataValue::Array(_) => "array",
            DataValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Finite numeric value, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Whether this is a finite number with no fractional part
    pub fn is_integer(&self) -> bool {
        matches!(self, DataValue::Number(n) if is_integral(*n))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form of string-typed data
    ///
    /// Dates render as ISO-8601 with millisecond precision and days as
    /// `YYYY-MM-DD`. Non-string data yields `None`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            DataValue::String(s) => Some(Cow::Borrowed(s)),
            DataValue::Date(date) => Some(Cow::Owned(iso_string(date))),
            DataValue::Day(day) => Some(Cow::Owned(day_string(day))),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<DataValue>> {
        match self {
            DataValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<DataValue>> {
        match self {
            DataValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DataMap> {
        match self {
            DataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut DataMap> {
        match self {
            DataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a property of object data
    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Convert into a JSON value
    ///
    /// Dates and days become their ISO-8601 text and non-finite numbers
    /// become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            DataValue::Null => Value::Null,
            DataValue::Bool(b) => Value::Bool(*b),
            DataValue::Number(n) => number_to_json(*n),
            DataValue::String(s) => Value::String(s.clone()),
            DataValue::Date(date) => Value::String(iso_string(date)),
            DataValue::Day(day) => Value::String(day_string(day)),
            DataValue::Array(items) => Value::Array(items.iter().map(DataValue::to_json).collect()),
            DataValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// ISO-8601 text of a date value, e.g. `2024-02-29T00:00:00.000Z`
pub fn iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar text of a day value, e.g. `2024-02-29`
pub fn day_string(day: &NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0
}

fn number_to_json(n: f64) -> Value {
    // Integral values inside the i64 range keep an integer representation.
    if is_integral(n) && n.abs() < 9.2e18 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

impl From<&Value> for DataValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => DataValue::Null,
            Value::Bool(b) => DataValue::Bool(*b),
            Value::Number(n) => DataValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => DataValue::String(s.clone()),
            Value::Array(items) => DataValue::Array(items.iter().map(DataValue::from).collect()),
            Value::Object(map) => DataValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), DataValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for DataValue {
    fn from(value: Value) -> Self {
        DataValue::from(&value)
    }
}

impl From<DataValue> for Value {
    fn from(value: DataValue) -> Self {
        value.to_json()
    }
}

impl From<f64> for DataValue {
    fn from(n: f64) -> Self {
        DataValue::Number(n)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        DataValue::Number(n as f64)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(date: DateTime<Utc>) -> Self {
        DataValue::Date(date)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(day: NaiveDate) -> Self {
        DataValue::Day(day)
    }
}
