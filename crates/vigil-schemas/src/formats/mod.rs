//! Format registry for the `format` keyword
//!
//! Maps a format name to a predicate over the textual value. Most
//! predicates are regular expressions compiled lazily through the shared
//! [`cache`]; `date` and `date-time` additionally check calendar validity,
//! and `regex` checks that the value compiles.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

pub mod cache;

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv6Addr;
use std::sync::Arc;

const DATE_PATTERN: &str = r"^(\d{4})-(\d{2})-(\d{2})$";
const DATE_TIME_PATTERN: &str =
    r"^(\d{4})-(\d{2})-(\d{2})[Tt ](\d{2}):(\d{2}):(\d{2})(\.\d+)?([Zz]|([+-])(\d{2}):(\d{2}))$";
const TIME_PATTERN: &str =
    r"^([01]\d|2[0-3]):[0-5]\d:([0-5]\d|60)(\.\d+)?([Zz]|[+-]([01]\d|2[0-3]):[0-5]\d)$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const HOSTNAME_PATTERN: &str =
    r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.?$";
const IPV4_PATTERN: &str =
    r"^((25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$";
const URI_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]*$";
const URI_REFERENCE_PATTERN: &str = r"^[^\s\\]*$";
const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";
const JSON_POINTER_PATTERN: &str = r"^(/([^~/]|~[01])*)*$";
const RELATIVE_JSON_POINTER_PATTERN: &str = r"^(0|[1-9]\d*)(#|(/([^~/]|~[01])*)*)$";
const SEMVER_PATTERN: &str = r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(-((0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(\.(0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(\+([0-9a-zA-Z-]+(\.[0-9a-zA-Z-]+)*))?$";
const DURATION_PATTERN: &str =
    r"^P(\d+W|(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?)$";

/// Names of the formats this crate checks out of the box
pub const BUILTIN_FORMATS: &[&str] = &[
    "date-time",
    "date",
    "time",
    "email",
    "hostname",
    "ipv4",
    "ipv6",
    "uri",
    "uri-reference",
    "regex",
    "uuid",
    "json-pointer",
    "relative-json-pointer",
    "semver",
    "duration",
];

/// Predicate for a format; `true` means the text conforms
pub type FormatChecker = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Look up the built-in predicate for a format name
pub fn builtin(name: &str) -> Option<fn(&str) -> bool> {
    let checker: fn(&str) -> bool = match name {
        "date-time" => is_date_time,
        "date" => is_date,
        "time" => |v| cache::is_match(TIME_PATTERN, v),
        "email" => |v| cache::is_match(EMAIL_PATTERN, v),
        "hostname" => is_hostname,
        "ipv4" => |v| cache::is_match(IPV4_PATTERN, v),
        "ipv6" => |v| !v.contains('%') && v.parse::<Ipv6Addr>().is_ok(),
        "uri" => is_uri,
        "uri-reference" => is_uri_reference,
        "regex" => |v| cache::compiled(v).is_ok(),
        "uuid" => |v| cache::is_match(UUID_PATTERN, v),
        "json-pointer" => |v| cache::is_match(JSON_POINTER_PATTERN, v),
        "relative-json-pointer" => |v| cache::is_match(RELATIVE_JSON_POINTER_PATTERN, v),
        "semver" => |v| cache::is_match(SEMVER_PATTERN, v),
        "duration" => is_duration,
        _ => return None,
    };
    Some(checker)
}

/// Test `value` against a built-in format
///
/// Unknown format names are annotations only and always pass.
pub fn test(name: &str, value: &str) -> bool {
    builtin(name).map_or(true, |checker| checker(value))
}

/// Format lookup with per-schema additions layered over the built-ins
#[derive(Clone, Default)]
pub struct FormatRegistry {
    custom: HashMap<String, FormatChecker>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("FormatRegistry").field("custom", &names).finish()
    }
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a format predicate
    pub fn register<F>(&mut self, name: impl Into<String>, checker: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(checker));
    }

    /// Whether a predicate exists for `name`
    pub fn is_known(&self, name: &str) -> bool {
        self.custom.contains_key(name) || builtin(name).is_some()
    }

    /// Test `value` against `name`; unknown formats pass
    pub fn test(&self, name: &str, value: &str) -> bool {
        match self.custom.get(name) {
            Some(checker) => checker(value),
            None => test(name, value),
        }
    }
}

/// Whether `format` coerces conforming strings into date values
pub fn is_date_format(format: &str) -> bool {
    matches!(format, "date" | "date-time")
}

/// Parse text already accepted by the `date` or `date-time` format
pub fn parse_date(format: &str, value: &str) -> Option<DateTime<Utc>> {
    match format {
        "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc()),
        "date-time" => {
            if value.len() < 11 || !value.is_char_boundary(10) || !value.is_char_boundary(11) {
                return None;
            }
            let mut normalized = value.to_ascii_uppercase();
            normalized.replace_range(10..11, "T");
            DateTime::parse_from_rfc3339(&normalized)
                .ok()
                .map(|date| date.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn calendar_date(year: &str, month: &str, day: &str) -> bool {
    match (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>()) {
        (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day).is_some(),
        _ => false,
    }
}

fn is_date(value: &str) -> bool {
    let Ok(regex) = cache::compiled(DATE_PATTERN) else {
        return false;
    };
    match regex.captures(value).ok().flatten() {
        Some(caps) => calendar_date(&caps[1], &caps[2], &caps[3]),
        None => false,
    }
}

fn is_date_time(value: &str) -> bool {
    let Ok(regex) = cache::compiled(DATE_TIME_PATTERN) else {
        return false;
    };
    let Some(caps) = regex.captures(value).ok().flatten() else {
        return false;
    };

    let in_range = |index: usize, max: u32| {
        caps.get(index)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .is_some_and(|n| n <= max)
    };
    let offset_ok = caps.get(9).is_none() || (in_range(10, 23) && in_range(11, 59));

    calendar_date(&caps[1], &caps[2], &caps[3])
        && in_range(4, 23)
        && in_range(5, 59)
        && in_range(6, 60)
        && offset_ok
        && parse_date("date-time", value).is_some()
}

fn is_hostname(value: &str) -> bool {
    !value.is_empty() && value.len() <= 253 && cache::is_match(HOSTNAME_PATTERN, value)
}

fn is_uri(value: &str) -> bool {
    cache::is_match(URI_PATTERN, value) && url::Url::parse(value).is_ok()
}

fn is_uri_reference(value: &str) -> bool {
    if !cache::is_match(URI_REFERENCE_PATTERN, value) {
        return false;
    }
    if url::Url::parse(value).is_ok() {
        return true;
    }
    url::Url::parse("http://reference.invalid/")
        .and_then(|base| base.join(value))
        .is_ok()
}

fn is_duration(value: &str) -> bool {
    value.len() > 1 && !value.ends_with('T') && cache::is_match(DURATION_PATTERN, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_calendar_validity() {
        assert!(test("date", "2024-02-29"));
        assert!(!test("date", "2023-02-29"));
        assert!(!test("date", "2024-02-31"));
        assert!(!test("date", "2024-13-01"));
        assert!(!test("date", "24-02-01"));
    }

    #[test]
    fn test_date_time() {
        assert!(test("date-time", "2024-02-29T12:30:00Z"));
        assert!(test("date-time", "2024-02-29t12:30:00.123+05:30"));
        assert!(!test("date-time", "2024-02-30T12:30:00Z"));
        assert!(!test("date-time", "2024-02-28T25:30:00Z"));
        assert!(!test("date-time", "2024-02-28T12:30:00"));
    }

    #[test]
    fn test_parse_date_values() {
        let date = parse_date("date", "2024-02-29").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-02-29T00:00:00+00:00");

        let date_time = parse_date("date-time", "2024-02-29T12:30:00+02:00").unwrap();
        assert_eq!(date_time.to_rfc3339(), "2024-02-29T10:30:00+00:00");
    }

    #[test]
    fn test_regex_format() {
        assert!(test("regex", "^[a-z]+$"));
        assert!(!test("regex", "(unclosed"));
        assert!(!test("regex", "*dangling"));
        assert!(test("regex", "^(?!admin).*$"));
        assert!(test("regex", r"(a)\1"));
    }

    #[test]
    fn test_time_offset_is_mandatory() {
        assert!(test("time", "08:15:00Z"));
        assert!(test("time", "08:15:00.250-04:00"));
        assert!(!test("time", "08:15:00"));
    }

    #[test]
    fn test_network_formats() {
        assert!(test("ipv4", "192.168.0.1"));
        assert!(!test("ipv4", "256.1.1.1"));
        assert!(test("ipv6", "::1"));
        assert!(!test("ipv6", "12345::"));
        assert!(test("hostname", "api.example.com"));
        assert!(!test("hostname", "-bad.example.com"));
        assert!(test("email", "someone@example.com"));
        assert!(!test("email", "someone@localhost"));
    }

    #[test]
    fn test_uri_formats() {
        assert!(test("uri", "https://example.com/a?b=c#d"));
        assert!(!test("uri", "/relative/path"));
        assert!(test("uri-reference", "/relative/path"));
        assert!(test("uri-reference", "#fragment"));
        assert!(!test("uri-reference", "has space"));
    }

    #[test]
    fn test_identifier_formats() {
        assert!(test("uuid", "123e4567-e89b-12d3-a456-426614174000"));
        assert!(!test("uuid", "123e4567e89b12d3a456426614174000"));
        assert!(test("json-pointer", "/a/b~1c"));
        assert!(!test("json-pointer", "a/b"));
        assert!(test("relative-json-pointer", "1/a"));
        assert!(test("relative-json-pointer", "0#"));
        assert!(test("semver", "1.2.3-alpha.1+build.5"));
        assert!(!test("semver", "1.2"));
        assert!(test("duration", "P1Y2M3DT4H5M6S"));
        assert!(!test("duration", "PT"));
    }

    #[test]
    fn test_unknown_formats_pass() {
        assert!(test("made-up", "anything"));
    }

    #[test]
    fn test_registry_override() {
        let mut registry = FormatRegistry::new();
        registry.register("ends-with-42", |v| v.ends_with("42"));
        registry.register("email", |v| v.ends_with("@corp.test"));

        assert!(registry.test("ends-with-42", "hello 42"));
        assert!(!registry.test("ends-with-42", "hello"));
        assert!(registry.test("email", "a@corp.test"));
        assert!(!registry.test("email", "a@example.com"));
        assert!(registry.test("uuid", "123e4567-e89b-12d3-a456-426614174000"));
        assert!(registry.is_known("ends-with-42"));
    }
}
