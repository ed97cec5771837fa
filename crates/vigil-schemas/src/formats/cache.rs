//! Process-wide cache of compiled regular expressions
//!
//! Patterns use ECMA-262 syntax, so they are compiled with `fancy_regex`,
//! which adds lookaround and backreferences on top of the `regex` engine.
//! Entries are keyed by pattern text and never evicted. Format patterns and
//! ad hoc `pattern`/`patternProperties` values share the same cache. Two
//! threads racing on the same key may both compile it; the last insert wins,
//! which is harmless because both compiled values are equivalent.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use parking_lot::RwLock;
use fancy_regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static REGEX_CACHE: OnceLock<RwLock<HashMap<String, Arc<Regex>>>> = OnceLock::new();

fn cache() -> &'static RwLock<HashMap<String, Arc<Regex>>> {
    REGEX_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get the compiled form of `pattern`, compiling and caching it on first use
///
/// Compilation failures are returned and not cached.
pub fn compiled(pattern: &str) -> Result<Arc<Regex>, fancy_regex::Error> {
    if let Some(regex) = cache().read().get(pattern) {
        return Ok(Arc::clone(regex));
    }

    let regex = Arc::new(Regex::new(pattern)?);
    cache()
        .write()
        .insert(pattern.to_string(), Arc::clone(&regex));
    Ok(regex)
}

/// Test `text` against a compiled pattern
///
/// A match that aborts at run time (backtrack limit) counts as no match.
pub fn matches(regex: &Regex, text: &str) -> bool {
    regex.is_match(text).unwrap_or(false)
}

/// Test `text` against `pattern`, treating an uncompilable pattern as no match
pub fn is_match(pattern: &str, text: &str) -> bool {
    compiled(pattern).map(|regex| matches(&regex, text)).unwrap_or(false)
}

/// Whether `pattern` has already been compiled
pub fn is_cached(pattern: &str) -> bool {
    cache().read().contains_key(pattern)
}

/// Number of compiled patterns held by the cache
pub fn len() -> usize {
    cache().read().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_is_reused() {
        let first = compiled("^cache-reuse-[0-9]+$").unwrap();
        let second = compiled("^cache-reuse-[0-9]+$").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(is_cached("^cache-reuse-[0-9]+$"));
    }

    #[test]
    fn test_invalid_pattern_not_cached() {
        assert!(compiled("(unbalanced").is_err());
        assert!(!is_cached("(unbalanced"));
        assert!(!is_match("(unbalanced", "unbalanced"));
    }

    #[test]
    fn test_lookaround_and_backreferences() {
        assert!(is_match("^(?!admin).*$", "user"));
        assert!(!is_match("^(?!admin).*$", "admin"));
        assert!(is_match("^foo(?=bar)", "foobar"));
        assert!(is_match(r"^(a)\1$", "aa"));
        assert!(!is_match(r"^(a)\1$", "ab"));
    }

    #[test]
    fn test_concurrent_population() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| compiled("^race-[a-z]+$").map(|r| matches(&r, "race-x"))))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap());
        }
        assert!(len() >= 1);
    }
}
