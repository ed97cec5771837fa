//! Per-draft keyword tables
//!
//! A [`VersionProfile`] maps every keyword name the engine dispatches for a
//! draft to its validator. Built-in keywords come from the closed
//! [`Keyword`] enum; callers add further keywords through a
//! [`ProfileExtension`] merged in when a schema locks its version.
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use crate::validation::keywords::{Keyword, KeywordValidator};
use crate::versioning::version::Draft;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Validator bound to a keyword name
#[derive(Clone)]
pub(crate) enum Handler {
    Builtin(Keyword),
    Custom(Arc<dyn KeywordValidator>),
}

/// Keyword set recognized for one draft
#[derive(Clone)]
pub struct VersionProfile {
    draft: Draft,
    handlers: HashMap<String, Handler>,
}

impl fmt::Debug for VersionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionProfile")
            .field("draft", &self.draft)
            .field("keywords", &self.keyword_names())
            .finish()
    }
}

impl VersionProfile {
    /// Built-in keyword table for `draft`
    pub fn new(draft: Draft) -> Self {
        let handlers = Keyword::ALL
            .iter()
            .filter(|keyword| keyword.since() <= draft)
            .map(|keyword| (keyword.name().to_string(), Handler::Builtin(*keyword)))
            .collect();

        Self { draft, handlers }
    }

    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Whether `name` is dispatched under this profile
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Whether `name` is dispatched by a caller-supplied validator
    pub fn is_custom(&self, name: &str) -> bool {
        matches!(self.handlers.get(name), Some(Handler::Custom(_)))
    }

    /// Sorted keyword names
    pub fn keyword_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Register an additional keyword
    ///
    /// Built-in keywords cannot be replaced; attempting to do so logs a
    /// warning and returns `false`. Re-registering a custom keyword replaces
    /// the previous validator.
    pub fn register<V>(&mut self, name: impl Into<String>, validator: V) -> bool
    where
        V: KeywordValidator + 'static,
    {
        self.register_shared(name, Arc::new(validator))
    }

    /// Register an additional keyword from a shared validator
    pub fn register_shared(&mut self, name: impl Into<String>, validator: Arc<dyn KeywordValidator>) -> bool {
        let name = name.into();
        if let Some(Handler::Builtin(_)) = self.handlers.get(&name) {
            warn!(keyword = %name, draft = %self.draft, "refusing to override built-in keyword");
            return false;
        }
        self.handlers.insert(name, Handler::Custom(validator));
        true
    }

    pub(crate) fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }
}

/// Names of the built-in keywords dispatched for `draft`
pub fn profile_for(draft: Draft) -> BTreeSet<&'static str> {
    Keyword::ALL
        .iter()
        .filter(|keyword| keyword.since() <= draft)
        .map(|keyword| keyword.name())
        .collect()
}

/// Hook for adding keywords to a profile without touching the base table
pub trait ProfileExtension: Send + Sync {
    /// Add keywords to `profile`; `profile.draft()` tells which draft is being built
    fn extend(&self, profile: &mut VersionProfile);
}

impl<F> ProfileExtension for F
where
    F: Fn(&mut VersionProfile) + Send + Sync,
{
    fn extend(&self, profile: &mut VersionProfile) {
        self(profile)
    }
}
