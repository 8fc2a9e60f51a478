//! Gender resolution for rule evaluation
//!
//! The recorded attribute always wins. When it is absent an optional
//! [`GenderFallback`] strategy may be consulted; if that does not match
//! either, the gender stays `Unknown` and gender-dependent rules are skipped.

use crate::{Gender, Person};
use std::collections::HashMap;

/// Last-resort strategy for guessing a gender from profile data
pub trait GenderFallback: Send + Sync {
    /// Guess a gender for the person, `Unknown` when there is no match
    fn guess(&self, person: &Person) -> Gender;
}

/// Fallback mapping known given names to a gender
///
/// Name lists are locale-specific; the table is always supplied by
/// configuration and nothing is built in.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: HashMap<String, Gender>,
}

impl NameTable {
    /// Build a table from `(name, gender)` pairs; names match case-insensitively
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Gender)>,
        S: AsRef<str>,
    {
        let names = entries
            .into_iter()
            .filter(|(_, g)| g.is_known())
            .map(|(name, g)| (name.as_ref().trim().to_lowercase(), g))
            .collect();
        Self { names }
    }

    /// Number of names in the table
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl GenderFallback for NameTable {
    fn guess(&self, person: &Person) -> Gender {
        person
            .given_name()
            .and_then(|name| self.names.get(&name.to_lowercase()).copied())
            .unwrap_or(Gender::Unknown)
    }
}

/// Resolves a person's gender for rule evaluation
#[derive(Default)]
pub struct GenderResolver {
    fallback: Option<Box<dyn GenderFallback>>,
}

impl GenderResolver {
    /// Resolver using the recorded attribute only
    pub fn attribute_only() -> Self {
        Self { fallback: None }
    }

    /// Resolver with a last-resort fallback strategy
    pub fn with_fallback(fallback: impl GenderFallback + 'static) -> Self {
        Self {
            fallback: Some(Box::new(fallback)),
        }
    }

    /// Resolve the gender of a person
    pub fn resolve(&self, person: &Person) -> Gender {
        if person.gender.is_known() {
            return person.gender;
        }
        match &self.fallback {
            Some(fallback) => fallback.guess(person),
            None => Gender::Unknown,
        }
    }

    /// Whether a fallback strategy is installed
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl std::fmt::Debug for GenderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenderResolver")
            .field("has_fallback", &self.has_fallback())
            .finish()
    }
}
