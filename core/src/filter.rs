#![deny(missing_docs)]

//! # Filters
//!
//! Predicates for selecting operations and objects in listings.
//! An empty set on any dimension places no constraint on it.

use crate::graph::{Object, ObjectKind, Operation};

/// Selects operations by HTTP method and name prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    /// Any-of HTTP methods, compared case-insensitively.
    pub methods: Vec<String>,
    /// Any-of name prefixes.
    pub prefixes: Vec<String>,
}

impl OperationFilter {
    /// A filter matching everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts to the given methods.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Restricts to the given name prefixes.
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// True if `op` satisfies every non-empty dimension.
    pub fn matches(&self, op: &Operation) -> bool {
        let method_ok =
            self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(&op.method));
        method_ok && has_any_prefix(&op.name, &self.prefixes)
    }
}

/// Selects objects by classification and name prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectFilter {
    /// Any-of classifications.
    pub kinds: Vec<ObjectKind>,
    /// Any-of name prefixes.
    pub prefixes: Vec<String>,
}

impl ObjectFilter {
    /// A filter matching everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts to the given classifications.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ObjectKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    /// Restricts to the given name prefixes.
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// True if `obj` satisfies every non-empty dimension.
    pub fn matches(&self, obj: &Object) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&obj.kind)) && has_any_prefix(&obj.name, &self.prefixes)
    }
}

fn has_any_prefix(name: &str, prefixes: &[String]) -> bool {
    prefixes.is_empty() || prefixes.iter().any(|p| name.starts_with(p.as_str()))
}
