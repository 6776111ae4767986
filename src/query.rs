// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sparse query-string encoding for list and search filters.
//!
//! Only defined, truthy values reach the query: `None`, empty strings,
//! zero and `false` are dropped entirely rather than sent as empty keys.

/// A filter value that may be omitted from the query.
pub trait QueryValue {
    /// Encoded value, or `None` when the value is falsy.
    fn encode(&self) -> Option<String>;
}

impl QueryValue for &str {
    fn encode(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl QueryValue for String {
    fn encode(&self) -> Option<String> {
        self.as_str().encode()
    }
}

impl QueryValue for u32 {
    fn encode(&self) -> Option<String> {
        (*self != 0).then(|| self.to_string())
    }
}

impl QueryValue for u64 {
    fn encode(&self) -> Option<String> {
        (*self != 0).then(|| self.to_string())
    }
}

impl QueryValue for bool {
    fn encode(&self) -> Option<String> {
        self.then(|| "true".to_string())
    }
}

/// Ordered builder of query pairs.
#[derive(Debug, Default)]
pub struct SparseQuery {
    pairs: Vec<(&'static str, String)>,
}

impl SparseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` when `value` is present and truthy.
    pub fn push<V: QueryValue>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(encoded) = value.as_ref().and_then(QueryValue::encode) {
            self.pairs.push((key, encoded));
        }
        self
    }

    /// Add `key` whenever `value` is defined, even when it is falsy.
    ///
    /// Used for tri-state flags where `false` is a meaningful filter.
    pub fn push_defined(&mut self, key: &'static str, value: Option<bool>) -> &mut Self {
        if let Some(flag) = value {
            self.pairs.push((key, flag.to_string()));
        }
        self
    }

    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }
}
