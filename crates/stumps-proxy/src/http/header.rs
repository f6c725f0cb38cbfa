//! HTTP header types.
//!
//! Requests carry headers as an ordered list that may repeat a name.
//! Responses use [`HeaderCollection`], which keeps one entry per name
//! (compared case-insensitively) while preserving insertion order and the
//! original casing of each name.

use serde::{Deserialize, Serialize};

/// A single HTTP header as received or recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive comparison of the header name.
    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Ordered header set keyed by case-insensitive name.
///
/// Setting a name that already exists replaces the value in place, so the
/// iteration order is the order in which names were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<HttpHeader>,
}

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|h| h.is_named(name))
    }

    /// Insert or replace the value stored for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.entries[index].value = value,
            None => self.entries.push(HttpHeader { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.is_named(name))
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name)
            .map(|index| self.entries.remove(index).value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HttpHeader> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HttpHeader> {
        self.entries.clone()
    }
}

impl<'a> FromIterator<&'a HttpHeader> for HeaderCollection {
    /// Later entries overwrite earlier entries with the same name.
    fn from_iter<I: IntoIterator<Item = &'a HttpHeader>>(iter: I) -> Self {
        let mut collection = HeaderCollection::new();
        for header in iter {
            collection.set(header.name.clone(), header.value.clone());
        }
        collection
    }
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = &'a HttpHeader;
    type IntoIter = std::slice::Iter<'a, HttpHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
