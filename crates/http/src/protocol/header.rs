//! Ordered, case-preserving header storage.
//!
//! Unlike `http::HeaderMap`, a [`HeaderList`] keeps every field exactly as it was received:
//! key spelling is untouched, duplicate keys stay separate, and iteration follows insertion
//! order. Lookups compare keys literally.

use std::fmt;

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const COOKIE: &str = "Cookie";
pub const SET_COOKIE: &str = "Set-Cookie";

/// A single `key: value` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    key: String,
    value: String,
}

impl HeaderField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_pair(self) -> (String, String) {
        (self.key, self.value)
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Header fields in wire order, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    fields: Vec<HeaderField>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    /// Appends a field at the end, never merging with an existing key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push(HeaderField::new(key, value));
    }

    pub fn append(&mut self, field: HeaderField) {
        self.fields.push(field);
    }

    /// Returns the value of the first field whose key matches exactly.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|field| field.key == key).map(HeaderField::value)
    }

    /// Returns every value stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter(move |field| field.key == key).map(HeaderField::value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.key == key)
    }

    /// Replaces every field named `key` with a single field holding `value`.
    ///
    /// The new field takes the position of the first removed one, or goes last when the key
    /// was absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let field = HeaderField::new(key, value);
        match self.fields.iter().position(|existing| existing.key == field.key) {
            Some(index) => {
                let key = field.key.clone();
                self.fields[index] = field;
                let mut current = 0;
                self.fields.retain(|existing| {
                    let keep = current == index || existing.key != key;
                    current += 1;
                    keep
                });
            }
            None => self.fields.push(field),
        }
    }

    /// Removes every field named `key`, returning how many were dropped.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|field| field.key != key);
        before - self.fields.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderField> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderList {
    type Item = &'a HeaderField;
    type IntoIter = std::slice::Iter<'a, HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for HeaderList {
    type Item = HeaderField;
    type IntoIter = std::vec::IntoIter<HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { fields: iter.into_iter().map(|(key, value)| HeaderField::new(key, value)).collect() }
    }
}
