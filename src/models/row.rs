//! Raw and normalized row types.

use std::collections::{BTreeSet, HashMap};

/// Positionally ordered text fields scraped from one source record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(Vec<String>);

impl RawRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>) {
        self.0.push(field.into());
    }

    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for RawRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for RawRow {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

/// A validated row keyed by field name.
///
/// Key order carries no meaning; writers impose their own column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    values: HashMap<String, String>,
}

impl NormalizedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a field, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sorted set of keys, handy for comparing row shapes.
    pub fn key_set(&self) -> BTreeSet<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// Values projected onto `fields`, or the first missing field name.
    pub fn project<'a>(&'a self, fields: &'a [String]) -> Result<Vec<&'a str>, &'a str> {
        fields
            .iter()
            .map(|f| self.get(f).ok_or(f.as_str()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NormalizedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
