//! Field sets and filter values
//!
//! A `Fields` map carries column values into inserts and partial updates, and
//! doubles as the filter map for searches.

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeMap;

/// A single column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text column value; matched by case-insensitive substring in searches
    Text(String),
    /// Integer column value (ids, foreign keys)
    Integer(i64),
    /// Calendar date column value
    Date(NaiveDate),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Column name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, FieldValue>);

/// Search filters share the field map representation; every entry is ANDed.
pub type Filters = Fields;

impl Fields {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any earlier value for the same column
    pub fn set(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a column value only when one is supplied
    pub fn set_opt<V: Into<FieldValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// Look up the value for a column
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no entries are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in column-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Bind a field value as the next query parameter
pub(crate) fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => qb.push_bind(text.clone()),
        FieldValue::Integer(n) => qb.push_bind(*n),
        FieldValue::Date(date) => qb.push_bind(*date),
    };
}

/// Build a `REGEXP` pattern matching `term` literally anywhere in the
/// column, ignoring case for any script.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("(?i){}", regex::escape(term))
}
