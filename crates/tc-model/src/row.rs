//! Rows streamed from a CSV table and the key values extracted from them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Explicit nil marker.
pub const NIL_MARKER: &str = "#nil";
/// Explicit empty-string marker.
pub const EMPTY_MARKER: &str = "#empty";
/// Explicit "no value" marker.
pub const NONE_MARKER: &str = "#none";

/// A value is nil when it is absent, the `#nil` marker, or the empty string.
pub fn is_nil(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some(NIL_MARKER))
}

/// True for the empty string and the `#empty` marker.
pub fn is_empty(value: &str) -> bool {
    value.is_empty() || value == EMPTY_MARKER
}

/// Column names of a CSV table, shared by every row read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build a header. A repeated column name resolves to its last occurrence.
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One data row: a mapping from column name to an optional cell value.
///
/// A cell is `None` when the record is shorter than the header. Table
/// parameters merged with [`Row::with_parameters`] shadow cells of the same
/// name.
#[derive(Debug, Clone)]
pub struct Row {
    header: Arc<Header>,
    cells: Vec<Option<String>>,
    overrides: Vec<(String, Option<String>)>,
}

impl Row {
    pub fn new(header: Arc<Header>, cells: Vec<Option<String>>) -> Self {
        Self {
            header,
            cells,
            overrides: Vec::new(),
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (names, cells): (Vec<String>, Vec<Option<String>>) = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.map(Into::into)))
            .unzip();
        Self::new(Arc::new(Header::new(names)), cells)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Value of a column or merged parameter, `None` when absent or null.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some((_, value)) = self.overrides.iter().rev().find(|(key, _)| key == name) {
            return value.as_deref();
        }
        self.header
            .position(name)
            .and_then(|position| self.cells.get(position))
            .and_then(|cell| cell.as_deref())
    }

    /// Merge table-level parameter values over the row's cells.
    pub fn with_parameters(mut self, parameters: &[(String, Option<String>)]) -> Self {
        self.overrides.extend(parameters.iter().cloned());
        self
    }

    /// Extract the values of `fields`, in order.
    pub fn key_value(&self, fields: &[String]) -> KeyValue {
        KeyValue(
            fields
                .iter()
                .map(|field| self.get(field).map(str::to_string))
                .collect(),
        )
    }
}

/// Ordered field values of one key, the unit of duplicate and reference
/// checks. Equality is positional on the raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyValue(Vec<Option<String>>);

impl KeyValue {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.0
    }

    /// Every field is nil. An empty key value counts as all-nil.
    pub fn all_nil(&self) -> bool {
        self.0.iter().all(|value| is_nil(value.as_deref()))
    }

    pub fn any_nil(&self) -> bool {
        self.0.iter().any(|value| is_nil(value.as_deref()))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (position, value) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{value:?}")?,
                None => f.write_str("null")?,
            }
        }
        f.write_str(")")
    }
}

impl From<Vec<Option<String>>> for KeyValue {
    fn from(values: Vec<Option<String>>) -> Self {
        Self(values)
    }
}
