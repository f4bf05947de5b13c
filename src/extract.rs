/// Field extraction: flatten records into display rows.
///
/// Records are flattened through their `Serialize` impl, so one set of helpers
/// works for every record shape. Each record type then picks its columns in a
/// [`Tabular`] impl. Nothing here can fail: a missing or mistyped field, at any
/// nesting depth, displays as an empty string.
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// A record that can be rendered as one table row.
pub trait Tabular {
    /// Column names, in display order.
    const COLUMNS: &'static [&'static str];

    /// Build the display row for this record. Must provide every column in
    /// [`Tabular::COLUMNS`]; absent columns render as `""`.
    fn display_row(&self) -> DisplayRow;
}

/// Column name to display string, for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRow(BTreeMap<&'static str, String>);

impl DisplayRow {
    /// Display value of `column`, or `""` when the row has no such column.
    #[must_use]
    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map_or("", String::as_str)
    }
}

impl FromIterator<(&'static str, String)> for DisplayRow {
    fn from_iter<I: IntoIterator<Item = (&'static str, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A record's named fields, as serialized.
#[derive(Debug, Clone, Default)]
pub struct Fields(Map<String, Value>);

impl Fields {
    /// Flatten `record` into its named fields.
    ///
    /// Records that do not serialize to an object yield no fields.
    #[must_use]
    pub fn of<T: Serialize + ?Sized>(record: &T) -> Self {
        match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// Scalar field as text. Null, missing and nested values give `""`.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.0.get(key).map(scalar_text).unwrap_or_default()
    }

    /// The `id` of a nested reference such as a server's `flavor`.
    #[must_use]
    pub fn nested_id(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_object)
            .and_then(|nested| nested.get("id"))
            .map(scalar_text)
            .unwrap_or_default()
    }

    /// `record[key][list][0][field]`, e.g. the first private address of a server.
    #[must_use]
    pub fn first_nested(&self, key: &str, list: &str, field: &str) -> String {
        self.0
            .get(key)
            .and_then(|nested| nested.get(list))
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(|item| item.get(field))
            .map(scalar_text)
            .unwrap_or_default()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
