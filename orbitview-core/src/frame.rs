//! Columnar result sets as delivered by the host
//!
//! A [`DataFrame`] is an ordered set of named [`Field`]s whose value
//! vectors are expected to have equal length. Cells are loosely typed
//! ([`FieldValue`]) and coerced on read, never on load.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One loosely typed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

static NULL_VALUE: FieldValue = FieldValue::Null;

impl FieldValue {
    /// Numeric view of the cell.
    ///
    /// `None` for null or blank cells. Text that does not parse yields
    /// `Some(NaN)` so malformed input stays visible downstream.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.parse::<f64>().unwrap_or(f64::NAN))
                }
            }
        }
    }

    /// Textual view of the cell; `None` for null or blank cells
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) if s.trim().is_empty() => None,
            FieldValue::Text(s) => Some(s.clone()),
        }
    }

    /// Boolean view of the cell; `None` when the cell is not recognizably boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Number(n) if n.is_nan() => None,
            FieldValue::Number(n) => Some(*n != 0.0),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Number(f64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

impl Field {
    pub fn new(name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Cell at `row`; rows past the end of a short column read as null
    pub fn value(&self, row: usize) -> &FieldValue {
        self.values.get(row).unwrap_or(&NULL_VALUE)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            fields: Vec::new(),
        }
    }

    /// Builder-style column append
    pub fn with_field<V: Into<FieldValue>>(mut self, name: &str, values: Vec<V>) -> Self {
        self.fields
            .push(Field::new(name, values.into_iter().map(Into::into).collect()));
        self
    }

    /// First field whose name matches `name` ignoring ASCII case
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Number of rows; the longest column decides
    pub fn row_count(&self) -> usize {
        self.fields.iter().map(Field::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Parse a JSON array of frames
    pub fn from_json_str(json: &str) -> Result<Vec<DataFrame>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Load a JSON array of frames from disk
pub fn load_frames<P: AsRef<Path>>(path: P) -> Result<Vec<DataFrame>> {
    let text = std::fs::read_to_string(path)?;
    DataFrame::from_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup_is_case_insensitive_and_first_wins() {
        let frame = DataFrame::new()
            .with_field("Label", vec!["first"])
            .with_field("label", vec!["second"]);
        let field = frame.field("LABEL").unwrap();
        assert_eq!(field.value(0).as_text().as_deref(), Some("first"));
        assert!(frame.field("lab").is_none());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FieldValue::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(FieldValue::from(" 42 ").as_f64(), Some(42.0));
        assert_eq!(FieldValue::from("").as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
        assert!(FieldValue::from("n/a").as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(FieldValue::from("TRUE").as_bool(), Some(true));
        assert_eq!(FieldValue::from(0i64).as_bool(), Some(false));
        assert_eq!(FieldValue::from("maybe").as_bool(), None);
    }

    #[test]
    fn test_short_columns_read_as_null() {
        let frame = DataFrame::new()
            .with_field("id", vec!["a", "b", "c"])
            .with_field("label", vec!["A"]);
        assert_eq!(frame.row_count(), 3);
        assert!(frame.field("label").unwrap().value(2).is_null());
    }

    #[test]
    fn test_frames_from_json() {
        let json = r#"[
            {"name": "nodes", "fields": [
                {"name": "id", "values": ["core", "edge-1"]},
                {"name": "layerOrder", "values": [0, 1]},
                {"name": "isCenter", "values": [true, null]}
            ]},
            {"fields": []}
        ]"#;
        let frames = DataFrame::from_json_str(json).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].name.as_deref(), Some("nodes"));
        assert_eq!(frames[0].row_count(), 2);
        assert_eq!(frames[0].field("isCenter").unwrap().value(1), &FieldValue::Null);
        assert!(frames[1].is_empty());
    }
}
