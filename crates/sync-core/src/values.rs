//! Portable row values.
//!
//! Drivers decode whatever their client library produces into [`SqlValue`].
//! Some client libraries hand back textual and temporal columns as raw byte
//! sequences; [`normalize_row`] is the separate pass that turns those into
//! text before a row reaches the sync engine.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlValue {
    /// SQL NULL
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 text
    Text(String),

    /// Raw bytes as delivered by the client library
    Bytes(Vec<u8>),
}

/// One row of a scan, keyed by column name.
pub type Row = HashMap<String, SqlValue>;

impl SqlValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Serializes as the natural JSON scalar; bytes become standard base64 text.
impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&BASE64.encode(b)),
        }
    }
}

/// Rewrite a byte-sequence value as text; every other value is returned as is.
///
/// Invalid UTF-8 is replaced with U+FFFD. There is no way to tell bytes that
/// mean text from bytes that mean binary data here, so both become text.
pub fn normalize_value(value: SqlValue) -> SqlValue {
    match value {
        SqlValue::Bytes(bytes) => SqlValue::Text(
            String::from_utf8(bytes)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        ),
        other => other,
    }
}

/// Apply [`normalize_value`] to every value of a row in place.
pub fn normalize_row(row: &mut Row) {
    for value in row.values_mut() {
        if matches!(value, SqlValue::Bytes(_)) {
            *value = normalize_value(std::mem::take(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert!(SqlValue::Null.is_null());
        assert_eq!(SqlValue::Bool(true).as_bool(), Some(true));
        assert_eq!(SqlValue::Int(42).as_i64(), Some(42));
        assert_eq!(SqlValue::Int(42).as_f64(), Some(42.0));
        assert_eq!(SqlValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(SqlValue::from("abc").as_str(), Some("abc"));
        assert_eq!(SqlValue::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(SqlValue::Text("1".to_string()).as_i64(), None);
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(
            normalize_value(SqlValue::Bytes(b"2024-01-02 03:04:05".to_vec())),
            SqlValue::Text("2024-01-02 03:04:05".to_string())
        );
        assert_eq!(normalize_value(SqlValue::Int(7)), SqlValue::Int(7));
        assert_eq!(normalize_value(SqlValue::Null), SqlValue::Null);
        assert_eq!(normalize_value(SqlValue::Float(0.5)), SqlValue::Float(0.5));
        assert_eq!(normalize_value(SqlValue::Bool(false)), SqlValue::Bool(false));
    }

    #[test]
    fn test_normalize_value_invalid_utf8() {
        let normalized = normalize_value(SqlValue::Bytes(vec![b'a', 0xff, b'b']));
        assert_eq!(normalized, SqlValue::Text("a\u{fffd}b".to_string()));
    }

    #[test]
    fn test_normalize_row() {
        let mut row = Row::new();
        row.insert("id".to_string(), SqlValue::Int(1));
        row.insert("name".to_string(), SqlValue::Bytes(b"alice".to_vec()));
        row.insert("created".to_string(), SqlValue::Bytes(b"2024-01-02".to_vec()));
        row.insert("deleted".to_string(), SqlValue::Null);
        row.insert("score".to_string(), SqlValue::Float(9.5));

        normalize_row(&mut row);

        assert_eq!(row["id"], SqlValue::Int(1));
        assert_eq!(row["name"], SqlValue::Text("alice".to_string()));
        assert_eq!(row["created"], SqlValue::Text("2024-01-02".to_string()));
        assert_eq!(row["deleted"], SqlValue::Null);
        assert_eq!(row["score"], SqlValue::Float(9.5));
        assert!(row.values().all(|v| v.as_bytes().is_none()));
    }

    #[test]
    fn test_normalize_row_is_idempotent() {
        let mut row = Row::new();
        row.insert("name".to_string(), SqlValue::Bytes(b"bob".to_vec()));
        normalize_row(&mut row);
        let once = row.clone();
        normalize_row(&mut row);
        assert_eq!(row, once);
    }

    #[test]
    fn test_serialize_to_json() {
        let values = vec![
            SqlValue::Null,
            SqlValue::Bool(true),
            SqlValue::Int(-3),
            SqlValue::Float(2.5),
            SqlValue::Text("hi".to_string()),
            SqlValue::Bytes(vec![0, 1, 2]),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,true,-3,2.5,"hi","AAEC"]"#);
    }
}
