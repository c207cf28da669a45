//! Scalar values and rows

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::ColumnRef;

/// A single cell. Dates are carried as strings (`"2024-01-15"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Numeric view of the value.
    ///
    /// Strings are read the way `parseFloat` reads them: leading whitespace is
    /// skipped and the longest numeric prefix wins, so `"2024-01-15"` is `2024`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => parse_float_prefix(s),
        }
    }

    /// Loose equality against a literal taken from SQL text.
    ///
    /// Numbers compare numerically (an empty literal counts as zero), strings
    /// compare textually, null never matches.
    pub fn loose_eq(&self, literal: &str) -> bool {
        match self {
            Value::Null => false,
            Value::Int(_) | Value::Float(_) => {
                let trimmed = literal.trim();
                let parsed = if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                };
                match (self.as_f64(), parsed) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            Value::String(s) => s == literal,
        }
    }

    /// Null, zero, NaN and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Total order used by ORDER BY: null < numbers < strings.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Int(_) | Value::Float(_) => 1,
                Value::String(_) => 2,
            }
        }

        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (a, b) if rank(a) == 1 && rank(b) == 1 => {
                let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].trim_end_matches('.').parse().ok()
}

/// A mapping from column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Row::new();
        for (k, v) in pairs {
            row.insert(k, v);
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Insert or overwrite a column. Overwriting keeps the column's position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Merge another row in; its fields overwrite same-named fields here.
    pub fn merge(&mut self, other: &Row) {
        for (k, v) in &other.fields {
            self.insert(k.clone(), v.clone());
        }
    }

    /// Look up a column reference. A table qualifier is ignored: after a
    /// join, `c.id` and `o.id` both read the merged `id` field.
    pub fn resolve(&self, column: &ColumnRef) -> Option<&Value> {
        self.get(&column.column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    row.insert(k, v);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_prefix() {
        assert_eq!(parse_float_prefix("42"), Some(42.0));
        assert_eq!(parse_float_prefix("  1200.50"), Some(1200.5));
        assert_eq!(parse_float_prefix("2024-01-15"), Some(2024.0));
        assert_eq!(parse_float_prefix("-3.5abc"), Some(-3.5));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("London"), None);
        assert_eq!(parse_float_prefix(""), None);
    }

    #[test]
    fn test_loose_eq() {
        assert!(Value::Int(28).loose_eq("28"));
        assert!(Value::Float(1200.5).loose_eq("1200.50"));
        assert!(Value::Int(0).loose_eq(""));
        assert!(Value::String("London".into()).loose_eq("London"));
        assert!(!Value::String("London".into()).loose_eq("london"));
        assert!(!Value::Null.loose_eq(""));
        assert!(!Value::Int(28).loose_eq("abc"));
    }

    #[test]
    fn test_sort_cmp() {
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(1.5)), Ordering::Greater);
        assert_eq!(Value::Null.sort_cmp(&Value::Int(0)), Ordering::Less);
        assert_eq!(Value::Int(9).sort_cmp(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::from("Bob").sort_cmp(&Value::from("Alice")), Ordering::Greater);
    }

    #[test]
    fn test_row_keeps_column_order() {
        let mut row = Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("Alice"))]);
        row.insert("id", 7);
        row.insert("city", "London");

        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, vec!["id", "name", "city"]);
        assert_eq!(row.get("id"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_resolve_strips_qualifier() {
        let mut left = Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("Alice"))]);
        let right = Row::from_pairs([("id", Value::Int(3)), ("product", Value::from("Headphones"))]);
        left.merge(&right);

        assert_eq!(left.columns().collect::<Vec<_>>(), vec!["id", "name", "product"]);
        assert_eq!(left.resolve(&ColumnRef::qualified("c", "id")), Some(&Value::Int(3)));
        assert_eq!(left.resolve(&ColumnRef::qualified("o", "id")), Some(&Value::Int(3)));
        assert_eq!(left.resolve(&ColumnRef::qualified("c", "name")), Some(&Value::from("Alice")));
        assert_eq!(left.resolve(&ColumnRef::new("missing")), None);
    }

    #[test]
    fn test_row_json_roundtrip_preserves_order() {
        let json = r#"{"id":1,"name":"Alice","amount":1200.5,"note":null}"#;
        let row: Row = serde_json::from_str(json).unwrap();

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name", "amount", "note"]);
        assert_eq!(row.get("amount"), Some(&Value::Float(1200.5)));
        assert_eq!(serde_json::to_string(&row).unwrap(), json);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let row = Row::from_pairs([("avg", Value::Float(f64::NAN))]);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"avg":null}"#);
    }
}
