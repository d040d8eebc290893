use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field holding the document id. Always retained by inclusion projections.
pub const ID_FIELD: &str = "id";

/// Store-owned revision counter, excluded by the default projection.
pub const REV_FIELD: &str = "_rev";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Unix milliseconds. Rendered as an RFC 3339 string on the wire.
    Timestamp(i64),
    List(Vec<Value>),
    Null,
}

impl Value {
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::Timestamp(_) => 4,
            Value::Text(_) => 5,
            Value::List(_) => 6,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "Text",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::Timestamp(_) => "Timestamp",
            Value::List(_) => "List",
            Value::Null => "Null",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Comparison used by filter predicates. `Integer` and `Float` compare
    /// numerically (documents built from JSON mix the two); other kinds only
    /// compare within their own kind. Returns `None` for incomparable kinds,
    /// which a predicate treats as a non-match.
    pub fn query_cmp(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return Some(a.total_cmp(&b));
        }
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Total ordering used by sort keys: numeric kinds unify, everything else
    /// orders by kind rank first so mixed-kind fields still sort stably.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        if let Some(ord) = self.query_cmp(other) {
            return ord;
        }
        let rank_cmp = self.kind_rank().cmp(&other.kind_rank());
        if rank_cmp != Ordering::Equal {
            return rank_cmp;
        }
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.sort_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => Ordering::Equal,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(v) => serde_json::Value::String(v.clone()),
            Value::Integer(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(v) => serde_json::Value::Bool(*v),
            Value::Timestamp(ms) => match DateTime::<Utc>::from_timestamp_millis(*ms) {
                Some(dt) => serde_json::Value::String(dt.to_rfc3339()),
                None => serde_json::Value::from(*ms),
            },
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Null => serde_json::Value::Null,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.sort_cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field '{field}'")]
    MissingField { field: String },
    #[error("field '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A schemaless record: ordered field-name to value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) -> &mut Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn retain(&mut self, keep: impl FnMut(&String, &mut Value) -> bool) {
        self.fields.retain(keep);
    }

    /// Merges `patch` into `self`, field by field. A `Null` in the patch
    /// removes the field.
    pub fn merge(&mut self, patch: Document) {
        for (field, value) in patch.fields {
            match value {
                Value::Null => {
                    self.fields.remove(&field);
                }
                value => {
                    self.fields.insert(field, value);
                }
            }
        }
    }

    pub fn id(&self) -> Result<&str, DecodeError> {
        self.text(ID_FIELD)
    }

    pub fn text(&self, field: &str) -> Result<&str, DecodeError> {
        match self.fields.get(field) {
            Some(Value::Text(v)) => Ok(v.as_str()),
            Some(other) => Err(DecodeError::TypeMismatch {
                field: field.to_string(),
                expected: "Text",
                actual: other.kind(),
            }),
            None => Err(DecodeError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    pub fn i64(&self, field: &str) -> Result<i64, DecodeError> {
        match self.fields.get(field) {
            Some(Value::Integer(v)) => Ok(*v),
            Some(other) => Err(DecodeError::TypeMismatch {
                field: field.to_string(),
                expected: "Integer",
                actual: other.kind(),
            }),
            None => Err(DecodeError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    /// Numeric accessor: accepts `Integer` or `Float`.
    pub fn number(&self, field: &str) -> Result<f64, DecodeError> {
        match self.fields.get(field) {
            Some(v) => v.as_number().ok_or_else(|| DecodeError::TypeMismatch {
                field: field.to_string(),
                expected: "Integer or Float",
                actual: v.kind(),
            }),
            None => Err(DecodeError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    pub fn boolean(&self, field: &str) -> Result<bool, DecodeError> {
        match self.fields.get(field) {
            Some(Value::Boolean(v)) => Ok(*v),
            Some(other) => Err(DecodeError::TypeMismatch {
                field: field.to_string(),
                expected: "Boolean",
                actual: other.kind(),
            }),
            None => Err(DecodeError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    pub fn timestamp(&self, field: &str) -> Result<i64, DecodeError> {
        match self.fields.get(field) {
            Some(Value::Timestamp(v)) => Ok(*v),
            Some(other) => Err(DecodeError::TypeMismatch {
                field: field.to_string(),
                expected: "Timestamp",
                actual: other.kind(),
            }),
            None => Err(DecodeError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    pub fn list(&self, field: &str) -> Result<&[Value], DecodeError> {
        match self.fields.get(field) {
            Some(Value::List(v)) => Ok(v.as_slice()),
            Some(other) => Err(DecodeError::TypeMismatch {
                field: field.to_string(),
                expected: "List",
                actual: other.kind(),
            }),
            None => Err(DecodeError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.fields.len());
        for (field, value) in &self.fields {
            map.insert(field.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, Value};
    use std::cmp::Ordering;

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert_eq!(
            Value::Integer(100).query_cmp(&Value::Float(100.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Float(99.5).query_cmp(&Value::Integer(100)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn mismatched_kinds_are_incomparable_for_queries() {
        assert_eq!(Value::Text("5".into()).query_cmp(&Value::Integer(5)), None);
        assert_eq!(Value::Boolean(true).query_cmp(&Value::Null), None);
    }

    #[test]
    fn sort_cmp_is_total_over_mixed_kinds() {
        let mut values = vec![
            Value::Text("b".into()),
            Value::Null,
            Value::Integer(3),
            Value::Boolean(false),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[3], Value::Text("b".into()));
    }

    #[test]
    fn merge_overwrites_and_null_removes() {
        let mut doc = Document::new()
            .with("name", Value::Text("Sea Explorer".into()))
            .with("price", Value::Integer(400));
        let patch = Document::new()
            .with("price", Value::Integer(350))
            .with("name", Value::Null);
        doc.merge(patch);
        assert_eq!(doc.get("price"), Some(&Value::Integer(350)));
        assert!(doc.get("name").is_none());
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        let json = Value::Timestamp(0).to_json();
        assert_eq!(json, serde_json::json!("1970-01-01T00:00:00+00:00"));
    }

    #[test]
    fn typed_accessors_report_kind_mismatch() {
        let doc = Document::new().with("rating", Value::Text("high".into()));
        let err = doc.number("rating").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field 'rating' type mismatch: expected Integer or Float, got Text"
        );
    }
}
