//! Purpose: Representation-neutral JSON document model.
//! Exports: `Document`, `Number`, `JsonRepr`.
//! Role: Conversion and pagination read this model; platform JSON types only translate into it.
//! Invariants: Object key order is preserved as received.
//! Invariants: Translation is lossless for every value serde_json can hold.
use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{ApiResult, Error, ErrorKind};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(value) => Some(value),
            Number::UInt(value) => i64::try_from(value).ok(),
            Number::Float(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                Some(value as i64)
            }
            Number::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::UInt(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Document>),
    Object(IndexMap<String, Document>),
}

impl Document {
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Null, `{}` and `[]` all mean "nothing here" to the converters.
    pub fn is_empty(&self) -> bool {
        match self {
            Document::Null => true,
            Document::Object(map) => map.is_empty(),
            Document::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Follows a dotted path such as `links.next`.
    pub fn pointer(&self, dotted: &str) -> Option<&Document> {
        dotted
            .split('.')
            .try_fold(self, |current, key| current.get(key))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Document::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Document>> {
        match self {
            Document::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    pub fn to_json_string(&self) -> String {
        Value::from(self.clone()).to_string()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(value) => Document::Bool(value),
            Value::Number(number) => Document::Number(if let Some(value) = number.as_i64() {
                Number::Int(value)
            } else if let Some(value) = number.as_u64() {
                Number::UInt(value)
            } else {
                Number::Float(number.as_f64().unwrap_or(f64::NAN))
            }),
            Value::String(value) => Document::String(value),
            Value::Array(items) => Document::Array(items.into_iter().map(Document::from).collect()),
            Value::Object(map) => Document::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Document::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Document {
    fn from(value: &Value) -> Self {
        Document::from(value.clone())
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        match document {
            Document::Null => Value::Null,
            Document::Bool(value) => Value::Bool(value),
            Document::Number(Number::Int(value)) => Value::from(value),
            Document::Number(Number::UInt(value)) => Value::from(value),
            Document::Number(Number::Float(value)) => serde_json::Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Document::String(value) => Value::String(value),
            Document::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Document::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// A platform JSON type the mirror layer can read.
///
/// Adapters only translate; every mapping and pagination rule is written once
/// against [`Document`].
pub trait JsonRepr: Sized + Send + Sync + 'static {
    fn parse(body: &str) -> ApiResult<Self>;

    fn null() -> Self;

    fn as_document(&self) -> Cow<'_, Document>;
}

impl JsonRepr for Value {
    fn parse(body: &str) -> ApiResult<Self> {
        serde_json::from_str(body).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("response body is not valid json")
                .with_document(truncate(body))
                .with_source(err)
        })
    }

    fn null() -> Self {
        Value::Null
    }

    fn as_document(&self) -> Cow<'_, Document> {
        Cow::Owned(Document::from(self))
    }
}

impl JsonRepr for Document {
    fn parse(body: &str) -> ApiResult<Self> {
        serde_json::from_str::<Value>(body)
            .map(Document::from)
            .map_err(|err| {
                Error::new(ErrorKind::Parse)
                    .with_message("response body is not valid json")
                    .with_document(truncate(body))
                    .with_source(err)
            })
    }

    fn null() -> Self {
        Document::Null
    }

    fn as_document(&self) -> Cow<'_, Document> {
        Cow::Borrowed(self)
    }
}

const MAX_DOCUMENT_EXCERPT: usize = 4096;

pub(crate) fn truncate(body: &str) -> String {
    if body.len() <= MAX_DOCUMENT_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_DOCUMENT_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::{Document, JsonRepr, Number};
    use crate::core::error::ErrorKind;
    use serde_json::{Value, json};

    #[test]
    fn translation_preserves_key_order() {
        let value: Value =
            serde_json::from_str(r#"{"z":1,"a":{"next":null},"m":[true,"x"]}"#).expect("json");
        let document = Document::from(&value);
        let keys: Vec<_> = document.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(Value::from(document), value);
    }

    #[test]
    fn pointer_walks_nested_objects() {
        let document = Document::from(json!({"links": {"next": "/api/v1/tokens?limit=2"}}));
        assert_eq!(
            document.pointer("links.next").and_then(Document::as_str),
            Some("/api/v1/tokens?limit=2")
        );
        assert!(document.pointer("links.prev").is_none());
    }

    #[test]
    fn numbers_keep_their_width() {
        let document = Document::from(json!({"big": u64::MAX, "neg": -5, "half": 0.5}));
        assert_eq!(
            document.get("big").and_then(Document::as_number),
            Some(Number::UInt(u64::MAX))
        );
        assert_eq!(document.get("neg").and_then(Document::as_number), Some(Number::Int(-5)));
        assert_eq!(
            document.get("half").and_then(Document::as_number).and_then(Number::as_i64),
            None
        );
    }

    #[test]
    fn empty_documents_are_empty() {
        assert!(Document::Null.is_empty());
        assert!(Document::from(json!({})).is_empty());
        assert!(!Document::from(json!({"a": 1})).is_empty());
    }

    #[test]
    fn both_representations_parse_the_same_body() {
        let body = r#"{"balances":[{"account":"0.0.100","balance":500}]}"#;
        let native = <Document as JsonRepr>::parse(body).expect("document");
        let value = <Value as JsonRepr>::parse(body).expect("value");
        assert_eq!(native, *value.as_document());
    }

    #[test]
    fn invalid_body_is_parse_error_with_document() {
        let err = <Value as JsonRepr>::parse("{not json").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.document(), Some("{not json"));
    }

    #[test]
    fn serde_round_trips_through_value() {
        let document: Document =
            serde_json::from_str(r#"{"b":[1,-2,3.5],"a":"x"}"#).expect("document");
        let keys: Vec<_> = document.as_object().expect("object").keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(
            serde_json::to_string(&document).expect("serialize"),
            r#"{"b":[1,-2,3.5],"a":"x"}"#
        );
    }
}
