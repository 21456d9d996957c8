//! Request parameters as an ordered map of tagged JSON values.
//!
//! # Design
//! Values are `serde_json::Value`, so every parameter is one of string,
//! number, bool, null, array or object. The map keeps insertion order
//! (`preserve_order`), which fixes the order of query segments and JSON
//! body keys for a given construction sequence. Callers must not depend on
//! that order for correctness.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Ordered `key -> value` bag attached to a `RequestDescriptor`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert. A repeated key keeps its original position and
    /// takes the new value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Build parameters from any value that serializes to a JSON object.
    ///
    /// Structs and string-keyed maps are accepted; scalars, sequences and
    /// `None` are rejected with `ApiError::InvalidParameters`.
    pub fn from_serialize<S: Serialize + ?Sized>(value: &S) -> Result<Self, ApiError> {
        match serde_json::to_value(value).map_err(|e| ApiError::InvalidParameters(e.to_string()))? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ApiError::InvalidParameters(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A strongly-typed parameter set for one kind of request.
pub trait RequestParameters {
    fn to_parameters(&self) -> Parameters;
}

impl RequestParameters for Parameters {
    fn to_parameters(&self) -> Parameters {
        self.clone()
    }
}

/// Render a value the way it appears on the left of a query `key=value`.
///
/// Strings are emitted verbatim; everything else uses its compact JSON text.
pub(crate) fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Login {
        username: String,
        remember: bool,
    }

    #[test]
    fn new_parameters_are_empty() {
        let params = Parameters::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn insertion_order_is_kept() {
        let params = Parameters::new().with("z", 1).with("a", "x").with("m", true);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn repeated_key_replaces_value() {
        let params = Parameters::new().with("a", 1).with("b", 2).with("a", 3);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some(&json!(3)));
    }

    #[test]
    fn from_serialize_accepts_structs() {
        let params = Parameters::from_serialize(&Login {
            username: "alice".to_string(),
            remember: true,
        })
        .unwrap();
        assert_eq!(params.get("username"), Some(&json!("alice")));
        assert_eq!(params.get("remember"), Some(&json!(true)));
    }

    #[test]
    fn from_serialize_rejects_non_objects() {
        let err = Parameters::from_serialize(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameters(ref m) if m.contains("array")));

        let err = Parameters::from_serialize("plain").unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameters(ref m) if m.contains("string")));
    }

    #[test]
    fn collects_from_pairs() {
        let params: Parameters = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn query_value_rendering() {
        assert_eq!(query_value(&json!("plain text")), "plain text");
        assert_eq!(query_value(&json!(42)), "42");
        assert_eq!(query_value(&json!(false)), "false");
        assert_eq!(query_value(&json!(null)), "null");
        assert_eq!(query_value(&json!([1, "a"])), r#"[1,"a"]"#);
    }
}
