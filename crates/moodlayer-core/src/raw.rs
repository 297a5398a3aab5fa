//! Untyped contract return values.
//!
//! Contract calls hand back JSON of unknown shape: plain strings, arrays,
//! nested objects, or serialized byte buffers. [`RawResult`] is the closed set
//! of shapes the normalizer dispatches on; [`RawResult::from_json`] is the
//! decoding boundary that produces it.

use std::fmt;

use serde_json::{Map, Number, Value};

/// Non-container, non-string JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
}

/// Largest integer a JS number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// Browser-style string form: `5.0` prints as `5`.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", js_number(n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Null,
    Text(String),
    Bytes {
        data: Vec<u8>,
        /// Buffer-shaped object the bytes were decoded from, if any.
        source: Option<Map<String, Value>>,
    },
    List(Vec<RawResult>),
    /// Object fields in their original order.
    Map(Vec<(String, RawResult)>),
    Scalar(Scalar),
}

impl RawResult {
    /// Decode a JSON value, recognising Node-style `{"type":"Buffer","data":[..]}`
    /// objects as byte sequences.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => match buffer_bytes(&map) {
                Some(data) => Self::Bytes {
                    data,
                    source: Some(map),
                },
                None => Self::Map(
                    map.into_iter()
                        .map(|(k, v)| (k, Self::from_json(v)))
                        .collect(),
                ),
            },
        }
    }

    /// Bytes with no JSON source, e.g. a decoded hex payload.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            data: data.into(),
            source: None,
        }
    }

    /// Re-encode as JSON the way a browser would stringify it. Decoded
    /// buffers come back as their source object; bare bytes in buffer form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Number(n)) => Value::Number(js_number(n)),
            Self::Bytes {
                source: Some(map), ..
            } => js_numbers(Value::Object(map.clone())),
            Self::Bytes { data, source: None } => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String("Buffer".into()));
                map.insert(
                    "data".into(),
                    Value::Array(data.iter().map(|&b| Value::from(b)).collect()),
                );
                Value::Object(map)
            }
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Field lookup on a `Map`; `None` for every other shape.
    pub fn field(&self, name: &str) -> Option<&RawResult> {
        match self {
            Self::Map(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Browser truthiness: `null`, `false`, `0` and `""` are falsy; every
    /// container, even an empty one, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(s) => !s.is_empty(),
            Self::Scalar(Scalar::Bool(b)) => *b,
            Self::Scalar(Scalar::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::Bytes { .. } | Self::List(_) | Self::Map(_) => true,
        }
    }
}

impl From<Value> for RawResult {
    fn from(value: Value) -> Self {
        Self::from_json(value)
    }
}

impl From<Vec<u8>> for RawResult {
    fn from(bytes: Vec<u8>) -> Self {
        Self::bytes(bytes)
    }
}

impl From<&str> for RawResult {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Integral floats in the safe-integer range become integers.
fn js_number(n: &Number) -> Number {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            Number::from(f as i64)
        }
        _ => n.clone(),
    }
}

fn js_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(js_number(&n)),
        Value::Array(items) => Value::Array(items.into_iter().map(js_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, js_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Bytes of a buffer-shaped object. Elements are coerced like a typed-array
/// copy: numbers wrap modulo 256, anything else becomes 0.
fn buffer_bytes(map: &Map<String, Value>) -> Option<Vec<u8>> {
    if map.get("type").and_then(Value::as_str) != Some("Buffer") {
        return None;
    }
    let data = map.get("data")?.as_array()?;
    Some(
        data.iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| (f.trunc() as i64).rem_euclid(256) as u8)
                    .unwrap_or(0)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buffer_object_decodes_to_bytes() {
        let raw = RawResult::from_json(json!({"type": "Buffer", "data": [104, 105]}));
        let RawResult::Bytes { data, source } = raw else {
            panic!("expected bytes");
        };
        assert_eq!(data, b"hi");
        assert!(source.is_some());
    }

    #[test]
    fn decoded_buffer_serializes_as_its_source() {
        let value = json!({"data": [104, "x"], "type": "Buffer", "encoding": "utf8"});
        let raw = RawResult::from_json(value.clone());
        assert!(matches!(raw, RawResult::Bytes { .. }));
        assert_eq!(raw.to_json(), value);
    }

    #[test]
    fn bare_bytes_serialize_in_buffer_form() {
        assert_eq!(
            RawResult::bytes(b"hi".to_vec()).to_json(),
            json!({"type": "Buffer", "data": [104, 105]})
        );
    }

    #[test]
    fn integral_floats_print_as_integers() {
        let raw = RawResult::from_json(json!({"score": 1.0, "ratio": 0.5, "n": 3}));
        assert_eq!(
            serde_json::to_string(&raw.to_json()).unwrap(),
            r#"{"score":1,"ratio":0.5,"n":3}"#
        );
        assert_eq!(Scalar::Number(Number::from_f64(5.0).unwrap()).to_string(), "5");
        assert_eq!(Scalar::Number(Number::from_f64(1.5).unwrap()).to_string(), "1.5");
    }

    #[test]
    fn buffer_tag_without_data_array_stays_a_map() {
        let raw = RawResult::from_json(json!({"type": "Buffer", "data": "nope"}));
        assert!(matches!(raw, RawResult::Map(_)));
    }

    #[test]
    fn map_keeps_field_order() {
        let raw = RawResult::from_json(json!({"z": 1, "a": 2, "m": 3}));
        let RawResult::Map(fields) = raw else {
            panic!("expected map");
        };
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn truthiness_matches_browser_rules() {
        assert!(!RawResult::Null.is_truthy());
        assert!(!RawResult::from("").is_truthy());
        assert!(!RawResult::from_json(json!(0)).is_truthy());
        assert!(!RawResult::from_json(json!(false)).is_truthy());
        assert!(RawResult::from_json(json!([])).is_truthy());
        assert!(RawResult::from_json(json!({})).is_truthy());
        assert!(RawResult::from_json(json!(0.5)).is_truthy());
    }

    #[test]
    fn to_json_restores_nested_structure() {
        let value = json!({"result": [1, "two", null, {"b": true}]});
        assert_eq!(RawResult::from_json(value.clone()).to_json(), value);
    }
}
