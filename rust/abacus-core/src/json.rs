//! Lossless-as-possible conversion between `Value` and `serde_json::Value`,
//! used by hosts and the CLI to supply scopes and read results.

use crate::keys;
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

impl Value {
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    // u64 beyond i64::MAX or a true float
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(Arc::from(s.as_str())),
            serde_json::Value::Array(items) => {
                Value::list(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => {
                let map: BTreeMap<String, Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect();
                Value::map(map)
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            // Non-finite floats have no JSON representation.
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => {
                let obj: serde_json::Map<String, serde_json::Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(obj)
            }
            Value::Struct(s) => {
                let obj: serde_json::Map<String, serde_json::Value> = s
                    .iter()
                    .map(|(k, v)| {
                        let name = keys::resolve(k).unwrap_or_else(|| Arc::from(""));
                        (name.to_string(), v.to_json())
                    })
                    .collect();
                serde_json::Value::Object(obj)
            }
        }
    }
}

/// Parse a JSON document directly into a `Value` (objects become maps).
pub fn scope_from_json(text: &str) -> Result<Value, serde_json::Error> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from_json(&json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::StructValue;

    #[test]
    fn test_round_trip_scalars() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a":1,"b":2.5,"c":"x","d":true,"e":null}"#).unwrap();
        let value = Value::from_json(&json);
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_ints_stay_ints() {
        let json: serde_json::Value = serde_json::from_str("[1, 2, 3]").unwrap();
        let value = Value::from_json(&json);
        assert_eq!(
            value,
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn test_struct_serializes_by_name() {
        let s = StructValue::from_named([("price", Value::Int(10))]);
        let json = Value::struct_of(s).to_json();
        assert_eq!(json, serde_json::json!({"price": 10}));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
