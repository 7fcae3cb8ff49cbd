//! Tagged runtime value exchanged between hosts, the compiler and the evaluator.

use crate::keys::{self, KeyId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Runtime values.
///
/// Collection variants (List, Map, Struct) and strings are wrapped in `Arc`
/// for cheap cloning via reference counting. Compiled expressions embed
/// constant values and must be shareable across threads, so the wrapper is
/// `Arc` rather than `Rc`. The engine never mutates a `Value` it is handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
    Struct(Arc<StructValue>),
}

/// A host-supplied record: an ordered map from pre-interned symbolic keys to
/// values. Keys are minted through [`keys::intern`] by the host; expression
/// evaluation only ever resolves names against keys that already exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructValue {
    fields: BTreeMap<KeyId, Value>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a struct from `(name, value)` pairs, interning the names.
    pub fn from_named<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(name, value)| (keys::intern(name), value))
            .collect();
        Self { fields }
    }

    pub fn insert(&mut self, key: KeyId, value: Value) {
        self.fields.insert(key, value);
    }

    pub fn get(&self, key: KeyId) -> Option<&Value> {
        self.fields.get(&key)
    }

    /// Resolve `name` against keys that already exist on this struct.
    ///
    /// Uses the non-inserting table lookup, so an unknown name can never
    /// grow the process-wide key pool.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        let key = keys::lookup(name)?;
        self.fields.get(&key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}

impl FromIterator<(KeyId, Value)> for StructValue {
    fn from_iter<I: IntoIterator<Item = (KeyId, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// Structs serialize as a plain name → value map. Deserialization interns the
// names, which is host-side key minting and therefore allowed.
impl Serialize for StructValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            let name = keys::resolve(*key).unwrap_or_else(|| Arc::from(""));
            map.serialize_entry(&*name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StructValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(named
            .into_iter()
            .map(|(name, value)| (keys::intern(&name), value))
            .collect())
    }
}

impl Value {
    // -- Constructors (wrap inner data in Arc) --

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn list(v: Vec<Value>) -> Self {
        Value::List(Arc::new(v))
    }

    pub fn map(m: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(m))
    }

    pub fn struct_of(s: StructValue) -> Self {
        Value::Struct(Arc::new(s))
    }

    /// Truthiness: only `Null` and `false` are falsy. `0`, `""`, `[]` and
    /// `{}` are all truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Struct(_) => "Struct",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used by string-producing built-ins (`concat`, `textjoin`).
    ///
    /// `Null` renders as the empty string so that joining over sparse data
    /// stays quiet; the user-facing `Display` impl spells it out instead.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    /// Ordered comparison, defined only within compatible groups: numbers
    /// (with Int → Float coercion), strings and booleans. `None` means the
    /// two values cannot be ordered and the caller reports a type error.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(_), Value::Float(_))
            | (Value::Float(_), Value::Int(_))
            | (Value::Float(_), Value::Float(_)) => {
                // as_float is total for Int and Float
                self.as_float()?.partial_cmp(&other.as_float()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Display with quotes around strings (used inside containers).
    fn display_quoted(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s),
            other => other.to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
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
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

/// Format a float keeping at least one decimal for integral values, so a
/// float result stays visibly distinct from an integer one.
pub fn format_float(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                let body: Vec<String> = items.iter().map(|v| v.display_quoted()).collect();
                write!(f, "[{}]", body.join(", "))
            }
            Value::Map(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("\"{}\": {}", k, v.display_quoted()))
                    .collect();
                write!(f, "{{{}}}", body.join(", "))
            }
            Value::Struct(s) => {
                let body: Vec<String> = s
                    .iter()
                    .map(|(k, v)| {
                        let name = keys::resolve(k).unwrap_or_else(|| Arc::from(""));
                        format!("{}: {}", name, v.display_quoted())
                    })
                    .collect();
                write!(f, "{{{}}}", body.join(", "))
            }
        }
    }
}

// Structural equality with numeric coercion: Int(1) == Float(1.0).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) => (*a as f64) == *b,
            (Value::Float(a), Value::Int(b)) => *a == (*b as f64),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => **a == **b,
            (Value::Map(a), Value::Map(b)) => **a == **b,
            (Value::Struct(a), Value::Struct(b)) => **a == **b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        // Unlike C-family truthiness, zero and empty containers are truthy.
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Float(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
        assert!(Value::map(BTreeMap::new()).is_truthy());
    }

    #[test]
    fn test_numeric_equality_coerces() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.5), Value::Float(2.5));
        assert_ne!(Value::Int(1), Value::Float(1.5));
        assert_ne!(Value::Int(1), Value::from("1"));
    }

    #[test]
    fn test_partial_compare_groups() {
        use std::cmp::Ordering;
        assert_eq!(
            Value::Int(1).partial_compare(&Value::Float(2.0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("b").partial_compare(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Bool(false).partial_compare(&Value::Bool(true)),
            Some(Ordering::Less)
        );
        // Mixed groups cannot be ordered.
        assert_eq!(Value::Int(1).partial_compare(&Value::from("1")), None);
        assert_eq!(Value::Null.partial_compare(&Value::Null), None);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(108.0).to_string(), "108.0");
        assert_eq!(Value::Float(1.25).to_string(), "1.25");
        assert_eq!(
            Value::list(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, \"a\"]"
        );
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from("x").to_text(), "x");
        assert_eq!(Value::Int(7).to_text(), "7");
        assert_eq!(Value::Float(2.0).to_text(), "2.0");
    }

    #[test]
    fn test_struct_get_named_existing_keys_only() {
        let s = StructValue::from_named([("qty", Value::Int(2))]);
        assert_eq!(s.get_named("qty"), Some(&Value::Int(2)));
        assert_eq!(s.get_named("definitely_not_interned_anywhere_zzz"), None);
    }

    #[test]
    fn test_struct_equality() {
        let a = StructValue::from_named([("x", Value::Int(1))]);
        let b = StructValue::from_named([("x", Value::Int(1))]);
        assert_eq!(Value::struct_of(a), Value::struct_of(b));
    }
}
