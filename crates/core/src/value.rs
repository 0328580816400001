//! Loosely typed external data and the typed values contract methods receive.

use crate::Address;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Parameter data as it arrives from outside the host.
///
/// Mapping keys are arbitrary values; only text and byte keys are accepted by
/// the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(BigInt),
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<RawValue>),
    Map(Vec<(RawValue, RawValue)>),
}

impl RawValue {
    /// Builds a mapping from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<RawValue>,
        V: Into<RawValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        RawValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a sequence.
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<RawValue>,
        I: IntoIterator<Item = V>,
    {
        RawValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Nesting depth: 1 for a scalar or an empty container, plus one per
    /// level of lists and mappings. Walks with an explicit worklist, so it
    /// is safe on input of any depth.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((value, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match value {
                RawValue::List(items) => {
                    pending.extend(items.iter().map(|item| (item, depth + 1)));
                }
                RawValue::Map(entries) => {
                    for (key, item) in entries {
                        pending.push((key, depth + 1));
                        pending.push((item, depth + 1));
                    }
                }
                _ => {}
            }
        }
        deepest
    }

    /// Name of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) => "int",
            RawValue::Bytes(_) => "bytes",
            RawValue::Text(_) => "str",
            RawValue::List(_) => "list",
            RawValue::Map(_) => "dict",
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<&[u8]> for RawValue {
    fn from(value: &[u8]) -> Self {
        RawValue::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for RawValue {
    fn from(value: &[u8; N]) -> Self {
        RawValue::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(value: Vec<u8>) -> Self {
        RawValue::Bytes(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(BigInt::from(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(BigInt::from(value))
    }
}

impl From<BigInt> for RawValue {
    fn from(value: BigInt) -> Self {
        RawValue::Int(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// A value converted to a declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Null,
    Int(BigInt),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    Address(Address),
    List(Vec<TypedValue>),
    Struct(IndexMap<String, TypedValue>),
}

impl TypedValue {
    /// Gets the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            TypedValue::Int(value) => Some(value),
            _ => None,
        }
    }

    /// Gets the address if this is an `Address`.
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            TypedValue::Address(value) => Some(value),
            _ => None,
        }
    }

    /// Gets the text if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Gets the flag if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Converts to the JSON form used in response envelopes.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Formats an integer the way values cross the boundary: `0x` hex with an
/// optional leading minus.
pub fn int_to_hex(value: &BigInt) -> String {
    let sign = if value.sign() == num_bigint::Sign::Minus {
        "-"
    } else {
        ""
    };
    format!("{}0x{:x}", sign, value.magnitude())
}

impl Serialize for TypedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TypedValue::Null => serializer.serialize_none(),
            TypedValue::Int(value) => serializer.serialize_str(&int_to_hex(value)),
            TypedValue::Bool(value) => serializer.serialize_str(if *value { "0x1" } else { "0x0" }),
            TypedValue::Str(value) => serializer.serialize_str(value),
            TypedValue::Bytes(value) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(value)))
            }
            TypedValue::Address(value) => value.serialize(serializer),
            TypedValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TypedValue::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}
