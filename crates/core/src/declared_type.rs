//! Declared parameter types of contract methods.

use crate::{ScoreError, ScoreResult};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named field of a struct parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: DeclaredType,
}

impl StructField {
    pub fn new(name: impl Into<String>, field_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// The type vocabulary of contract method signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Int,
    Str,
    Bytes,
    Bool,
    Address,
    List(Box<DeclaredType>),
    Struct(Vec<StructField>),
    /// Accepts any value without conversion.
    Any,
}

impl DeclaredType {
    /// Shorthand for `list[element]`.
    pub fn list(element: DeclaredType) -> Self {
        DeclaredType::List(Box::new(element))
    }

    /// Gets the struct fields, if this is a struct type.
    pub fn fields(&self) -> Option<&[StructField]> {
        match self {
            DeclaredType::Struct(fields) => Some(fields),
            DeclaredType::List(element) => element.fields(),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Int => f.write_str("int"),
            DeclaredType::Str => f.write_str("str"),
            DeclaredType::Bytes => f.write_str("bytes"),
            DeclaredType::Bool => f.write_str("bool"),
            DeclaredType::Address => f.write_str("Address"),
            DeclaredType::List(element) => write!(f, "[]{}", element),
            DeclaredType::Struct(_) => f.write_str("struct"),
            DeclaredType::Any => f.write_str("any"),
        }
    }
}

impl FromStr for DeclaredType {
    type Err = ScoreError;

    /// Parses scalar and list type names. Struct types carry their fields and
    /// cannot be written as a bare name.
    fn from_str(s: &str) -> ScoreResult<Self> {
        if let Some(element) = s.strip_prefix("[]") {
            return Ok(DeclaredType::list(element.parse()?));
        }
        match s {
            "int" => Ok(DeclaredType::Int),
            "str" => Ok(DeclaredType::Str),
            "bytes" => Ok(DeclaredType::Bytes),
            "bool" => Ok(DeclaredType::Bool),
            "Address" => Ok(DeclaredType::Address),
            "any" => Ok(DeclaredType::Any),
            _ => Err(ScoreError::internal(format!("Unknown declared type: {}", s))),
        }
    }
}

/// Struct types, and lists of them, serialize as
/// `{"type": "struct", "fields": [..]}` with one `[]` prefix per list level.
/// Every other type serializes as its name.
impl Serialize for DeclaredType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.fields() {
            None => serializer.collect_str(self),
            Some(fields) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", &self.to_string())?;
                map.serialize_entry("fields", fields)?;
                map.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeclaredTypeRepr {
    Name(String),
    Struct {
        #[serde(rename = "type")]
        type_name: String,
        fields: Vec<StructField>,
    },
}

impl<'de> Deserialize<'de> for DeclaredType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match DeclaredTypeRepr::deserialize(deserializer)? {
            DeclaredTypeRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            DeclaredTypeRepr::Struct { type_name, fields } => {
                let mut base = type_name.as_str();
                let mut levels = 0;
                while let Some(element) = base.strip_prefix("[]") {
                    base = element;
                    levels += 1;
                }
                if base != "struct" {
                    return Err(serde::de::Error::custom(format!(
                        "Fields given for non-struct type: {}",
                        type_name
                    )));
                }
                let mut declared = DeclaredType::Struct(fields);
                for _ in 0..levels {
                    declared = DeclaredType::list(declared);
                }
                Ok(declared)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(DeclaredType::list(DeclaredType::Address).to_string(), "[]Address");
        assert_eq!(
            "[][]int".parse::<DeclaredType>().unwrap(),
            DeclaredType::list(DeclaredType::list(DeclaredType::Int))
        );
        assert!("float".parse::<DeclaredType>().is_err());
    }

    #[test]
    fn test_struct_fields_through_list() {
        let person = DeclaredType::Struct(vec![
            StructField::new("name", DeclaredType::Str),
            StructField::new("age", DeclaredType::Int),
        ]);
        let people = DeclaredType::list(person);
        assert_eq!(people.to_string(), "[]struct");
        assert_eq!(people.fields().map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_struct_json_round_trip() {
        let person = DeclaredType::Struct(vec![
            StructField::new("name", DeclaredType::Str),
            StructField::new("wallets", DeclaredType::list(DeclaredType::Address)),
        ]);
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "struct",
                "fields": [
                    {"name": "name", "type": "str"},
                    {"name": "wallets", "type": "[]Address"},
                ]
            })
        );
        assert_eq!(serde_json::from_value::<DeclaredType>(json).unwrap(), person);

        let people = DeclaredType::list(DeclaredType::list(person.clone()));
        let json = serde_json::to_value(&people).unwrap();
        assert_eq!(json["type"], "[][]struct");
        assert_eq!(serde_json::from_value::<DeclaredType>(json).unwrap(), people);

        let field = StructField::new("owner", person);
        let text = serde_json::to_string(&field).unwrap();
        assert_eq!(serde_json::from_str::<StructField>(&text).unwrap(), field);

        assert_eq!(serde_json::to_value(DeclaredType::Int).unwrap(), "int");
        assert_eq!(
            serde_json::from_value::<DeclaredType>(serde_json::json!("[]bytes")).unwrap(),
            DeclaredType::list(DeclaredType::Bytes)
        );
    }

    #[test]
    fn test_struct_json_rejects_bad_shapes() {
        assert!(serde_json::from_value::<DeclaredType>(serde_json::json!("struct")).is_err());
        assert!(serde_json::from_value::<DeclaredType>(serde_json::json!({
            "type": "int",
            "fields": [],
        }))
        .is_err());
    }
}
