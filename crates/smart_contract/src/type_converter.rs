//! Parameter normalisation.
//!
//! Call parameters arrive as loosely typed data. [`decode_params`] turns a
//! raw mapping into keyword form with text keys, and [`convert_params`]
//! coerces each value to the type declared by the target method.

use crate::manifest::FunctionDescriptor;
use indexmap::IndexMap;
use num_bigint::BigInt;
use score_core::{
    Address, DeclaredType, RawValue, ScoreError, ScoreResult, StructField, TypedValue,
};

/// Decodes the top level of a raw parameter mapping.
///
/// Byte keys and byte values are decoded as UTF-8; text keys pass through.
/// Nested values are left untouched. Later duplicates of a key win.
pub fn decode_params(raw: &RawValue) -> ScoreResult<IndexMap<String, RawValue>> {
    let entries = match raw {
        RawValue::Map(entries) => entries,
        other => {
            return Err(ScoreError::internal(format!(
                "Cannot decode params of type {}",
                other.type_name()
            )))
        }
    };

    let mut decoded = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let key = match key {
            RawValue::Text(text) => text.clone(),
            RawValue::Bytes(bytes) => utf8(bytes, "param name")?,
            other => {
                return Err(ScoreError::internal(format!(
                    "Unexpected key type: {}",
                    other.type_name()
                )))
            }
        };
        let value = match value {
            RawValue::Bytes(bytes) => RawValue::Text(utf8(bytes, &key)?),
            other => other.clone(),
        };
        decoded.insert(key, value);
    }
    Ok(decoded)
}

/// Converts keyword params to the declared types of `function`.
///
/// The result is ordered as the parameters are declared. Omitted optional
/// parameters take their default.
pub fn convert_params(
    function: &FunctionDescriptor,
    mut params: IndexMap<String, RawValue>,
) -> ScoreResult<IndexMap<String, TypedValue>> {
    if let Some(unknown) = params
        .keys()
        .find(|name| function.input(name).is_none())
    {
        return Err(ScoreError::invalid_params(format!(
            "Unknown param: {} in {}",
            unknown, function.name
        )));
    }

    let mut converted = IndexMap::with_capacity(function.inputs.len());
    for input in &function.inputs {
        let value = match params.shift_remove(&input.name) {
            Some(raw) => convert_value(&input.param_type, &raw).map_err(|e| {
                ScoreError::invalid_params(format!("Invalid param {}: {}", input.name, e))
            })?,
            None if input.optional => input.default.clone().unwrap_or(TypedValue::Null),
            None => {
                return Err(ScoreError::invalid_params(format!(
                    "Missing param: {} in {}",
                    input.name, function.name
                )))
            }
        };
        converted.insert(input.name.clone(), value);
    }
    Ok(converted)
}

/// Converts one value to `declared`. `Null` converts to `Null` for every type.
pub fn convert_value(declared: &DeclaredType, raw: &RawValue) -> ScoreResult<TypedValue> {
    if let RawValue::Null = raw {
        return Ok(TypedValue::Null);
    }

    match declared {
        DeclaredType::Int => to_int(raw).map(TypedValue::Int),
        DeclaredType::Str => match raw {
            RawValue::Text(text) => Ok(TypedValue::Str(text.clone())),
            RawValue::Bytes(bytes) => utf8(bytes, "str").map(TypedValue::Str),
            other => Err(mismatch(declared, other)),
        },
        DeclaredType::Bytes => match raw {
            RawValue::Bytes(bytes) => Ok(TypedValue::Bytes(bytes.clone())),
            RawValue::Text(text) => {
                let digits = text
                    .strip_prefix("0x")
                    .ok_or_else(|| ScoreError::invalid_params(format!("Invalid bytes: {}", text)))?;
                hex::decode(digits)
                    .map(TypedValue::Bytes)
                    .map_err(|_| ScoreError::invalid_params(format!("Invalid bytes: {}", text)))
            }
            other => Err(mismatch(declared, other)),
        },
        DeclaredType::Bool => match raw {
            RawValue::Bool(flag) => Ok(TypedValue::Bool(*flag)),
            other => {
                let value = to_int(other)?;
                if value == BigInt::from(0) {
                    Ok(TypedValue::Bool(false))
                } else if value == BigInt::from(1) {
                    Ok(TypedValue::Bool(true))
                } else {
                    Err(ScoreError::invalid_params(format!("Invalid bool: {}", value)))
                }
            }
        },
        DeclaredType::Address => match raw {
            RawValue::Text(text) => text.parse::<Address>().map(TypedValue::Address),
            RawValue::Bytes(bytes) => utf8(bytes, "Address")?
                .parse::<Address>()
                .map(TypedValue::Address),
            other => Err(mismatch(declared, other)),
        },
        DeclaredType::List(element) => match raw {
            RawValue::List(items) => items
                .iter()
                .map(|item| convert_value(element, item))
                .collect::<ScoreResult<Vec<_>>>()
                .map(TypedValue::List),
            other => Err(mismatch(declared, other)),
        },
        DeclaredType::Struct(fields) => match raw {
            RawValue::Map(entries) => convert_struct(fields, entries),
            other => Err(mismatch(declared, other)),
        },
        DeclaredType::Any => convert_any(raw),
    }
}

fn convert_struct(
    fields: &[StructField],
    entries: &[(RawValue, RawValue)],
) -> ScoreResult<TypedValue> {
    let mut values = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        values.insert(field_name(key)?, value);
    }
    if let Some(unknown) = values
        .keys()
        .find(|name| !fields.iter().any(|f| &f.name == *name))
    {
        return Err(ScoreError::invalid_params(format!("Unknown field: {}", unknown)));
    }

    let mut converted = IndexMap::with_capacity(fields.len());
    for field in fields {
        let raw = values
            .get(&field.name)
            .ok_or_else(|| ScoreError::invalid_params(format!("Missing field: {}", field.name)))?;
        converted.insert(field.name.clone(), convert_value(&field.field_type, raw)?);
    }
    Ok(TypedValue::Struct(converted))
}

fn convert_any(raw: &RawValue) -> ScoreResult<TypedValue> {
    Ok(match raw {
        RawValue::Null => TypedValue::Null,
        RawValue::Bool(flag) => TypedValue::Bool(*flag),
        RawValue::Int(value) => TypedValue::Int(value.clone()),
        RawValue::Bytes(bytes) => TypedValue::Bytes(bytes.clone()),
        RawValue::Text(text) => TypedValue::Str(text.clone()),
        RawValue::List(items) => TypedValue::List(
            items
                .iter()
                .map(convert_any)
                .collect::<ScoreResult<Vec<_>>>()?,
        ),
        RawValue::Map(entries) => {
            let mut values = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                values.insert(field_name(key)?, convert_any(value)?);
            }
            TypedValue::Struct(values)
        }
    })
}

fn to_int(raw: &RawValue) -> ScoreResult<BigInt> {
    match raw {
        RawValue::Int(value) => Ok(value.clone()),
        RawValue::Bool(flag) => Ok(BigInt::from(u8::from(*flag))),
        RawValue::Text(text) => parse_int(text),
        RawValue::Bytes(bytes) => parse_int(&utf8(bytes, "int")?),
        other => Err(ScoreError::invalid_params(format!(
            "Cannot convert {} to int",
            other.type_name()
        ))),
    }
}

/// Parses `0x`-prefixed hex or decimal text with an optional leading `-`.
fn parse_int(text: &str) -> ScoreResult<BigInt> {
    let invalid = || ScoreError::invalid_params(format!("Invalid int: {}", text));
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (digits, radix) = match body.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let value = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
    Ok(if negative { -value } else { value })
}

fn field_name(key: &RawValue) -> ScoreResult<String> {
    match key {
        RawValue::Text(text) => Ok(text.clone()),
        RawValue::Bytes(bytes) => utf8(bytes, "field name"),
        other => Err(ScoreError::invalid_params(format!(
            "Unexpected field name type: {}",
            other.type_name()
        ))),
    }
}

fn utf8(bytes: &[u8], what: &str) -> ScoreResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ScoreError::invalid_params(format!("{} is not valid UTF-8", what)))
}

fn mismatch(declared: &DeclaredType, raw: &RawValue) -> ScoreError {
    ScoreError::invalid_params(format!("Cannot convert {} to {}", raw.type_name(), declared))
}
