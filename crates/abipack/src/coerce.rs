//! Schema-directed coercion of a [`DynamicValue`] into a [`TypedValue`].
//!
//! `coerce` dispatches on the declared [`ParamType`]. Composite kinds recurse:
//! tuple fields are looked up by name in the *same* container, array elements
//! are taken by position. The first failure aborts the whole value; its path
//! records where it happened.

use crate::error::{Error, ErrorKind};
use crate::numeric::{coerce_int, IntWidth};
use crate::resolve::{resolve, Field};
use crate::typed::TypedValue;
use crate::types::{ParamType, TupleField, FUNCTION_REF_LEN};
use crate::value::{strip_0x, Address, DynamicValue, ADDRESS_LEN};

/// Resolves `field` in `container`, then coerces the result to `ty`.
pub fn coerce_field(
    ty: &ParamType,
    field: Field<'_>,
    container: &DynamicValue,
) -> Result<TypedValue, Error> {
    let value = resolve(field, container)?;
    coerce(ty, value)
}

pub fn coerce(ty: &ParamType, value: &DynamicValue) -> Result<TypedValue, Error> {
    let value = value.unwrapped();
    tracing::trace!(ty = %ty, found = value.kind_str(), "coerce");

    if let DynamicValue::Null | DynamicValue::Optional(None) = value {
        if !matches!(ty, ParamType::Unsupported(_)) {
            return Err(Error::type_mismatch(ty, "absent value"));
        }
    }

    match ty {
        ParamType::Bool => coerce_bool(value),
        ParamType::String => match value {
            DynamicValue::Text(s) => Ok(TypedValue::String(s.clone())),
            other => Err(Error::type_mismatch(ty, other.kind_str())),
        },
        ParamType::Address => coerce_address(value),
        ParamType::Bytes => coerce_bytes(value),
        ParamType::FixedBytes(n) => coerce_fixed_bytes(value, *n),
        ParamType::Int(bits) => coerce_int(value, IntWidth::signed(*bits)),
        ParamType::Uint(bits) => coerce_int(value, IntWidth::unsigned(*bits)),
        ParamType::Function => match value {
            DynamicValue::FixedBytes(b) if b.len() == FUNCTION_REF_LEN => {
                let mut out = [0u8; FUNCTION_REF_LEN];
                out.copy_from_slice(b);
                Ok(TypedValue::Function(out))
            }
            DynamicValue::FixedBytes(b) => Err(Error::length_mismatch(FUNCTION_REF_LEN, b.len())),
            other => Err(Error::type_mismatch(ty, other.kind_str())),
        },
        ParamType::Tuple(fields) => match value {
            DynamicValue::Map(_) | DynamicValue::Record { .. } => coerce_tuple(fields, value),
            other => Err(Error::type_mismatch(ty, other.kind_str())),
        },
        ParamType::FixedArray(n, elem) => {
            let items = expect_seq(ty, value)?;
            if items.len() != *n {
                return Err(Error::length_mismatch(*n, items.len()));
            }
            coerce_seq(elem, items).map(TypedValue::FixedArray)
        }
        ParamType::Array(elem) => {
            let items = expect_seq(ty, value)?;
            coerce_seq(elem, items).map(TypedValue::Array)
        }
        ParamType::Unsupported(name) => Err(Error::new(
            ErrorKind::UnsupportedKind,
            format!("type {name} is not supported"),
        )),
    }
}

/// Builds a tuple by resolving every declared field against `container`.
pub fn coerce_tuple(fields: &[TupleField], container: &DynamicValue) -> Result<TypedValue, Error> {
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        let v = coerce_field(&field.ty, Field::Named(&field.name), container)
            .map_err(|e| e.at_field(&field.name))?;
        out.push(v);
    }
    Ok(TypedValue::Tuple(out))
}

/// Coerces sequence elements by position; tuple elements take the tuple path
/// on each element directly.
pub fn coerce_seq(elem: &ParamType, items: &[DynamicValue]) -> Result<Vec<TypedValue>, Error> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| coerce_field(elem, Field::Direct, item).map_err(|e| e.at_index(idx)))
        .collect()
}

fn expect_seq<'v>(ty: &ParamType, value: &'v DynamicValue) -> Result<&'v [DynamicValue], Error> {
    match value {
        DynamicValue::Seq(items) => Ok(items),
        other => Err(Error::type_mismatch(ty, other.kind_str())),
    }
}

fn coerce_bool(value: &DynamicValue) -> Result<TypedValue, Error> {
    match value {
        DynamicValue::Bool(b) => Ok(TypedValue::Bool(*b)),
        DynamicValue::Text(s) => {
            let lit = strip_0x(s).unwrap_or(s);
            parse_bool(lit).map(TypedValue::Bool).ok_or_else(|| {
                Error::new(
                    ErrorKind::TypeMismatch,
                    format!("expected bool, found unparsable text {s:?}"),
                )
            })
        }
        other => Err(Error::type_mismatch("bool", other.kind_str())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn coerce_address(value: &DynamicValue) -> Result<TypedValue, Error> {
    match value {
        DynamicValue::Address(a) => Ok(TypedValue::Address(*a)),
        DynamicValue::Text(s) => address_from_slice(&decode_hex(s)?),
        DynamicValue::Bytes(b) | DynamicValue::FixedBytes(b) => address_from_slice(b),
        other => Err(Error::type_mismatch("address", other.kind_str())),
    }
}

fn address_from_slice(b: &[u8]) -> Result<TypedValue, Error> {
    Address::from_slice(b)
        .map(TypedValue::Address)
        .ok_or_else(|| Error::length_mismatch(ADDRESS_LEN, b.len()))
}

fn coerce_bytes(value: &DynamicValue) -> Result<TypedValue, Error> {
    match value {
        DynamicValue::Bytes(b) | DynamicValue::FixedBytes(b) => Ok(TypedValue::Bytes(b.clone())),
        DynamicValue::Text(s) => decode_hex(s).map(TypedValue::Bytes),
        other => Err(Error::type_mismatch("bytes", other.kind_str())),
    }
}

fn coerce_fixed_bytes(value: &DynamicValue, n: usize) -> Result<TypedValue, Error> {
    let bytes = match value {
        DynamicValue::Bytes(b) | DynamicValue::FixedBytes(b) => b.clone(),
        DynamicValue::Text(s) => decode_hex(s)?,
        other => return Err(Error::type_mismatch(format!("bytes{n}"), other.kind_str())),
    };
    if bytes.len() != n {
        return Err(Error::length_mismatch(n, bytes.len()));
    }
    Ok(TypedValue::FixedBytes(bytes))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    hex::decode(strip_0x(s).unwrap_or(s)).map_err(|e| {
        Error::new(
            ErrorKind::TypeMismatch,
            format!("expected hex text, found {s:?}: {e}"),
        )
    })
}
