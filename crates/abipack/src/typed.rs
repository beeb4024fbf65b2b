//! Strongly-typed argument values, one shape per [`ParamType`] kind.
//!
//! [`ParamType`]: crate::types::ParamType

use num_bigint::BigInt;
use serde_json::{json, Value};

use crate::types::FUNCTION_REF_LEN;
use crate::value::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Bool(bool),
    String(String),
    Address(Address),
    Bytes(Vec<u8>),
    /// `bytesN`. The width is only known from the schema at runtime, so the
    /// bytes live in a `Vec` whose length always equals the declared `N`
    /// (1..=32); coercion fails with `LengthMismatch` rather than pad or cut.
    FixedBytes(Vec<u8>),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    /// Integers declared wider than 64 bits, signed or unsigned.
    BigInt(BigInt),
    Function([u8; FUNCTION_REF_LEN]),
    FixedArray(Vec<TypedValue>),
    Array(Vec<TypedValue>),
    Tuple(Vec<TypedValue>),
}

impl TypedValue {
    pub fn kind_str(&self) -> &'static str {
        match self {
            TypedValue::Bool(_) => "bool",
            TypedValue::String(_) => "string",
            TypedValue::Address(_) => "address",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::FixedBytes(_) => "fixed bytes",
            TypedValue::I8(_)
            | TypedValue::I16(_)
            | TypedValue::I32(_)
            | TypedValue::I64(_)
            | TypedValue::U8(_)
            | TypedValue::U16(_)
            | TypedValue::U32(_)
            | TypedValue::U64(_)
            | TypedValue::BigInt(_) => "integer",
            TypedValue::Function(_) => "function",
            TypedValue::FixedArray(_) => "fixed array",
            TypedValue::Array(_) => "array",
            TypedValue::Tuple(_) => "tuple",
        }
    }

    /// Integer value widened to `BigInt`, for any integer shape.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            TypedValue::I8(v) => Some(BigInt::from(*v)),
            TypedValue::I16(v) => Some(BigInt::from(*v)),
            TypedValue::I32(v) => Some(BigInt::from(*v)),
            TypedValue::I64(v) => Some(BigInt::from(*v)),
            TypedValue::U8(v) => Some(BigInt::from(*v)),
            TypedValue::U16(v) => Some(BigInt::from(*v)),
            TypedValue::U32(v) => Some(BigInt::from(*v)),
            TypedValue::U64(v) => Some(BigInt::from(*v)),
            TypedValue::BigInt(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// JSON rendering for reports. Integers wider than 53 bits would lose
    /// precision as JSON numbers, so every integer is a decimal string.
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Bool(b) => json!(b),
            TypedValue::String(s) => json!(s),
            TypedValue::Address(a) => json!(a.to_hex()),
            TypedValue::Bytes(b) | TypedValue::FixedBytes(b) => {
                json!(format!("0x{}", hex::encode(b)))
            }
            TypedValue::Function(f) => json!(format!("0x{}", hex::encode(f))),
            TypedValue::FixedArray(items) | TypedValue::Array(items) | TypedValue::Tuple(items) => {
                Value::Array(items.iter().map(TypedValue::to_json).collect())
            }
            int => match int.as_bigint() {
                Some(v) => json!(v.to_string()),
                None => Value::Null,
            },
        }
    }
}
