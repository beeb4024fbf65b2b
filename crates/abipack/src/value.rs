//! Closed model of caller-supplied argument data.
//!
//! Whatever shape the host hands over (JSON, Rust structs, maps of strings) is
//! converted into [`DynamicValue`] once, at the boundary. Resolution and
//! coercion only ever look at this type.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;

pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Parses 40 hex digits with an optional `0x`/`0X` prefix.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = strip_0x(s).unwrap_or(s);
        if digits.len() != ADDRESS_LEN * 2 {
            return None;
        }
        let mut out = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut out).ok()?;
        Some(Address(out))
    }

    pub fn from_slice(b: &[u8]) -> Option<Self> {
        let arr: [u8; ADDRESS_LEN] = b.try_into().ok()?;
        Some(Address(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(b: [u8; ADDRESS_LEN]) -> Self {
        Address(b)
    }
}

/// Returns the digits after a `0x`/`0X` prefix, if there is one.
pub(crate) fn strip_0x(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// Absent / JSON `null`.
    Null,
    Bool(bool),
    /// Any native signed integer.
    Int(i128),
    /// Any native unsigned integer.
    Uint(u128),
    BigInt(BigInt),
    Float(f64),
    Text(String),
    /// A growable byte sequence (`Vec<u8>`, `&[u8]`).
    Bytes(Vec<u8>),
    /// A native fixed-size byte array (`[u8; N]`).
    FixedBytes(Vec<u8>),
    Address(Address),
    Seq(Vec<DynamicValue>),
    Map(BTreeMap<String, DynamicValue>),
    Record {
        name: String,
        fields: Vec<(String, DynamicValue)>,
    },
    /// An optional or boxed reference (`Option<T>`, `Box<T>`).
    Optional(Option<Box<DynamicValue>>),
    /// A handle with no data view (closures, channels); never resolvable.
    Opaque(String),
}

impl DynamicValue {
    pub fn kind_str(&self) -> &'static str {
        match self {
            DynamicValue::Null => "null",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Int(_) => "int",
            DynamicValue::Uint(_) => "uint",
            DynamicValue::BigInt(_) => "bigint",
            DynamicValue::Float(_) => "float",
            DynamicValue::Text(_) => "text",
            DynamicValue::Bytes(_) => "bytes",
            DynamicValue::FixedBytes(_) => "fixed bytes",
            DynamicValue::Address(_) => "address",
            DynamicValue::Seq(_) => "sequence",
            DynamicValue::Map(_) => "map",
            DynamicValue::Record { .. } => "record",
            DynamicValue::Optional(_) => "optional",
            DynamicValue::Opaque(_) => "opaque handle",
        }
    }

    /// Follows `Optional(Some(..))` wrappers down to the wrapped value.
    pub fn unwrapped(&self) -> &DynamicValue {
        let mut cur = self;
        while let DynamicValue::Optional(Some(inner)) = cur {
            cur = inner;
        }
        cur
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        DynamicValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn record<K, I>(name: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        DynamicValue::Record {
            name: name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DynamicValue>,
    {
        DynamicValue::Seq(items.into_iter().map(Into::into).collect())
    }

    pub fn some(v: impl Into<DynamicValue>) -> Self {
        DynamicValue::Optional(Some(Box::new(v.into())))
    }

    pub fn none() -> Self {
        DynamicValue::Optional(None)
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        DynamicValue::Bytes(b.into())
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for DynamicValue {
            fn from(v: $t) -> Self {
                DynamicValue::Int(v as i128)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for DynamicValue {
            fn from(v: $t) -> Self {
                DynamicValue::Uint(v as u128)
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, i128, isize);
from_unsigned!(u8, u16, u32, u64, u128, usize);

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<f32> for DynamicValue {
    fn from(v: f32) -> Self {
        DynamicValue::Float(v as f64)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::Float(v)
    }
}

impl From<BigInt> for DynamicValue {
    fn from(v: BigInt) -> Self {
        DynamicValue::BigInt(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::Text(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::Text(v)
    }
}

impl From<Vec<u8>> for DynamicValue {
    fn from(v: Vec<u8>) -> Self {
        DynamicValue::Bytes(v)
    }
}

impl From<&[u8]> for DynamicValue {
    fn from(v: &[u8]) -> Self {
        DynamicValue::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for DynamicValue {
    fn from(v: [u8; N]) -> Self {
        DynamicValue::FixedBytes(v.to_vec())
    }
}

impl From<Address> for DynamicValue {
    fn from(v: Address) -> Self {
        DynamicValue::Address(v)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        DynamicValue::Optional(v.map(|inner| Box::new(inner.into())))
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;

        match v {
            Value::Null => DynamicValue::Null,
            Value::Bool(b) => DynamicValue::Bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    DynamicValue::Uint(u as u128)
                } else if let Some(i) = n.as_i64() {
                    DynamicValue::Int(i as i128)
                } else {
                    number_literal(&n.to_string())
                }
            }
            Value::String(s) => DynamicValue::Text(s),
            Value::Array(items) => {
                DynamicValue::Seq(items.into_iter().map(DynamicValue::from).collect())
            }
            Value::Object(obj) => DynamicValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, DynamicValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// JSON numbers outside the 64-bit range. With `arbitrary_precision` the
/// literal text is kept verbatim, so integers stay exact; only literals with a
/// fraction or exponent become floats.
fn number_literal(lit: &str) -> DynamicValue {
    if !lit.contains(['.', 'e', 'E']) {
        if let Ok(v) = lit.parse::<BigInt>() {
            return DynamicValue::BigInt(v);
        }
    }
    match lit.parse::<f64>() {
        Ok(f) => DynamicValue::Float(f),
        Err(_) => DynamicValue::Text(lit.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_from_hex_accepts_both_prefixes() {
        let a = Address::from_hex("0x0000000000000000000000000000000000000001").unwrap();
        let b = Address::from_hex("0X0000000000000000000000000000000000000001").unwrap();
        let c = Address::from_hex("0000000000000000000000000000000000000001").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.0[19], 1);
    }

    #[test]
    fn address_from_hex_rejects_bad_input() {
        assert!(Address::from_hex("0x01").is_none());
        assert!(Address::from_hex("0xzz00000000000000000000000000000000000001").is_none());
        assert!(Address::from_hex("0x000000000000000000000000000000000000000001").is_none());
    }

    #[test]
    fn unwrapped_follows_nested_optionals() {
        let v = DynamicValue::some(DynamicValue::some("x"));
        assert_eq!(v.unwrapped(), &DynamicValue::Text("x".to_string()));
        assert_eq!(DynamicValue::none().unwrapped(), &DynamicValue::Optional(None));
    }

    #[test]
    fn json_numbers_keep_sign() {
        let v = DynamicValue::from(serde_json::json!([1, -2, 1.5]));
        assert_eq!(
            v,
            DynamicValue::Seq(vec![
                DynamicValue::Uint(1),
                DynamicValue::Int(-2),
                DynamicValue::Float(1.5),
            ])
        );
    }

    #[test]
    fn wide_json_integers_stay_exact() {
        use crate::types::ParamType;
        use crate::typed::TypedValue;

        let lit = "12345678901234567890123";
        let v = DynamicValue::from(serde_json::from_str::<serde_json::Value>(lit).unwrap());
        let want: BigInt = lit.parse().unwrap();
        assert_eq!(v, DynamicValue::BigInt(want.clone()));
        assert_eq!(
            crate::coerce(&ParamType::Uint(256), &v).unwrap(),
            TypedValue::BigInt(want)
        );

        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let v = DynamicValue::from(serde_json::from_str::<serde_json::Value>(max).unwrap());
        assert_eq!(
            crate::coerce(&ParamType::Uint(256), &v).unwrap(),
            TypedValue::BigInt(max.parse().unwrap())
        );
        let over = format!("{}6", &max[..max.len() - 1]);
        let v = DynamicValue::from(serde_json::from_str::<serde_json::Value>(&over).unwrap());
        let err = crate::coerce(&ParamType::Uint(256), &v).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::RangeOverflow);

        let neg = "-57896044618658097711785492504343953926634992332820282019728792003956564819968";
        let v = DynamicValue::from(serde_json::from_str::<serde_json::Value>(neg).unwrap());
        assert_eq!(
            crate::coerce(&ParamType::Int(256), &v).unwrap(),
            TypedValue::BigInt(neg.parse().unwrap())
        );
    }

    #[test]
    fn json_fractions_and_exponents_are_floats() {
        let v = DynamicValue::from(serde_json::from_str::<serde_json::Value>("[2.5, 1e30]").unwrap());
        assert_eq!(
            v,
            DynamicValue::Seq(vec![DynamicValue::Float(2.5), DynamicValue::Float(1e30)])
        );
    }
}
