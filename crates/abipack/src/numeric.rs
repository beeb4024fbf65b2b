//! Integer coercion for every declared width.
//!
//! Every source shape is first widened to a `BigInt`, checked once against the
//! declared width, then narrowed into its carrier: the smallest native slot
//! that holds the declared width, or `BigInt` above 64 bits.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use crate::error::{Error, ErrorKind};
use crate::typed::TypedValue;
use crate::value::{strip_0x, DynamicValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntWidth {
    pub bits: u16,
    pub signed: bool,
}

impl IntWidth {
    pub fn signed(bits: u16) -> Self {
        IntWidth { bits, signed: true }
    }

    pub fn unsigned(bits: u16) -> Self {
        IntWidth {
            bits,
            signed: false,
        }
    }

    pub fn min(&self) -> BigInt {
        if self.signed {
            -(BigInt::one() << (self.bits as usize - 1))
        } else {
            BigInt::zero()
        }
    }

    pub fn max(&self) -> BigInt {
        let magnitude_bits = if self.signed {
            self.bits as usize - 1
        } else {
            self.bits as usize
        };
        (BigInt::one() << magnitude_bits) - BigInt::one()
    }

    /// Bit width of the carrier; declared widths above 64 keep their own width.
    pub fn slot_bits(&self) -> u16 {
        match self.bits {
            0..=8 => 8,
            9..=16 => 16,
            17..=32 => 32,
            33..=64 => 64,
            bits => bits,
        }
    }

    fn type_name(&self) -> String {
        if self.signed {
            format!("int{}", self.bits)
        } else {
            format!("uint{}", self.bits)
        }
    }
}

/// Parses `[+-]digits` or `[+-]0xhexdigits`. Hex is chosen only by the prefix.
pub fn parse_int_text(s: &str) -> Option<BigInt> {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (Sign::Minus, &s[1..]),
        Some(b'+') => (Sign::Plus, &s[1..]),
        _ => (Sign::Plus, s),
    };
    let (radix, digits) = match strip_0x(rest) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = BigUint::parse_bytes(digits.as_bytes(), radix)?;
    Some(BigInt::from_biguint(sign, magnitude))
}

/// Widens any numeric-looking source to a `BigInt`. Floats truncate toward zero.
pub fn to_bigint(value: &DynamicValue, width: IntWidth) -> Result<BigInt, Error> {
    match value.unwrapped() {
        DynamicValue::Int(v) => Ok(BigInt::from(*v)),
        DynamicValue::Uint(v) => Ok(BigInt::from(*v)),
        DynamicValue::BigInt(v) => Ok(v.clone()),
        DynamicValue::Float(f) => BigInt::from_f64(f.trunc()).ok_or_else(|| {
            Error::new(
                ErrorKind::TypeMismatch,
                format!("expected {}, found non-finite float {f}", width.type_name()),
            )
        }),
        DynamicValue::Text(s) if !width.signed && s.starts_with(['+', '-']) => Err(Error::new(
            ErrorKind::TypeMismatch,
            format!("expected {}, found signed text {s:?}", width.type_name()),
        )),
        DynamicValue::Text(s) => parse_int_text(s).ok_or_else(|| {
            Error::new(
                ErrorKind::TypeMismatch,
                format!("expected {}, found unparsable text {s:?}", width.type_name()),
            )
        }),
        other => Err(Error::type_mismatch(width.type_name(), other.kind_str())),
    }
}

/// The one bounds check every integer coercion goes through.
pub fn check_bounds(v: &BigInt, width: IntWidth) -> Result<(), Error> {
    if !width.signed && v.is_negative() {
        return Err(Error::new(
            ErrorKind::RangeOverflow,
            format!("{v} is negative, {} is unsigned", width.type_name()),
        ));
    }
    if *v < width.min() || *v > width.max() {
        return Err(Error::new(
            ErrorKind::RangeOverflow,
            format!(
                "{v} is outside {} range [{}, {}]",
                width.type_name(),
                width.min(),
                width.max()
            ),
        ));
    }
    Ok(())
}

pub fn coerce_int(value: &DynamicValue, width: IntWidth) -> Result<TypedValue, Error> {
    let v = to_bigint(value, width)?;
    check_bounds(&v, width)?;
    narrow(v, width)
}

fn narrow(v: BigInt, width: IntWidth) -> Result<TypedValue, Error> {
    if width.bits > 64 {
        return Ok(TypedValue::BigInt(v));
    }
    // In range for the declared width, so every cast below is lossless.
    let n = v.to_i128().ok_or_else(|| {
        Error::new(
            ErrorKind::RangeOverflow,
            format!("{v} does not fit {}", width.type_name()),
        )
    })?;
    let out = match (width.signed, width.slot_bits()) {
        (true, 8) => TypedValue::I8(n as i8),
        (true, 16) => TypedValue::I16(n as i16),
        (true, 32) => TypedValue::I32(n as i32),
        (true, _) => TypedValue::I64(n as i64),
        (false, 8) => TypedValue::U8(n as u8),
        (false, 16) => TypedValue::U16(n as u16),
        (false, 32) => TypedValue::U32(n as u32),
        (false, _) => TypedValue::U64(n as u64),
    };
    Ok(out)
}
