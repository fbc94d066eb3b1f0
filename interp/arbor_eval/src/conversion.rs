//! Primitive conversion table.
//!
//! Converts a scalar value from one kind to another across the full
//! numeric lattice, in two flavors:
//!
//! - [`convert_unchecked`] wraps/truncates like a native narrowing cast
//!   and never raises on magnitude loss;
//! - [`convert_checked`] raises `ArithmeticOverflow` when the value
//!   does not fit the target kind.
//!
//! Booleans and characters sit outside the pairwise numeric grid but
//! are individually convertible: characters through their code point,
//! booleans only to themselves.

use arbor_ir::errors::{arithmetic_overflow, invalid_cast, EvalError};
use arbor_ir::{PrimitiveKind, ScalarKind, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Intermediate widened form: every numeric kind embeds losslessly into
/// one of these three.
enum Wide {
    Int(i128),
    Float(f64),
    Dec(Decimal),
}

/// Widen a value into its intermediate form, if it is numeric or a
/// character. Booleans and non-scalar values do not widen.
fn widen(value: &Value) -> Option<Wide> {
    let wide = match value {
        Value::I8(v) => Wide::Int(i128::from(*v)),
        Value::U8(v) => Wide::Int(i128::from(*v)),
        Value::I16(v) => Wide::Int(i128::from(*v)),
        Value::U16(v) => Wide::Int(i128::from(*v)),
        Value::I32(v) => Wide::Int(i128::from(*v)),
        Value::U32(v) => Wide::Int(i128::from(*v)),
        Value::I64(v) => Wide::Int(i128::from(*v)),
        Value::U64(v) => Wide::Int(i128::from(*v)),
        Value::F32(v) => Wide::Float(f64::from(*v)),
        Value::F64(v) => Wide::Float(*v),
        Value::Decimal(v) => Wide::Dec(*v),
        Value::Char(c) => Wide::Int(i128::from(u32::from(*c))),
        _ => return None,
    };
    Some(wide)
}

/// Truncate toward zero into the widest integer form.
///
/// Rust's `as` cast already truncates toward zero, saturates at the
/// `i128` bounds, and maps NaN to zero; every fixed-width target then
/// wraps from there.
fn trunc_to_i128(wide: &Wide) -> i128 {
    match wide {
        Wide::Int(i) => *i,
        Wide::Float(f) => *f as i128,
        Wide::Dec(d) => d.trunc().to_i128().unwrap_or(0),
    }
}

fn to_f64(wide: &Wide) -> f64 {
    match wide {
        Wide::Int(i) => *i as f64,
        Wide::Float(f) => *f,
        Wide::Dec(d) => d.to_f64().unwrap_or(0.0),
    }
}

/// Wrap the widened value into a fixed-width numeric kind.
fn narrow_wrapping(wide: &Wide, kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::I8 => Value::I8(trunc_to_i128(wide) as i8),
        PrimitiveKind::U8 => Value::U8(trunc_to_i128(wide) as u8),
        PrimitiveKind::I16 => Value::I16(trunc_to_i128(wide) as i16),
        PrimitiveKind::U16 => Value::U16(trunc_to_i128(wide) as u16),
        PrimitiveKind::I32 => Value::I32(trunc_to_i128(wide) as i32),
        PrimitiveKind::U32 => Value::U32(trunc_to_i128(wide) as u32),
        PrimitiveKind::I64 => Value::I64(trunc_to_i128(wide) as i64),
        PrimitiveKind::U64 => Value::U64(trunc_to_i128(wide) as u64),
        PrimitiveKind::F32 => Value::F32(to_f64(wide) as f32),
        PrimitiveKind::F64 => Value::F64(to_f64(wide)),
        PrimitiveKind::Decimal => match wide {
            Wide::Int(i) => Value::Decimal(Decimal::from_i128_with_scale(*i, 0)),
            Wide::Float(f) => Decimal::from_f64_retain(*f).map_or(Value::Nothing, Value::Decimal),
            Wide::Dec(d) => Value::Decimal(*d),
        },
    }
}

/// Convert a scalar value to the target kind, wrapping on overflow.
///
/// Float-to-integer truncates toward zero (NaN becomes zero),
/// integer-to-narrower-integer truncates high bits, integer-to-float
/// may silently lose precision. Never raises: an unconvertible value
/// or unrecognized pairing yields `Nothing` instead.
pub fn convert_unchecked(value: &Value, target: ScalarKind) -> Value {
    match target {
        ScalarKind::Numeric(kind) => match widen(value) {
            Some(wide) => narrow_wrapping(&wide, kind),
            None => Value::Nothing,
        },
        ScalarKind::Bool => match value {
            Value::Bool(b) => Value::Bool(*b),
            _ => Value::Nothing,
        },
        ScalarKind::Char => match widen(value) {
            // Wrap to a 16-bit code unit; the surrogate range has no
            // char representation and yields Nothing.
            Some(wide) => {
                let bits = trunc_to_i128(&wide) as u16;
                char::from_u32(u32::from(bits)).map_or(Value::Nothing, Value::Char)
            }
            None => Value::Nothing,
        },
    }
}

macro_rules! checked_int_narrow {
    ($i:expr, $target:expr, $variant:ident, $ty:ty) => {
        <$ty>::try_from($i)
            .map(Value::$variant)
            .map_err(|_| conversion_overflow($target))
    };
}

fn conversion_overflow(target: ScalarKind) -> EvalError {
    arithmetic_overflow(format!("conversion to {}", target.name()))
}

/// Range-check the widened integer form into a fixed-width kind.
fn narrow_checked_int(i: i128, kind: PrimitiveKind) -> Result<Value, EvalError> {
    let target = ScalarKind::Numeric(kind);
    match kind {
        PrimitiveKind::I8 => checked_int_narrow!(i, target, I8, i8),
        PrimitiveKind::U8 => checked_int_narrow!(i, target, U8, u8),
        PrimitiveKind::I16 => checked_int_narrow!(i, target, I16, i16),
        PrimitiveKind::U16 => checked_int_narrow!(i, target, U16, u16),
        PrimitiveKind::I32 => checked_int_narrow!(i, target, I32, i32),
        PrimitiveKind::U32 => checked_int_narrow!(i, target, U32, u32),
        PrimitiveKind::I64 => checked_int_narrow!(i, target, I64, i64),
        PrimitiveKind::U64 => checked_int_narrow!(i, target, U64, u64),
        // Integer-to-float conversion never overflows; precision loss
        // is permitted even in checked mode.
        PrimitiveKind::F32 => Ok(Value::F32(i as f32)),
        PrimitiveKind::F64 => Ok(Value::F64(i as f64)),
        PrimitiveKind::Decimal => Ok(Value::Decimal(Decimal::from_i128_with_scale(i, 0))),
    }
}

/// Range-check a floating value into the target kind.
fn narrow_checked_float(f: f64, kind: PrimitiveKind) -> Result<Value, EvalError> {
    let target = ScalarKind::Numeric(kind);
    match kind {
        // Float-to-float stays IEEE: out-of-range f64 becomes an f32
        // infinity rather than trapping.
        PrimitiveKind::F32 => Ok(Value::F32(f as f32)),
        PrimitiveKind::F64 => Ok(Value::F64(f)),
        PrimitiveKind::Decimal => {
            Decimal::from_f64_retain(f).map(Value::Decimal).ok_or_else(|| conversion_overflow(target))
        }
        _ => {
            if f.is_nan() || f.is_infinite() {
                return Err(conversion_overflow(target));
            }
            let t = f.trunc();
            // i128 covers every fixed-width target; a truncated float
            // outside it cannot fit any of them.
            if t < i128::MIN as f64 || t >= i128::MAX as f64 {
                return Err(conversion_overflow(target));
            }
            narrow_checked_int(t as i128, kind)
        }
    }
}

/// Convert a scalar value to the target kind, raising on magnitude
/// loss.
///
/// A value already of the target kind passes through unchanged. A
/// value outside the target's representable range raises
/// `ArithmeticOverflow`; a pairing with no defined rule (e.g. boolean
/// to integer) raises an invalid-cast error.
pub fn convert_checked(value: &Value, target: ScalarKind) -> Result<Value, EvalError> {
    if value.kind() == Some(target) {
        return Ok(value.clone());
    }
    let cast_error = || invalid_cast(value.type_name(), target.name());
    match target {
        ScalarKind::Numeric(kind) => match widen(value).ok_or_else(cast_error)? {
            Wide::Int(i) => narrow_checked_int(i, kind),
            Wide::Float(f) => narrow_checked_float(f, kind),
            Wide::Dec(d) => match kind {
                PrimitiveKind::F32 => Ok(Value::F32(d.to_f64().unwrap_or(0.0) as f32)),
                PrimitiveKind::F64 => Ok(Value::F64(d.to_f64().unwrap_or(0.0))),
                PrimitiveKind::Decimal => Ok(Value::Decimal(d)),
                _ => d
                    .trunc()
                    .to_i128()
                    .ok_or_else(|| conversion_overflow(target))
                    .and_then(|i| narrow_checked_int(i, kind)),
            },
        },
        ScalarKind::Bool => Err(cast_error()),
        ScalarKind::Char => match widen(value).ok_or_else(cast_error)? {
            Wide::Int(i) => u32::try_from(i)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| conversion_overflow(target)),
            // Floating kinds have no checked conversion to char.
            Wide::Float(_) | Wide::Dec(_) => Err(cast_error()),
        },
    }
}
