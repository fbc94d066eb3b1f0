//! Binary operator implementations: the numeric evaluation engine.
//!
//! Provides direct enum-based dispatch over the closed operator and
//! kind sets. Both operands are first normalized to one common
//! primitive kind — the node's declared result kind, or the wider of
//! the two operand kinds for comparisons — so no rule ever mixes
//! kinds.
//!
//! Arithmetic runs in two modes: the plain operators wrap on overflow,
//! the `*Checked` operators raise `ArithmeticOverflow`. Integer
//! division by zero always traps regardless of mode; float division by
//! zero follows IEEE semantics.

use std::cmp::Ordering;

use arbor_ir::errors::{
    arithmetic_overflow, division_by_zero, index_out_of_bounds, type_mismatch,
    unsupported_operation, EvalError, EvalResult,
};
use arbor_ir::{BinaryOp, PrimitiveKind, ScalarKind, Ty, Value};
use rust_decimal::Decimal;

use crate::conversion::convert_unchecked;

// Helper functions for repetitive checked arithmetic patterns

/// Checked arithmetic with overflow handling; used where the only
/// error case is overflow.
#[inline]
fn checked_arith<T>(result: Option<T>, wrap: fn(T) -> Value, op_name: &'static str) -> EvalResult {
    result.map(wrap).ok_or_else(|| arithmetic_overflow(op_name))
}

/// Checked division/remainder with zero guard.
///
/// The zero guard applies in both arithmetic modes; the overflow case
/// (`MIN / -1`) also traps in both modes because the quotient has no
/// representation in the operand kind.
#[inline]
fn checked_div<T, F>(is_zero: bool, op: F, wrap: fn(T) -> Value, op_name: &'static str) -> EvalResult
where
    F: FnOnce() -> Option<T>,
{
    if is_zero {
        Err(division_by_zero())
    } else {
        op().map(wrap).ok_or_else(|| arithmetic_overflow(op_name))
    }
}

/// Normalize a value to the given numeric kind via the unchecked
/// conversion table.
pub(crate) fn coerce(value: &Value, kind: PrimitiveKind) -> Result<Value, EvalError> {
    if value.numeric_kind() == Some(kind) {
        return Ok(value.clone());
    }
    match convert_unchecked(value, ScalarKind::Numeric(kind)) {
        Value::Nothing => Err(type_mismatch(kind.name(), value.type_name())),
        v => Ok(v),
    }
}

// Direct Dispatch Function

/// Evaluate a binary operation against the node's declared result
/// type.
///
/// A plain scalar result type dispatches directly; an optional
/// ("nullable") result type takes the lifted path. Short-circuiting
/// control constructs (`AndAlso`, `OrElse`, `Coalesce`) never reach
/// this engine — the tree walker owns them.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value, result_ty: &Ty) -> EvalResult {
    if op == BinaryOp::ArrayIndex {
        return eval_array_index(left, right);
    }
    if op.is_control() {
        return Err(unsupported_operation(format!(
            "{op} is a control construct, not a numeric operation"
        )));
    }
    match result_ty.as_scalar() {
        Some((kind, true)) => eval_lifted(op, left, right, kind),
        Some((kind, false)) => eval_scalar(op, left, right, kind),
        None => Err(unsupported_operation(format!(
            "{op} with non-scalar result type {result_ty}"
        ))),
    }
}

/// Lifted path: operands of optional kind.
///
/// The boolean bitwise operators use three-valued logic and are the
/// one case where a partially-absent operand pair can still produce a
/// present result; every other operator propagates absence.
fn eval_lifted(op: BinaryOp, left: &Value, right: &Value, kind: ScalarKind) -> EvalResult {
    if kind == ScalarKind::Bool
        && matches!(op, BinaryOp::And | BinaryOp::Or | BinaryOp::ExclusiveOr)
    {
        return three_valued(op, left, right);
    }
    if left.is_nothing() || right.is_nothing() {
        return Ok(Value::Nothing);
    }
    eval_scalar(op, left, right, kind)
}

/// Non-lifted path: both operands present, dispatch by result kind.
fn eval_scalar(op: BinaryOp, left: &Value, right: &Value, kind: ScalarKind) -> EvalResult {
    if op.is_comparison() {
        return eval_comparison(op, left, right);
    }
    match kind {
        ScalarKind::Bool => eval_bool_binary(op, left, right),
        ScalarKind::Char => Err(unsupported_operation(format!("{op} on char"))),
        ScalarKind::Numeric(k) => {
            if op.is_shift() {
                return eval_shift(op, left, right, k);
            }
            let a = coerce(left, k)?;
            let b = coerce(right, k)?;
            eval_numeric(op, &a, &b)
        }
    }
}

// Three-Valued Logic

fn as_lifted_bool(value: &Value) -> Result<Option<bool>, EvalError> {
    match value {
        Value::Nothing => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(type_mismatch("bool?", other.type_name())),
    }
}

/// Three-valued AND/OR/XOR over optional booleans.
///
/// `absent AND false = false`, `absent AND true = absent`,
/// `absent OR true = true`, `absent OR false = absent`,
/// `absent XOR anything = absent`.
pub(crate) fn three_valued(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let l = as_lifted_bool(left)?;
    let r = as_lifted_bool(right)?;
    let out = match op {
        BinaryOp::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        BinaryOp::Or => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        BinaryOp::ExclusiveOr => l.zip(r).map(|(a, b)| a ^ b),
        _ => {
            return Err(unsupported_operation(format!(
                "{op} has no three-valued rule"
            )))
        }
    };
    Ok(out.map_or(Value::Nothing, Value::Bool))
}

// Comparisons

/// Map a partial ordering to the comparison operator's boolean result.
///
/// An unordered pair (NaN on either side) compares unequal and fails
/// every ordering test, per IEEE semantics.
fn ordering_result(op: BinaryOp, ord: Option<Ordering>) -> EvalResult {
    let out = match op {
        BinaryOp::Eq => ord == Some(Ordering::Equal),
        BinaryOp::NotEq => ord != Some(Ordering::Equal),
        BinaryOp::Lt => ord == Some(Ordering::Less),
        BinaryOp::LtEq => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ord == Some(Ordering::Greater),
        BinaryOp::GtEq => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        _ => return Err(unsupported_operation(format!("{op} is not a comparison"))),
    };
    Ok(Value::Bool(out))
}

/// Comparison dispatch.
///
/// Numeric operands are promoted to the wider of their two kinds and
/// compared there. For everything else, `Eq` uses `Value` equality
/// (structural for value kinds, reference identity for heap kinds) and
/// `NotEq` is its plain negation.
fn eval_comparison(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if left.is_nothing() || right.is_nothing() {
        // Equality treats absence as a comparable value; ordering
        // against absence is always false.
        return Ok(Value::Bool(match op {
            BinaryOp::Eq => left == right,
            BinaryOp::NotEq => left != right,
            _ => false,
        }));
    }
    if let (Some(lk), Some(rk)) = (left.numeric_kind(), right.numeric_kind()) {
        let k = lk.wider(rk);
        let a = coerce(left, k)?;
        let b = coerce(right, k)?;
        return ordering_result(op, numeric_ordering(&a, &b));
    }
    match (left, right, op) {
        (Value::Char(a), Value::Char(b), _) => ordering_result(op, a.partial_cmp(b)),
        (_, _, BinaryOp::Eq) => Ok(Value::Bool(left == right)),
        (_, _, BinaryOp::NotEq) => Ok(Value::Bool(left != right)),
        _ => Err(unsupported_operation(format!(
            "{op} on {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Ordering of two values of the same numeric kind.
fn numeric_ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::I8(x), Value::I8(y)) => x.partial_cmp(y),
        (Value::U8(x), Value::U8(y)) => x.partial_cmp(y),
        (Value::I16(x), Value::I16(y)) => x.partial_cmp(y),
        (Value::U16(x), Value::U16(y)) => x.partial_cmp(y),
        (Value::I32(x), Value::I32(y)) => x.partial_cmp(y),
        (Value::U32(x), Value::U32(y)) => x.partial_cmp(y),
        (Value::I64(x), Value::I64(y)) => x.partial_cmp(y),
        (Value::U64(x), Value::U64(y)) => x.partial_cmp(y),
        (Value::F32(x), Value::F32(y)) => x.partial_cmp(y),
        (Value::F64(x), Value::F64(y)) => x.partial_cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => x.partial_cmp(y),
        _ => None,
    }
}

// Type-Specific Evaluation Functions

macro_rules! int_binary {
    ($a:expr, $b:expr, $op:expr, $variant:ident) => {{
        let a = $a;
        let b = $b;
        match $op {
            BinaryOp::Add => Ok(Value::$variant(a.wrapping_add(b))),
            BinaryOp::AddChecked => checked_arith(a.checked_add(b), Value::$variant, "addition"),
            BinaryOp::Sub => Ok(Value::$variant(a.wrapping_sub(b))),
            BinaryOp::SubChecked => checked_arith(a.checked_sub(b), Value::$variant, "subtraction"),
            BinaryOp::Mul => Ok(Value::$variant(a.wrapping_mul(b))),
            BinaryOp::MulChecked => {
                checked_arith(a.checked_mul(b), Value::$variant, "multiplication")
            }
            BinaryOp::Div => checked_div(b == 0, || a.checked_div(b), Value::$variant, "division"),
            BinaryOp::Modulo => {
                checked_div(b == 0, || a.checked_rem(b), Value::$variant, "remainder")
            }
            BinaryOp::And => Ok(Value::$variant(a & b)),
            BinaryOp::Or => Ok(Value::$variant(a | b)),
            BinaryOp::ExclusiveOr => Ok(Value::$variant(a ^ b)),
            op => Err(unsupported_operation(format!(
                "{op} on {}",
                stringify!($variant)
            ))),
        }
    }};
}

macro_rules! float_binary {
    ($a:expr, $b:expr, $op:expr, $variant:ident) => {{
        let a = $a;
        let b = $b;
        // Floating arithmetic never traps: the checked variants behave
        // identically and division by zero yields infinity/NaN.
        match $op {
            BinaryOp::Add | BinaryOp::AddChecked => Ok(Value::$variant(a + b)),
            BinaryOp::Sub | BinaryOp::SubChecked => Ok(Value::$variant(a - b)),
            BinaryOp::Mul | BinaryOp::MulChecked => Ok(Value::$variant(a * b)),
            BinaryOp::Div => Ok(Value::$variant(a / b)),
            BinaryOp::Modulo => Ok(Value::$variant(a % b)),
            BinaryOp::Power => Ok(Value::$variant(a.powf(b))),
            op => Err(unsupported_operation(format!(
                "{op} on {}",
                stringify!($variant)
            ))),
        }
    }};
}

/// Binary operations on two operands of the same numeric kind.
fn eval_numeric(op: BinaryOp, a: &Value, b: &Value) -> EvalResult {
    match (a, b) {
        (Value::I8(x), Value::I8(y)) => int_binary!(*x, *y, op, I8),
        (Value::U8(x), Value::U8(y)) => int_binary!(*x, *y, op, U8),
        (Value::I16(x), Value::I16(y)) => int_binary!(*x, *y, op, I16),
        (Value::U16(x), Value::U16(y)) => int_binary!(*x, *y, op, U16),
        (Value::I32(x), Value::I32(y)) => int_binary!(*x, *y, op, I32),
        (Value::U32(x), Value::U32(y)) => int_binary!(*x, *y, op, U32),
        (Value::I64(x), Value::I64(y)) => int_binary!(*x, *y, op, I64),
        (Value::U64(x), Value::U64(y)) => int_binary!(*x, *y, op, U64),
        (Value::F32(x), Value::F32(y)) => float_binary!(*x, *y, op, F32),
        (Value::F64(x), Value::F64(y)) => float_binary!(*x, *y, op, F64),
        (Value::Decimal(x), Value::Decimal(y)) => eval_decimal_binary(*x, *y, op),
        _ => Err(type_mismatch(a.type_name(), b.type_name())),
    }
}

/// Binary operations on decimals.
///
/// The decimal kind has no wrapping representation, so overflow traps
/// in both arithmetic modes.
fn eval_decimal_binary(a: Decimal, b: Decimal, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add | BinaryOp::AddChecked => {
            checked_arith(a.checked_add(b), Value::Decimal, "addition")
        }
        BinaryOp::Sub | BinaryOp::SubChecked => {
            checked_arith(a.checked_sub(b), Value::Decimal, "subtraction")
        }
        BinaryOp::Mul | BinaryOp::MulChecked => {
            checked_arith(a.checked_mul(b), Value::Decimal, "multiplication")
        }
        BinaryOp::Div => checked_div(
            b.is_zero(),
            || a.checked_div(b),
            Value::Decimal,
            "division",
        ),
        BinaryOp::Modulo => checked_div(
            b.is_zero(),
            || a.checked_rem(b),
            Value::Decimal,
            "remainder",
        ),
        op => Err(unsupported_operation(format!("{op} on decimal"))),
    }
}

/// Eager (non-short-circuit) boolean combination.
fn eval_bool_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let (Some(a), Some(b)) = (left.as_bool(), right.as_bool()) else {
        return Err(type_mismatch("bool", if left.as_bool().is_none() {
            left.type_name()
        } else {
            right.type_name()
        }));
    };
    match op {
        BinaryOp::And => Ok(Value::Bool(a & b)),
        BinaryOp::Or => Ok(Value::Bool(a | b)),
        BinaryOp::ExclusiveOr => Ok(Value::Bool(a ^ b)),
        op => Err(unsupported_operation(format!("{op} on bool"))),
    }
}

// Shifts

macro_rules! shift {
    ($a:expr, $count:expr, $is_left:expr, $variant:ident) => {{
        // wrapping_shl/shr mask the count by the operand's bit width,
        // so the shift is always performed in the left operand's kind.
        if $is_left {
            Ok(Value::$variant($a.wrapping_shl($count)))
        } else {
            Ok(Value::$variant($a.wrapping_shr($count)))
        }
    }};
}

/// Shift dispatch: the count is coerced to a 32-bit signed value and
/// the shift happens in the left operand's kind.
fn eval_shift(op: BinaryOp, left: &Value, right: &Value, kind: PrimitiveKind) -> EvalResult {
    let Value::I32(count) = convert_unchecked(right, ScalarKind::Numeric(PrimitiveKind::I32))
    else {
        return Err(type_mismatch("i32", right.type_name()));
    };
    let count = count as u32;
    let is_left = op == BinaryOp::LeftShift;
    match coerce(left, kind)? {
        Value::I8(a) => shift!(a, count, is_left, I8),
        Value::U8(a) => shift!(a, count, is_left, U8),
        Value::I16(a) => shift!(a, count, is_left, I16),
        Value::U16(a) => shift!(a, count, is_left, U16),
        Value::I32(a) => shift!(a, count, is_left, I32),
        Value::U32(a) => shift!(a, count, is_left, U32),
        Value::I64(a) => shift!(a, count, is_left, I64),
        Value::U64(a) => shift!(a, count, is_left, U64),
        other => Err(unsupported_operation(format!(
            "{op} on {}",
            other.type_name()
        ))),
    }
}

// Array Indexing

/// `ArrayIndex`: left is an array, right an integer index.
fn eval_array_index(left: &Value, right: &Value) -> EvalResult {
    let Value::Array(arr) = left else {
        return Err(type_mismatch("array", left.type_name()));
    };
    let Value::I64(index) = convert_unchecked(right, ScalarKind::Numeric(PrimitiveKind::I64))
    else {
        return Err(type_mismatch("integer index", right.type_name()));
    };
    usize::try_from(index)
        .ok()
        .and_then(|i| arr.get(i))
        .ok_or_else(|| index_out_of_bounds(index, arr.len()))
}
