//! Unary operator implementations for the evaluator.
//!
//! Direct enum-based dispatch, same shape as the binary engine. The
//! `Quote` and `TypeAs` operators need access to the node itself and
//! are handled by the tree walker before this module is consulted.

use arbor_ir::errors::{
    arithmetic_overflow, invalid_cast, null_reference, type_mismatch, unsupported_operation,
    EvalResult,
};
use arbor_ir::{ScalarKind, Ty, UnaryOp, Value};

use crate::conversion::{convert_checked, convert_unchecked};
use crate::operators::coerce;

/// Evaluate a unary operation against the node's declared result type.
///
/// An optional result type lifts the operator: an absent operand
/// yields an absent result without consulting the built-in rule.
pub fn evaluate_unary(op: UnaryOp, operand: &Value, result_ty: &Ty) -> EvalResult {
    match op {
        UnaryOp::ArrayLength => eval_array_length(operand),
        UnaryOp::Convert => Ok(eval_convert(operand, result_ty)),
        UnaryOp::ConvertChecked => eval_convert_checked(operand, result_ty),
        UnaryOp::Negate | UnaryOp::NegateChecked | UnaryOp::Not | UnaryOp::UnaryPlus => {
            let Some((kind, lifted)) = result_ty.as_scalar() else {
                return Err(unsupported_operation(format!(
                    "{op} with non-scalar result type {result_ty}"
                )));
            };
            if lifted && operand.is_nothing() {
                return Ok(Value::Nothing);
            }
            match op {
                UnaryOp::UnaryPlus => Ok(operand.clone()),
                UnaryOp::Not => eval_not(operand),
                _ => {
                    let ScalarKind::Numeric(k) = kind else {
                        return Err(unsupported_operation(format!("{op} on {}", kind.name())));
                    };
                    eval_negate(&coerce(operand, k)?, op == UnaryOp::NegateChecked)
                }
            }
        }
        UnaryOp::Quote | UnaryOp::TypeAs => Err(unsupported_operation(format!(
            "{op} must be handled by the tree walker"
        ))),
    }
}

macro_rules! negate_int {
    ($v:expr, $trapping:expr, $variant:ident) => {
        if $trapping {
            $v.checked_neg()
                .map(Value::$variant)
                .ok_or_else(|| arithmetic_overflow("negation"))
        } else {
            Ok(Value::$variant($v.wrapping_neg()))
        }
    };
}

/// Arithmetic negation, defined per kind identically to the binary
/// subtract-from-zero case.
fn eval_negate(operand: &Value, trapping: bool) -> EvalResult {
    match operand {
        Value::I8(v) => negate_int!(v, trapping, I8),
        Value::U8(v) => negate_int!(v, trapping, U8),
        Value::I16(v) => negate_int!(v, trapping, I16),
        Value::U16(v) => negate_int!(v, trapping, U16),
        Value::I32(v) => negate_int!(v, trapping, I32),
        Value::U32(v) => negate_int!(v, trapping, U32),
        Value::I64(v) => negate_int!(v, trapping, I64),
        Value::U64(v) => negate_int!(v, trapping, U64),
        Value::F32(v) => Ok(Value::F32(-v)),
        Value::F64(v) => Ok(Value::F64(-v)),
        Value::Decimal(v) => Ok(Value::Decimal(-v)),
        other => Err(type_mismatch("numeric", other.type_name())),
    }
}

/// Boolean complement, or bitwise complement on integer kinds.
fn eval_not(operand: &Value) -> EvalResult {
    match operand {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::I8(v) => Ok(Value::I8(!v)),
        Value::U8(v) => Ok(Value::U8(!v)),
        Value::I16(v) => Ok(Value::I16(!v)),
        Value::U16(v) => Ok(Value::U16(!v)),
        Value::I32(v) => Ok(Value::I32(!v)),
        Value::U32(v) => Ok(Value::U32(!v)),
        Value::I64(v) => Ok(Value::I64(!v)),
        Value::U64(v) => Ok(Value::U64(!v)),
        other => Err(unsupported_operation(format!(
            "complement on {}",
            other.type_name()
        ))),
    }
}

/// Array length as a 32-bit signed integer.
fn eval_array_length(operand: &Value) -> EvalResult {
    match operand {
        Value::Array(arr) => i32::try_from(arr.len())
            .map(Value::I32)
            .map_err(|_| arithmetic_overflow("array length")),
        Value::Nothing => Err(null_reference("length")),
        other => Err(type_mismatch("array", other.type_name())),
    }
}

/// Unchecked conversion to the declared result type.
///
/// Scalar targets go through the conversion table; reference-typed
/// targets are identity (the tree is assumed well-typed, and unchecked
/// conversion never raises).
fn eval_convert(operand: &Value, result_ty: &Ty) -> Value {
    match result_ty.as_scalar() {
        Some((kind, lifted)) => {
            if lifted && operand.is_nothing() {
                Value::Nothing
            } else {
                convert_unchecked(operand, kind)
            }
        }
        None => operand.clone(),
    }
}

/// Checked conversion to the declared result type.
///
/// A value that already satisfies the target type passes through; a
/// recognized scalar pair converts with range checking; anything else
/// is an invalid cast.
fn eval_convert_checked(operand: &Value, result_ty: &Ty) -> EvalResult {
    match result_ty.as_scalar() {
        Some((kind, lifted)) => {
            if lifted && operand.is_nothing() {
                return Ok(Value::Nothing);
            }
            convert_checked(operand, kind)
        }
        None => {
            if operand.is_nothing() || operand.is_instance_of(result_ty) {
                Ok(operand.clone())
            } else {
                Err(invalid_cast(
                    operand.type_name(),
                    result_ty.to_string(),
                ))
            }
        }
    }
}
