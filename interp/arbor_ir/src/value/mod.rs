//! Runtime values.
//!
//! A [`Value`] is the dynamically-typed box threaded through
//! evaluation: one of the eleven primitive numeric kinds, a boolean, a
//! character, an object reference, an array, a function value, a quoted
//! sub-tree, or `Nothing` (absence — used both for void results and
//! for unset optional primitives).
//!
//! # Heap Enforcement
//!
//! Heap-backed variants can only be produced through the factory
//! methods on `Value`; the composites' constructors are `pub(crate)`
//! and the [`Heap`] wrapper's constructor is private to this crate.
//!
//! # Equality
//!
//! Scalar kinds compare structurally (no cross-kind coercion — the
//! numeric engine promotes operands before comparing). Objects, arrays,
//! function values, and quoted trees compare by reference identity.
//! `Nothing` equals only `Nothing`.

mod composite;
mod heap;


use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::ast::{ExprRef, PrimitiveKind, ScalarKind, Ty};
use crate::errors::EvalResult;

pub use composite::{ArrayValue, FunctionValue, MethodFn, NativeFn, ObjectValue};
pub use heap::Heap;

/// A dynamically-typed runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    // Primitive numeric kinds (inline, no heap allocation)
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// High-precision decimal.
    Decimal(Decimal),

    /// Boolean value.
    Bool(bool),
    /// Character value.
    Char(char),

    /// Object reference.
    Obj(ObjectValue),
    /// Array reference.
    Array(ArrayValue),
    /// First-class function value.
    Function(FunctionValue),
    /// A sub-tree passed as data rather than evaluated (`quote`).
    Quoted(ExprRef),

    /// Absence: void results and unset optional primitives.
    Nothing,
}

impl Value {
    /// Create a default-initialized object instance of the named type.
    pub fn object(type_name: &str) -> Value {
        Value::Obj(ObjectValue::new(type_name))
    }

    /// Allocate an array of the given dimensions, every slot filled
    /// with the element type's default value.
    pub fn array_filled(elem_ty: Ty, dims: Vec<usize>) -> Value {
        let total: usize = dims.iter().product();
        let fill = Value::default_of(&elem_ty);
        Value::Array(ArrayValue::new(elem_ty, dims, vec![fill; total]))
    }

    /// Allocate a one-dimensional array from the given elements.
    pub fn array_from(elem_ty: Ty, elems: Vec<Value>) -> Value {
        let dims = vec![elems.len()];
        Value::Array(ArrayValue::new(elem_ty, dims, elems))
    }

    /// Wrap a closure as a function value.
    pub fn function(
        arity: usize,
        f: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Value {
        Value::Function(FunctionValue::new(arity, f))
    }

    /// Wrap a sub-tree as data.
    pub fn quoted(expr: ExprRef) -> Value {
        Value::Quoted(expr)
    }

    /// The scalar kind of this value, if it is a scalar.
    pub fn kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Value::I8(_) => ScalarKind::Numeric(PrimitiveKind::I8),
            Value::U8(_) => ScalarKind::Numeric(PrimitiveKind::U8),
            Value::I16(_) => ScalarKind::Numeric(PrimitiveKind::I16),
            Value::U16(_) => ScalarKind::Numeric(PrimitiveKind::U16),
            Value::I32(_) => ScalarKind::Numeric(PrimitiveKind::I32),
            Value::U32(_) => ScalarKind::Numeric(PrimitiveKind::U32),
            Value::I64(_) => ScalarKind::Numeric(PrimitiveKind::I64),
            Value::U64(_) => ScalarKind::Numeric(PrimitiveKind::U64),
            Value::F32(_) => ScalarKind::Numeric(PrimitiveKind::F32),
            Value::F64(_) => ScalarKind::Numeric(PrimitiveKind::F64),
            Value::Decimal(_) => ScalarKind::Numeric(PrimitiveKind::Decimal),
            Value::Bool(_) => ScalarKind::Bool,
            Value::Char(_) => ScalarKind::Char,
            _ => return None,
        };
        Some(kind)
    }

    /// The numeric kind of this value, if it is numeric.
    pub fn numeric_kind(&self) -> Option<PrimitiveKind> {
        match self.kind() {
            Some(ScalarKind::Numeric(k)) => Some(k),
            _ => None,
        }
    }

    /// Whether this is the absent value.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Extract a boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Value type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::I8(_) => "i8",
            Value::U8(_) => "u8",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Obj(_) => "object",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Quoted(_) => "expr",
            Value::Nothing => "nothing",
        }
    }

    /// The default-initialized value of a declared type: numeric zero,
    /// `false`, `'\0'`, and `Nothing` for nullable and reference types.
    pub fn default_of(ty: &Ty) -> Value {
        match ty {
            Ty::Scalar(ScalarKind::Numeric(k)) => Value::zero_of(*k),
            Ty::Scalar(ScalarKind::Bool) => Value::Bool(false),
            Ty::Scalar(ScalarKind::Char) => Value::Char('\0'),
            Ty::Nullable(_) | Ty::Object(_) | Ty::Array(_) | Ty::Function(_) | Ty::Void => {
                Value::Nothing
            }
        }
    }

    /// Numeric zero of the given kind.
    pub fn zero_of(kind: PrimitiveKind) -> Value {
        match kind {
            PrimitiveKind::I8 => Value::I8(0),
            PrimitiveKind::U8 => Value::U8(0),
            PrimitiveKind::I16 => Value::I16(0),
            PrimitiveKind::U16 => Value::U16(0),
            PrimitiveKind::I32 => Value::I32(0),
            PrimitiveKind::U32 => Value::U32(0),
            PrimitiveKind::I64 => Value::I64(0),
            PrimitiveKind::U64 => Value::U64(0),
            PrimitiveKind::F32 => Value::F32(0.0),
            PrimitiveKind::F64 => Value::F64(0.0),
            PrimitiveKind::Decimal => Value::Decimal(Decimal::ZERO),
        }
    }

    /// Whether this value is an instance of the declared type.
    ///
    /// Absence is never an instance of anything. A present scalar
    /// satisfies both its plain and its optional type.
    pub fn is_instance_of(&self, ty: &Ty) -> bool {
        match (self, ty) {
            (Value::Nothing, _) => false,
            (_, Ty::Scalar(k) | Ty::Nullable(k)) => self.kind() == Some(*k),
            (Value::Obj(o), Ty::Object(name)) => o.type_name() == name.as_ref(),
            (Value::Array(a), Ty::Array(elem)) => a.elem_ty() == elem.as_ref(),
            (Value::Function(f), Ty::Function(ft)) => f.arity() == ft.params.len(),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Obj(a), Value::Obj(b)) => ObjectValue::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => ArrayValue::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => FunctionValue::ptr_eq(a, b),
            (Value::Quoted(a), Value::Quoted(b)) => Arc::ptr_eq(a, b),
            (Value::Nothing, Value::Nothing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Obj(o) => write!(f, "{}", o.type_name()),
            Value::Array(a) => write!(f, "array[{}]", a.len()),
            Value::Function(fun) => write!(f, "{fun:?}"),
            Value::Quoted(_) => write!(f, "<quoted expr>"),
            Value::Nothing => write!(f, "nothing"),
        }
    }
}
