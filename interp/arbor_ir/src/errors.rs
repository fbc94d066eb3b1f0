//! Error types for validation, dispatch, and evaluation.
//!
//! `EvalErrorKind` provides typed error categories; factory functions
//! (e.g. `division_by_zero()`) are the public construction API. They
//! populate both `kind` and `message`, so callers can match on the kind
//! or print the message without re-deriving it.
//!
//! Nothing in this crate retries or downgrades an error: a trapping-mode
//! overflow stays an overflow all the way to the invoker.

use std::fmt;

use crate::value::Value;

/// Result of evaluating an expression node.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category for evaluation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    /// A trapping-mode arithmetic or conversion operation exceeded the
    /// target kind's representable range.
    ArithmeticOverflow { operation: String },
    /// Integer division or remainder by zero. Always traps, independent
    /// of the wrapping/trapping mode.
    DivisionByZero,

    // Tree shape
    /// The tree contains a node-kind/operator/type combination this
    /// interpreter does not implement. An internal-invariant violation:
    /// the tree should have been rejected upstream.
    UnsupportedOperation { detail: String },
    /// A conversion between kinds with no defined rule.
    InvalidCast { from: String, to: String },
    /// Operand value does not match the kind the tree declared.
    TypeMismatch { expected: String, got: String },

    // Access
    /// Member access through an absent value.
    NullReference { member: String },
    /// Array element access outside the allocated bounds.
    IndexOutOfBounds { index: i64, len: usize },
    /// Named field missing from an object.
    NoSuchField { field: String, type_name: String },
    /// Array allocated with a negative dimension.
    InvalidArrayLength { len: i64 },

    // Invocation
    /// Callable invoked with the wrong number of arguments.
    WrongArgCount { expected: usize, got: usize },
    /// Invocation target is not a function value.
    NotCallable { type_name: String },

    /// Catch-all for errors raised by user-supplied handles.
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArithmeticOverflow { operation } => {
                write!(f, "arithmetic overflow in {operation}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::UnsupportedOperation { detail } => {
                write!(f, "unsupported operation: {detail}")
            }
            Self::InvalidCast { from, to } => {
                write!(f, "cannot convert {from} to {to}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::NullReference { member } => {
                write!(f, "member '{member}' accessed through an absent value")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for array of length {len}")
            }
            Self::NoSuchField { field, type_name } => {
                write!(f, "no field '{field}' on {type_name}")
            }
            Self::InvalidArrayLength { len } => {
                write!(f, "invalid array length {len}")
            }
            Self::WrongArgCount { expected, got } => {
                let arg_word = if *expected == 1 { "argument" } else { "arguments" };
                write!(f, "expected {expected} {arg_word}, got {got}")
            }
            Self::NotCallable { type_name } => {
                write!(f, "value of type {type_name} is not callable")
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
///
/// Raised during one invocation and reported to that invocation's
/// caller; it has no effect on the reusable validator/dispatcher state
/// or on other concurrent invocations.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message; equals `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message, using the `Custom` kind.
    ///
    /// Prefer the specific factory functions when a structured kind is
    /// available; this constructor exists for user-supplied handles.
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    /// Whether this error is a trapping-overflow condition.
    pub fn is_overflow(&self) -> bool {
        matches!(self.kind, EvalErrorKind::ArithmeticOverflow { .. })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// Trapping-mode arithmetic exceeded the target kind's range.
pub fn arithmetic_overflow(operation: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArithmeticOverflow {
        operation: operation.into(),
    })
}

/// Integer division or remainder by zero.
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

/// Node-kind/operator/type combination with no implementation.
pub fn unsupported_operation(detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperation {
        detail: detail.into(),
    })
}

/// Conversion between kinds with no defined rule.
pub fn invalid_cast(from: impl Into<String>, to: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidCast {
        from: from.into(),
        to: to.into(),
    })
}

/// Operand value does not match the declared kind.
pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.into(),
        got: got.into(),
    })
}

/// Member access through an absent value.
pub fn null_reference(member: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullReference {
        member: member.into(),
    })
}

/// Array element access outside the allocated bounds.
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

/// Named field missing from an object.
pub fn no_such_field(field: impl Into<String>, type_name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchField {
        field: field.into(),
        type_name: type_name.into(),
    })
}

/// Array allocated with a negative dimension.
pub fn invalid_array_length(len: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArrayLength { len })
}

/// Callable invoked with the wrong number of arguments.
pub fn wrong_arg_count(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongArgCount { expected, got })
}

/// Invocation target is not a function value.
pub fn not_callable(type_name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.into(),
    })
}

/// A parameter reference could not be resolved within its lambda's
/// declared scope.
///
/// Raised only by the validator, always before any evaluation. Surfaced
/// to the tree's producer as a malformed-input condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeError {
    /// Name of the unresolved parameter.
    pub parameter: String,
    /// Whether a parameter with the same name exists in scope but is not
    /// reference-identical (an inner/outer lambda shadowing mistake).
    pub shadowed: bool,
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shadowed {
            write!(
                f,
                "parameter '{}' resolves by name but not by identity; it belongs to a different lambda",
                self.parameter
            )
        } else {
            write!(
                f,
                "parameter '{}' is not declared by the enclosing lambda",
                self.parameter
            )
        }
    }
}

impl std::error::Error for ScopeError {}

/// A lambda's parameter count exceeds the supported adapter range.
///
/// Raised at dispatcher-construction time, not at invocation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArityError {
    /// The unsupported parameter count.
    pub count: usize,
}

impl fmt::Display for ArityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lambda has {} parameters; at most 4 are supported",
            self.count
        )
    }
}

impl std::error::Error for ArityError {}

/// Combined error for the validate-then-dispatch convenience path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// The tree failed scope validation.
    Scope(ScopeError),
    /// The lambda's arity has no adapter.
    Arity(ArityError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scope(e) => write!(f, "{e}"),
            Self::Arity(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<ScopeError> for CompileError {
    fn from(e: ScopeError) -> Self {
        Self::Scope(e)
    }
}

impl From<ArityError> for CompileError {
    fn from(e: ArityError) -> Self {
        Self::Arity(e)
    }
}
