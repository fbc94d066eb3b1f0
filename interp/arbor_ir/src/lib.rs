//! Arbor IR - Expression-tree data model.
//!
//! This crate contains the data structures shared by the Arbor
//! interpreter:
//! - `Ty` and the primitive-kind lattice (`PrimitiveKind`, `ScalarKind`)
//! - Operator tags (`BinaryOp`, `UnaryOp`)
//! - Expression nodes (`Expr`, `ExprKind`, `LambdaExpr`)
//! - Runtime values (`Value` and its heap composites)
//! - Error types with factory constructors
//!
//! # Design Philosophy
//!
//! - **Closed sums**: node kinds, operator tags, and primitive kinds are
//!   closed enums. Evaluation is an exhaustive match over them, so adding
//!   or auditing a kind is a compile-time exercise.
//! - **Immutable trees**: nodes are `Arc`-linked and never mutated after
//!   construction. A tree can be read by many in-flight evaluations
//!   without synchronization.
//! - **Pre-resolved handles**: user-overloaded operators, constructors,
//!   and methods arrive as closures attached to nodes. No member lookup
//!   happens at evaluation time.

pub mod ast;
pub mod errors;
pub mod value;

pub use ast::{
    BinaryOp, ElementInit, Expr, ExprKind, ExprRef, FunctionTy, LambdaExpr, MemberBinding,
    ParamRef, Parameter, PrimitiveKind, ScalarKind, Ty, UnaryOp,
};
pub use errors::{
    ArityError, CompileError, EvalError, EvalErrorKind, EvalResult, ScopeError,
};
pub use value::{ArrayValue, FunctionValue, Heap, MethodFn, NativeFn, ObjectValue, Value};

pub use rust_decimal::Decimal;
