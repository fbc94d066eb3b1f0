//! Arbor Eval - Tree-walking evaluator for the Arbor interpreter.
//!
//! Evaluates a pre-built, strongly-typed expression tree directly:
//! argument list in, one result out. This is a fallback execution
//! strategy for platforms without native compilation of such trees, so
//! exact numeric and semantic fidelity with the compiled path matters
//! more than raw speed.
//!
//! # Architecture
//!
//! - `conversion`: the primitive conversion table — unchecked
//!   (wrapping) and checked (trapping) scalar conversion across the
//!   full numeric lattice
//! - `evaluate_binary` / `evaluate_unary`: direct enum-based operator
//!   dispatch, with nullable lifting and the wrapping/trapping
//!   arithmetic duality
//! - `Interpreter`: the recursive-descent tree walker, one handler per
//!   node kind
//! - `validate`: the parameter scope validator, run once per tree
//!   before any evaluation
//! - `make_callable` / `compile`: the arity dispatcher, producing a
//!   reusable [`Callable`] adapter for 0-4 parameters
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use arbor_ir::{BinaryOp, Expr, LambdaExpr, Parameter, PrimitiveKind, Ty, Value};
//! use arbor_eval::compile;
//!
//! let int = Ty::numeric(PrimitiveKind::I32);
//! let a = Parameter::new("a", int.clone());
//! let b = Parameter::new("b", int.clone());
//! let body = Expr::binary(
//!     int.clone(),
//!     BinaryOp::Add,
//!     Expr::parameter(&a),
//!     Expr::parameter(&b),
//! );
//! let lambda = LambdaExpr::new(vec![a, b], body, int);
//!
//! let callable = compile(&lambda)?;
//! assert_eq!(callable.invoke(&[Value::I32(2), Value::I32(3)])?, Value::I32(5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod conversion;
mod dispatcher;
mod interpreter;
mod operators;
mod unary_operators;
mod validator;

#[cfg(test)]
mod tests;

pub use conversion::{convert_checked, convert_unchecked};
pub use dispatcher::{compile, make_callable, Arity, Callable};
pub use interpreter::Interpreter;
pub use operators::evaluate_binary;
pub use unary_operators::evaluate_unary;
pub use validator::validate;

// Re-export the data model and error types for convenience.
pub use arbor_ir::{
    ArityError, CompileError, EvalError, EvalErrorKind, EvalResult, ScopeError, Value,
};
