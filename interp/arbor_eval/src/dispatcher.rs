//! Arity dispatch: wrapping a lambda behind an invocable adapter.
//!
//! Construct-once, invoke-many: a [`Callable`] holds a shared handle
//! to the (immutable) tree and nothing else, so one callable can serve
//! any number of concurrent invocations. Each invocation binds its own
//! argument slice and runs the tree walker to completion on the
//! calling thread.

use std::sync::Arc;

use arbor_ir::errors::{wrong_arg_count, ArityError, CompileError, EvalResult};
use arbor_ir::{LambdaExpr, Value};

use crate::interpreter::Interpreter;
use crate::validator::validate;

/// The closed set of supported adapter shapes, keyed by parameter
/// count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Nullary,
    Unary,
    Binary,
    Ternary,
    Quaternary,
}

impl Arity {
    /// Select the adapter shape for a parameter count, if supported.
    pub fn of(count: usize) -> Option<Arity> {
        match count {
            0 => Some(Arity::Nullary),
            1 => Some(Arity::Unary),
            2 => Some(Arity::Binary),
            3 => Some(Arity::Ternary),
            4 => Some(Arity::Quaternary),
            _ => None,
        }
    }

    /// The parameter count this shape accepts.
    pub fn count(self) -> usize {
        match self {
            Arity::Nullary => 0,
            Arity::Unary => 1,
            Arity::Binary => 2,
            Arity::Ternary => 3,
            Arity::Quaternary => 4,
        }
    }
}

/// An invocable adapter produced once per lambda.
///
/// Cloning is cheap (one `Arc` bump) and clones share the tree.
#[derive(Clone, Debug)]
pub struct Callable {
    lambda: Arc<LambdaExpr>,
    arity: Arity,
    discards_result: bool,
}

impl Callable {
    /// The number of positional arguments an invocation must supply.
    pub fn arity(&self) -> usize {
        self.arity.count()
    }

    /// Whether this adapter represents a side-effecting, no-result
    /// shape.
    pub fn discards_result(&self) -> bool {
        self.discards_result
    }

    /// Invoke the lambda with a positional argument list.
    ///
    /// Runs the entire recursive descent to completion (or to a raised
    /// error) on the calling thread. A no-result shape evaluates the
    /// body for its side effects and returns the absent value.
    #[tracing::instrument(level = "trace", skip_all, fields(arity = self.arity()))]
    pub fn invoke(&self, args: &[Value]) -> EvalResult {
        if args.len() != self.arity.count() {
            return Err(wrong_arg_count(self.arity.count(), args.len()));
        }
        let result = Interpreter::run(&self.lambda, args)?;
        if self.discards_result {
            Ok(Value::Nothing)
        } else {
            Ok(result)
        }
    }

    /// Re-wrap this adapter as a first-class function value, suitable
    /// for feeding back into invocation nodes.
    pub fn as_function_value(&self) -> Value {
        let callable = self.clone();
        Value::function(self.arity(), move |args: &[Value]| callable.invoke(args))
    }
}

/// Select the adapter shape matching the lambda's parameter count and
/// declared result type.
///
/// A parameter count above the supported range is a configuration
/// error, rejected here rather than at invocation time.
pub fn make_callable(lambda: Arc<LambdaExpr>) -> Result<Callable, ArityError> {
    let count = lambda.params.len();
    let arity = Arity::of(count).ok_or(ArityError { count })?;
    let discards_result = lambda.result_ty.is_void();
    Ok(Callable {
        lambda,
        arity,
        discards_result,
    })
}

/// Validate-then-dispatch convenience: scope-check the tree, then
/// produce its callable.
pub fn compile(lambda: &Arc<LambdaExpr>) -> Result<Callable, CompileError> {
    validate(lambda)?;
    make_callable(Arc::clone(lambda)).map_err(CompileError::from)
}
