//! The tree-walking evaluator.
//!
//! Recursive descent with one handler per node kind. Each visit
//! returns its result value directly — there is no shared mutable
//! register, which is what makes a produced callable safe to reuse
//! across concurrent invocations: the only state an invocation carries
//! is its read-only argument slice.
//!
//! A node carrying a pre-resolved user operator handle invokes that
//! handle instead of any built-in rule. Unknown node-kind/operator
//! combinations raise `UnsupportedOperation` as a hard stop; there is
//! no partial evaluation.

use std::sync::Arc;

use arbor_ir::errors::{
    index_out_of_bounds, invalid_array_length, no_such_field, not_callable, null_reference,
    type_mismatch, unsupported_operation, wrong_arg_count, EvalError, EvalResult,
};
use arbor_ir::{
    BinaryOp, ElementInit, Expr, ExprKind, ExprRef, LambdaExpr, MemberBinding, NativeFn, ParamRef,
    PrimitiveKind, ScalarKind, Ty, UnaryOp, Value,
};

use crate::conversion::convert_unchecked;
use crate::operators::{evaluate_binary, three_valued};
use crate::unary_operators::evaluate_unary;

/// One in-flight invocation: the enclosing lambda and its bound
/// argument vector, both read-only for the duration of the call.
pub struct Interpreter<'a> {
    lambda: &'a LambdaExpr,
    args: &'a [Value],
}

impl<'a> Interpreter<'a> {
    /// Evaluate a lambda body against a bound argument vector.
    ///
    /// The caller is responsible for matching `args` to the lambda's
    /// parameter count; the dispatcher's `Callable` enforces this.
    #[tracing::instrument(level = "trace", skip_all, fields(params = lambda.params.len()))]
    pub fn run(lambda: &'a LambdaExpr, args: &'a [Value]) -> EvalResult {
        Interpreter { lambda, args }.eval(&lambda.body)
    }

    fn eval(&self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Constant(value) => Ok(value.clone()),
            ExprKind::Parameter(param) => Ok(self.lookup_parameter(param)),
            ExprKind::Binary {
                op,
                left,
                right,
                method,
            } => self.eval_binary(expr, *op, left, right, method.as_ref()),
            ExprKind::Unary {
                op,
                operand,
                method,
            } => self.eval_unary(expr, *op, operand, method.as_ref()),
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => self.eval_conditional(test, if_true, if_false),
            ExprKind::MemberAccess { target, member } => {
                let receiver = self.eval(target)?;
                read_member(&receiver, member)
            }
            ExprKind::MemberAssign {
                target,
                member,
                value,
            } => {
                let receiver = self.eval(target)?;
                let value = self.eval(value)?;
                write_member(&receiver, member, value)?;
                Ok(receiver)
            }
            ExprKind::IndexAssign {
                array,
                index,
                value,
            } => self.eval_index_assign(array, index, value),
            ExprKind::Call {
                target,
                method,
                args,
            } => {
                let receiver = target.as_ref().map(|t| self.eval(t)).transpose()?;
                let args = self.eval_all(args)?;
                method.invoke(receiver.as_ref(), &args)
            }
            ExprKind::New { ctor, args } => match ctor {
                Some(ctor) => {
                    let args = self.eval_all(args)?;
                    ctor.invoke(&args)
                }
                None => Ok(default_instance(&expr.ty)),
            },
            ExprKind::NewArrayBounds { bounds } => self.eval_new_array_bounds(expr, bounds),
            ExprKind::NewArrayInit { elements } => self.eval_new_array_init(expr, elements),
            ExprKind::TypeIs { operand, target } => {
                let value = self.eval(operand)?;
                Ok(Value::Bool(value.is_instance_of(target)))
            }
            ExprKind::Invoke { callee, args } => {
                let callee = self.eval(callee)?;
                let args = self.eval_all(args)?;
                match callee {
                    Value::Function(f) => f.invoke(&args),
                    other => Err(not_callable(other.type_name())),
                }
            }
            ExprKind::Lambda(lambda) => Ok(make_function_value(lambda)),
            ExprKind::MemberInit { new_expr, bindings } => {
                let target = self.eval(new_expr)?;
                self.apply_bindings(&target, bindings)?;
                Ok(target)
            }
            ExprKind::ListInit { new_expr, inits } => {
                let target = self.eval(new_expr)?;
                self.apply_element_inits(&target, inits)?;
                Ok(target)
            }
        }
    }

    /// Positional lookup against the enclosing lambda's parameter
    /// list, by reference identity. A miss indicates a scope-validation
    /// gap and yields the absent value.
    fn lookup_parameter(&self, param: &ParamRef) -> Value {
        self.lambda
            .params
            .iter()
            .position(|p| Arc::ptr_eq(p, param))
            .and_then(|i| self.args.get(i).cloned())
            .unwrap_or(Value::Nothing)
    }

    fn eval_all(&self, exprs: &[ExprRef]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn eval_binary(
        &self,
        expr: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        method: Option<&NativeFn>,
    ) -> EvalResult {
        match op {
            // Short-circuiting control constructs: the untaken side is
            // never evaluated, and the combination of both sides goes
            // through the three-valued rule so `absent AND false` still
            // yields `false`.
            BinaryOp::AndAlso => {
                let l = self.eval(left)?;
                if l.as_bool() == Some(false) {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval(right)?;
                three_valued(BinaryOp::And, &l, &r)
            }
            BinaryOp::OrElse => {
                let l = self.eval(left)?;
                if l.as_bool() == Some(true) {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval(right)?;
                three_valued(BinaryOp::Or, &l, &r)
            }
            BinaryOp::Coalesce => {
                let l = self.eval(left)?;
                if l.is_nothing() {
                    self.eval(right)
                } else {
                    Ok(l)
                }
            }
            // Everything else evaluates both sides, always.
            _ => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                match method {
                    Some(method) => method.invoke(&[l, r]),
                    None => evaluate_binary(op, &l, &r, &expr.ty),
                }
            }
        }
    }

    fn eval_unary(
        &self,
        expr: &Expr,
        op: UnaryOp,
        operand: &ExprRef,
        method: Option<&NativeFn>,
    ) -> EvalResult {
        // Quote returns the operand sub-tree itself, unevaluated.
        if op == UnaryOp::Quote {
            return Ok(Value::quoted(Arc::clone(operand)));
        }
        let value = self.eval(operand)?;
        if let Some(method) = method {
            return method.invoke(&[value]);
        }
        match op {
            UnaryOp::TypeAs => {
                if value.is_instance_of(&expr.ty) {
                    Ok(value)
                } else {
                    Ok(Value::Nothing)
                }
            }
            _ => evaluate_unary(op, &value, &expr.ty),
        }
    }

    fn eval_conditional(&self, test: &Expr, if_true: &Expr, if_false: &Expr) -> EvalResult {
        let test = self.eval(test)?;
        match test.as_bool() {
            Some(true) => self.eval(if_true),
            Some(false) => self.eval(if_false),
            None => Err(type_mismatch("bool", test.type_name())),
        }
    }

    fn eval_index_assign(&self, array: &Expr, index: &Expr, value: &Expr) -> EvalResult {
        let target = self.eval(array)?;
        let index = self.eval(index)?;
        let value = self.eval(value)?;
        let Value::Array(ref arr) = target else {
            return Err(type_mismatch("array", target.type_name()));
        };
        let raw = index_as_i64(&index)?;
        let slot = usize::try_from(raw).ok().filter(|i| *i < arr.len());
        match slot {
            Some(i) => {
                arr.set(i, value);
                Ok(target)
            }
            None => Err(index_out_of_bounds(raw, arr.len())),
        }
    }

    /// Each dimension sub-tree evaluates left to right as a 32-bit
    /// integer; the allocated array is filled with the element type's
    /// default value.
    fn eval_new_array_bounds(&self, expr: &Expr, bounds: &[ExprRef]) -> EvalResult {
        let elem_ty = element_type(&expr.ty)?;
        let mut dims = Vec::with_capacity(bounds.len());
        for bound in bounds {
            let value = self.eval(bound)?;
            let len = index_as_i64(&value)?;
            dims.push(usize::try_from(len).map_err(|_| invalid_array_length(len))?);
        }
        Ok(Value::array_filled(elem_ty, dims))
    }

    fn eval_new_array_init(&self, expr: &Expr, elements: &[ExprRef]) -> EvalResult {
        let elem_ty = element_type(&expr.ty)?;
        let elems = self.eval_all(elements)?;
        Ok(Value::array_from(elem_ty, elems))
    }

    /// Initializer bindings read or write members of the value under
    /// construction; the enclosing node's result stays the outer value.
    fn apply_bindings(
        &self,
        target: &Value,
        bindings: &[MemberBinding],
    ) -> Result<(), EvalError> {
        for binding in bindings {
            match binding {
                MemberBinding::Assignment { member, value } => {
                    let value = self.eval(value)?;
                    write_member(target, member, value)?;
                }
                MemberBinding::MemberMember { member, bindings } => {
                    let inner = read_member(target, member)?;
                    self.apply_bindings(&inner, bindings)?;
                }
                MemberBinding::MemberList { member, inits } => {
                    let inner = read_member(target, member)?;
                    self.apply_element_inits(&inner, inits)?;
                }
            }
        }
        Ok(())
    }

    fn apply_element_inits(
        &self,
        target: &Value,
        inits: &[ElementInit],
    ) -> Result<(), EvalError> {
        for init in inits {
            let args = self.eval_all(&init.args)?;
            init.add.invoke(Some(target), &args)?;
        }
        Ok(())
    }
}

/// Wrap a nested lambda as a first-class function value.
///
/// The body is not evaluated here; each later invocation runs the
/// whole interpreter against the nested lambda with its own argument
/// vector.
fn make_function_value(lambda: &Arc<LambdaExpr>) -> Value {
    let lambda = Arc::clone(lambda);
    let arity = lambda.params.len();
    Value::function(arity, move |args: &[Value]| {
        if args.len() != lambda.params.len() {
            return Err(wrong_arg_count(lambda.params.len(), args.len()));
        }
        Interpreter::run(&lambda, args)
    })
}

/// Default-initialized instance of a declared type, used by
/// construction nodes with no constructor handle.
fn default_instance(ty: &Ty) -> Value {
    match ty {
        Ty::Object(name) => Value::object(name),
        _ => Value::default_of(ty),
    }
}

fn element_type(ty: &Ty) -> Result<Ty, EvalError> {
    match ty {
        Ty::Array(elem) => Ok(elem.as_ref().clone()),
        other => Err(unsupported_operation(format!(
            "array allocation with non-array type {other}"
        ))),
    }
}

fn index_as_i64(value: &Value) -> Result<i64, EvalError> {
    match convert_unchecked(value, ScalarKind::Numeric(PrimitiveKind::I64)) {
        Value::I64(i) => Ok(i),
        _ => Err(type_mismatch("integer", value.type_name())),
    }
}

/// Read a named member off a receiver value.
///
/// Optional primitives expose `value` (unwrap, raising on absence) and
/// `has_value` (presence test, defined even on an absent receiver).
fn read_member(receiver: &Value, member: &str) -> EvalResult {
    match receiver {
        Value::Obj(obj) => obj
            .get(member)
            .ok_or_else(|| no_such_field(member, obj.type_name())),
        Value::Nothing => {
            if member == "has_value" {
                Ok(Value::Bool(false))
            } else {
                Err(null_reference(member))
            }
        }
        scalar if scalar.kind().is_some() => match member {
            "value" => Ok(scalar.clone()),
            "has_value" => Ok(Value::Bool(true)),
            _ => Err(no_such_field(member, scalar.type_name())),
        },
        other => Err(no_such_field(member, other.type_name())),
    }
}

fn write_member(receiver: &Value, member: &str, value: Value) -> Result<(), EvalError> {
    match receiver {
        Value::Obj(obj) => {
            obj.set(member, value);
            Ok(())
        }
        Value::Nothing => Err(null_reference(member)),
        other => Err(no_such_field(member, other.type_name())),
    }
}
