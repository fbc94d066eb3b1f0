//! Parameter scope validation.
//!
//! Walks a tree once, before any evaluation, and confirms that every
//! parameter-reference node resolves to a parameter declared by the
//! innermost enclosing lambda — by reference identity, not just by
//! name. A name-equal but identity-distinct match is the
//! shadowing mistake (an inner lambda referencing a same-named
//! parameter of a different lambda) and is reported distinctly.
//!
//! A pass that completes without error guarantees every parameter
//! reference in the tree is resolvable by the evaluator.

use std::sync::Arc;

use arbor_ir::{ElementInit, Expr, ExprKind, ExprRef, LambdaExpr, MemberBinding, ScopeError};

/// Validate every parameter reference in the lambda's body.
///
/// The first mismatch aborts the traversal. The result is reusable:
/// a validated tree stays valid because trees are immutable.
#[tracing::instrument(level = "trace", skip_all, fields(params = lambda.params.len()))]
pub fn validate(lambda: &LambdaExpr) -> Result<(), ScopeError> {
    check_expr(&lambda.body, lambda)
}

fn check_expr(expr: &Expr, scope: &LambdaExpr) -> Result<(), ScopeError> {
    match &expr.kind {
        ExprKind::Constant(_) => Ok(()),
        ExprKind::Parameter(param) => {
            if scope.params.iter().any(|p| Arc::ptr_eq(p, param)) {
                Ok(())
            } else {
                Err(ScopeError {
                    parameter: param.name.to_string(),
                    shadowed: scope.params.iter().any(|p| p.name == param.name),
                })
            }
        }
        ExprKind::Binary { left, right, .. } => {
            check_expr(left, scope)?;
            check_expr(right, scope)
        }
        ExprKind::Unary { operand, .. } => check_expr(operand, scope),
        ExprKind::Conditional {
            test,
            if_true,
            if_false,
        } => {
            check_expr(test, scope)?;
            check_expr(if_true, scope)?;
            check_expr(if_false, scope)
        }
        ExprKind::MemberAccess { target, .. } => check_expr(target, scope),
        ExprKind::MemberAssign { target, value, .. } => {
            check_expr(target, scope)?;
            check_expr(value, scope)
        }
        ExprKind::IndexAssign {
            array,
            index,
            value,
        } => {
            check_expr(array, scope)?;
            check_expr(index, scope)?;
            check_expr(value, scope)
        }
        ExprKind::Call { target, args, .. } => {
            if let Some(target) = target {
                check_expr(target, scope)?;
            }
            check_all(args, scope)
        }
        ExprKind::New { args, .. } => check_all(args, scope),
        ExprKind::NewArrayBounds { bounds } => check_all(bounds, scope),
        ExprKind::NewArrayInit { elements } => check_all(elements, scope),
        ExprKind::TypeIs { operand, .. } => check_expr(operand, scope),
        ExprKind::Invoke { callee, args } => {
            check_expr(callee, scope)?;
            check_all(args, scope)
        }
        // A nested lambda switches the scope entirely: its body may
        // only reference its own parameters.
        ExprKind::Lambda(inner) => validate(inner),
        ExprKind::MemberInit { new_expr, bindings } => {
            check_expr(new_expr, scope)?;
            check_bindings(bindings, scope)
        }
        ExprKind::ListInit { new_expr, inits } => {
            check_expr(new_expr, scope)?;
            check_inits(inits, scope)
        }
    }
}

fn check_all(exprs: &[ExprRef], scope: &LambdaExpr) -> Result<(), ScopeError> {
    exprs.iter().try_for_each(|e| check_expr(e, scope))
}

fn check_bindings(bindings: &[MemberBinding], scope: &LambdaExpr) -> Result<(), ScopeError> {
    for binding in bindings {
        match binding {
            MemberBinding::Assignment { value, .. } => check_expr(value, scope)?,
            MemberBinding::MemberMember { bindings, .. } => check_bindings(bindings, scope)?,
            MemberBinding::MemberList { inits, .. } => check_inits(inits, scope)?,
        }
    }
    Ok(())
}

fn check_inits(inits: &[ElementInit], scope: &LambdaExpr) -> Result<(), ScopeError> {
    inits.iter().try_for_each(|init| check_all(&init.args, scope))
}
