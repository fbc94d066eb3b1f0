//! Test modules relocated from implementation files, plus shared tree
//! builders.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

mod interpreter_tests;

use arbor_ir::{Expr, ExprRef, MethodFn, PrimitiveKind, Ty, Value};

pub(crate) fn i32_ty() -> Ty {
    Ty::numeric(PrimitiveKind::I32)
}

pub(crate) fn const_i32(v: i32) -> ExprRef {
    Expr::constant(i32_ty(), Value::I32(v))
}

pub(crate) fn const_bool(v: bool) -> ExprRef {
    Expr::constant(Ty::BOOL, Value::Bool(v))
}

/// A sub-tree that raises if it is ever evaluated; used to prove that
/// a branch was skipped.
pub(crate) fn poison(ty: Ty) -> ExprRef {
    let method = MethodFn::new(|_, _| Err(arbor_ir::EvalError::new("poison subtree evaluated")));
    Expr::call(ty, None, method, vec![])
}
