//! Expression-tree node types.

mod expr;
mod ops;
mod ty;

pub use expr::{
    ElementInit, Expr, ExprKind, ExprRef, LambdaExpr, MemberBinding, ParamRef, Parameter,
};
pub use ops::{BinaryOp, UnaryOp};
pub use ty::{FunctionTy, PrimitiveKind, ScalarKind, Ty};
