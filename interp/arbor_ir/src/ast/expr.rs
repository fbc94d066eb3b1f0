//! Expression nodes and lambda handles.
//!
//! Nodes are `Arc`-linked and immutable after construction; the same
//! tree may be read concurrently by any number of in-flight
//! evaluations. Operator, constructor, and method handles arrive
//! pre-resolved as closures — this crate performs no member lookup.

use std::sync::Arc;

use crate::ast::{BinaryOp, Ty, UnaryOp};
use crate::value::{MethodFn, NativeFn, Value};

/// A named, typed lambda parameter.
///
/// Parameter references are resolved by `Arc` identity, not by name:
/// two parameters may share a name across nested lambdas, and the scope
/// validator distinguishes them by reference.
#[derive(Debug)]
pub struct Parameter {
    pub name: Arc<str>,
    pub ty: Ty,
}

/// Shared handle to a parameter; identity is scope identity.
pub type ParamRef = Arc<Parameter>;

impl Parameter {
    /// Create a new parameter handle.
    pub fn new(name: &str, ty: Ty) -> ParamRef {
        Arc::new(Parameter {
            name: Arc::from(name),
            ty,
        })
    }
}

/// A lambda expression: ordered named parameters, a body node, and a
/// declared result type (`Ty::Void` = no result).
#[derive(Debug)]
pub struct LambdaExpr {
    pub params: Vec<ParamRef>,
    pub body: ExprRef,
    pub result_ty: Ty,
}

impl LambdaExpr {
    /// Create a new lambda handle.
    pub fn new(params: Vec<ParamRef>, body: ExprRef, result_ty: Ty) -> Arc<LambdaExpr> {
        Arc::new(LambdaExpr {
            params,
            body,
            result_ty,
        })
    }

    /// The delegate type this lambda satisfies.
    pub fn function_ty(&self) -> Ty {
        Ty::function(
            self.params.iter().map(|p| p.ty.clone()).collect(),
            self.result_ty.clone(),
        )
    }
}

/// Shared handle to an expression node.
pub type ExprRef = Arc<Expr>;

/// An expression node: a declared static type and a kind-specific
/// payload.
#[derive(Debug)]
pub struct Expr {
    pub ty: Ty,
    pub kind: ExprKind,
}

/// One binding inside an object-construction initializer list.
///
/// Bindings are "visit as a side effect" nodes: they read or write
/// members of the object under construction and leave the object itself
/// as the result of the enclosing initializer node.
#[derive(Debug)]
pub enum MemberBinding {
    /// `member = value`
    Assignment { member: Arc<str>, value: ExprRef },
    /// `member = { nested bindings }` — recurse into the member.
    MemberMember {
        member: Arc<str>,
        bindings: Vec<MemberBinding>,
    },
    /// `member = { element inits }` — add elements to the member.
    MemberList {
        member: Arc<str>,
        inits: Vec<ElementInit>,
    },
}

/// One element initializer: a pre-resolved add method and its
/// arguments, invoked against the collection being initialized.
#[derive(Debug)]
pub struct ElementInit {
    pub add: MethodFn,
    pub args: Vec<ExprRef>,
}

/// Node kind and children.
#[derive(Debug)]
pub enum ExprKind {
    /// Embedded literal value, returned unchanged.
    Constant(Value),
    /// Reference to a parameter of the enclosing lambda.
    Parameter(ParamRef),
    /// Binary operator. `method` is the optional pre-resolved
    /// user-operator handle; when present it replaces the built-in rule.
    Binary {
        op: BinaryOp,
        left: ExprRef,
        right: ExprRef,
        method: Option<NativeFn>,
    },
    /// Unary operator, with the same optional user-operator handle.
    Unary {
        op: UnaryOp,
        operand: ExprRef,
        method: Option<NativeFn>,
    },
    /// Ternary conditional; exactly one branch is evaluated.
    Conditional {
        test: ExprRef,
        if_true: ExprRef,
        if_false: ExprRef,
    },
    /// Read a named field off the receiver.
    MemberAccess { target: ExprRef, member: Arc<str> },
    /// Write a named field on the receiver; evaluates to the receiver.
    MemberAssign {
        target: ExprRef,
        member: Arc<str>,
        value: ExprRef,
    },
    /// Write an array element; evaluates to the array.
    IndexAssign {
        array: ExprRef,
        index: ExprRef,
        value: ExprRef,
    },
    /// Invoke a pre-resolved method handle, receiver first (if any),
    /// then arguments left to right.
    Call {
        target: Option<ExprRef>,
        method: MethodFn,
        args: Vec<ExprRef>,
    },
    /// Construct an object: default instance when no constructor handle
    /// is present, otherwise the handle invoked with evaluated
    /// arguments.
    New {
        ctor: Option<NativeFn>,
        args: Vec<ExprRef>,
    },
    /// Allocate an array from dimension expressions; the node type is
    /// the array type.
    NewArrayBounds { bounds: Vec<ExprRef> },
    /// Allocate an array from element expressions, left to right.
    NewArrayInit { elements: Vec<ExprRef> },
    /// Whether the operand value is an instance of the target type.
    TypeIs { operand: ExprRef, target: Ty },
    /// Invoke a first-class function value.
    Invoke { callee: ExprRef, args: Vec<ExprRef> },
    /// A nested lambda, producing a callable value rather than being
    /// evaluated immediately.
    Lambda(Arc<LambdaExpr>),
    /// Object construction followed by initializer bindings.
    MemberInit {
        new_expr: ExprRef,
        bindings: Vec<MemberBinding>,
    },
    /// Object construction followed by element initializers.
    ListInit {
        new_expr: ExprRef,
        inits: Vec<ElementInit>,
    },
}

impl ExprKind {
    /// Node-kind name, used in unsupported-operation errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Parameter(_) => "parameter",
            Self::Binary { .. } => "binary",
            Self::Unary { .. } => "unary",
            Self::Conditional { .. } => "conditional",
            Self::MemberAccess { .. } => "member access",
            Self::MemberAssign { .. } => "member assignment",
            Self::IndexAssign { .. } => "index assignment",
            Self::Call { .. } => "call",
            Self::New { .. } => "new",
            Self::NewArrayBounds { .. } => "new array (bounds)",
            Self::NewArrayInit { .. } => "new array (init)",
            Self::TypeIs { .. } => "type test",
            Self::Invoke { .. } => "invoke",
            Self::Lambda(_) => "lambda",
            Self::MemberInit { .. } => "member init",
            Self::ListInit { .. } => "list init",
        }
    }
}

impl Expr {
    fn node(ty: Ty, kind: ExprKind) -> ExprRef {
        Arc::new(Expr { ty, kind })
    }

    /// A constant node.
    pub fn constant(ty: Ty, value: Value) -> ExprRef {
        Self::node(ty, ExprKind::Constant(value))
    }

    /// A parameter-reference node; the node type is the parameter's.
    pub fn parameter(param: &ParamRef) -> ExprRef {
        Self::node(param.ty.clone(), ExprKind::Parameter(Arc::clone(param)))
    }

    /// A binary-operator node with built-in semantics.
    pub fn binary(ty: Ty, op: BinaryOp, left: ExprRef, right: ExprRef) -> ExprRef {
        Self::node(
            ty,
            ExprKind::Binary {
                op,
                left,
                right,
                method: None,
            },
        )
    }

    /// A binary-operator node carrying a user-operator handle.
    pub fn binary_method(
        ty: Ty,
        op: BinaryOp,
        left: ExprRef,
        right: ExprRef,
        method: NativeFn,
    ) -> ExprRef {
        Self::node(
            ty,
            ExprKind::Binary {
                op,
                left,
                right,
                method: Some(method),
            },
        )
    }

    /// A unary-operator node with built-in semantics.
    pub fn unary(ty: Ty, op: UnaryOp, operand: ExprRef) -> ExprRef {
        Self::node(
            ty,
            ExprKind::Unary {
                op,
                operand,
                method: None,
            },
        )
    }

    /// A unary-operator node carrying a user-operator handle.
    pub fn unary_method(ty: Ty, op: UnaryOp, operand: ExprRef, method: NativeFn) -> ExprRef {
        Self::node(
            ty,
            ExprKind::Unary {
                op,
                operand,
                method: Some(method),
            },
        )
    }

    /// A conditional node.
    pub fn conditional(ty: Ty, test: ExprRef, if_true: ExprRef, if_false: ExprRef) -> ExprRef {
        Self::node(
            ty,
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            },
        )
    }

    /// A member-access node.
    pub fn member_access(ty: Ty, target: ExprRef, member: &str) -> ExprRef {
        Self::node(
            ty,
            ExprKind::MemberAccess {
                target,
                member: Arc::from(member),
            },
        )
    }

    /// A member-assignment node.
    pub fn member_assign(ty: Ty, target: ExprRef, member: &str, value: ExprRef) -> ExprRef {
        Self::node(
            ty,
            ExprKind::MemberAssign {
                target,
                member: Arc::from(member),
                value,
            },
        )
    }

    /// An element-assignment node.
    pub fn index_assign(ty: Ty, array: ExprRef, index: ExprRef, value: ExprRef) -> ExprRef {
        Self::node(ty, ExprKind::IndexAssign { array, index, value })
    }

    /// A method-call node.
    pub fn call(ty: Ty, target: Option<ExprRef>, method: MethodFn, args: Vec<ExprRef>) -> ExprRef {
        Self::node(ty, ExprKind::Call { target, method, args })
    }

    /// An object-construction node.
    pub fn new_object(ty: Ty, ctor: Option<NativeFn>, args: Vec<ExprRef>) -> ExprRef {
        Self::node(ty, ExprKind::New { ctor, args })
    }

    /// An array-allocation node sized by dimension expressions.
    pub fn new_array_bounds(ty: Ty, bounds: Vec<ExprRef>) -> ExprRef {
        Self::node(ty, ExprKind::NewArrayBounds { bounds })
    }

    /// An array-allocation node filled from element expressions.
    pub fn new_array_init(ty: Ty, elements: Vec<ExprRef>) -> ExprRef {
        Self::node(ty, ExprKind::NewArrayInit { elements })
    }

    /// A type-test node; the node type is boolean.
    pub fn type_is(operand: ExprRef, target: Ty) -> ExprRef {
        Self::node(Ty::BOOL, ExprKind::TypeIs { operand, target })
    }

    /// A delegate-invocation node.
    pub fn invoke(ty: Ty, callee: ExprRef, args: Vec<ExprRef>) -> ExprRef {
        Self::node(ty, ExprKind::Invoke { callee, args })
    }

    /// A nested-lambda node; the node type is the lambda's delegate
    /// type.
    pub fn lambda(lambda: Arc<LambdaExpr>) -> ExprRef {
        let ty = lambda.function_ty();
        Self::node(ty, ExprKind::Lambda(lambda))
    }

    /// An object construction with initializer bindings.
    pub fn member_init(ty: Ty, new_expr: ExprRef, bindings: Vec<MemberBinding>) -> ExprRef {
        Self::node(ty, ExprKind::MemberInit { new_expr, bindings })
    }

    /// An object construction with element initializers.
    pub fn list_init(ty: Ty, new_expr: ExprRef, inits: Vec<ElementInit>) -> ExprRef {
        Self::node(ty, ExprKind::ListInit { new_expr, inits })
    }
}
