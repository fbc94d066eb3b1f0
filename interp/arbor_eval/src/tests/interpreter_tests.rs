//! End-to-end tests driving whole lambdas through validation,
//! dispatch, and the tree walker.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use arbor_ir::{
    BinaryOp, CompileError, ElementInit, EvalErrorKind, Expr, LambdaExpr, MemberBinding, MethodFn,
    NativeFn, Parameter, PrimitiveKind, ScalarKind, Ty, UnaryOp, Value,
};

use crate::dispatcher::{compile, make_callable};
use crate::interpreter::Interpreter;

use super::{const_bool, const_i32, i32_ty, poison};

fn opt_i32_ty() -> Ty {
    Ty::nullable_numeric(PrimitiveKind::I32)
}

#[test]
fn adds_two_integers() {
    let a = Parameter::new("a", i32_ty());
    let b = Parameter::new("b", i32_ty());
    let body = Expr::binary(
        i32_ty(),
        BinaryOp::Add,
        Expr::parameter(&a),
        Expr::parameter(&b),
    );
    let lambda = LambdaExpr::new(vec![a, b], body, i32_ty());

    let callable = compile(&lambda).unwrap();
    assert_eq!(
        callable.invoke(&[Value::I32(2), Value::I32(3)]).unwrap(),
        Value::I32(5)
    );
}

#[test]
fn repeated_invocations_are_independent() {
    let a = Parameter::new("a", i32_ty());
    let body = Expr::binary(i32_ty(), BinaryOp::Mul, Expr::parameter(&a), const_i32(10));
    let callable = compile(&LambdaExpr::new(vec![a], body, i32_ty())).unwrap();

    assert_eq!(callable.invoke(&[Value::I32(3)]).unwrap(), Value::I32(30));
    assert_eq!(callable.invoke(&[Value::I32(7)]).unwrap(), Value::I32(70));
    assert_eq!(callable.invoke(&[Value::I32(3)]).unwrap(), Value::I32(30));
}

#[test]
fn optional_parameter_unwrapped_through_a_conditional() {
    // x.has_value ? x.value : 0
    let x = Parameter::new("x", opt_i32_ty());
    let body = Expr::conditional(
        i32_ty(),
        Expr::member_access(Ty::BOOL, Expr::parameter(&x), "has_value"),
        Expr::member_access(i32_ty(), Expr::parameter(&x), "value"),
        const_i32(0),
    );
    let callable = compile(&LambdaExpr::new(vec![x], body, i32_ty())).unwrap();

    assert_eq!(callable.invoke(&[Value::Nothing]).unwrap(), Value::I32(0));
    assert_eq!(callable.invoke(&[Value::I32(7)]).unwrap(), Value::I32(7));
}

#[test]
fn conditional_never_touches_the_untaken_branch() {
    let taken = Expr::conditional(i32_ty(), const_bool(true), const_i32(1), poison(i32_ty()));
    let callable = compile(&LambdaExpr::new(vec![], taken, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(1));

    let other = Expr::conditional(i32_ty(), const_bool(false), poison(i32_ty()), const_i32(2));
    let callable = compile(&LambdaExpr::new(vec![], other, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(2));
}

#[test]
fn conditional_requires_a_boolean_test() {
    let body = Expr::conditional(i32_ty(), const_i32(1), const_i32(2), const_i32(3));
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    let err = callable.invoke(&[]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn and_also_short_circuits_on_false() {
    let body = Expr::binary(Ty::BOOL, BinaryOp::AndAlso, const_bool(false), poison(Ty::BOOL));
    let callable = compile(&LambdaExpr::new(vec![], body, Ty::BOOL)).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::Bool(false));
}

#[test]
fn or_else_short_circuits_on_true() {
    let body = Expr::binary(Ty::BOOL, BinaryOp::OrElse, const_bool(true), poison(Ty::BOOL));
    let callable = compile(&LambdaExpr::new(vec![], body, Ty::BOOL)).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::Bool(true));
}

#[test]
fn and_also_combines_absence_three_valued() {
    let opt_bool = Ty::Nullable(ScalarKind::Bool);
    let absent = Expr::constant(opt_bool.clone(), Value::Nothing);

    // absent && false is false: the right side decides.
    let body = Expr::binary(
        opt_bool.clone(),
        BinaryOp::AndAlso,
        Arc::clone(&absent),
        const_bool(false),
    );
    let callable = compile(&LambdaExpr::new(vec![], body, opt_bool.clone())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::Bool(false));

    // absent && true stays undetermined.
    let body = Expr::binary(opt_bool.clone(), BinaryOp::AndAlso, absent, const_bool(true));
    let callable = compile(&LambdaExpr::new(vec![], body, opt_bool)).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::Nothing);
}

#[test]
fn coalesce_takes_the_first_present_value() {
    let absent = Expr::constant(opt_i32_ty(), Value::Nothing);
    let body = Expr::binary(i32_ty(), BinaryOp::Coalesce, absent, const_i32(9));
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(9));

    // A present left side never evaluates the fallback.
    let body = Expr::binary(i32_ty(), BinaryOp::Coalesce, const_i32(4), poison(i32_ty()));
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(4));
}

#[test]
fn trapping_overflow_surfaces_to_the_invoker() {
    let i8_ty = Ty::numeric(PrimitiveKind::I8);
    let body = Expr::binary(
        i8_ty.clone(),
        BinaryOp::AddChecked,
        Expr::constant(i8_ty.clone(), Value::I8(127)),
        Expr::constant(i8_ty.clone(), Value::I8(1)),
    );
    let callable = compile(&LambdaExpr::new(vec![], body, i8_ty)).unwrap();
    assert!(callable.invoke(&[]).unwrap_err().is_overflow());
}

#[test]
fn array_literal_then_index() {
    let arr = Expr::new_array_init(
        Ty::array(i32_ty()),
        vec![const_i32(1), const_i32(2), const_i32(3)],
    );
    let body = Expr::binary(i32_ty(), BinaryOp::ArrayIndex, arr, const_i32(1));
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(2));
}

#[test]
fn sized_allocation_fills_with_the_element_default() {
    let arr = Expr::new_array_bounds(Ty::array(i32_ty()), vec![const_i32(3)]);
    let body = Expr::binary(i32_ty(), BinaryOp::ArrayIndex, arr, const_i32(2));
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(0));
}

#[test]
fn negative_dimension_is_an_invalid_length() {
    let body = Expr::new_array_bounds(Ty::array(i32_ty()), vec![const_i32(-1)]);
    let callable = compile(&LambdaExpr::new(vec![], body, Ty::array(i32_ty()))).unwrap();
    let err = callable.invoke(&[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::InvalidArrayLength { len: -1 });
}

#[test]
fn index_assignment_mutates_and_returns_the_array() {
    let arr_ty = Ty::array(i32_ty());
    let a = Parameter::new("a", arr_ty.clone());
    let body = Expr::index_assign(
        arr_ty.clone(),
        Expr::parameter(&a),
        const_i32(0),
        const_i32(42),
    );
    let callable = compile(&LambdaExpr::new(vec![a], body, arr_ty)).unwrap();

    let arr = Value::array_from(i32_ty(), vec![Value::I32(0), Value::I32(0)]);
    let result = callable.invoke(&[arr.clone()]).unwrap();
    assert_eq!(result, arr);
    let Value::Array(ref inner) = arr else {
        panic!("expected array");
    };
    assert_eq!(inner.get(0), Some(Value::I32(42)));
    assert_eq!(inner.get(1), Some(Value::I32(0)));
}

#[test]
fn index_assignment_out_of_bounds() {
    let arr_ty = Ty::array(i32_ty());
    let a = Parameter::new("a", arr_ty.clone());
    let body = Expr::index_assign(
        arr_ty.clone(),
        Expr::parameter(&a),
        const_i32(5),
        const_i32(1),
    );
    let callable = compile(&LambdaExpr::new(vec![a], body, arr_ty)).unwrap();

    let arr = Value::array_from(i32_ty(), vec![Value::I32(0)]);
    let err = callable.invoke(&[arr]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfBounds { index: 5, len: 1 });
}

#[test]
fn member_init_builds_and_returns_the_object() {
    let point_ty = Ty::object("point");
    let body = Expr::member_init(
        point_ty.clone(),
        Expr::new_object(point_ty.clone(), None, vec![]),
        vec![
            MemberBinding::Assignment {
                member: Arc::from("x"),
                value: const_i32(1),
            },
            MemberBinding::Assignment {
                member: Arc::from("y"),
                value: const_i32(2),
            },
        ],
    );
    let callable = compile(&LambdaExpr::new(vec![], body, point_ty)).unwrap();

    let Value::Obj(obj) = callable.invoke(&[]).unwrap() else {
        panic!("expected object");
    };
    assert_eq!(obj.type_name(), "point");
    assert_eq!(obj.get("x"), Some(Value::I32(1)));
    assert_eq!(obj.get("y"), Some(Value::I32(2)));
}

#[test]
fn list_init_runs_each_add_against_the_collection() {
    let bag_ty = Ty::object("bag");
    let add = MethodFn::new(|receiver, args| {
        let Some(Value::Obj(obj)) = receiver else {
            return Err(arbor_ir::errors::type_mismatch("object", "nothing"));
        };
        let count = obj.field_count();
        obj.set(&format!("item{count}"), args[0].clone());
        Ok(Value::Nothing)
    });
    let body = Expr::list_init(
        bag_ty.clone(),
        Expr::new_object(bag_ty.clone(), None, vec![]),
        vec![
            ElementInit {
                add: add.clone(),
                args: vec![const_i32(10)],
            },
            ElementInit {
                add,
                args: vec![const_i32(20)],
            },
        ],
    );
    let callable = compile(&LambdaExpr::new(vec![], body, bag_ty)).unwrap();

    let Value::Obj(obj) = callable.invoke(&[]).unwrap() else {
        panic!("expected object");
    };
    assert_eq!(obj.get("item0"), Some(Value::I32(10)));
    assert_eq!(obj.get("item1"), Some(Value::I32(20)));
}

#[test]
fn member_assignment_evaluates_to_the_receiver() {
    let point_ty = Ty::object("point");
    let p = Parameter::new("p", point_ty.clone());
    let body = Expr::member_assign(point_ty.clone(), Expr::parameter(&p), "x", const_i32(5));
    let callable = compile(&LambdaExpr::new(vec![p], body, point_ty)).unwrap();

    let obj = Value::object("point");
    let result = callable.invoke(&[obj.clone()]).unwrap();
    assert_eq!(result, obj);
    let Value::Obj(ref inner) = obj else {
        panic!("expected object");
    };
    assert_eq!(inner.get("x"), Some(Value::I32(5)));
}

#[test]
fn member_access_through_absence_raises() {
    let point_ty = Ty::object("point");
    let p = Parameter::new("p", point_ty);
    let body = Expr::member_access(i32_ty(), Expr::parameter(&p), "x");
    let callable = compile(&LambdaExpr::new(vec![p], body, i32_ty())).unwrap();

    let err = callable.invoke(&[Value::Nothing]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NullReference { member: "x".into() }
    );
}

#[test]
fn constructor_handle_replaces_the_default_instance() {
    let point_ty = Ty::object("point");
    let ctor = NativeFn::new(|args| {
        let obj = Value::object("point");
        if let Value::Obj(ref o) = obj {
            o.set("x", args[0].clone());
        }
        Ok(obj)
    });
    let body = Expr::new_object(point_ty.clone(), Some(ctor), vec![const_i32(3)]);
    let callable = compile(&LambdaExpr::new(vec![], body, point_ty)).unwrap();

    let Value::Obj(obj) = callable.invoke(&[]).unwrap() else {
        panic!("expected object");
    };
    assert_eq!(obj.get("x"), Some(Value::I32(3)));
}

#[test]
fn call_node_passes_receiver_then_arguments() {
    let method = MethodFn::new(|receiver, args| {
        let Some(Value::Obj(obj)) = receiver else {
            return Err(arbor_ir::errors::type_mismatch("object", "nothing"));
        };
        let Some(Value::I32(base)) = obj.get("n") else {
            return Err(arbor_ir::errors::no_such_field("n", obj.type_name()));
        };
        let Value::I32(delta) = args[0] else {
            return Err(arbor_ir::errors::type_mismatch("i32", args[0].type_name()));
        };
        Ok(Value::I32(base + delta))
    });
    let counter_ty = Ty::object("counter");
    let c = Parameter::new("c", counter_ty);
    let body = Expr::call(
        i32_ty(),
        Some(Expr::parameter(&c)),
        method,
        vec![const_i32(2)],
    );
    let callable = compile(&LambdaExpr::new(vec![c], body, i32_ty())).unwrap();

    let obj = Value::object("counter");
    if let Value::Obj(ref o) = obj {
        o.set("n", Value::I32(40));
    }
    assert_eq!(callable.invoke(&[obj]).unwrap(), Value::I32(42));
}

#[test]
fn user_operator_handle_overrides_the_builtin_rule() {
    let method = NativeFn::new(|_| Ok(Value::I32(100)));
    let body = Expr::binary_method(i32_ty(), BinaryOp::Add, const_i32(2), const_i32(3), method);
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(100));
}

#[test]
fn nested_lambda_invoked_as_a_value() {
    // () => ((y) => y + 1)(41)
    let y = Parameter::new("y", i32_ty());
    let inner_body = Expr::binary(i32_ty(), BinaryOp::Add, Expr::parameter(&y), const_i32(1));
    let inner = LambdaExpr::new(vec![y], inner_body, i32_ty());

    let body = Expr::invoke(i32_ty(), Expr::lambda(inner), vec![const_i32(41)]);
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[]).unwrap(), Value::I32(42));
}

#[test]
fn invoking_with_the_wrong_count_raises() {
    let y = Parameter::new("y", i32_ty());
    let inner_body = Expr::parameter(&y);
    let inner = LambdaExpr::new(vec![y], inner_body, i32_ty());

    let body = Expr::invoke(i32_ty(), Expr::lambda(inner), vec![]);
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    let err = callable.invoke(&[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::WrongArgCount { expected: 1, got: 0 });
}

#[test]
fn invoking_a_non_function_raises() {
    let body = Expr::invoke(i32_ty(), const_i32(1), vec![]);
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();
    let err = callable.invoke(&[]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotCallable {
            type_name: "i32".into()
        }
    );
}

#[test]
fn type_test_and_safe_downcast() {
    let x = Parameter::new("x", opt_i32_ty());
    let body = Expr::type_is(Expr::parameter(&x), i32_ty());
    let callable = compile(&LambdaExpr::new(vec![x], body, Ty::BOOL)).unwrap();
    assert_eq!(callable.invoke(&[Value::I32(1)]).unwrap(), Value::Bool(true));
    assert_eq!(
        callable.invoke(&[Value::Nothing]).unwrap(),
        Value::Bool(false)
    );

    let x = Parameter::new("x", opt_i32_ty());
    let body = Expr::unary(i32_ty(), UnaryOp::TypeAs, Expr::parameter(&x));
    let callable = compile(&LambdaExpr::new(vec![x], body, opt_i32_ty())).unwrap();
    assert_eq!(callable.invoke(&[Value::I32(1)]).unwrap(), Value::I32(1));
    assert_eq!(
        callable.invoke(&[Value::Bool(true)]).unwrap(),
        Value::Nothing
    );
}

#[test]
fn quote_yields_the_subtree_unevaluated() {
    let operand = poison(i32_ty());
    let body = Expr::unary(i32_ty(), UnaryOp::Quote, Arc::clone(&operand));
    let callable = compile(&LambdaExpr::new(vec![], body, i32_ty())).unwrap();

    let Value::Quoted(quoted) = callable.invoke(&[]).unwrap() else {
        panic!("expected quoted sub-tree");
    };
    assert!(Arc::ptr_eq(&quoted, &operand));
}

#[test]
fn equality_on_objects_is_reference_identity() {
    let point_ty = Ty::object("point");
    let p = Parameter::new("p", point_ty.clone());
    let q = Parameter::new("q", point_ty.clone());
    let eq_body = Expr::binary(
        Ty::BOOL,
        BinaryOp::Eq,
        Expr::parameter(&p),
        Expr::parameter(&q),
    );
    let eq = compile(&LambdaExpr::new(vec![p.clone(), q.clone()], eq_body, Ty::BOOL)).unwrap();
    let neq_body = Expr::binary(
        Ty::BOOL,
        BinaryOp::NotEq,
        Expr::parameter(&p),
        Expr::parameter(&q),
    );
    let neq = compile(&LambdaExpr::new(vec![p, q], neq_body, Ty::BOOL)).unwrap();

    let a = Value::object("point");
    let b = Value::object("point");
    assert_eq!(eq.invoke(&[a.clone(), a.clone()]).unwrap(), Value::Bool(true));
    assert_eq!(eq.invoke(&[a.clone(), b.clone()]).unwrap(), Value::Bool(false));
    assert_eq!(neq.invoke(&[a.clone(), a.clone()]).unwrap(), Value::Bool(false));
    assert_eq!(neq.invoke(&[a, b]).unwrap(), Value::Bool(true));
}

#[test]
fn compile_rejects_a_foreign_parameter() {
    let own = Parameter::new("a", i32_ty());
    let foreign = Parameter::new("b", i32_ty());
    let body = Expr::parameter(&foreign);
    let lambda = LambdaExpr::new(vec![own], body, i32_ty());
    assert!(matches!(compile(&lambda), Err(CompileError::Scope(_))));
}

#[test]
fn unvalidated_parameter_miss_reads_as_absence() {
    // Bypassing validation, an unresolvable reference degrades to the
    // absent value rather than panicking.
    let foreign = Parameter::new("ghost", opt_i32_ty());
    let body = Expr::parameter(&foreign);
    let lambda = LambdaExpr::new(vec![], body, opt_i32_ty());
    assert_eq!(Interpreter::run(&lambda, &[]).unwrap(), Value::Nothing);
}

#[test]
fn one_callable_serves_concurrent_invocations() {
    let a = Parameter::new("a", i32_ty());
    let b = Parameter::new("b", i32_ty());
    let body = Expr::binary(
        i32_ty(),
        BinaryOp::Add,
        Expr::parameter(&a),
        Expr::parameter(&b),
    );
    let callable = make_callable(LambdaExpr::new(vec![a, b], body, i32_ty())).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let callable = callable.clone();
                s.spawn(move || callable.invoke(&[Value::I32(i), Value::I32(i)]).unwrap())
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Value::I32(2 * i as i32));
        }
    });
}
