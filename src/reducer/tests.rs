//! Unit tests for the small-step reducer.

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use crate::{
    ast::{same, Decl, Expr, ExprKind, Type},
    errors::errors::ErrorImpl,
    interpreter::Value,
    resolver::resolve_expr,
};

use super::{
    reducer::{is_value, reduce, step, to_value, Reducer},
    substitute::substitute,
};

fn resolved(mut expr: Expr) -> Expr {
    resolve_expr(&mut expr).expect("test expressions should resolve");
    expr
}

fn implies() -> Expr {
    Expr::lambda(
        [("p", Type::Bool), ("q", Type::Bool)],
        Expr::or(Expr::not("p"), "q"),
    )
}

#[test]
fn test_value_forms() {
    assert!(is_value(&Expr::bool(true)));
    assert!(is_value(&Expr::int(1)));
    assert!(is_value(&Expr::unit()));
    assert!(is_value(&Expr::loc(0)));
    assert!(is_value(&Expr::lambda([("x", Type::Int)], Expr::add("x", 1))));
    assert!(is_value(&Expr::tuple([1, 2])));
    assert!(is_value(&Expr::record([("x", true)])));

    assert!(!is_value(&Expr::id("x")));
    assert!(!is_value(&Expr::not(true)));
    assert!(!is_value(&Expr::tuple([Expr::int(1), Expr::add(1, 1)])));
    assert!(!is_value(&Expr::new_ref(1)));
}

#[test]
fn test_single_step_folds_an_operator() {
    let next = step(&Expr::and(true, false)).unwrap();
    assert!(same(&next, &Expr::bool(false)));
}

#[test]
fn test_step_rewrites_leftmost_redex_only() {
    let expr = Expr::add(Expr::mul(2, 3), Expr::mul(4, 5));

    let next = step(&expr).unwrap();
    assert_eq!(next.to_string(), "(6 + (4 * 5))");

    let next = step(&next).unwrap();
    assert_eq!(next.to_string(), "(6 + 20)");

    let next = step(&next).unwrap();
    assert_eq!(next.to_string(), "26");
}

#[test]
fn test_step_on_a_value_is_rejected() {
    assert_eq!(
        step(&Expr::int(3)).unwrap_err().kind(),
        &ErrorImpl::AlreadyNormal
    );
}

#[test]
fn test_conditional_selects_without_reducing() {
    let expr = Expr::if_then_else(true, Expr::add(1, 1), Expr::div(1, 0));
    let next = step(&expr).unwrap();

    assert_eq!(next.to_string(), "(1 + 1)");
}

#[test]
fn test_application_substitutes_arguments() {
    let expr = resolved(Expr::call(implies(), [true, false]));

    let next = step(&expr).unwrap();
    assert_eq!(next.to_string(), "((not true) or false)");
    assert!(same(&reduce(&expr).unwrap(), &Expr::bool(false)));
}

#[test]
fn test_arguments_reduce_before_application() {
    let expr = resolved(Expr::call(implies(), [Expr::not(true), Expr::bool(true)]));
    let next = step(&expr).unwrap();

    match &next.kind {
        ExprKind::Call { args, .. } => assert!(same(&args[0], &Expr::bool(false))),
        other => panic!("expected a call, found {:?}", other),
    }
}

#[test]
fn test_application_of_non_function() {
    assert_eq!(
        step(&Expr::call(5, [1])).unwrap_err().kind(),
        &ErrorImpl::ApplicationOfNonFunction
    );
}

#[test]
fn test_application_arity() {
    let expr = resolved(Expr::call(implies(), [true]));
    assert_eq!(
        step(&expr).unwrap_err().kind(),
        &ErrorImpl::TooFewArguments {
            expected: 2,
            received: 1
        }
    );
}

#[test]
fn test_substitution_respects_shadowing() {
    // (\(x:Int). (\(x:Int). x)(2))(1): the inner x is a different declaration.
    let expr = resolved(Expr::call(
        Expr::lambda(
            [("x", Type::Int)],
            Expr::call(Expr::lambda([("x", Type::Int)], "x"), [2]),
        ),
        [1],
    ));

    assert!(same(&reduce(&expr).unwrap(), &Expr::int(2)));
}

fn int_to_int() -> Type {
    Type::function([Type::Int], Type::Int)
}

#[test]
fn test_lambda_applied_to_itself_keeps_its_binders() {
    // (\l. l(l(\z.z))(0))(\x:(Int)->Int. \y:Int. x(y + 1))
    // Beta reduction copies the second lambda into its own body, so both
    // copies bind the same y.
    let twice = Expr::lambda(
        [("x", int_to_int())],
        Expr::lambda([("y", Type::Int)], Expr::call("x", [Expr::add("y", 1)])),
    );
    let expr = resolved(Expr::call(
        Expr::lambda(
            [("l", Type::function([int_to_int()], int_to_int()))],
            Expr::call(
                Expr::call("l", [Expr::call("l", [Expr::lambda([("z", Type::Int)], "z")])]),
                [0],
            ),
        ),
        [twice],
    ));

    assert!(same(&reduce(&expr).unwrap(), &Expr::int(2)));
    assert_eq!(crate::interpreter::evaluate_expr(&expr).unwrap(), Value::Int(2));
}

#[test]
fn test_binders_hide_their_own_declaration() {
    let x = Decl::typed("x", Type::Int);
    let bindings = HashMap::from([(x.id(), Expr::int(7))]);

    let lambda = Expr::lambda([&x], Expr::add(&x, 1));
    assert_eq!(substitute(&lambda, &bindings).to_string(), "(\\(x:Int).(x + 1))");

    let ty = Type::variant([("a", Type::Int)]);
    let case = Expr::case(Expr::variant("a", &x, ty), [("a", &x, &x)]);
    assert_eq!(
        substitute(&case, &bindings).to_string(),
        "(case (<a=7> as <a:Int>) of <a=x> => x)"
    );
}

#[test]
fn test_substitute_replaces_by_declaration() {
    let x = Decl::typed("x", Type::Int);
    let other = Decl::typed("x", Type::Int);
    let expr = Expr::add(&x, &other);

    let bindings = HashMap::from([(x.id(), Expr::int(7))]);
    let result = substitute(&expr, &bindings);

    assert_eq!(result.to_string(), "(7 + x)");
    assert!(same(&substitute(&expr, &HashMap::new()), &expr));
}

#[test]
fn test_references_use_the_store() {
    // (\(r:Ref Int). {*r, r = new 10, *r})(new 5), with the reducer's own store.
    let body = Expr::tuple([
        Expr::deref("r"),
        Expr::assign("r", Expr::new_ref(10)),
        Expr::deref("r"),
    ]);
    let expr = resolved(Expr::call(
        Expr::lambda([("r", Type::reference(Type::Int))], body),
        [Expr::new_ref(5)],
    ));

    let mut reducer = Reducer::new();
    let result = reducer.reduce(&expr).unwrap();

    assert_eq!(result.to_string(), "{5,(),@1}");
    assert_eq!(reducer.store().len(), 2);
    assert_eq!(reducer.store()[0].to_string(), "@1");
}

#[test]
fn test_assignment_requires_a_location() {
    assert!(matches!(
        step(&Expr::assign(5, 1)).unwrap_err().kind(),
        ErrorImpl::InvalidReference { .. }
    ));
    assert!(matches!(
        step(&Expr::deref(Expr::loc(0))).unwrap_err().kind(),
        ErrorImpl::InvalidReference { .. }
    ));
}

#[test]
fn test_structured_data() {
    let proj = Expr::proj(Expr::tuple([Expr::add(1, 1), Expr::bool(true)]), 0);
    assert!(same(&reduce(&proj).unwrap(), &Expr::int(2)));

    let member = Expr::member(Expr::record([("x", 1), ("y", 2)]), "y");
    assert!(same(&reduce(&member).unwrap(), &Expr::int(2)));

    let ty = Type::variant([("num", Type::Int), ("flag", Type::Bool)]);
    let case = resolved(Expr::case(
        Expr::variant("num", Expr::add(2, 3), ty),
        [
            ("num", "n", Expr::mul("n", 2)),
            ("flag", "f", Expr::if_then_else("f", 1, 0)),
        ],
    ));
    assert!(same(&reduce(&case).unwrap(), &Expr::int(10)));
}

#[test]
fn test_step_limit() {
    let expr = Expr::add(Expr::add(1, 2), Expr::add(3, 4));
    let mut reducer = Reducer::with_step_limit(2);

    let error = reducer.reduce(&expr).unwrap_err();
    assert_eq!(error.kind(), &ErrorImpl::StepLimitExceeded { limit: 2 });
    assert_eq!(reducer.steps(), 2);

    assert!(same(
        &Reducer::with_step_limit(3).reduce(&expr).unwrap(),
        &Expr::int(10)
    ));
}

#[test]
fn test_every_step_shrinks_a_first_order_term() {
    let mut current = Expr::and(Expr::not(Expr::lt(1, 2)), Expr::or(true, false));
    let mut reducer = Reducer::new();

    while !is_value(&current) {
        let next = reducer.step(&current).unwrap();
        assert!(next.size() < current.size());
        current = next;
    }
    assert_eq!(reducer.steps(), 4);
}

#[test]
fn test_to_value() {
    assert_eq!(to_value(&Expr::bool(false)).unwrap(), Value::Bool(false));
    assert_eq!(
        to_value(&Expr::tuple([Expr::int(1), Expr::loc(2)])).unwrap(),
        Value::Tuple(vec![Value::Int(1), Value::Location(2)])
    );
    assert_eq!(
        to_value(&Expr::record([("a", 1)])).unwrap(),
        Value::Record(vec![("a".to_string(), Value::Int(1))])
    );
    assert!(matches!(
        to_value(&Expr::not(true)).unwrap_err().kind(),
        ErrorImpl::Malformed { .. }
    ));
}
