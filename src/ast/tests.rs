//! Unit tests for the AST model.

use pretty_assertions::assert_eq;

use super::{same, Decl, Expr, ExprKind, Type};

#[test]
fn test_shorthands_are_normalized() {
    assert!(matches!(Expr::from(true).kind, ExprKind::Bool(true)));
    assert!(matches!(Expr::from(4).kind, ExprKind::Int(4)));
    assert!(matches!(Expr::from(4i64).kind, ExprKind::Int(4)));

    match Expr::from("x").kind {
        ExprKind::Id(identifier) => {
            assert_eq!(identifier.name, "x");
            assert!(identifier.decl.is_none());
        }
        other => panic!("expected an identifier, found {:?}", other),
    }

    let decl = Decl::typed("y", Type::Int);
    match Expr::from(&decl).kind {
        ExprKind::Id(identifier) => {
            assert_eq!(identifier.decl.map(|decl| decl.id()), Some(decl.id()))
        }
        other => panic!("expected an identifier, found {:?}", other),
    }
}

#[test]
fn test_display_is_fully_parenthesized() {
    assert_eq!(Expr::and("x", "y").to_display_string(), "(x and y)");
    assert_eq!(
        Expr::or(Expr::not("p"), "q").to_display_string(),
        "((not p) or q)"
    );
    assert_eq!(Expr::neg(Expr::sub(1, 2)).to_string(), "(-(1 - 2))");
    assert_eq!(
        Expr::if_then_else(true, 1, 2).to_string(),
        "(if true then 1 else 2)"
    );
    assert_eq!(Expr::unit().to_string(), "()");
}

#[test]
fn test_display_of_functions_and_references() {
    let lambda = Expr::lambda([("p", Type::Bool), ("q", Type::Bool)], Expr::and("p", "q"));
    assert_eq!(lambda.to_string(), "(\\(p:Bool,q:Bool).(p and q))");
    assert_eq!(Expr::call("f", [1, 2]).to_string(), "(f (1,2))");
    assert_eq!(
        Expr::assign(Expr::new_ref(1), Expr::deref("r")).to_string(),
        "((new 1) = (*r))"
    );
    assert_eq!(Expr::loc(3).to_string(), "@3");
}

#[test]
fn test_display_of_structured_data() {
    assert_eq!(Expr::proj(Expr::tuple([1, 2]), 0).to_string(), "({1,2}.0)");
    assert_eq!(
        Expr::member(Expr::record([("x", 1), ("y", 2)]), "x").to_string(),
        "({x=1,y=2}.x)"
    );

    let ty = Type::variant([("a", Type::Int), ("b", Type::Bool)]);
    let case = Expr::case(
        Expr::variant("a", 1, ty),
        [("a", "x", Expr::from("x")), ("b", "y", Expr::from(0))],
    );
    assert_eq!(
        case.to_string(),
        "(case (<a=1> as <a:Int,b:Bool>) of <a=x> => x | <b=y> => 0)"
    );
}

#[test]
fn test_size_and_height() {
    let leaf = Expr::int(1);
    assert_eq!(leaf.size(), 1);
    assert_eq!(leaf.height(), 1);

    // ((1 + 2) * 3)
    let expr = Expr::mul(Expr::add(1, 2), 3);
    assert_eq!(expr.size(), 5);
    assert_eq!(expr.height(), 3);

    let lambda = Expr::lambda([("x", Type::Int)], Expr::add("x", 1));
    assert_eq!(lambda.size(), 4);
    assert_eq!(Expr::call(lambda, [2]).size(), 6);
}

#[test]
fn test_same_compares_structure() {
    assert!(same(&Expr::add(1, 2), &Expr::add(1, 2)));
    assert!(!same(&Expr::add(1, 2), &Expr::add(2, 1)));
    assert!(!same(&Expr::add(1, 2), &Expr::sub(1, 2)));
    assert!(!same(
        &Expr::proj(Expr::tuple([1, 2]), 0),
        &Expr::proj(Expr::tuple([1, 2]), 1)
    ));
    assert!(!same(
        &Expr::member(Expr::record([("x", 1)]), "x"),
        &Expr::member(Expr::record([("y", 1)]), "x")
    ));
}

#[test]
fn test_same_matches_binders_positionally() {
    let x = Decl::typed("x", Type::Int);
    let other_x = Decl::typed("x", Type::Int);

    let first = Expr::lambda([&x], Expr::add(&x, 1));
    let second = Expr::lambda([&other_x], Expr::add(&other_x, 1));
    assert!(same(&first, &second));

    // Free occurrences must refer to the same declaration.
    assert!(!same(&Expr::add(&x, 1), &Expr::add(&other_x, 1)));
    assert!(same(&Expr::add(&x, 1), &Expr::add(&x, 1)));

    // Unresolved identifiers fall back to names.
    assert!(same(&Expr::from("z"), &Expr::from("z")));
    assert!(!same(&Expr::from("z"), &Expr::from(&x)));
}

#[test]
fn test_type_equality_ignores_field_order() {
    let record = Type::record([("x", Type::Int), ("y", Type::Bool)]);
    let reordered = Type::record([("y", Type::Bool), ("x", Type::Int)]);
    assert_eq!(record, reordered);

    let variant = Type::variant([("x", Type::Int), ("y", Type::Bool)]);
    assert!(record != variant);
    assert!(Type::record([("x", Type::Int)]) != Type::record([("x", Type::Bool)]));

    // Tuples are positional.
    assert!(Type::tuple([Type::Int, Type::Bool]) != Type::tuple([Type::Bool, Type::Int]));
}

#[test]
fn test_type_helpers() {
    let record = Type::record([("x", Type::Int), ("y", Type::Bool)]);
    assert_eq!(record.get_field("y"), Some((1, &Type::Bool)));
    assert_eq!(record.get_field("z"), None);

    let reference = Type::reference(Type::Int);
    assert_eq!(reference.referent(), Some(&Type::Int));
    assert!(reference.is_reference_to(&Type::Int));
    assert!(!Type::Int.is_reference_to(&Type::Int));
}

#[test]
fn test_type_display() {
    assert_eq!(
        Type::function([Type::Bool, Type::Int], Type::reference(Type::Unit)).to_string(),
        "(Bool,Int)->Ref Unit"
    );
    assert_eq!(Type::tuple([Type::Int, Type::Bool]).to_string(), "{Int,Bool}");
    assert_eq!(
        Type::record([("a", Type::Int)]).to_string(),
        "{a:Int}"
    );
}

#[test]
fn test_decl_ids_are_unique() {
    let a = Decl::untyped("a");
    let b = Decl::untyped("a");
    assert!(a.id() != b.id());
    assert_eq!(a.to_string(), "a");

    a.set_type(Type::Bool);
    assert_eq!(a.get_type(), Some(Type::Bool));
    assert_eq!(a.to_string(), "a:Bool");
}

#[test]
fn test_computed_type_is_written_once() {
    let expr = Expr::int(1);
    assert_eq!(expr.computed_type(), None);

    assert_eq!(expr.set_computed_type(Type::Int), &Type::Int);
    assert_eq!(expr.set_computed_type(Type::Bool), &Type::Int);
    assert_eq!(expr.computed_type(), Some(&Type::Int));
}

#[test]
fn test_metrics_of_a_deep_tree() {
    let depth = 2_000;
    let mut expr = Expr::int(0);
    for _ in 0..depth {
        expr = Expr::neg(expr);
    }

    assert_eq!(expr.size(), depth + 1);
    assert_eq!(expr.height(), depth + 1);
    assert!(same(&expr, &expr));
}
