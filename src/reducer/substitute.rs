use std::{borrow::Cow, collections::HashMap, rc::Rc};

use crate::{
    ast::{CaseArm, DeclId, Expr, ExprKind, FieldInit, Lambda},
    stack::ensure_sufficient_stack,
};

fn boxed(expr: &Expr, bindings: &HashMap<DeclId, Expr>) -> Box<Expr> {
    Box::new(substitute(expr, bindings))
}

fn all(exprs: &[Expr], bindings: &HashMap<DeclId, Expr>) -> Vec<Expr> {
    exprs.iter().map(|expr| substitute(expr, bindings)).collect()
}

/// The bindings visible under a binder for `bound`. A binder shadows any
/// binding for its own declaration, which happens once a lambda has been
/// substituted into its own body.
fn shadowed<'a>(
    bindings: &'a HashMap<DeclId, Expr>,
    bound: impl IntoIterator<Item = DeclId>,
) -> Cow<'a, HashMap<DeclId, Expr>> {
    let mut visible = Cow::Borrowed(bindings);
    for id in bound {
        if visible.contains_key(&id) {
            visible.to_mut().remove(&id);
        }
    }
    visible
}

/// Replaces every identifier bound to a declaration in `bindings` with a copy
/// of the bound expression, returning a fresh tree.
///
/// Occurrences are matched by declaration identity rather than by name, and a
/// binder for a declaration in `bindings` hides it inside its scope. Bound
/// expressions are closed values, so nothing in them can be captured.
pub fn substitute(expr: &Expr, bindings: &HashMap<DeclId, Expr>) -> Expr {
    if bindings.is_empty() {
        return expr.clone();
    }
    ensure_sufficient_stack(|| substitute_node(expr, bindings))
}

fn substitute_node(expr: &Expr, bindings: &HashMap<DeclId, Expr>) -> Expr {
    let kind = match &expr.kind {
        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Unit | ExprKind::Loc(_) => {
            return expr.clone()
        }
        ExprKind::Id(identifier) => {
            return identifier
                .decl
                .as_ref()
                .and_then(|decl| bindings.get(&decl.id()))
                .unwrap_or(expr)
                .clone()
        }
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op: *op,
            operand: boxed(operand, bindings),
        },
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op: *op,
            lhs: boxed(lhs, bindings),
            rhs: boxed(rhs, bindings),
        },
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => ExprKind::If {
            cond: boxed(cond, bindings),
            then_branch: boxed(then_branch, bindings),
            else_branch: boxed(else_branch, bindings),
        },
        ExprKind::Lambda(lambda) => {
            let visible = shadowed(bindings, lambda.params.iter().map(|param| param.id()));
            ExprKind::Lambda(Rc::new(Lambda {
                params: lambda.params.clone(),
                body: boxed(&lambda.body, &visible),
            }))
        }
        ExprKind::Call { callee, args } => ExprKind::Call {
            callee: boxed(callee, bindings),
            args: all(args, bindings),
        },
        ExprKind::New(inner) => ExprKind::New(boxed(inner, bindings)),
        ExprKind::Deref(inner) => ExprKind::Deref(boxed(inner, bindings)),
        ExprKind::Assign { lhs, rhs } => ExprKind::Assign {
            lhs: boxed(lhs, bindings),
            rhs: boxed(rhs, bindings),
        },
        ExprKind::Tuple(elems) => ExprKind::Tuple(all(elems, bindings)),
        ExprKind::Proj { tuple, index } => ExprKind::Proj {
            tuple: boxed(tuple, bindings),
            index: *index,
        },
        ExprKind::Record(fields) => ExprKind::Record(
            fields
                .iter()
                .map(|field| FieldInit {
                    name: field.name.clone(),
                    value: substitute(&field.value, bindings),
                })
                .collect(),
        ),
        ExprKind::Member {
            record,
            name,
            field,
        } => ExprKind::Member {
            record: boxed(record, bindings),
            name: name.clone(),
            field: field.clone(),
        },
        ExprKind::Variant { tag, payload, ty } => ExprKind::Variant {
            tag: tag.clone(),
            payload: boxed(payload, bindings),
            ty: ty.clone(),
        },
        ExprKind::Case { scrutinee, arms } => ExprKind::Case {
            scrutinee: boxed(scrutinee, bindings),
            arms: arms
                .iter()
                .map(|arm| CaseArm {
                    tag: arm.tag.clone(),
                    var: Rc::clone(&arm.var),
                    body: substitute(&arm.body, &shadowed(bindings, [arm.var.id()])),
                })
                .collect(),
        },
    };
    Expr::new(kind)
}
