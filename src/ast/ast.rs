use std::{cell::OnceCell, fmt::Display};

use crate::stack::ensure_sufficient_stack;

use super::{
    declarations::DeclId,
    expressions::{ExprKind, UnaryOp},
    types::Type,
};

/// Expression
///
/// An AST node: its kind plus the type computed for it by the type checker.
/// The computed type is written once and is authoritative afterwards.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    computed_type: OnceCell<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            computed_type: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// The type assigned by the type checker, if checking has reached this node.
    pub fn computed_type(&self) -> Option<&Type> {
        self.computed_type.get()
    }

    /// Records the checked type. Returns the stored type, which is the
    /// earlier one if the cell was already filled.
    pub(crate) fn set_computed_type(&self, ty: Type) -> &Type {
        self.computed_type.get_or_init(|| ty)
    }

    /// Immediate sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::Unit
            | ExprKind::Id(_)
            | ExprKind::Loc(_) => vec![],
            ExprKind::Unary { operand, .. } => vec![operand.as_ref()],
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs } => {
                vec![lhs.as_ref(), rhs.as_ref()]
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => vec![cond.as_ref(), then_branch.as_ref(), else_branch.as_ref()],
            ExprKind::Lambda(lambda) => vec![lambda.body.as_ref()],
            ExprKind::Call { callee, args } => {
                let mut children = vec![callee.as_ref()];
                children.extend(args.iter());
                children
            }
            ExprKind::New(inner) | ExprKind::Deref(inner) => vec![inner.as_ref()],
            ExprKind::Tuple(elems) => elems.iter().collect(),
            ExprKind::Proj { tuple, .. } => vec![tuple.as_ref()],
            ExprKind::Record(fields) => fields.iter().map(|field| &field.value).collect(),
            ExprKind::Member { record, .. } => vec![record.as_ref()],
            ExprKind::Variant { payload, .. } => vec![payload.as_ref()],
            ExprKind::Case { scrutinee, arms } => {
                let mut children = vec![scrutinee.as_ref()];
                children.extend(arms.iter().map(|arm| &arm.body));
                children
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        ensure_sufficient_stack(|| {
            1 + self
                .children()
                .into_iter()
                .map(Expr::size)
                .sum::<usize>()
        })
    }

    /// Length of the longest root-to-leaf path, counting nodes.
    pub fn height(&self) -> usize {
        ensure_sufficient_stack(|| {
            1 + self
                .children()
                .into_iter()
                .map(Expr::height)
                .max()
                .unwrap_or(0)
        })
    }

    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

/// Returns whether two trees are structurally identical.
///
/// Binders are matched positionally, so two lambdas that differ only in the
/// identity of their parameter declarations are the same. Resolved free
/// identifiers must refer to the same declaration; unresolved ones compare by
/// name.
pub fn same(lhs: &Expr, rhs: &Expr) -> bool {
    same_in(lhs, rhs, &mut vec![])
}

fn same_in(lhs: &Expr, rhs: &Expr, binders: &mut Vec<(DeclId, DeclId)>) -> bool {
    ensure_sufficient_stack(|| same_node(lhs, rhs, binders))
}

fn same_node(lhs: &Expr, rhs: &Expr, binders: &mut Vec<(DeclId, DeclId)>) -> bool {
    match (&lhs.kind, &rhs.kind) {
        (ExprKind::Bool(a), ExprKind::Bool(b)) => a == b,
        (ExprKind::Int(a), ExprKind::Int(b)) => a == b,
        (ExprKind::Unit, ExprKind::Unit) => true,
        (ExprKind::Loc(a), ExprKind::Loc(b)) => a == b,
        (ExprKind::Id(a), ExprKind::Id(b)) => match (&a.decl, &b.decl) {
            (Some(a), Some(b)) => {
                let bound = binders
                    .iter()
                    .rev()
                    .find(|(left, right)| *left == a.id() || *right == b.id());
                match bound {
                    Some((left, right)) => *left == a.id() && *right == b.id(),
                    None => a.id() == b.id(),
                }
            }
            (None, None) => a.name == b.name,
            _ => false,
        },
        (
            ExprKind::Unary { op, operand },
            ExprKind::Unary {
                op: other_op,
                operand: other_operand,
            },
        ) => op == other_op && same_in(operand, other_operand, binders),
        (
            ExprKind::Binary { op, lhs, rhs },
            ExprKind::Binary {
                op: other_op,
                lhs: other_lhs,
                rhs: other_rhs,
            },
        ) => op == other_op && same_in(lhs, other_lhs, binders) && same_in(rhs, other_rhs, binders),
        (ExprKind::Lambda(a), ExprKind::Lambda(b)) => {
            if a.params.len() != b.params.len()
                || a
                    .params
                    .iter()
                    .zip(b.params.iter())
                    .any(|(p, q)| p.name() != q.name() || p.get_type() != q.get_type())
            {
                return false;
            }
            let mark = binders.len();
            binders.extend(a.params.iter().zip(b.params.iter()).map(|(p, q)| (p.id(), q.id())));
            let result = same_in(&a.body, &b.body, binders);
            binders.truncate(mark);
            result
        }
        (ExprKind::Proj { index, .. }, ExprKind::Proj { index: other, .. }) if index != other => {
            false
        }
        (ExprKind::Member { name, .. }, ExprKind::Member { name: other, .. }) if name != other => {
            false
        }
        (ExprKind::Record(a), ExprKind::Record(b))
            if a.iter().map(|f| &f.name).ne(b.iter().map(|f| &f.name)) =>
        {
            false
        }
        (
            ExprKind::Variant { tag, ty, .. },
            ExprKind::Variant {
                tag: other_tag,
                ty: other_ty,
                ..
            },
        ) if tag != other_tag || ty != other_ty => false,
        (ExprKind::Case { scrutinee, arms }, ExprKind::Case { scrutinee: s, arms: other_arms }) => {
            if arms.len() != other_arms.len() || !same_in(scrutinee, s, binders) {
                return false;
            }
            arms.iter().zip(other_arms.iter()).all(|(arm, other)| {
                if arm.tag != other.tag {
                    return false;
                }
                binders.push((arm.var.id(), other.var.id()));
                let result = same_in(&arm.body, &other.body, binders);
                binders.pop();
                result
            })
        }
        (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => {
            let (left, right) = (lhs.children(), rhs.children());
            left.len() == right.len()
                && left
                    .into_iter()
                    .zip(right)
                    .all(|(a, b)| same_in(a, b, binders))
        }
        _ => false,
    }
}

fn join<T: Display>(items: impl IntoIterator<Item = T>, separator: &str) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(separator)
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Bool(value) => write!(f, "{}", value),
            ExprKind::Int(value) => write!(f, "{}", value),
            ExprKind::Unit => write!(f, "()"),
            ExprKind::Id(identifier) => write!(f, "{}", identifier.name),
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "(not {})", operand),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "(-{})", operand),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => write!(f, "(if {} then {} else {})", cond, then_branch, else_branch),
            ExprKind::Lambda(lambda) => write!(
                f,
                "(\\({}).{})",
                join(lambda.params.iter(), ","),
                lambda.body
            ),
            ExprKind::Call { callee, args } => write!(f, "({} ({}))", callee, join(args, ",")),
            ExprKind::New(inner) => write!(f, "(new {})", inner),
            ExprKind::Deref(inner) => write!(f, "(*{})", inner),
            ExprKind::Assign { lhs, rhs } => write!(f, "({} = {})", lhs, rhs),
            ExprKind::Loc(index) => write!(f, "@{}", index),
            ExprKind::Tuple(elems) => write!(f, "{{{}}}", join(elems, ",")),
            ExprKind::Proj { tuple, index } => write!(f, "({}.{})", tuple, index),
            ExprKind::Record(fields) => write!(
                f,
                "{{{}}}",
                join(fields.iter().map(|field| format!("{}={}", field.name, field.value)), ",")
            ),
            ExprKind::Member { record, name, .. } => write!(f, "({}.{})", record, name),
            ExprKind::Variant { tag, payload, ty } => write!(f, "(<{}={}> as {})", tag, payload, ty),
            ExprKind::Case { scrutinee, arms } => write!(
                f,
                "(case {} of {})",
                scrutinee,
                join(
                    arms.iter()
                        .map(|arm| format!("<{}={}> => {}", arm.tag, arm.var.name(), arm.body)),
                    " | "
                )
            ),
        }
    }
}
