//! Expression node kinds and their construction API.
//!
//! Constructors accept anything convertible into an [`Expr`], so literal
//! shorthands are normalized here: a `bool` becomes a boolean literal, an
//! integer an integer literal, and a string an unresolved identifier.

use std::{cell::OnceCell, fmt::Display, rc::Rc};

use super::{
    ast::Expr,
    declarations::{CaseArm, DeclRef, FieldInit, IntoDecl},
    types::Type,
};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "-",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Operator families, each with its own typing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Logical,
    Arithmetic,
    Equality,
    Ordering,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn class(&self) -> OperatorClass {
        match self {
            BinaryOp::And | BinaryOp::Or => OperatorClass::Logical,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                OperatorClass::Arithmetic
            }
            BinaryOp::Eq | BinaryOp::Ne => OperatorClass::Equality,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => OperatorClass::Ordering,
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Identifier Expression
///
/// Holds only a name until resolution attaches the declaration it refers to.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub decl: Option<DeclRef>,
}

/// Lambda Expression
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<DeclRef>,
    pub body: Box<Expr>,
}

/// Every kind of expression in the language.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Bool(bool),
    Int(i64),
    Unit,
    Id(Identifier),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Lambda(Rc<Lambda>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New(Box<Expr>),
    Deref(Box<Expr>),
    Assign {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A heap location; only produced by reduction of `new`.
    Loc(usize),
    Tuple(Vec<Expr>),
    Proj {
        tuple: Box<Expr>,
        index: i64,
    },
    Record(Vec<FieldInit>),
    Member {
        record: Box<Expr>,
        name: String,
        /// Position of the selected field in the record type, cached by the type checker.
        field: OnceCell<usize>,
    },
    Variant {
        tag: String,
        payload: Box<Expr>,
        ty: Type,
    },
    Case {
        scrutinee: Box<Expr>,
        arms: Vec<CaseArm>,
    },
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr::new(kind)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::new(ExprKind::Bool(value))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::new(ExprKind::Int(value))
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::new(ExprKind::Int(value.into()))
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::id(name)
    }
}

impl From<String> for Expr {
    fn from(name: String) -> Self {
        Expr::id(name)
    }
}

impl From<DeclRef> for Expr {
    fn from(decl: DeclRef) -> Self {
        Expr::id_of(&decl)
    }
}

impl From<&DeclRef> for Expr {
    fn from(decl: &DeclRef) -> Self {
        Expr::id_of(decl)
    }
}

fn boxed(expr: impl Into<Expr>) -> Box<Expr> {
    Box::new(expr.into())
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    pub fn bool(value: bool) -> Self {
        value.into()
    }

    pub fn int(value: i64) -> Self {
        value.into()
    }

    pub fn unit() -> Self {
        Expr::new(ExprKind::Unit)
    }

    /// An unresolved identifier.
    pub fn id(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Id(Identifier {
            name: name.into(),
            decl: None,
        }))
    }

    /// An identifier already bound to `decl`.
    pub fn id_of(decl: &DeclRef) -> Self {
        Expr::new(ExprKind::Id(Identifier {
            name: decl.name().to_string(),
            decl: Some(Rc::clone(decl)),
        }))
    }

    pub fn unary(op: UnaryOp, operand: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::Unary {
            op,
            operand: boxed(operand),
        })
    }

    pub fn binary(op: BinaryOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::Binary {
            op,
            lhs: boxed(lhs),
            rhs: boxed(rhs),
        })
    }

    pub fn not(operand: impl Into<Expr>) -> Self {
        Expr::unary(UnaryOp::Not, operand)
    }

    pub fn neg(operand: impl Into<Expr>) -> Self {
        Expr::unary(UnaryOp::Neg, operand)
    }

    pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn add(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Div, lhs, rhs)
    }

    pub fn rem(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Rem, lhs, rhs)
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Eq, lhs, rhs)
    }

    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Ne, lhs, rhs)
    }

    pub fn lt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Lt, lhs, rhs)
    }

    pub fn gt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Gt, lhs, rhs)
    }

    pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Le, lhs, rhs)
    }

    pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Ge, lhs, rhs)
    }

    pub fn if_then_else(
        cond: impl Into<Expr>,
        then_branch: impl Into<Expr>,
        else_branch: impl Into<Expr>,
    ) -> Self {
        Expr::new(ExprKind::If {
            cond: boxed(cond),
            then_branch: boxed(then_branch),
            else_branch: boxed(else_branch),
        })
    }

    pub fn lambda<P: IntoDecl>(params: impl IntoIterator<Item = P>, body: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::Lambda(Rc::new(Lambda {
            params: params.into_iter().map(IntoDecl::into_decl).collect(),
            body: boxed(body),
        })))
    }

    pub fn call<A: Into<Expr>>(callee: impl Into<Expr>, args: impl IntoIterator<Item = A>) -> Self {
        Expr::new(ExprKind::Call {
            callee: boxed(callee),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    pub fn new_ref(value: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::New(boxed(value)))
    }

    pub fn deref(reference: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::Deref(boxed(reference)))
    }

    pub fn assign(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::Assign {
            lhs: boxed(lhs),
            rhs: boxed(rhs),
        })
    }

    pub fn loc(index: usize) -> Self {
        Expr::new(ExprKind::Loc(index))
    }

    pub fn tuple<E: Into<Expr>>(elems: impl IntoIterator<Item = E>) -> Self {
        Expr::new(ExprKind::Tuple(elems.into_iter().map(Into::into).collect()))
    }

    pub fn proj(tuple: impl Into<Expr>, index: i64) -> Self {
        Expr::new(ExprKind::Proj {
            tuple: boxed(tuple),
            index,
        })
    }

    pub fn record<F: Into<FieldInit>>(fields: impl IntoIterator<Item = F>) -> Self {
        Expr::new(ExprKind::Record(fields.into_iter().map(Into::into).collect()))
    }

    pub fn member(record: impl Into<Expr>, name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Member {
            record: boxed(record),
            name: name.into(),
            field: OnceCell::new(),
        })
    }

    /// `<tag=payload> as ty`
    pub fn variant(tag: impl Into<String>, payload: impl Into<Expr>, ty: Type) -> Self {
        Expr::new(ExprKind::Variant {
            tag: tag.into(),
            payload: boxed(payload),
            ty,
        })
    }

    pub fn case<A: Into<CaseArm>>(
        scrutinee: impl Into<Expr>,
        arms: impl IntoIterator<Item = A>,
    ) -> Self {
        Expr::new(ExprKind::Case {
            scrutinee: boxed(scrutinee),
            arms: arms.into_iter().map(Into::into).collect(),
        })
    }
}
