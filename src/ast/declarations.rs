//! Binding sites and the small records owned by expressions.
//!
//! A [`Decl`] is created by the construct that introduces it (a lambda
//! parameter or a case-arm variable) and is shared through [`DeclRef`] with
//! every identifier resolved to it. Identity is carried by [`DeclId`], never
//! by name, so shadowed names stay distinct.

use std::{
    cell::RefCell,
    fmt::Display,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::{ast::Expr, types::Type};

static NEXT_DECL_ID: AtomicUsize = AtomicUsize::new(0);

/// Unique identity of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(usize);

impl DeclId {
    fn fresh() -> Self {
        DeclId(NEXT_DECL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for DeclId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variable Declaration
///
/// The declared type may be absent when the binder is created; case arms
/// receive theirs from the scrutinee's variant type during checking.
#[derive(Debug)]
pub struct Decl {
    id: DeclId,
    name: String,
    ty: RefCell<Option<Type>>,
}

pub type DeclRef = Rc<Decl>;

impl Decl {
    pub fn new(name: impl Into<String>, ty: Option<Type>) -> DeclRef {
        Rc::new(Decl {
            id: DeclId::fresh(),
            name: name.into(),
            ty: RefCell::new(ty),
        })
    }

    pub fn typed(name: impl Into<String>, ty: Type) -> DeclRef {
        Decl::new(name, Some(ty))
    }

    pub fn untyped(name: impl Into<String>) -> DeclRef {
        Decl::new(name, None)
    }

    pub fn id(&self) -> DeclId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_type(&self) -> Option<Type> {
        self.ty.borrow().clone()
    }

    pub fn set_type(&self, ty: Type) {
        *self.ty.borrow_mut() = Some(ty);
    }
}

impl Display for Decl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.ty.borrow() {
            Some(ty) => write!(f, "{}:{}", self.name, ty),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Conversion of construction shorthands into a declaration.
///
/// A bare name produces an untyped declaration, a `(name, type)` pair a typed
/// one, and an existing [`DeclRef`] is passed through unchanged.
pub trait IntoDecl {
    fn into_decl(self) -> DeclRef;
}

impl IntoDecl for DeclRef {
    fn into_decl(self) -> DeclRef {
        self
    }
}

impl IntoDecl for &DeclRef {
    fn into_decl(self) -> DeclRef {
        Rc::clone(self)
    }
}

impl IntoDecl for &str {
    fn into_decl(self) -> DeclRef {
        Decl::untyped(self)
    }
}

impl IntoDecl for String {
    fn into_decl(self) -> DeclRef {
        Decl::untyped(self)
    }
}

impl<S: Into<String>> IntoDecl for (S, Type) {
    fn into_decl(self) -> DeclRef {
        Decl::typed(self.0, self.1)
    }
}

/// Field initializer of a record or variant construction.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

impl<S: Into<String>, E: Into<Expr>> From<(S, E)> for FieldInit {
    fn from((name, value): (S, E)) -> Self {
        FieldInit {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One arm of a case analysis: `<tag=var> => body`.
#[derive(Debug, Clone)]
pub struct CaseArm {
    pub tag: String,
    pub var: DeclRef,
    pub body: Expr,
}

impl CaseArm {
    pub fn new(tag: impl Into<String>, var: impl IntoDecl, body: impl Into<Expr>) -> Self {
        CaseArm {
            tag: tag.into(),
            var: var.into_decl(),
            body: body.into(),
        }
    }
}

impl<S: Into<String>, V: IntoDecl, E: Into<Expr>> From<(S, V, E)> for CaseArm {
    fn from((tag, var, body): (S, V, E)) -> Self {
        CaseArm::new(tag, var, body)
    }
}
