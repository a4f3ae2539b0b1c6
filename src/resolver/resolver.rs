use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{DeclRef, Expr, ExprKind},
    errors::errors::{Error, ErrorImpl},
    stack::ensure_sufficient_stack,
};

/// Bindings introduced by a single lambda or case arm.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, DeclRef>,
}

impl Scope {
    pub fn declare(&mut self, decl: &DeclRef) {
        self.bindings.insert(decl.name().to_string(), Rc::clone(decl));
    }

    pub fn get(&self, name: &str) -> Option<&DeclRef> {
        self.bindings.get(name)
    }
}

/// Scope Chain
///
/// Ordered from outermost to innermost. Extending a chain copies it, so a
/// child chain never changes the bindings its parent sees.
#[derive(Debug, Clone, Default)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain { scopes: vec![] }
    }

    /// Returns a copy of this chain with a new innermost scope holding `decls`.
    pub fn extend<'a>(&self, decls: impl IntoIterator<Item = &'a DeclRef>) -> ScopeChain {
        let mut scope = Scope::default();
        for decl in decls {
            scope.declare(decl);
        }

        let mut chain = self.clone();
        chain.scopes.push(scope);
        chain
    }

    /// Searches from the innermost scope outwards.
    pub fn lookup(&self, name: &str) -> Option<&DeclRef> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

/// Binds every identifier in `expr` to its declaration, searching `scopes`
/// and the binders `expr` itself introduces.
pub fn resolve(expr: &mut Expr, scopes: &ScopeChain) -> Result<(), Error> {
    ensure_sufficient_stack(|| resolve_node(expr, scopes))
}

fn resolve_node(expr: &mut Expr, scopes: &ScopeChain) -> Result<(), Error> {
    match &mut expr.kind {
        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Unit | ExprKind::Loc(_) => Ok(()),
        ExprKind::Id(identifier) => match scopes.lookup(&identifier.name) {
            Some(decl) => {
                tracing::trace!(name = %identifier.name, decl = %decl.id(), "resolved identifier");
                identifier.decl = Some(Rc::clone(decl));
                Ok(())
            }
            None => Err(Error::new(
                ErrorImpl::NameResolution {
                    name: identifier.name.clone(),
                },
                identifier.name.clone(),
            )),
        },
        ExprKind::Unary { operand, .. } => resolve(operand, scopes),
        ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs } => {
            resolve(lhs, scopes)?;
            resolve(rhs, scopes)
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            resolve(cond, scopes)?;
            resolve(then_branch, scopes)?;
            resolve(else_branch, scopes)
        }
        ExprKind::Lambda(lambda) => {
            let lambda = Rc::make_mut(lambda);
            let inner = scopes.extend(lambda.params.iter());
            resolve(&mut lambda.body, &inner)
        }
        ExprKind::Call { callee, args } => {
            resolve(callee, scopes)?;
            for arg in args.iter_mut() {
                resolve(arg, scopes)?;
            }
            Ok(())
        }
        ExprKind::New(inner) | ExprKind::Deref(inner) => resolve(inner, scopes),
        ExprKind::Tuple(elems) => {
            for elem in elems.iter_mut() {
                resolve(elem, scopes)?;
            }
            Ok(())
        }
        ExprKind::Proj { tuple, .. } => resolve(tuple, scopes),
        ExprKind::Record(fields) => {
            for field in fields.iter_mut() {
                resolve(&mut field.value, scopes)?;
            }
            Ok(())
        }
        ExprKind::Member { record, .. } => resolve(record, scopes),
        ExprKind::Variant { payload, .. } => resolve(payload, scopes),
        ExprKind::Case { scrutinee, arms } => {
            resolve(scrutinee, scopes)?;
            for arm in arms.iter_mut() {
                let inner = scopes.extend([&arm.var]);
                resolve(&mut arm.body, &inner)?;
            }
            Ok(())
        }
    }
}

/// Resolves a closed expression: every identifier must be bound inside it.
#[tracing::instrument(level = "debug", skip_all)]
pub fn resolve_expr(expr: &mut Expr) -> Result<(), Error> {
    resolve(expr, &ScopeChain::new())
}
