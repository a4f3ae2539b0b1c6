//! Name resolution.
//!
//! Walks an expression with a chain of lexical scopes and attaches to every
//! identifier the declaration it refers to. Lambdas and case arms open a new
//! innermost scope; the innermost matching name wins.

pub mod resolver;

pub use resolver::{resolve, resolve_expr, Scope, ScopeChain};
