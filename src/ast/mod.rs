/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The expression node, its type memo cell, metrics and debug rendering
/// - declarations: Binding sites, field initializers and case arms
/// - expressions: Node kinds, operators and the construction API
/// - types: Structural type representation
pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod types;

pub use ast::{same, Expr};
pub use declarations::{CaseArm, Decl, DeclId, DeclRef, FieldInit, IntoDecl};
pub use expressions::{BinaryOp, ExprKind, Identifier, Lambda, OperatorClass, UnaryOp};
pub use types::{FieldType, Type};

#[cfg(test)]
mod tests;
