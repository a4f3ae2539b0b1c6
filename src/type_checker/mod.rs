//! Type checking module.
//!
//! This module assigns a type to every expression of a resolved AST:
//!
//! - One structural rule per expression kind
//! - Types are memoized in each node's computed-type cell
//! - Case-arm variables receive their type from the scrutinee's variant
//! - The first type error aborts checking
//!
//! The checker never changes the shape of the tree; it only fills in the
//! memo cells and the cached field positions of member accesses.

pub mod type_checker;

pub use type_checker::{type_check, type_check_expr, AssignmentRule, CheckerOptions, TypeChecker};
