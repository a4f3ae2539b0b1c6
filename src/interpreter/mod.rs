//! Big-step interpreter.
//!
//! Evaluates a resolved, type-checked expression directly to a value:
//!
//! - Lambdas evaluate to closures capturing a copy of the environment
//! - Reference cells live in a heap that outlives every activation
//! - Operands and arguments are evaluated left to right

pub mod environment;
pub mod evaluator;
pub mod value;

pub use environment::{Environment, Heap};
pub use evaluator::{evaluate, evaluate_expr, Evaluator};
pub use value::{Closure, Value};
