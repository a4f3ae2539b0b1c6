//! Small-step reduction.
//!
//! Rewrites an expression one redex at a time, left to right and call by
//! value. Application substitutes argument values for parameters by
//! declaration identity; `new` allocates a store cell and leaves a location
//! in the tree.

pub mod reducer;
pub mod substitute;

pub use reducer::{is_value, reduce, step, to_value, Reducer};
pub use substitute::substitute;

#[cfg(test)]
mod tests;
