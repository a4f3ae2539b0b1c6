//! Error types and error handling for the interpreter.
//!
//! This module defines the error types shared by every phase:
//!
//! - Name resolution failures
//! - Type errors, one variant per typing rule that can fail
//! - Reduction and runtime failures
//!
//! Each error carries the rendering of the offending expression and a
//! human-readable suggestion where one helps.

pub mod errors;

pub use errors::{Error, ErrorCategory, ErrorImpl, ErrorTip};

#[cfg(test)]
mod tests;
