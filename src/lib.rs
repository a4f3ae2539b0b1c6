#![allow(clippy::module_inception)]

use crate::{
    ast::{Expr, Type},
    errors::errors::{Error, ErrorTip},
    interpreter::Value,
    reducer::Reducer,
};

pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod reducer;
pub mod resolver;
pub mod stack;
pub mod type_checker;

/// Resolves, type checks and evaluates `expr`, returning its type and value.
///
/// Each phase runs only if the previous one succeeded.
#[tracing::instrument(level = "debug", skip_all)]
pub fn interpret(expr: &mut Expr) -> Result<(Type, Value), Error> {
    resolver::resolve_expr(expr)?;
    let ty = type_checker::type_check(expr)?;
    let value = interpreter::evaluate_expr(expr)?;
    Ok((ty, value))
}

/// Resolves, type checks and reduces `expr` to normal form.
#[tracing::instrument(level = "debug", skip_all)]
pub fn interpret_small_step(expr: &mut Expr) -> Result<(Type, Expr), Error> {
    resolver::resolve_expr(expr)?;
    let ty = type_checker::type_check(expr)?;
    let normal = Reducer::new().reduce(expr)?;
    Ok((ty, normal))
}

pub fn render_error(error: &Error) -> String {
    /*
        Error: InvalidOperand (Both operands must be Int)
        -> invalid operands to '+'
           |
           | (1 + true)
    */

    let header = if let ErrorTip::None = error.get_tip() {
        format!("Error: {}", error.get_error_name())
    } else {
        format!("Error: {} ({})", error.get_error_name(), error.get_tip())
    };

    format!(
        "{}\n-> {}\n   |\n   | {}",
        header,
        error.kind(),
        error.get_context()
    )
}

pub fn display_error(error: &Error) {
    eprintln!("{}", render_error(error));
}
