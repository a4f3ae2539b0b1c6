use std::rc::Rc;

use crate::{
    ast::{BinaryOp, Expr, ExprKind, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    stack::ensure_sufficient_stack,
};

use super::{
    environment::{Environment, Heap},
    value::{Closure, Value},
};

/// Big-step interpreter owning the heap shared by every evaluation it runs.
#[derive(Debug, Default)]
pub struct Evaluator {
    pub heap: Heap,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    pub fn evaluate(&mut self, expr: &Expr, env: &Environment) -> Result<Value, Error> {
        evaluate(expr, env, &mut self.heap)
    }
}

fn malformed(message: impl Into<String>, expr: &Expr) -> Error {
    Error::at(
        ErrorImpl::Malformed {
            message: message.into(),
        },
        expr,
    )
}

fn expect_bool(value: &Value, expr: &Expr) -> Result<bool, Error> {
    value
        .as_bool()
        .ok_or_else(|| malformed(format!("expected a boolean, found {}", value), expr))
}

fn expect_int(value: &Value, expr: &Expr) -> Result<i64, Error> {
    value
        .as_int()
        .ok_or_else(|| malformed(format!("expected an integer, found {}", value), expr))
}

/// Applies an arithmetic operator, failing on division by zero and overflow.
pub(crate) fn apply_arithmetic(op: BinaryOp, lhs: i64, rhs: i64, expr: &Expr) -> Result<i64, Error> {
    if matches!(op, BinaryOp::Div | BinaryOp::Rem) && rhs == 0 {
        return Err(Error::at(ErrorImpl::DivisionByZero, expr));
    }

    let result = match op {
        BinaryOp::Add => lhs.checked_add(rhs),
        BinaryOp::Sub => lhs.checked_sub(rhs),
        BinaryOp::Mul => lhs.checked_mul(rhs),
        BinaryOp::Div => lhs.checked_div(rhs),
        BinaryOp::Rem => lhs.checked_rem(rhs),
        _ => return Err(malformed(format!("'{}' is not arithmetic", op), expr)),
    };
    result.ok_or_else(|| {
        Error::at(
            ErrorImpl::ArithmeticOverflow {
                op: op.symbol().to_string(),
            },
            expr,
        )
    })
}

/// Applies an ordering operator to two integers.
pub(crate) fn apply_ordering(op: BinaryOp, lhs: i64, rhs: i64, expr: &Expr) -> Result<bool, Error> {
    match op {
        BinaryOp::Lt => Ok(lhs < rhs),
        BinaryOp::Gt => Ok(lhs > rhs),
        BinaryOp::Le => Ok(lhs <= rhs),
        BinaryOp::Ge => Ok(lhs >= rhs),
        _ => Err(malformed(format!("'{}' is not an ordering", op), expr)),
    }
}

/// Evaluates `expr` in `env`, allocating and updating cells in `heap`.
///
/// Both operands of every binary operator are evaluated, left to right;
/// `and` and `or` do not short-circuit.
pub fn evaluate(expr: &Expr, env: &Environment, heap: &mut Heap) -> Result<Value, Error> {
    ensure_sufficient_stack(|| evaluate_node(expr, env, heap))
}

fn evaluate_node(expr: &Expr, env: &Environment, heap: &mut Heap) -> Result<Value, Error> {
    tracing::trace!(expr = %expr, "evaluating node");
    match &expr.kind {
        ExprKind::Bool(value) => Ok(Value::Bool(*value)),
        ExprKind::Int(value) => Ok(Value::Int(*value)),
        ExprKind::Unit => Ok(Value::Unit),
        ExprKind::Id(identifier) => identifier
            .decl
            .as_ref()
            .and_then(|decl| env.get(decl))
            .cloned()
            .ok_or_else(|| {
                Error::at(
                    ErrorImpl::UnboundVariable {
                        name: identifier.name.clone(),
                    },
                    expr,
                )
            }),
        ExprKind::Unary { op, operand } => {
            let value = evaluate(operand, env, heap)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!expect_bool(&value, expr)?)),
                UnaryOp::Neg => expect_int(&value, expr)?
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| {
                        Error::at(
                            ErrorImpl::ArithmeticOverflow {
                                op: op.symbol().to_string(),
                            },
                            expr,
                        )
                    }),
            }
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, env, heap)?;
            let rhs = evaluate(rhs, env, heap)?;
            match op {
                BinaryOp::And => Ok(Value::Bool(expect_bool(&lhs, expr)? && expect_bool(&rhs, expr)?)),
                BinaryOp::Or => Ok(Value::Bool(expect_bool(&lhs, expr)? || expect_bool(&rhs, expr)?)),
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                    apply_arithmetic(*op, expect_int(&lhs, expr)?, expect_int(&rhs, expr)?, expr)
                        .map(Value::Int)
                }
                BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
                BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
                BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                    apply_ordering(*op, expect_int(&lhs, expr)?, expect_int(&rhs, expr)?, expr)
                        .map(Value::Bool)
                }
            }
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            if expect_bool(&evaluate(cond, env, heap)?, expr)? {
                evaluate(then_branch, env, heap)
            } else {
                evaluate(else_branch, env, heap)
            }
        }
        ExprKind::Lambda(lambda) => Ok(Value::Closure(Closure {
            lambda: Rc::clone(lambda),
            env: env.clone(),
        })),
        ExprKind::Call { callee, args } => {
            let closure = match evaluate(callee, env, heap)? {
                Value::Closure(closure) => closure,
                other => {
                    return Err(Error::at(
                        ErrorImpl::NotCallable {
                            found: other.to_string(),
                        },
                        expr,
                    ))
                }
            };

            let mut values = vec![];
            for arg in args.iter() {
                values.push(evaluate(arg, env, heap)?);
            }
            if values.len() != closure.lambda.params.len() {
                return Err(malformed(
                    format!(
                        "closure expects {} arguments, received {}",
                        closure.lambda.params.len(),
                        values.len()
                    ),
                    expr,
                ));
            }

            let activation = closure.env.extend(closure.lambda.params.iter().zip(values));
            evaluate(&closure.lambda.body, &activation, heap)
        }
        ExprKind::New(value) => {
            let value = evaluate(value, env, heap)?;
            Ok(Value::Location(heap.alloc(value)))
        }
        ExprKind::Deref(reference) => match evaluate(reference, env, heap)? {
            Value::Location(index) => heap.get(index).cloned().ok_or_else(|| {
                Error::at(
                    ErrorImpl::InvalidReference {
                        found: format!("@{}", index),
                    },
                    expr,
                )
            }),
            other => Err(Error::at(
                ErrorImpl::InvalidReference {
                    found: other.to_string(),
                },
                expr,
            )),
        },
        ExprKind::Assign { lhs, rhs } => {
            let value = evaluate(rhs, env, heap)?;
            match evaluate(lhs, env, heap)? {
                Value::Location(index) if heap.set(index, value) => Ok(Value::Unit),
                other => Err(Error::at(
                    ErrorImpl::InvalidReference {
                        found: other.to_string(),
                    },
                    expr,
                )),
            }
        }
        ExprKind::Loc(index) => Ok(Value::Location(*index)),
        ExprKind::Tuple(elems) => {
            let mut values = vec![];
            for elem in elems.iter() {
                values.push(evaluate(elem, env, heap)?);
            }
            Ok(Value::Tuple(values))
        }
        ExprKind::Proj { tuple, index } => match evaluate(tuple, env, heap)? {
            Value::Tuple(mut values) => usize::try_from(*index)
                .ok()
                .filter(|position| *position < values.len())
                .map(|position| values.swap_remove(position))
                .ok_or_else(|| malformed(format!("no element {} in tuple", index), expr)),
            other => Err(malformed(format!("expected a tuple, found {}", other), expr)),
        },
        ExprKind::Record(fields) => {
            let mut values = vec![];
            for field in fields.iter() {
                values.push((field.name.clone(), evaluate(&field.value, env, heap)?));
            }
            Ok(Value::Record(values))
        }
        ExprKind::Member { record, name, .. } => {
            let record = evaluate(record, env, heap)?;
            record
                .get_field(name)
                .cloned()
                .ok_or_else(|| malformed(format!("no field {} in {}", name, record), expr))
        }
        ExprKind::Variant { tag, payload, .. } => {
            let payload = evaluate(payload, env, heap)?;
            Ok(Value::Variant(tag.clone(), Box::new(payload)))
        }
        ExprKind::Case { scrutinee, arms } => {
            let (tag, payload) = match evaluate(scrutinee, env, heap)? {
                Value::Variant(tag, payload) => (tag, payload),
                other => {
                    return Err(malformed(format!("expected a variant, found {}", other), expr))
                }
            };
            let arm = arms
                .iter()
                .find(|arm| arm.tag == tag)
                .ok_or_else(|| malformed(format!("no arm for label {}", tag), expr))?;

            let activation = env.extend([(&arm.var, *payload)]);
            evaluate(&arm.body, &activation, heap)
        }
    }
}

/// Evaluates a closed expression with an empty environment and a fresh heap.
#[tracing::instrument(level = "debug", skip_all)]
pub fn evaluate_expr(expr: &Expr) -> Result<Value, Error> {
    let mut evaluator = Evaluator::new();
    let value = evaluator.evaluate(expr, &Environment::new())?;
    tracing::debug!(value = %value, cells = evaluator.heap.len(), "evaluated");
    Ok(value)
}
