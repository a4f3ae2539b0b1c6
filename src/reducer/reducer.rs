use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{BinaryOp, Expr, ExprKind, FieldInit, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    interpreter::{
        evaluator::{apply_arithmetic, apply_ordering},
        Closure, Environment, Value,
    },
    stack::ensure_sufficient_stack,
};

use super::substitute::substitute;

/// Whether `expr` is in normal form: no rule of [`Reducer::step`] applies to it.
pub fn is_value(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Unit
        | ExprKind::Lambda(_)
        | ExprKind::Loc(_) => true,
        ExprKind::Tuple(elems) => elems.iter().all(is_value),
        ExprKind::Record(fields) => fields.iter().all(|field| is_value(&field.value)),
        ExprKind::Variant { payload, .. } => is_value(payload),
        _ => false,
    }
}

/// Converts a normal-form expression into the runtime value it denotes.
///
/// A lambda becomes a closure over the empty environment; a location becomes
/// a heap location with the same index.
pub fn to_value(expr: &Expr) -> Result<Value, Error> {
    let value = match &expr.kind {
        ExprKind::Bool(value) => Value::Bool(*value),
        ExprKind::Int(value) => Value::Int(*value),
        ExprKind::Unit => Value::Unit,
        ExprKind::Lambda(lambda) => Value::Closure(Closure {
            lambda: Rc::clone(lambda),
            env: Environment::new(),
        }),
        ExprKind::Loc(index) => Value::Location(*index),
        ExprKind::Tuple(elems) => Value::Tuple(elems.iter().map(to_value).collect::<Result<_, _>>()?),
        ExprKind::Record(fields) => Value::Record(
            fields
                .iter()
                .map(|field| -> Result<(String, Value), Error> {
                    Ok((field.name.clone(), to_value(&field.value)?))
                })
                .collect::<Result<_, _>>()?,
        ),
        ExprKind::Variant { tag, payload, .. } => {
            Value::Variant(tag.clone(), Box::new(to_value(payload)?))
        }
        _ => return Err(malformed("expression is not a value", expr)),
    };
    Ok(value)
}

fn malformed(message: impl Into<String>, expr: &Expr) -> Error {
    Error::at(
        ErrorImpl::Malformed {
            message: message.into(),
        },
        expr,
    )
}

fn expect_bool(expr: &Expr, context: &Expr) -> Result<bool, Error> {
    match &expr.kind {
        ExprKind::Bool(value) => Ok(*value),
        _ => Err(malformed(format!("expected a boolean, found {}", expr), context)),
    }
}

fn expect_int(expr: &Expr, context: &Expr) -> Result<i64, Error> {
    match &expr.kind {
        ExprKind::Int(value) => Ok(*value),
        _ => Err(malformed(format!("expected an integer, found {}", expr), context)),
    }
}

fn boxed(expr: Expr) -> Box<Expr> {
    Box::new(expr)
}

/// Small-step reducer
///
/// Rewrites one redex per [`step`](Reducer::step), left to right and call by
/// value. Reference cells created by `new` live in the reducer's store and
/// appear in the tree as locations, so one reducer must drive a whole
/// reduction sequence.
#[derive(Debug, Default)]
pub struct Reducer {
    store: Vec<Expr>,
    step_limit: Option<usize>,
    steps: usize,
}

impl Reducer {
    pub fn new() -> Self {
        Reducer::default()
    }

    /// A reducer that fails with `StepLimitExceeded` instead of taking more
    /// than `limit` steps.
    pub fn with_step_limit(limit: usize) -> Self {
        Reducer {
            step_limit: Some(limit),
            ..Reducer::default()
        }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Contents of the reference cells allocated so far, by location.
    pub fn store(&self) -> &[Expr] {
        &self.store
    }

    /// Performs exactly one rewrite of `expr`.
    pub fn step(&mut self, expr: &Expr) -> Result<Expr, Error> {
        if is_value(expr) {
            return Err(Error::at(ErrorImpl::AlreadyNormal, expr));
        }
        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                return Err(Error::at(ErrorImpl::StepLimitExceeded { limit }, expr));
            }
        }

        let next = self.step_inner(expr)?;
        self.steps += 1;
        tracing::trace!(step = self.steps, expr = %next);
        Ok(next)
    }

    /// Steps `expr` until it is a value.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn reduce(&mut self, expr: &Expr) -> Result<Expr, Error> {
        let mut current = expr.clone();
        while !is_value(&current) {
            current = self.step(&current)?;
        }
        tracing::debug!(steps = self.steps, result = %current, "reduced");
        Ok(current)
    }

    fn step_inner(&mut self, expr: &Expr) -> Result<Expr, Error> {
        ensure_sufficient_stack(|| self.step_node(expr))
    }

    /// Steps the leftmost non-value among `exprs`, if any.
    fn step_first(&mut self, exprs: &[Expr]) -> Result<Option<Vec<Expr>>, Error> {
        match exprs.iter().position(|expr| !is_value(expr)) {
            Some(position) => {
                let mut next = exprs.to_vec();
                next[position] = self.step_inner(&exprs[position])?;
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }

    fn step_node(&mut self, expr: &Expr) -> Result<Expr, Error> {
        let kind = match &expr.kind {
            ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::Unit
            | ExprKind::Lambda(_)
            | ExprKind::Loc(_) => return Err(Error::at(ErrorImpl::AlreadyNormal, expr)),
            ExprKind::Id(identifier) => {
                return Err(Error::at(
                    ErrorImpl::UnboundVariable {
                        name: identifier.name.clone(),
                    },
                    expr,
                ))
            }
            ExprKind::Unary { op, operand } if !is_value(operand) => ExprKind::Unary {
                op: *op,
                operand: boxed(self.step_inner(operand)?),
            },
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => ExprKind::Bool(!expect_bool(operand, expr)?),
                UnaryOp::Neg => ExprKind::Int(expect_int(operand, expr)?.checked_neg().ok_or_else(
                    || {
                        Error::at(
                            ErrorImpl::ArithmeticOverflow {
                                op: op.symbol().to_string(),
                            },
                            expr,
                        )
                    },
                )?),
            },
            ExprKind::Binary { op, lhs, rhs } if !is_value(lhs) => ExprKind::Binary {
                op: *op,
                lhs: boxed(self.step_inner(lhs)?),
                rhs: rhs.clone(),
            },
            ExprKind::Binary { op, lhs, rhs } if !is_value(rhs) => ExprKind::Binary {
                op: *op,
                lhs: lhs.clone(),
                rhs: boxed(self.step_inner(rhs)?),
            },
            ExprKind::Binary { op, lhs, rhs } => fold_binary(*op, lhs, rhs, expr)?,
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } if !is_value(cond) => ExprKind::If {
                cond: boxed(self.step_inner(cond)?),
                then_branch: then_branch.clone(),
                else_branch: else_branch.clone(),
            },
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                return Ok(if expect_bool(cond, expr)? {
                    then_branch.as_ref().clone()
                } else {
                    else_branch.as_ref().clone()
                })
            }
            ExprKind::Call { callee, args } if !is_value(callee) => ExprKind::Call {
                callee: boxed(self.step_inner(callee)?),
                args: args.clone(),
            },
            ExprKind::Call { callee, args } => {
                if let Some(args) = self.step_first(args)? {
                    ExprKind::Call {
                        callee: callee.clone(),
                        args,
                    }
                } else {
                    return apply(callee, args, expr);
                }
            }
            ExprKind::New(inner) if !is_value(inner) => {
                ExprKind::New(boxed(self.step_inner(inner)?))
            }
            ExprKind::New(inner) => {
                self.store.push(inner.as_ref().clone());
                let index = self.store.len() - 1;
                tracing::trace!(index, "allocated store cell");
                ExprKind::Loc(index)
            }
            ExprKind::Deref(inner) if !is_value(inner) => {
                ExprKind::Deref(boxed(self.step_inner(inner)?))
            }
            ExprKind::Deref(inner) => {
                return match &inner.kind {
                    ExprKind::Loc(index) => self.store.get(*index).cloned().ok_or_else(|| {
                        Error::at(
                            ErrorImpl::InvalidReference {
                                found: inner.to_string(),
                            },
                            expr,
                        )
                    }),
                    _ => Err(Error::at(
                        ErrorImpl::InvalidReference {
                            found: inner.to_string(),
                        },
                        expr,
                    )),
                }
            }
            ExprKind::Assign { lhs, rhs } if !is_value(lhs) => ExprKind::Assign {
                lhs: boxed(self.step_inner(lhs)?),
                rhs: rhs.clone(),
            },
            ExprKind::Assign { lhs, rhs } if !is_value(rhs) => ExprKind::Assign {
                lhs: lhs.clone(),
                rhs: boxed(self.step_inner(rhs)?),
            },
            ExprKind::Assign { lhs, rhs } => {
                let cell = match &lhs.kind {
                    ExprKind::Loc(index) => self.store.get_mut(*index),
                    _ => None,
                };
                match cell {
                    Some(cell) => {
                        *cell = rhs.as_ref().clone();
                        tracing::trace!(location = %lhs, value = %rhs, "assigned store cell");
                        ExprKind::Unit
                    }
                    None => {
                        return Err(Error::at(
                            ErrorImpl::InvalidReference {
                                found: lhs.to_string(),
                            },
                            expr,
                        ))
                    }
                }
            }
            ExprKind::Tuple(elems) => match self.step_first(elems)? {
                Some(elems) => ExprKind::Tuple(elems),
                None => return Err(Error::at(ErrorImpl::AlreadyNormal, expr)),
            },
            ExprKind::Proj { tuple, index } if !is_value(tuple) => ExprKind::Proj {
                tuple: boxed(self.step_inner(tuple)?),
                index: *index,
            },
            ExprKind::Proj { tuple, index } => {
                return match &tuple.kind {
                    ExprKind::Tuple(elems) => usize::try_from(*index)
                        .ok()
                        .and_then(|position| elems.get(position))
                        .cloned()
                        .ok_or_else(|| malformed(format!("no element {} in tuple", index), expr)),
                    _ => Err(malformed(format!("expected a tuple, found {}", tuple), expr)),
                }
            }
            ExprKind::Record(fields) => {
                let values = fields
                    .iter()
                    .map(|field| field.value.clone())
                    .collect::<Vec<Expr>>();
                match self.step_first(&values)? {
                    Some(values) => ExprKind::Record(
                        fields
                            .iter()
                            .zip(values)
                            .map(|(field, value)| FieldInit {
                                name: field.name.clone(),
                                value,
                            })
                            .collect(),
                    ),
                    None => return Err(Error::at(ErrorImpl::AlreadyNormal, expr)),
                }
            }
            ExprKind::Member {
                record,
                name,
                field,
            } if !is_value(record) => ExprKind::Member {
                record: boxed(self.step_inner(record)?),
                name: name.clone(),
                field: field.clone(),
            },
            ExprKind::Member { record, name, .. } => {
                return match &record.kind {
                    ExprKind::Record(fields) => fields
                        .iter()
                        .find(|field| &field.name == name)
                        .map(|field| field.value.clone())
                        .ok_or_else(|| malformed(format!("no field {} in {}", name, record), expr)),
                    _ => Err(malformed(format!("expected a record, found {}", record), expr)),
                }
            }
            ExprKind::Variant { tag, payload, ty } => ExprKind::Variant {
                tag: tag.clone(),
                payload: boxed(self.step_inner(payload)?),
                ty: ty.clone(),
            },
            ExprKind::Case { scrutinee, arms } if !is_value(scrutinee) => ExprKind::Case {
                scrutinee: boxed(self.step_inner(scrutinee)?),
                arms: arms.clone(),
            },
            ExprKind::Case { scrutinee, arms } => {
                let (tag, payload) = match &scrutinee.kind {
                    ExprKind::Variant { tag, payload, .. } => (tag, payload),
                    _ => {
                        return Err(malformed(
                            format!("expected a variant, found {}", scrutinee),
                            expr,
                        ))
                    }
                };
                let arm = arms
                    .iter()
                    .find(|arm| &arm.tag == tag)
                    .ok_or_else(|| malformed(format!("no arm for label {}", tag), expr))?;

                let bindings = HashMap::from([(arm.var.id(), payload.as_ref().clone())]);
                return Ok(substitute(&arm.body, &bindings));
            }
        };
        Ok(Expr::new(kind))
    }
}

/// Folds a binary operator whose operands are both values.
fn fold_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, expr: &Expr) -> Result<ExprKind, Error> {
    let kind = match op {
        BinaryOp::And => ExprKind::Bool(expect_bool(lhs, expr)? && expect_bool(rhs, expr)?),
        BinaryOp::Or => ExprKind::Bool(expect_bool(lhs, expr)? || expect_bool(rhs, expr)?),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            ExprKind::Int(apply_arithmetic(
                op,
                expect_int(lhs, expr)?,
                expect_int(rhs, expr)?,
                expr,
            )?)
        }
        BinaryOp::Eq => ExprKind::Bool(to_value(lhs)? == to_value(rhs)?),
        BinaryOp::Ne => ExprKind::Bool(to_value(lhs)? != to_value(rhs)?),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => ExprKind::Bool(
            apply_ordering(op, expect_int(lhs, expr)?, expect_int(rhs, expr)?, expr)?,
        ),
    };
    Ok(kind)
}

/// Beta-reduces a call whose callee and arguments are all values.
fn apply(callee: &Expr, args: &[Expr], expr: &Expr) -> Result<Expr, Error> {
    let lambda = match &callee.kind {
        ExprKind::Lambda(lambda) => lambda,
        _ => return Err(Error::at(ErrorImpl::ApplicationOfNonFunction, expr)),
    };

    let (expected, received) = (lambda.params.len(), args.len());
    if received < expected {
        return Err(Error::at(
            ErrorImpl::TooFewArguments { expected, received },
            expr,
        ));
    }
    if received > expected {
        return Err(Error::at(
            ErrorImpl::TooManyArguments { expected, received },
            expr,
        ));
    }

    let bindings = lambda
        .params
        .iter()
        .map(|param| param.id())
        .zip(args.iter().cloned())
        .collect::<HashMap<_, _>>();
    Ok(substitute(&lambda.body, &bindings))
}

/// Performs one rewrite of `expr` with a fresh reducer.
///
/// Dereferencing a location requires the store of the reducer that created
/// it; drive whole reductions through a single [`Reducer`] instead.
pub fn step(expr: &Expr) -> Result<Expr, Error> {
    Reducer::new().step(expr)
}

/// Reduces `expr` to normal form with a fresh, unbounded reducer.
pub fn reduce(expr: &Expr) -> Result<Expr, Error> {
    Reducer::new().reduce(expr)
}
