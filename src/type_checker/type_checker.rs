use crate::{
    ast::{BinaryOp, Expr, ExprKind, OperatorClass, Type, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    stack::ensure_sufficient_stack,
};

/// How the right-hand side of `lhs = rhs` is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentRule {
    /// `lhs : Ref T` and `rhs : Ref T`.
    #[default]
    ReferenceToReference,
    /// `lhs : Ref T` and `rhs : T`.
    ReferenceToValue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckerOptions {
    pub assignment_rule: AssignmentRule,
}

#[derive(Debug, Default)]
pub struct TypeChecker {
    pub options: CheckerOptions,
    /// Number of nodes whose type was computed rather than read from the memo.
    rules_applied: usize,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker::default()
    }

    pub fn with_options(options: CheckerOptions) -> Self {
        TypeChecker {
            options,
            rules_applied: 0,
        }
    }

    pub fn rules_applied(&self) -> usize {
        self.rules_applied
    }

    /// Returns the type of `expr`, computing it at most once per node.
    pub fn check(&mut self, expr: &Expr) -> Result<Type, Error> {
        if let Some(ty) = expr.computed_type() {
            return Ok(ty.clone());
        }

        let ty = ensure_sufficient_stack(|| self.check_node(expr))?;
        self.rules_applied += 1;
        tracing::trace!(expr = %expr, ty = %ty, "checked node");
        Ok(expr.set_computed_type(ty).clone())
    }

    fn check_node(&mut self, expr: &Expr) -> Result<Type, Error> {
        match &expr.kind {
            ExprKind::Bool(_) => Ok(Type::Bool),
            ExprKind::Int(_) => Ok(Type::Int),
            ExprKind::Unit => Ok(Type::Unit),
            ExprKind::Id(identifier) => {
                let decl = identifier.decl.as_ref().ok_or_else(|| {
                    Error::at(
                        ErrorImpl::UnresolvedIdentifier {
                            name: identifier.name.clone(),
                        },
                        expr,
                    )
                })?;
                decl.get_type().ok_or_else(|| {
                    Error::at(
                        ErrorImpl::UntypedDeclaration {
                            name: decl.name().to_string(),
                        },
                        expr,
                    )
                })
            }
            ExprKind::Unary { op, operand } => {
                let operand_type = self.check(operand)?;
                let expected = match op {
                    UnaryOp::Not => Type::Bool,
                    UnaryOp::Neg => Type::Int,
                };
                if operand_type != expected {
                    return Err(invalid_operand(op.symbol(), expr));
                }
                Ok(expected)
            }
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(*op, lhs, rhs, expr),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond_type = self.check(cond)?;
                if !cond_type.is_bool() {
                    return Err(Error::at(
                        ErrorImpl::ConditionalMismatch {
                            message: format!("condition has type {}, expected Bool", cond_type),
                        },
                        expr,
                    ));
                }
                let then_type = self.check(then_branch)?;
                let else_type = self.check(else_branch)?;
                if then_type != else_type {
                    return Err(Error::at(
                        ErrorImpl::ConditionalMismatch {
                            message: format!("branches have types {} and {}", then_type, else_type),
                        },
                        expr,
                    ));
                }
                Ok(then_type)
            }
            ExprKind::Lambda(lambda) => {
                let mut params = vec![];
                for param in lambda.params.iter() {
                    let ty = param.get_type().ok_or_else(|| {
                        Error::at(
                            ErrorImpl::UntypedDeclaration {
                                name: param.name().to_string(),
                            },
                            expr,
                        )
                    })?;
                    params.push(ty);
                }
                let ret = self.check(&lambda.body)?;
                Ok(Type::function(params, ret))
            }
            ExprKind::Call { callee, args } => {
                let (params, ret) = match self.check(callee)? {
                    Type::Function { params, ret } => (params, ret),
                    other => {
                        return Err(Error::at(
                            ErrorImpl::NotAFunction {
                                found: other.to_string(),
                            },
                            expr,
                        ))
                    }
                };

                if args.len() < params.len() {
                    return Err(Error::at(
                        ErrorImpl::TooFewArguments {
                            expected: params.len(),
                            received: args.len(),
                        },
                        expr,
                    ));
                } else if args.len() > params.len() {
                    return Err(Error::at(
                        ErrorImpl::TooManyArguments {
                            expected: params.len(),
                            received: args.len(),
                        },
                        expr,
                    ));
                }

                for (index, (arg, param)) in args.iter().zip(params.iter()).enumerate() {
                    let arg_type = self.check(arg)?;
                    if &arg_type != param {
                        return Err(Error::at(
                            ErrorImpl::ArgumentMismatch {
                                index,
                                expected: param.to_string(),
                                received: arg_type.to_string(),
                            },
                            arg,
                        ));
                    }
                }

                Ok(*ret)
            }
            ExprKind::New(value) => Ok(Type::reference(self.check(value)?)),
            ExprKind::Deref(reference) => match self.check(reference)? {
                Type::Reference(inner) => Ok(*inner),
                other => Err(Error::at(
                    ErrorImpl::NotAReference {
                        found: other.to_string(),
                    },
                    expr,
                )),
            },
            ExprKind::Assign { lhs, rhs } => {
                let lhs_type = self.check(lhs)?;
                let referent = match lhs_type.referent() {
                    Some(referent) => referent.clone(),
                    None => {
                        return Err(Error::at(
                            ErrorImpl::NotAReference {
                                found: lhs_type.to_string(),
                            },
                            expr,
                        ))
                    }
                };

                let rhs_type = self.check(rhs)?;
                let expected = match self.options.assignment_rule {
                    AssignmentRule::ReferenceToReference => lhs_type,
                    AssignmentRule::ReferenceToValue => referent,
                };
                if rhs_type != expected {
                    return Err(Error::at(
                        ErrorImpl::AssignmentTypeMismatch {
                            expected: expected.to_string(),
                            received: rhs_type.to_string(),
                        },
                        expr,
                    ));
                }
                Ok(Type::Unit)
            }
            ExprKind::Loc(_) => Err(Error::at(
                ErrorImpl::Malformed {
                    message: String::from("heap locations have no static type"),
                },
                expr,
            )),
            ExprKind::Tuple(elems) => {
                let mut types = vec![];
                for elem in elems.iter() {
                    types.push(self.check(elem)?);
                }
                Ok(Type::Tuple(types))
            }
            ExprKind::Proj { tuple, index } => {
                let elems = match self.check(tuple)? {
                    Type::Tuple(elems) => elems,
                    other => {
                        return Err(Error::at(
                            ErrorImpl::NotATuple {
                                found: other.to_string(),
                            },
                            expr,
                        ))
                    }
                };
                if *index < 0 {
                    return Err(Error::at(ErrorImpl::NegativeIndex { index: *index }, expr));
                }
                usize::try_from(*index)
                    .ok()
                    .and_then(|position| elems.get(position).cloned())
                    .ok_or_else(|| {
                        Error::at(
                            ErrorImpl::IndexOutOfBounds {
                                index: *index,
                                arity: elems.len(),
                            },
                            expr,
                        )
                    })
            }
            ExprKind::Record(fields) => {
                let mut types = vec![];
                for field in fields.iter() {
                    types.push((field.name.clone(), self.check(&field.value)?));
                }
                Ok(Type::record(types))
            }
            ExprKind::Member {
                record,
                name,
                field,
            } => {
                let record_type = self.check(record)?;
                if !matches!(record_type, Type::Record(_)) {
                    return Err(Error::at(
                        ErrorImpl::NotARecord {
                            found: record_type.to_string(),
                        },
                        expr,
                    ));
                }
                let (position, ty) = record_type.get_field(name).ok_or_else(|| {
                    Error::at(
                        ErrorImpl::NoSuchMember {
                            member: name.clone(),
                        },
                        expr,
                    )
                })?;
                let _ = field.set(position);
                Ok(ty.clone())
            }
            ExprKind::Variant { tag, payload, ty } => {
                let payload_type = self.check(payload)?;
                if !matches!(ty, Type::Variant(_)) {
                    return Err(Error::at(
                        ErrorImpl::NotAVariant {
                            found: ty.to_string(),
                        },
                        expr,
                    ));
                }
                let (_, declared) = ty.get_field(tag).ok_or_else(|| {
                    Error::at(ErrorImpl::NoSuchLabel { label: tag.clone() }, expr)
                })?;
                if &payload_type != declared {
                    return Err(Error::at(
                        ErrorImpl::VariantTypeMismatch {
                            label: tag.clone(),
                            expected: declared.to_string(),
                            received: payload_type.to_string(),
                        },
                        expr,
                    ));
                }
                Ok(ty.clone())
            }
            ExprKind::Case { scrutinee, arms } => {
                let variant = self.check(scrutinee)?;
                if !matches!(variant, Type::Variant(_)) {
                    return Err(Error::at(
                        ErrorImpl::NotAVariant {
                            found: variant.to_string(),
                        },
                        expr,
                    ));
                }

                let mut result: Option<Type> = None;
                for arm in arms.iter() {
                    let (_, field_type) = variant.get_field(&arm.tag).ok_or_else(|| {
                        Error::at(
                            ErrorImpl::NoSuchCaseLabel {
                                label: arm.tag.clone(),
                            },
                            expr,
                        )
                    })?;
                    arm.var.set_type(field_type.clone());

                    let arm_type = self.check(&arm.body)?;
                    if let Some(expected) = &result {
                        if *expected != arm_type {
                            return Err(Error::at(
                                ErrorImpl::CaseTypeMismatch {
                                    expected: expected.to_string(),
                                    received: arm_type.to_string(),
                                },
                                &arm.body,
                            ));
                        }
                    } else {
                        result = Some(arm_type);
                    }
                }

                result.ok_or_else(|| Error::at(ErrorImpl::EmptyCase, expr))
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        expr: &Expr,
    ) -> Result<Type, Error> {
        let lhs_type = self.check(lhs)?;
        let rhs_type = self.check(rhs)?;

        let valid = match op.class() {
            OperatorClass::Logical => lhs_type.is_bool() && rhs_type.is_bool(),
            OperatorClass::Arithmetic | OperatorClass::Ordering => {
                lhs_type.is_int() && rhs_type.is_int()
            }
            OperatorClass::Equality => lhs_type == rhs_type,
        };
        if !valid {
            return Err(invalid_operand(op.symbol(), expr));
        }

        Ok(match op.class() {
            OperatorClass::Arithmetic => Type::Int,
            OperatorClass::Logical | OperatorClass::Equality | OperatorClass::Ordering => {
                Type::Bool
            }
        })
    }
}

fn invalid_operand(op: &str, expr: &Expr) -> Error {
    Error::at(ErrorImpl::InvalidOperand { op: op.to_string() }, expr)
}

/// Type checks `expr` with an existing checker.
pub fn type_check_expr(type_checker: &mut TypeChecker, expr: &Expr) -> Result<Type, Error> {
    type_checker.check(expr)
}

/// Type checks a resolved expression with the default options.
#[tracing::instrument(level = "debug", skip_all)]
pub fn type_check(expr: &Expr) -> Result<Type, Error> {
    let mut type_checker = TypeChecker::new();
    let ty = type_checker.check(expr)?;
    tracing::debug!(ty = %ty, nodes = type_checker.rules_applied(), "type checked");
    Ok(ty)
}
