use std::fmt::Display;

use thiserror::Error;

use crate::ast::Expr;

/// Phase an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NameResolution,
    Type,
    Reduction,
    Runtime,
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    /// Debug rendering of the node the failure was detected at.
    context: String,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, context: String) -> Self {
        Error {
            internal_error: error_impl,
            context,
        }
    }

    pub fn at(error_impl: ErrorImpl, expr: &Expr) -> Self {
        Error::new(error_impl, expr.to_display_string())
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_context(&self) -> &str {
        &self.context
    }

    pub fn category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::NameResolution { .. } => ErrorCategory::NameResolution,
            ErrorImpl::InvalidOperand { .. }
            | ErrorImpl::NotAFunction { .. }
            | ErrorImpl::TooFewArguments { .. }
            | ErrorImpl::TooManyArguments { .. }
            | ErrorImpl::ArgumentMismatch { .. }
            | ErrorImpl::NotAReference { .. }
            | ErrorImpl::AssignmentTypeMismatch { .. }
            | ErrorImpl::NotATuple { .. }
            | ErrorImpl::NegativeIndex { .. }
            | ErrorImpl::IndexOutOfBounds { .. }
            | ErrorImpl::NotARecord { .. }
            | ErrorImpl::NoSuchMember { .. }
            | ErrorImpl::NotAVariant { .. }
            | ErrorImpl::NoSuchLabel { .. }
            | ErrorImpl::VariantTypeMismatch { .. }
            | ErrorImpl::NoSuchCaseLabel { .. }
            | ErrorImpl::CaseTypeMismatch { .. }
            | ErrorImpl::EmptyCase
            | ErrorImpl::ConditionalMismatch { .. }
            | ErrorImpl::UntypedDeclaration { .. }
            | ErrorImpl::UnresolvedIdentifier { .. } => ErrorCategory::Type,
            ErrorImpl::ApplicationOfNonFunction
            | ErrorImpl::AlreadyNormal
            | ErrorImpl::StepLimitExceeded { .. } => ErrorCategory::Reduction,
            ErrorImpl::NotCallable { .. }
            | ErrorImpl::InvalidReference { .. }
            | ErrorImpl::UnboundVariable { .. }
            | ErrorImpl::DivisionByZero
            | ErrorImpl::ArithmeticOverflow { .. }
            | ErrorImpl::Malformed { .. } => ErrorCategory::Runtime,
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.category() == ErrorCategory::Type
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::NameResolution { .. } => "NameResolutionError",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::TooFewArguments { .. } => "TooFewArguments",
            ErrorImpl::TooManyArguments { .. } => "TooManyArguments",
            ErrorImpl::ArgumentMismatch { .. } => "ArgumentMismatch",
            ErrorImpl::NotAReference { .. } => "NotAReference",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::NotATuple { .. } => "NotATuple",
            ErrorImpl::NegativeIndex { .. } => "NegativeIndex",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::NotARecord { .. } => "NotARecord",
            ErrorImpl::NoSuchMember { .. } => "NoSuchMember",
            ErrorImpl::NotAVariant { .. } => "NotAVariant",
            ErrorImpl::NoSuchLabel { .. } => "NoSuchLabel",
            ErrorImpl::VariantTypeMismatch { .. } => "VariantTypeMismatch",
            ErrorImpl::NoSuchCaseLabel { .. } => "NoSuchCaseLabel",
            ErrorImpl::CaseTypeMismatch { .. } => "CaseTypeMismatch",
            ErrorImpl::EmptyCase => "EmptyCase",
            ErrorImpl::ConditionalMismatch { .. } => "ConditionalMismatch",
            ErrorImpl::UntypedDeclaration { .. } => "UntypedDeclaration",
            ErrorImpl::UnresolvedIdentifier { .. } => "UnresolvedIdentifier",
            ErrorImpl::ApplicationOfNonFunction => "ApplicationOfNonFunction",
            ErrorImpl::AlreadyNormal => "AlreadyNormal",
            ErrorImpl::StepLimitExceeded { .. } => "StepLimitExceeded",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::InvalidReference { .. } => "InvalidReference",
            ErrorImpl::UnboundVariable { .. } => "UnboundVariable",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::ArithmeticOverflow { .. } => "ArithmeticOverflow",
            ErrorImpl::Malformed { .. } => "Malformed",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::NameResolution { name } => ErrorTip::Suggestion(format!(
                "`{}` is not bound by any enclosing lambda or case arm",
                name
            )),
            ErrorImpl::TooFewArguments { expected, received }
            | ErrorImpl::TooManyArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ArgumentMismatch {
                index,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Argument {} should have type `{}`, received `{}`",
                index, expected, received
            )),
            ErrorImpl::AssignmentTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Right-hand side should have type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::IndexOutOfBounds { index, arity } => ErrorTip::Suggestion(format!(
                "Index {} is out of range for a tuple of {} elements",
                index, arity
            )),
            ErrorImpl::NoSuchMember { member } => {
                ErrorTip::Suggestion(format!("The record has no field `{}`", member))
            }
            ErrorImpl::NoSuchLabel { label } | ErrorImpl::NoSuchCaseLabel { label } => {
                ErrorTip::Suggestion(format!("The variant has no label `{}`", label))
            }
            ErrorImpl::CaseTypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Every arm must have type `{}`, found an arm of type `{}`",
                expected, received
            )),
            ErrorImpl::UntypedDeclaration { name } => ErrorTip::Suggestion(format!(
                "Give `{}` a type where it is declared",
                name
            )),
            ErrorImpl::UnresolvedIdentifier { name } => ErrorTip::Suggestion(format!(
                "Resolve names before type checking (`{}` has no declaration)",
                name
            )),
            ErrorImpl::StepLimitExceeded { limit } => ErrorTip::Suggestion(format!(
                "Reduction did not reach a value within {} steps",
                limit
            )),
            ErrorImpl::Malformed { .. } => ErrorTip::Suggestion(String::from(
                "Type check the expression before evaluating it",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in `{}`", self.internal_error, self.context)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    #[error("name lookup error: {name:?}")]
    NameResolution { name: String },
    #[error("invalid operands to '{op}'")]
    InvalidOperand { op: String },
    #[error("invalid function call: {found} is not a function")]
    NotAFunction { found: String },
    #[error("too few arguments: expected {expected}, received {received}")]
    TooFewArguments { expected: usize, received: usize },
    #[error("too many arguments: expected {expected}, received {received}")]
    TooManyArguments { expected: usize, received: usize },
    #[error("parameter/argument mismatch at {index}: expected {expected}, received {received}")]
    ArgumentMismatch {
        index: usize,
        expected: String,
        received: String,
    },
    #[error("cannot dereference a non-reference of type {found}")]
    NotAReference { found: String },
    #[error("type mismatch in assignment: expected {expected}, received {received}")]
    AssignmentTypeMismatch { expected: String, received: String },
    #[error("operand of type {found} is not a tuple")]
    NotATuple { found: String },
    #[error("negative projection index {index}")]
    NegativeIndex { index: i64 },
    #[error("projection index {index} out of bounds for arity {arity}")]
    IndexOutOfBounds { index: i64, arity: usize },
    #[error("operand of type {found} is not a record")]
    NotARecord { found: String },
    #[error("no such member {member:?}")]
    NoSuchMember { member: String },
    #[error("operand of type {found} is not a variant")]
    NotAVariant { found: String },
    #[error("no matching label {label:?} in variant")]
    NoSuchLabel { label: String },
    #[error("type mismatch in variant {label:?}: expected {expected}, received {received}")]
    VariantTypeMismatch {
        label: String,
        expected: String,
        received: String,
    },
    #[error("no matching case label {label:?} in variant")]
    NoSuchCaseLabel { label: String },
    #[error("case type mismatch: expected {expected}, received {received}")]
    CaseTypeMismatch { expected: String, received: String },
    #[error("case analysis without arms")]
    EmptyCase,
    #[error("conditional mismatch: {message}")]
    ConditionalMismatch { message: String },
    #[error("declaration {name:?} has no type")]
    UntypedDeclaration { name: String },
    #[error("identifier {name:?} has not been resolved")]
    UnresolvedIdentifier { name: String },
    #[error("application of non-lambda")]
    ApplicationOfNonFunction,
    #[error("expression is already a value")]
    AlreadyNormal,
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },
    #[error("cannot apply a non-closure {found} to an argument")]
    NotCallable { found: String },
    #[error("invalid reference {found}")]
    InvalidReference { found: String },
    #[error("unbound variable {name:?}")]
    UnboundVariable { name: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in '{op}'")]
    ArithmeticOverflow { op: String },
    #[error("malformed expression: {message}")]
    Malformed { message: String },
}
