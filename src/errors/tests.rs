//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::ast::Expr;
use crate::errors::errors::{Error, ErrorCategory, ErrorImpl, ErrorTip};

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::NameResolution {
            name: "x".to_string(),
        },
        "x".to_string(),
    );

    assert_eq!(error.get_error_name(), "NameResolutionError");
    assert_eq!(error.category(), ErrorCategory::NameResolution);
}

#[test]
fn test_error_context_is_rendered_expression() {
    let expr = Expr::and(true, false);
    let error = Error::at(ErrorImpl::InvalidOperand { op: "and".to_string() }, &expr);

    assert_eq!(error.get_context(), "(true and false)");
}

#[test]
fn test_invalid_operand_message() {
    let error = Error::new(
        ErrorImpl::InvalidOperand {
            op: "not".to_string(),
        },
        "(not 1)".to_string(),
    );

    assert_eq!(error.kind().to_string(), "invalid operands to 'not'");
    assert_eq!(error.to_string(), "invalid operands to 'not' in `(not 1)`");
}

#[test]
fn test_type_error_categories() {
    let kinds = vec![
        ErrorImpl::TooFewArguments {
            expected: 2,
            received: 1,
        },
        ErrorImpl::TooManyArguments {
            expected: 1,
            received: 2,
        },
        ErrorImpl::NegativeIndex { index: -1 },
        ErrorImpl::IndexOutOfBounds { index: 2, arity: 2 },
        ErrorImpl::NoSuchMember {
            member: "z".to_string(),
        },
        ErrorImpl::CaseTypeMismatch {
            expected: "Int".to_string(),
            received: "Bool".to_string(),
        },
    ];

    for kind in kinds {
        let error = Error::new(kind, String::new());
        assert!(error.is_type_error(), "{} should be a type error", error);
    }
}

#[test]
fn test_reduction_and_runtime_categories() {
    let reduction = Error::new(ErrorImpl::ApplicationOfNonFunction, String::new());
    assert_eq!(reduction.category(), ErrorCategory::Reduction);

    let runtime = Error::new(
        ErrorImpl::NotCallable {
            found: "5".to_string(),
        },
        String::new(),
    );
    assert_eq!(runtime.category(), ErrorCategory::Runtime);
    assert_eq!(runtime.get_error_name(), "NotCallable");
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(ErrorImpl::DivisionByZero, String::new());

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::IndexOutOfBounds { index: 2, arity: 2 },
        String::new(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => {
            assert_eq!(tip, "Index 2 is out of range for a tuple of 2 elements")
        }
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}
