//! Restricted arithmetic and boolean expressions.
//!
//! Text is tokenized, parsed into a closed [`Expr`] tree, checked against the
//! requested [`ExprKind`] and only then evaluated. Names, calls, attribute
//! access and every other construct outside the grammar are rejected.

mod ast;
mod check;
mod eval;
mod lexer;
mod parser;

use std::fmt;

use dl_core::{DialogueError, Number};

pub use ast::{BinaryOp, BoolOp, CompareOp, Expr, UnaryOp};
pub use check::check_kind;
pub use eval::Evaluator;
pub use parser::{parse_expression, MAX_NESTING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    Boolean,
    Numeric,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Numeric => f.write_str("numeric"),
        }
    }
}

pub(crate) fn syntax_error(source: &str, message: impl Into<String>) -> DialogueError {
    DialogueError::invalid_expression("EXPR_SYNTAX", message, source)
}

fn parse_checked(text: &str, kind: ExprKind) -> Result<Expr, DialogueError> {
    let expr = parse_expression(text)?;
    check_kind(&expr, kind, text)?;
    Ok(expr)
}

pub fn evaluate_as_boolean(text: &str) -> Result<bool, DialogueError> {
    let expr = parse_checked(text, ExprKind::Boolean)?;
    Evaluator::new(text).eval_bool(&expr)
}

pub fn evaluate_as_number(text: &str) -> Result<Number, DialogueError> {
    let expr = parse_checked(text, ExprKind::Numeric)?;
    Evaluator::new(text).eval_num(&expr)
}

/// Syntax and kind validation only; nothing is evaluated.
pub fn is_well_formed(text: &str, kind: ExprKind) -> bool {
    parse_checked(text, kind).is_ok()
}

#[cfg(test)]
mod lib_tests {
    use super::*;
    use proptest::prelude::*;

    fn arithmetic() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            (-1_000_i64..1_000).prop_map(|value| value.to_string()),
            (-100.0_f64..100.0).prop_map(|value| format!("{:.3}", value)),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            (inner.clone(), prop::sample::select(vec!["+", "-", "*", "/", "%"]), inner)
                .prop_map(|(left, op, right)| format!("({} {} {})", left, op, right))
        })
    }

    proptest! {
        #[test]
        fn evaluate_as_number_is_deterministic(source in arithmetic()) {
            prop_assert!(is_well_formed(&source, ExprKind::Numeric));
            let first = evaluate_as_number(&source);
            let second = evaluate_as_number(&source);
            prop_assert_eq!(format!("{:?}", first), format!("{:?}", second));
        }
    }

    #[test]
    fn number_propagation_matches_operand_kinds() {
        assert_eq!(
            evaluate_as_number("3/2").expect("eval should pass"),
            Number::Float(1.5)
        );
        assert_eq!(
            evaluate_as_number("3+2").expect("eval should pass"),
            Number::Int(5)
        );
        assert_eq!(
            evaluate_as_number("3.0+2").expect("eval should pass"),
            Number::Float(5.0)
        );
        assert_eq!(
            evaluate_as_number("(3+2)*2").expect("eval should pass"),
            Number::Int(10)
        );
    }

    #[test]
    fn boolean_entry_points() {
        assert!(evaluate_as_boolean("true**false").expect("eval should pass"));
        assert!(evaluate_as_boolean("1<2<3").expect("eval should pass"));
        assert!(!evaluate_as_boolean("1<2<0").expect("eval should pass"));
        assert!(evaluate_as_boolean("True and not False").expect("eval should pass"));
    }

    #[test]
    fn wrong_kind_is_invalid_expression() {
        let error = evaluate_as_number("true").expect_err("should fail");
        assert_eq!(error.kind, dl_core::ErrorKind::InvalidExpression);
        assert_eq!(error.code, "EXPR_KIND");
        let error = evaluate_as_boolean("1 + 1").expect_err("should fail");
        assert_eq!(error.code, "EXPR_KIND");
    }

    #[test]
    fn unary_plus_validates_and_evaluates() {
        assert!(is_well_formed("+3", ExprKind::Numeric));
        assert_eq!(
            evaluate_as_number("+3").expect("eval should pass"),
            Number::Int(3)
        );
        assert_eq!(
            evaluate_as_number("-+2.5").expect("eval should pass"),
            Number::Float(-2.5)
        );
    }

    #[test]
    fn well_formed_accepts_variable_holes_without_evaluating() {
        assert!(is_well_formed("$n$ > 2", ExprKind::Boolean));
        assert!(is_well_formed("$flag$", ExprKind::Boolean));
        assert!(is_well_formed("1 / 0", ExprKind::Numeric));
        assert!(!is_well_formed("1 +", ExprKind::Numeric));
        assert!(!is_well_formed("open('x')", ExprKind::Boolean));
        assert!(!is_well_formed("1", ExprKind::Boolean));
    }

    #[test]
    fn deep_nesting_is_an_invalid_expression() {
        let deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let error = evaluate_as_number(&deep).expect_err("should fail");
        assert_eq!(error.kind, dl_core::ErrorKind::InvalidExpression);
        assert_eq!(error.code, "EXPR_TOO_DEEP");
        assert!(!is_well_formed(&deep, ExprKind::Numeric));
        let shallow = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(
            evaluate_as_number(&shallow).expect("eval should pass"),
            Number::Int(1)
        );
    }

    #[test]
    fn evaluation_is_repeatable() {
        let first = evaluate_as_number("7 % 3 * 2.5").expect("eval should pass");
        let second = evaluate_as_number("7 % 3 * 2.5").expect("eval should pass");
        assert_eq!(first, second);
        assert_eq!(first, Number::Float(2.5));
    }
}
