use dl_core::DialogueError;

use crate::ast::{BinaryOp, Expr};
use crate::ExprKind;

/// Verifies that `expr` is built only from nodes allowed for `kind`.
/// Variable holes are accepted in either kind.
pub fn check_kind(expr: &Expr, kind: ExprKind, source: &str) -> Result<(), DialogueError> {
    if conforms(expr, kind) {
        Ok(())
    } else {
        Err(DialogueError::invalid_expression(
            "EXPR_KIND",
            format!("Expression is not a valid {} expression.", kind),
            source,
        ))
    }
}

fn conforms(expr: &Expr, kind: ExprKind) -> bool {
    if let Expr::Variable(_) = expr {
        return true;
    }
    match kind {
        ExprKind::Boolean => match expr {
            Expr::Bool(_) => true,
            Expr::Binary {
                op: BinaryOp::Pow,
                left,
                right,
            } => conforms(left, ExprKind::Boolean) && conforms(right, ExprKind::Boolean),
            Expr::Logical { operands, .. } => operands
                .iter()
                .all(|operand| conforms(operand, ExprKind::Boolean)),
            Expr::Not(operand) => conforms(operand, ExprKind::Boolean),
            Expr::Compare { first, rest } => {
                conforms(first, ExprKind::Numeric)
                    && rest
                        .iter()
                        .all(|(_, operand)| conforms(operand, ExprKind::Numeric))
            }
            _ => false,
        },
        ExprKind::Numeric => match expr {
            Expr::Int(_) | Expr::Float(_) => true,
            Expr::Binary { op, left, right } if *op != BinaryOp::Pow => {
                conforms(left, ExprKind::Numeric) && conforms(right, ExprKind::Numeric)
            }
            Expr::Unary { operand, .. } => conforms(operand, ExprKind::Numeric),
            _ => false,
        },
    }
}
