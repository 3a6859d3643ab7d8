use dl_core::{DialogueError, Number};

use crate::ast::{BinaryOp, BoolOp, CompareOp, Expr, UnaryOp};

/// Kind-directed evaluator over a checked tree. Holds the source text only
/// to attach it to errors.
pub struct Evaluator<'a> {
    source: &'a str,
}

impl<'a> Evaluator<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn error(&self, code: &str, message: impl Into<String>) -> DialogueError {
        DialogueError::invalid_expression(code, message, self.source)
    }

    fn kind_error(&self, expected: &str) -> DialogueError {
        self.error(
            "EXPR_KIND",
            format!("Expected a {} operand.", expected),
        )
    }

    pub fn eval_bool(&self, expr: &Expr) -> Result<bool, DialogueError> {
        match expr {
            Expr::Bool(value) => Ok(*value),
            Expr::Variable(name) => Err(self.unbound(name)),
            Expr::Not(operand) => Ok(!self.eval_bool(operand)?),
            Expr::Binary {
                op: BinaryOp::Pow,
                left,
                right,
            } => {
                let left = self.eval_bool(left)?;
                let right = self.eval_bool(right)?;
                Ok(left ^ right)
            }
            Expr::Logical { op, operands } => {
                // every operand is evaluated; no short circuit
                let mut accumulator = matches!(op, BoolOp::And);
                for operand in operands {
                    let value = self.eval_bool(operand)?;
                    accumulator = match op {
                        BoolOp::And => accumulator & value,
                        BoolOp::Or => accumulator | value,
                    };
                }
                Ok(accumulator)
            }
            Expr::Compare { first, rest } => {
                let mut values = Vec::with_capacity(rest.len() + 1);
                values.push(self.eval_num(first)?);
                for (_, operand) in rest {
                    values.push(self.eval_num(operand)?);
                }
                let mut result = true;
                for (index, (op, _)) in rest.iter().enumerate() {
                    result &= compare(*op, values[index], values[index + 1]);
                }
                Ok(result)
            }
            _ => Err(self.kind_error("boolean")),
        }
    }

    pub fn eval_num(&self, expr: &Expr) -> Result<Number, DialogueError> {
        match expr {
            Expr::Int(value) => Ok(Number::Int(*value)),
            Expr::Float(value) => Ok(Number::Float(*value)),
            Expr::Variable(name) => Err(self.unbound(name)),
            Expr::Unary { op, operand } => {
                let value = self.eval_num(operand)?;
                match (op, value) {
                    (UnaryOp::Plus, value) => Ok(value),
                    (UnaryOp::Minus, Number::Int(n)) => n
                        .checked_neg()
                        .map(Number::Int)
                        .ok_or_else(|| self.overflow()),
                    (UnaryOp::Minus, Number::Float(f)) => Ok(Number::Float(-f)),
                }
            }
            Expr::Binary { op, left, right } if *op != BinaryOp::Pow => {
                let left = self.eval_num(left)?;
                let right = self.eval_num(right)?;
                self.arithmetic(*op, left, right)
            }
            _ => Err(self.kind_error("numeric")),
        }
    }

    fn arithmetic(&self, op: BinaryOp, left: Number, right: Number) -> Result<Number, DialogueError> {
        match (left, right) {
            (Number::Int(a), Number::Int(b)) => {
                let result = match op {
                    BinaryOp::Add => a.checked_add(b),
                    BinaryOp::Sub => a.checked_sub(b),
                    BinaryOp::Mul => a.checked_mul(b),
                    BinaryOp::Div => {
                        if b == 0 {
                            return Err(self.division_by_zero());
                        }
                        return Ok(Number::Float(a as f64 / b as f64));
                    }
                    BinaryOp::Mod => {
                        if b == 0 {
                            return Err(self.division_by_zero());
                        }
                        Some(floored_mod_int(a, b))
                    }
                    BinaryOp::Pow => return Err(self.kind_error("boolean")),
                };
                result.map(Number::Int).ok_or_else(|| self.overflow())
            }
            (left, right) => {
                let (a, b) = (left.as_f64(), right.as_f64());
                let result = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => {
                        if b == 0.0 {
                            return Err(self.division_by_zero());
                        }
                        a / b
                    }
                    BinaryOp::Mod => {
                        if b == 0.0 {
                            return Err(self.division_by_zero());
                        }
                        floored_mod_float(a, b)
                    }
                    BinaryOp::Pow => return Err(self.kind_error("boolean")),
                };
                Ok(Number::Float(result))
            }
        }
    }

    fn unbound(&self, name: &str) -> DialogueError {
        self.error(
            "EXPR_UNBOUND_VARIABLE",
            format!("Variable {} has no value here.", name),
        )
    }

    fn overflow(&self) -> DialogueError {
        self.error("EXPR_OVERFLOW", "Integer arithmetic overflowed.")
    }

    fn division_by_zero(&self) -> DialogueError {
        self.error("EXPR_DIVISION_BY_ZERO", "Division by zero.")
    }
}

fn compare(op: CompareOp, left: Number, right: Number) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};

    let ordering = left.compare(right);
    match op {
        CompareOp::Eq => ordering == Some(Equal),
        CompareOp::NotEq => ordering != Some(Equal),
        CompareOp::Lt => ordering == Some(Less),
        CompareOp::LtEq => matches!(ordering, Some(Less | Equal)),
        CompareOp::Gt => ordering == Some(Greater),
        CompareOp::GtEq => matches!(ordering, Some(Greater | Equal)),
    }
}

/// Remainder with the sign of the divisor.
fn floored_mod_int(a: i64, b: i64) -> i64 {
    if b == -1 {
        return 0;
    }
    let remainder = a % b;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        remainder + b
    } else {
        remainder
    }
}

fn floored_mod_float(a: f64, b: f64) -> f64 {
    let remainder = a % b;
    if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
        remainder + b
    } else {
        remainder
    }
}
