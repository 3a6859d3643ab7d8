use dl_core::DialogueError;

use crate::ast::{BinaryOp, BoolOp, CompareOp, Expr, UnaryOp};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::syntax_error;

/// Deepest tree the parser builds. Parentheses, `not`, unary signs, `**`
/// exponents and each chained binary operator count one level, which also
/// bounds the recursion of the checker and the evaluator.
pub const MAX_NESTING: usize = 200;

/// Parses `source` into an expression tree without checking its kind.
pub fn parse_expression(source: &str) -> Result<Expr, DialogueError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    match &parser.peek().kind {
        TokenKind::Eof => Ok(expr),
        other => Err(parser.unexpected(other)),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), DialogueError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(DialogueError::invalid_expression(
                "EXPR_TOO_DEEP",
                format!("Expression nests deeper than {} levels.", MAX_NESTING),
                self.source,
            ));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn unexpected(&self, kind: &TokenKind) -> DialogueError {
        let offset = self.peek().offset;
        let message = match kind {
            TokenKind::Eof => "Unexpected end of expression.".to_string(),
            TokenKind::Ident(name) => {
                format!("Name \"{}\" is not allowed at offset {}.", name, offset)
            }
            other => format!("Unexpected token {:?} at offset {}.", other, offset),
        };
        syntax_error(self.source, message)
    }

    fn parse_or(&mut self) -> Result<Expr, DialogueError> {
        let first = self.parse_and()?;
        let mut operands = vec![first];
        while self.eat(&TokenKind::Or) {
            operands.push(self.parse_and()?);
        }
        Ok(fold_logical(BoolOp::Or, operands))
    }

    fn parse_and(&mut self) -> Result<Expr, DialogueError> {
        let first = self.parse_not()?;
        let mut operands = vec![first];
        while self.eat(&TokenKind::And) {
            operands.push(self.parse_not()?);
        }
        Ok(fold_logical(BoolOp::And, operands))
    }

    fn parse_not(&mut self) -> Result<Expr, DialogueError> {
        if self.eat(&TokenKind::Not) {
            self.descend()?;
            let operand = self.parse_not()?;
            self.ascend(1);
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, DialogueError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        while let Some(op) = compare_op(&self.peek().kind) {
            self.bump();
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, DialogueError> {
        let mut left = self.parse_term()?;
        let mut links = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => {
                    self.ascend(links);
                    return Ok(left);
                }
            };
            self.bump();
            self.descend()?;
            links += 1;
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, DialogueError> {
        let mut left = self.parse_unary()?;
        let mut links = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => {
                    self.ascend(links);
                    return Ok(left);
                }
            };
            self.bump();
            self.descend()?;
            links += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, DialogueError> {
        let op = match self.peek().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_power(),
        };
        self.bump();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend(1);
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// `**` binds tighter than a unary sign on its left and is right associative.
    fn parse_power(&mut self) -> Result<Expr, DialogueError> {
        let base = self.parse_atom()?;
        if self.eat(&TokenKind::StarStar) {
            self.descend()?;
            let exponent = self.parse_unary()?;
            self.ascend(1);
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, DialogueError> {
        let token = self.bump();
        match token.kind {
            TokenKind::Int(value) => Ok(Expr::Int(value)),
            TokenKind::Float(value) => Ok(Expr::Float(value)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::Variable(name) => Ok(Expr::Variable(name)),
            TokenKind::LParen => {
                self.descend()?;
                let inner = self.parse_or()?;
                self.ascend(1);
                if !self.eat(&TokenKind::RParen) {
                    let kind = self.peek().kind.clone();
                    return Err(self.unexpected(&kind));
                }
                Ok(inner)
            }
            other => {
                self.pos -= 1;
                Err(self.unexpected(&other))
            }
        }
    }
}

fn compare_op(kind: &TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::EqEq => Some(CompareOp::Eq),
        TokenKind::NotEq => Some(CompareOp::NotEq),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::LtEq => Some(CompareOp::LtEq),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::GtEq => Some(CompareOp::GtEq),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn fold_logical(op: BoolOp, mut operands: Vec<Expr>) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        Expr::Logical { op, operands }
    }
}
