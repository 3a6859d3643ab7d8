use dl_core::DialogueError;

use crate::syntax_error;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `$name$` hole left by an unsubstituted variable.
    Variable(String),
    /// Any other bare word. Always rejected by the parser.
    Ident(String),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Character iterator with byte position tracking.
struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn slice(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, DialogueError> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        cursor.eat_while(char::is_whitespace);
        let offset = cursor.pos;
        let Some(ch) = cursor.advance() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                offset,
            });
            return Ok(tokens);
        };

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' if cursor.eat('*') => TokenKind::StarStar,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' if cursor.eat('=') => TokenKind::EqEq,
            '!' if cursor.eat('=') => TokenKind::NotEq,
            '<' if cursor.eat('=') => TokenKind::LtEq,
            '<' => TokenKind::Lt,
            '>' if cursor.eat('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            '$' => lex_variable(&mut cursor, source, offset)?,
            '0'..='9' => lex_number(&mut cursor, source, offset)?,
            '.' if cursor.peek().is_some_and(|next| next.is_ascii_digit()) => {
                lex_number(&mut cursor, source, offset)?
            }
            c if c.is_alphabetic() || c == '_' => {
                cursor.eat_while(|c| c.is_alphanumeric() || c == '_');
                keyword_or_ident(cursor.slice(offset))
            }
            other => {
                return Err(syntax_error(
                    source,
                    format!("Unexpected character '{}' at offset {}.", other, offset),
                ))
            }
        };
        tokens.push(Token { kind, offset });
    }
}

fn keyword_or_ident(word: &str) -> TokenKind {
    match word {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "true" | "True" => TokenKind::True,
        "false" | "False" => TokenKind::False,
        _ => TokenKind::Ident(word.to_string()),
    }
}

fn lex_variable(
    cursor: &mut Cursor<'_>,
    source: &str,
    offset: usize,
) -> Result<TokenKind, DialogueError> {
    if !cursor.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(syntax_error(
            source,
            format!("Malformed variable at offset {}.", offset),
        ));
    }
    cursor.eat_while(|c| c.is_alphanumeric() || c == '_');
    if !cursor.eat('$') {
        return Err(syntax_error(
            source,
            format!("Unterminated variable at offset {}.", offset),
        ));
    }
    Ok(TokenKind::Variable(cursor.slice(offset).to_string()))
}

fn lex_number(
    cursor: &mut Cursor<'_>,
    source: &str,
    offset: usize,
) -> Result<TokenKind, DialogueError> {
    let mut is_float = cursor.slice(offset) == ".";
    cursor.eat_while(|c| c.is_ascii_digit());
    if !is_float && cursor.peek() == Some('.') {
        cursor.advance();
        is_float = true;
        cursor.eat_while(|c| c.is_ascii_digit());
    }
    if matches!(cursor.peek(), Some('e' | 'E')) {
        let signed = matches!(cursor.peek_next(), Some('+' | '-'));
        let mut lookahead = cursor.source[cursor.pos..].chars().skip(if signed { 2 } else { 1 });
        if lookahead.next().is_some_and(|c| c.is_ascii_digit()) {
            cursor.advance();
            if signed {
                cursor.advance();
            }
            cursor.eat_while(|c| c.is_ascii_digit());
            is_float = true;
        }
    }
    if cursor.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        return Err(syntax_error(
            source,
            format!("Malformed number at offset {}.", offset),
        ));
    }

    let text = cursor.slice(offset);
    if is_float {
        text.parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| syntax_error(source, format!("Malformed number \"{}\".", text)))
    } else {
        text.parse::<i64>().map(TokenKind::Int).map_err(|_| {
            DialogueError::invalid_expression(
                "EXPR_OVERFLOW",
                format!("Integer literal \"{}\" is out of range.", text),
                source,
            )
        })
    }
}
