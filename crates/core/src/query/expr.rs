//! WHERE expressions: a recursive-descent parser and per-document evaluation.
//!
//! Precedence, lowest first: `OR`, `AND`, unary `!`/`NOT`, comparison,
//! primary (parenthesised group, `contains(a, b)`, field path, literal).

use std::borrow::Cow;

use super::compare::{self, CmpOp};
use super::error::{EvalError, ParseError};
use super::fields;
use super::lexer::{Token, TokenKind, tokenize};
use crate::frontmatter::FieldValue;
use crate::vault::Document;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(String),
    Literal(FieldValue),
}

impl Operand {
    fn value<'a>(&'a self, doc: &'a Document) -> Cow<'a, FieldValue> {
        match self {
            Operand::Field(path) => fields::resolve(doc, path),
            Operand::Literal(value) => Cow::Borrowed(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Or(Vec<Expr>),
    And(Vec<Expr>),
    Not(Box<Expr>),
    Compare { left: Operand, op: CmpOp, right: Operand },
    Contains { haystack: Operand, needle: Operand },
    /// A bare operand: true when the value is present and truthy.
    Truthy(Operand),
}

impl Expr {
    /// Evaluate against one document. `AND`/`OR` short-circuit left to right.
    pub fn eval(&self, doc: &Document) -> Result<bool, EvalError> {
        match self {
            Expr::Or(parts) => {
                for part in parts {
                    if part.eval(doc)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Expr::And(parts) => {
                for part in parts {
                    if !part.eval(doc)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Expr::Not(inner) => Ok(!inner.eval(doc)?),
            Expr::Compare { left, op, right } => {
                compare::compare(*op, &left.value(doc), &right.value(doc))
            }
            Expr::Contains { haystack, needle } => {
                compare::contains(&haystack.value(doc), &needle.value(doc))
            }
            Expr::Truthy(operand) => Ok(operand.value(doc).is_truthy()),
        }
    }
}

/// Parse a WHERE clause body.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new("expected expression", 0));
    }

    let mut parser = ExprParser { tokens, index: 0, end: input.len(), depth: 0 };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            format!("unexpected {}", token.kind.describe()),
            token.position,
        ));
    }
    Ok(expr)
}

/// Deepest allowed nesting of parentheses and negations.
const MAX_NESTING: usize = 64;

struct ExprParser {
    tokens: Vec<Token>,
    index: usize,
    /// Position reported for errors at end of input.
    end: usize,
    depth: usize,
}

impl ExprParser {
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut parts = vec![self.parse_and()?];
        while self.consume(&TokenKind::Or) {
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { Expr::Or(parts) })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut parts = vec![self.parse_not()?];
        while self.consume(&TokenKind::And) {
            parts.push(self.parse_not()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { Expr::And(parts) })
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        let position = self.position();
        if self.consume(&TokenKind::Bang) || self.consume(&TokenKind::Not) {
            self.descend(position)?;
            let inner = self.parse_not();
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let position = self.position();
        if self.consume(&TokenKind::LParen) {
            self.descend(position)?;
            let expr = self.parse_or();
            self.depth -= 1;
            let expr = expr?;
            self.expect(&TokenKind::RParen)?;
            return Ok(expr);
        }

        if let Some(name) = self.peek_function_name() {
            return self.parse_call(name);
        }

        let left = self.parse_operand()?;
        if let Some(Token { kind: TokenKind::Cmp(op), .. }) = self.peek() {
            let op = *op;
            self.index += 1;
            let right = self.parse_operand()?;
            return Ok(Expr::Compare { left, op, right });
        }
        Ok(Expr::Truthy(left))
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ParseError> {
        let position = self.position();
        if !name.eq_ignore_ascii_case("contains") {
            return Err(ParseError::new(format!("unknown function '{name}'"), position));
        }
        self.index += 2; // name and '('

        let haystack = self.parse_operand()?;
        self.expect(&TokenKind::Comma)?;
        let needle = self.parse_operand()?;
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::Contains { haystack, needle })
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let position = self.position();
        let Some(token) = self.tokens.get(self.index) else {
            return Err(ParseError::new("expected value but reached end of expression", position));
        };

        let operand = match &token.kind {
            TokenKind::Ident(path) => Operand::Field(path.clone()),
            TokenKind::Str(s) => Operand::Literal(FieldValue::String(s.clone())),
            TokenKind::Number(n) => Operand::Literal(FieldValue::Number(*n)),
            TokenKind::Date(d) => Operand::Literal(FieldValue::Date(*d)),
            TokenKind::True => Operand::Literal(FieldValue::Boolean(true)),
            TokenKind::False => Operand::Literal(FieldValue::Boolean(false)),
            other => {
                return Err(ParseError::new(
                    format!("expected field or value, found {}", other.describe()),
                    position,
                ));
            }
        };
        self.index += 1;
        Ok(operand)
    }

    fn descend(&mut self, position: usize) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new("expression nested too deeply", position));
        }
        self.depth += 1;
        Ok(())
    }

    fn peek_function_name(&self) -> Option<String> {
        match (self.tokens.get(self.index), self.tokens.get(self.index + 1)) {
            (Some(Token { kind: TokenKind::Ident(name), .. }), Some(next))
                if next.kind == TokenKind::LParen =>
            {
                Some(name.clone())
            }
            _ => None,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.consume(kind) {
            return Ok(());
        }
        let found =
            self.peek().map_or_else(|| "end of expression".to_string(), |t| t.kind.describe());
        Err(ParseError::new(
            format!("expected {}, found {}", kind.describe(), found),
            self.position(),
        ))
    }
}
