//! Hand-written precedence-climbing parser for the expression grammar.
//!
//! The parser is tokenless: it walks the UTF-8 source directly with a byte
//! cursor instead of materializing a token stream. Each precedence tier is a
//! function that parses its operands from the next-tighter tier and loops on
//! its own operators, so every binary operator (including `^`) groups
//! left-associatively.

use crate::compiler::ast::{AccessKey, BinOp, Expr, PathStep, UnaryOp};
use abacus_core::error::Error;
use abacus_core::value::Value;
use thiserror::Error as ThisError;

#[derive(Debug, Clone, ThisError)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub column: u32,
    /// First ≤10 bytes of the unconsumed input at the failure point.
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ParseErrorKind {
    #[error("empty expression")]
    EmptyInput,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected trailing input")]
    TrailingInput,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unknown escape sequence '\\{0}'")]
    UnknownEscape(char),
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("expected {0}")]
    Expected(&'static str),
    #[error("computed spread '.( )' is only valid after '[*]'")]
    MisplacedComputedSpread,
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::parser(err.kind.to_string(), err.line, err.column).with_details(err.snippet)
    }
}

/// Parse a complete expression. Trailing non-whitespace input is an error,
/// never a silent truncation.
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(src);
    parser.skip_ws();
    if parser.at_end() {
        return Err(parser.error(ParseErrorKind::EmptyInput));
    }
    let expr = parser.parse_ternary()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error(ParseErrorKind::TrailingInput));
    }
    Ok(expr)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    // -- Cursor helpers ----------------------------------------------------

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    /// Consume `kw` only when it is not a prefix of a longer identifier.
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if !self.rest().starts_with(kw) {
            return false;
        }
        let after = self.src[self.pos + kw.len()..].chars().next();
        if matches!(after, Some(c) if is_ident_char(c)) {
            return false;
        }
        self.pos += kw.len();
        true
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n')) {
            self.pos += 1;
        }
    }

    // -- Error construction ------------------------------------------------

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, pos: usize, kind: ParseErrorKind) -> ParseError {
        let (line, column) = line_col(self.src, pos);
        let rest = &self.src[pos..];
        let mut end = rest.len().min(10);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        ParseError {
            kind,
            line,
            column,
            snippet: rest[..end].to_string(),
        }
    }

    // -- Precedence tiers, lowest to highest -------------------------------

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_or()?;
        self.skip_ws();
        if !self.eat('?') {
            return Ok(cond);
        }
        let then_branch = self.parse_ternary()?;
        self.skip_ws();
        if !self.eat(':') {
            return Err(self.error(ParseErrorKind::Expected("':' in ternary")));
        }
        let else_branch = self.parse_ternary()?;
        Ok(Expr::Ternary {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_ws();
            if !self.eat_str("||") {
                return Ok(lhs);
            }
            let rhs = self.parse_and()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_bitwise()?;
        loop {
            self.skip_ws();
            if !self.eat_str("&&") {
                return Ok(lhs);
            }
            let rhs = self.parse_bitwise()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
    }

    /// One tier for `&`, `|^` and `|`; `|^` must be tried before `|`, and a
    /// lone `&`/`|` must not swallow the first half of `&&`/`||`.
    fn parse_bitwise(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            self.skip_ws();
            let op = if self.peek() == Some('&') && self.peek_second() != Some('&') {
                self.pos += 1;
                BinOp::BitAnd
            } else if self.eat_str("|^") {
                BinOp::BitXor
            } else if self.peek() == Some('|') && self.peek_second() != Some('|') {
                self.pos += 1;
                BinOp::BitOr
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_comparison()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_shift()?;
        loop {
            self.skip_ws();
            let op = if self.eat_str("==") {
                BinOp::Eq
            } else if self.eat_str("!=") {
                BinOp::NotEq
            } else if self.eat_str(">=") {
                BinOp::GtEq
            } else if self.eat_str("<=") {
                BinOp::LtEq
            } else if self.peek() == Some('>') && self.peek_second() != Some('>') {
                self.pos += 1;
                BinOp::Gt
            } else if self.peek() == Some('<') && self.peek_second() != Some('<') {
                self.pos += 1;
                BinOp::Lt
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_shift()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            self.skip_ws();
            let op = if self.eat_str("<<") {
                BinOp::Shl
            } else if self.eat_str(">>") {
                BinOp::Shr
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            let op = if self.eat('+') {
                BinOp::Add
            } else if self.eat('-') {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_power()?;
        loop {
            self.skip_ws();
            let op = if self.eat('*') {
                BinOp::Mul
            } else if self.eat('/') {
                BinOp::Div
            } else if self.eat('%') {
                BinOp::Mod
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_power()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// `^` groups left-associatively, matching spreadsheet engines rather
    /// than mathematical convention.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_postfix()?;
        loop {
            self.skip_ws();
            if !self.eat('^') {
                return Ok(lhs);
            }
            let rhs = self.parse_postfix()?;
            lhs = binary(BinOp::Pow, lhs, rhs);
        }
    }

    /// Postfix `!` is factorial only when not followed by `=`, which would
    /// make it the first character of `!=`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut operand = self.parse_prefix()?;
        loop {
            self.skip_ws();
            if self.peek() == Some('!') && self.peek_second() != Some('=') {
                self.pos += 1;
                operand = Expr::Factorial(Box::new(operand));
            } else {
                return Ok(operand);
            }
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        if self.eat('-') {
            let operand = self.parse_prefix()?;
            return Ok(unary(UnaryOp::Neg, operand));
        }
        if self.eat('~') {
            let operand = self.parse_prefix()?;
            return Ok(unary(UnaryOp::BNot, operand));
        }
        if self.eat_keyword("not") {
            let operand = self.parse_prefix()?;
            return Ok(unary(UnaryOp::Not, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEof)),
            Some('(') => {
                self.pos += 1;
                let expr = self.parse_ternary()?;
                self.skip_ws();
                if !self.eat(')') {
                    return Err(self.error(ParseErrorKind::Expected("')'")));
                }
                Ok(expr)
            }
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('.') if matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(c) if is_ident_start(c) => self.parse_ident_or_chain(),
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
        }
    }

    // -- Literals ----------------------------------------------------------

    fn parse_number(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = &self.src[start..self.pos];
        if is_float {
            // A missing integer or fractional part defaults to 0.
            let normalized = if let Some(stripped) = text.strip_prefix('.') {
                format!("0.{}", stripped)
            } else if let Some(stripped) = text.strip_suffix('.') {
                format!("{}.0", stripped)
            } else {
                text.to_string()
            };
            match normalized.parse::<f64>() {
                Ok(f) => Ok(Expr::Literal(Value::Float(f))),
                Err(_) => Err(self.error_at(start, ParseErrorKind::InvalidNumber)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => Ok(Expr::Literal(Value::Int(n))),
                Err(_) => Err(self.error_at(start, ParseErrorKind::InvalidNumber)),
            }
        }
    }

    fn parse_string(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let quote = match self.bump() {
            Some(q) => q,
            None => return Err(self.error(ParseErrorKind::UnexpectedEof)),
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, ParseErrorKind::UnterminatedString)),
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    None => return Err(self.error_at(start, ParseErrorKind::UnterminatedString)),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('"') => out.push('"'),
                    Some('\'') => out.push('\''),
                    Some(other) => {
                        return Err(self.error(ParseErrorKind::UnknownEscape(other)));
                    }
                },
                Some(c) => out.push(c),
            }
        }
        Ok(Expr::Literal(Value::from(out)))
    }

    // -- Identifiers, chains, spreads --------------------------------------

    fn parse_ident_or_chain(&mut self) -> Result<Expr, ParseError> {
        // Keyword literals need a lookahead guard so `trueish` stays an
        // identifier.
        if self.eat_keyword("true") {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.eat_keyword("false") {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.eat_keyword("null") {
            return Ok(Expr::Literal(Value::Null));
        }
        let name = self.parse_ident();
        self.parse_chain(name)
    }

    fn parse_ident(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    /// Parse the accessor chain following an identifier.
    ///
    /// A call is only legal as the first post-identifier step. Once a `[*]`
    /// marker appears, subsequent `.name` / `[expr]` steps accumulate into a
    /// spread tail; the tail closes at the next `[*]` (which marks the
    /// pending spread as flattening), at a `.(expr)` body, or at chain end.
    fn parse_chain(&mut self, name: String) -> Result<Expr, ParseError> {
        self.skip_ws();
        let mut current = if self.eat('(') {
            let args = self.parse_call_args()?;
            Expr::Call { name, args }
        } else {
            Expr::GetVar(name)
        };

        let mut spread_tail: Option<Vec<PathStep>> = None;
        let mut after_computed = false;
        loop {
            self.skip_ws();
            if self.eat('.') {
                self.skip_ws();
                if self.peek() == Some('(') {
                    let Some(tail) = spread_tail.take() else {
                        return Err(self.error(ParseErrorKind::MisplacedComputedSpread));
                    };
                    let target = if tail.is_empty() {
                        current
                    } else {
                        Expr::Spread {
                            target: Box::new(current),
                            tail,
                            flatten: false,
                        }
                    };
                    self.pos += 1;
                    let body = self.parse_ternary()?;
                    self.skip_ws();
                    if !self.eat(')') {
                        return Err(self.error(ParseErrorKind::Expected(
                            "')' to close computed spread body",
                        )));
                    }
                    current = Expr::ComputedSpread {
                        target: Box::new(target),
                        body: Box::new(body),
                        flatten: false,
                    };
                    after_computed = true;
                } else if matches!(self.peek(), Some(c) if is_ident_start(c)) {
                    let key = self.parse_ident();
                    match &mut spread_tail {
                        Some(tail) => tail.push(PathStep::Key(key)),
                        None => {
                            current = Expr::Access {
                                target: Box::new(current),
                                key: AccessKey::Dot(key),
                            };
                        }
                    }
                    after_computed = false;
                } else {
                    return Err(self.error(ParseErrorKind::Expected("identifier or '(' after '.'")));
                }
            } else if self.eat('[') {
                self.skip_ws();
                if self.eat('*') {
                    self.skip_ws();
                    if !self.eat(']') {
                        return Err(self.error(ParseErrorKind::Expected("']' after '*'")));
                    }
                    if let Some(tail) = spread_tail.take() {
                        // A second marker concatenates the pending spread's
                        // per-element results.
                        current = Expr::Spread {
                            target: Box::new(current),
                            tail,
                            flatten: true,
                        };
                    } else if after_computed {
                        if let Expr::ComputedSpread { flatten, .. } = &mut current {
                            *flatten = true;
                        }
                    }
                    spread_tail = Some(Vec::new());
                    after_computed = false;
                } else {
                    let index = self.parse_ternary()?;
                    self.skip_ws();
                    if !self.eat(']') {
                        return Err(self.error(ParseErrorKind::Expected("']'")));
                    }
                    match &mut spread_tail {
                        Some(tail) => tail.push(PathStep::Index(index)),
                        None => {
                            current = Expr::Access {
                                target: Box::new(current),
                                key: AccessKey::Bracket(Box::new(index)),
                            };
                        }
                    }
                    after_computed = false;
                }
            } else {
                break;
            }
        }
        if let Some(tail) = spread_tail {
            current = Expr::Spread {
                target: Box::new(current),
                tail,
                flatten: false,
            };
        }
        Ok(current)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.eat(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_ternary()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                return Ok(args);
            }
            return Err(self.error(ParseErrorKind::Expected("',' or ')' in argument list")));
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

fn line_col(src: &str, pos: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut column = 1u32;
    for c in src[..pos].chars() {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
