//! A small arithmetic evaluator for the `calculate` tool.
//!
//! Grammar, over `f64`:
//!
//! ```text
//! expr    = term *( ("+" / "-") term )
//! term    = unary *( ("*" / "/") unary )
//! unary   = ("+" / "-") unary / primary
//! primary = number / "(" expr ")"
//! number  = digits [ "." [ digits ] ] [ exponent ] / "." digits [ exponent ]
//! ```
//!
//! Whitespace is allowed between tokens. Names, calls and any other
//! operator are rejected, so evaluating untrusted input is safe.

use std::fmt::{self, Display};

const MAX_DEPTH: usize = 64;

/// Why an expression could not be evaluated.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// A character that can't start or continue a token.
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Its byte offset in the input.
        pos: usize,
    },
    /// The input ended in the middle of an expression.
    UnexpectedEnd,
    /// A `(` without `)`, or the other way around.
    UnbalancedParen,
    /// Extra input after a complete expression.
    TrailingInput {
        /// Byte offset where the extra input starts.
        pos: usize,
    },
    /// A literal that looks like a number but isn't one.
    InvalidNumber(String),
    /// Parentheses or signs nested deeper than the evaluator allows.
    TooDeep,
    /// Division by zero.
    DivisionByZero,
    /// The result overflowed to infinity or is not a number.
    NonFinite,
}

impl Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnexpectedChar { ch, pos } => {
                write!(f, "unexpected character '{ch}' at position {pos}")
            }
            EvalError::UnexpectedEnd => write!(f, "unexpected end of expression"),
            EvalError::UnbalancedParen => write!(f, "unbalanced parenthesis"),
            EvalError::TrailingInput { pos } => {
                write!(f, "unexpected input at position {pos}")
            }
            EvalError::InvalidNumber(literal) => {
                write!(f, "invalid number '{literal}'")
            }
            EvalError::TooDeep => write!(f, "expression is nested too deeply"),
            EvalError::DivisionByZero => write!(f, "division by zero"),
            EvalError::NonFinite => write!(f, "result is not a finite number"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluates an arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let mut parser = Parser {
        input,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => {}
        Some(')') => return Err(EvalError::UnbalancedParen),
        Some(_) => return Err(EvalError::TrailingInput { pos: parser.pos }),
    }
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}

/// Formats a result the way a person would write it: integral values
/// without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    value += self.term()?;
                }
                Some('-') => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    value *= self.unary()?;
                }
                Some('/') => {
                    self.bump();
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        let sign = match self.peek() {
            Some('-') => -1.0,
            Some('+') => 1.0,
            _ => return self.primary(),
        };
        self.bump();
        self.descend(|parser| parser.unary())
            .map(|value| sign * value)
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(EvalError::UnexpectedEnd),
            Some('(') => {
                self.bump();
                let value = self.descend(|parser| parser.expr())?;
                self.skip_whitespace();
                match self.peek() {
                    Some(')') => {
                        self.bump();
                        Ok(value)
                    }
                    None => Err(EvalError::UnbalancedParen),
                    Some(ch) => {
                        Err(EvalError::UnexpectedChar { ch, pos: self.pos })
                    }
                }
            }
            Some(')') => Err(EvalError::UnbalancedParen),
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(ch) => Err(EvalError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let start = self.pos;
        self.eat_digits();
        if self.peek() == Some('.') {
            self.bump();
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            self.eat_digits();
        }
        let literal = &self.input[start..self.pos];
        literal
            .parse()
            .map_err(|_| EvalError::InvalidNumber(literal.to_owned()))
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn descend<F>(&mut self, f: F) -> Result<f64, EvalError>
    where
        F: FnOnce(&mut Self) -> Result<f64, EvalError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
