//! Visibility and requiredness predicates.
//!
//! # Grammar
//! ```text
//! expr    := term (("&&" | "||") term)*
//! term    := cmp | "true" | "false"
//! cmp     := IDENT ("==" | "!=") literal
//! literal := 'string' | "string" | true | false | number
//! ```
//!
//! # Semantics
//! - `IDENT` names a sibling field in the same structure scope
//! - The literal is coerced to the sibling's declared type: numbers compare
//!   numerically, booleans as booleans, everything else by text
//! - Operators have no precedence and fold left to right:
//!   `a || b && c` is `(a || b) && c`. There are no parentheses.
//! - Any unresolvable comparison (missing or hidden sibling, null value,
//!   literal that does not coerce) makes the whole predicate `false`.
//!   Every term is evaluated, so there is no short-circuit around it.

use serde_json::Value;
use thiserror::Error;

use crate::params::reflect::FieldType;

/// Errors produced while parsing predicate source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredicateError {
    #[error("empty predicate")]
    Empty,

    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unterminated string starting at offset {pos}")]
    UnterminatedString { pos: usize },

    #[error("unexpected {found} at offset {pos}, expected {expected}")]
    UnexpectedToken {
        pos: usize,
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of predicate, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Bool(bool),
    /// Keeps the source text for textual comparison against string fields.
    Number { value: f64, text: String },
}

/// Parsed predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Const(bool),
    Compare {
        field: String,
        op: CompareOp,
        literal: Literal,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

/// Current sibling values visible to a predicate.
pub trait Environment {
    /// Declared type and current value of a sibling field.
    ///
    /// Returns `None` when the sibling does not exist, is hidden, or its
    /// owning structure is absent.
    fn lookup(&self, name: &str) -> Option<(FieldType, &Value)>;
}

impl Predicate {
    /// Parse predicate source.
    pub fn parse(source: &str) -> Result<Self, PredicateError> {
        let tokens = tokenize(source)?;
        Parser { tokens, pos: 0 }.parse_expr()
    }

    /// Evaluate against `env`. Unresolvable predicates are `false`.
    pub fn evaluate<E: Environment + ?Sized>(&self, env: &E) -> bool {
        self.eval(env).unwrap_or(false)
    }

    fn eval<E: Environment + ?Sized>(&self, env: &E) -> Option<bool> {
        match self {
            Predicate::Const(b) => Some(*b),
            Predicate::Compare { field, op, literal } => {
                let (ty, value) = env.lookup(field)?;
                let equal = literal.matches(ty, value)?;
                Some(match op {
                    CompareOp::Eq => equal,
                    CompareOp::Ne => !equal,
                })
            }
            Predicate::And(lhs, rhs) => {
                let (l, r) = (lhs.eval(env), rhs.eval(env));
                Some(l? && r?)
            }
            Predicate::Or(lhs, rhs) => {
                let (l, r) = (lhs.eval(env), rhs.eval(env));
                Some(l? || r?)
            }
        }
    }
}

impl Literal {
    /// Equality against a field value after coercion to `ty`.
    fn matches(&self, ty: FieldType, value: &Value) -> Option<bool> {
        if value.is_null() {
            return None;
        }
        match ty {
            FieldType::Bool => {
                let expected = match self {
                    Literal::Bool(b) => *b,
                    Literal::Str(s) => parse_bool(s.trim())?,
                    Literal::Number { value, .. } if *value == 1.0 => true,
                    Literal::Number { value, .. } if *value == 0.0 => false,
                    Literal::Number { .. } => return None,
                };
                Some(value.as_bool()? == expected)
            }
            FieldType::Int | FieldType::Float => {
                let expected = match self {
                    Literal::Number { value, .. } => *value,
                    Literal::Str(s) => s.trim().parse().ok()?,
                    Literal::Bool(_) => return None,
                };
                Some(value.as_f64()? == expected)
            }
            _ => Some(text_of(value) == self.text()),
        }
    }

    fn text(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            Literal::Bool(b) => b.to_string(),
            Literal::Number { text, .. } => text.clone(),
        }
    }
}

/// Accepted boolean spellings: `1 t T TRUE true True` and their false
/// counterparts.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(f64, String),
    Bool(bool),
    Eq,
    Ne,
    And,
    Or,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Str(s) => format!("string '{}'", s),
            Token::Number(_, text) => format!("number {}", text),
            Token::Bool(b) => format!("'{}'", b),
            Token::Eq => "'=='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::And => "'&&'".to_string(),
            Token::Or => "'||'".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, PredicateError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '=' | '!' | '&' | '|' => {
                chars.next();
                let token = match (ch, chars.peek().map(|&(_, c)| c)) {
                    ('=', Some('=')) => Token::Eq,
                    ('!', Some('=')) => Token::Ne,
                    ('&', Some('&')) => Token::And,
                    ('|', Some('|')) => Token::Or,
                    _ => return Err(PredicateError::UnexpectedChar { pos, ch }),
                };
                chars.next();
                tokens.push((pos, token));
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == ch => break,
                        Some((_, c)) => text.push(c),
                        None => return Err(PredicateError::UnterminatedString { pos }),
                    }
                }
                tokens.push((pos, Token::Str(text)));
            }
            c if c == '-' || c.is_ascii_digit() => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| PredicateError::UnexpectedChar { pos, ch: c })?;
                tokens.push((pos, Token::Number(value, text)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let token = match ident.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Ident(ident),
                };
                tokens.push((pos, token));
            }
            _ => return Err(PredicateError::UnexpectedChar { pos, ch }),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_expr(&mut self) -> Result<Predicate, PredicateError> {
        if self.tokens.is_empty() {
            return Err(PredicateError::Empty);
        }

        let mut lhs = self.parse_term()?;
        while let Some((pos, token)) = self.next() {
            let is_and = match token {
                Token::And => true,
                Token::Or => false,
                other => {
                    return Err(PredicateError::UnexpectedToken {
                        pos,
                        found: other.describe(),
                        expected: "'&&' or '||'",
                    })
                }
            };
            let rhs = self.parse_term()?;
            lhs = if is_and {
                Predicate::And(Box::new(lhs), Box::new(rhs))
            } else {
                Predicate::Or(Box::new(lhs), Box::new(rhs))
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Predicate, PredicateError> {
        const TERM: &str = "comparison or boolean";
        match self.next() {
            Some((_, Token::Bool(b))) => Ok(Predicate::Const(b)),
            Some((_, Token::Ident(field))) => {
                let op = match self.next() {
                    Some((_, Token::Eq)) => CompareOp::Eq,
                    Some((_, Token::Ne)) => CompareOp::Ne,
                    Some((pos, other)) => {
                        return Err(PredicateError::UnexpectedToken {
                            pos,
                            found: other.describe(),
                            expected: "'==' or '!='",
                        })
                    }
                    None => return Err(PredicateError::UnexpectedEnd { expected: "'==' or '!='" }),
                };
                let literal = match self.next() {
                    Some((_, Token::Str(s))) => Literal::Str(s),
                    Some((_, Token::Bool(b))) => Literal::Bool(b),
                    Some((_, Token::Number(value, text))) => Literal::Number { value, text },
                    Some((pos, other)) => {
                        return Err(PredicateError::UnexpectedToken {
                            pos,
                            found: other.describe(),
                            expected: "literal",
                        })
                    }
                    None => return Err(PredicateError::UnexpectedEnd { expected: "literal" }),
                };
                Ok(Predicate::Compare { field, op, literal })
            }
            Some((pos, other)) => Err(PredicateError::UnexpectedToken {
                pos,
                found: other.describe(),
                expected: TERM,
            }),
            None => Err(PredicateError::UnexpectedEnd { expected: TERM }),
        }
    }
}
