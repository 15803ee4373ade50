//! Static evaluation of Python data literals.
//!
//! Definition settings are written as nested constructor calls over plain
//! data (`comp.Setting(identifier=comp.Identifier(name='id', ...))`). This
//! module turns such an expression into a [`Literal`] tree without running
//! anything: calls and dotted names are kept symbolic, strings, numbers,
//! containers and the `None`/`True`/`False` constants are decoded.

use std::fmt;

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use thiserror::Error;

use super::lexer::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LiteralError {
    #[error("expected {expected}, found {found} at line {line}")]
    Unexpected {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[error("unsupported expression at line {line}: {reason}")]
    Unsupported { reason: String, line: usize },

    #[error("empty expression")]
    Empty,
}

/// A symbolic call: `callee(args..., key=value...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Dotted callee path, e.g. `comp.Setting`.
    pub callee: String,
    pub args: Vec<Literal>,
    pub kwargs: Vec<(String, Literal)>,
}

impl Call {
    /// Last segment of the callee path.
    pub fn short_name(&self) -> &str {
        last_segment(&self.callee)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Dictionary entries in source order
    Dict(Vec<(Literal, Literal)>),
    /// Dotted reference such as `atom.User`
    Name(String),
    Call(Call),
}

impl Literal {
    pub fn is_none(&self) -> bool {
        matches!(self, Literal::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Literal::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Items of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) | Literal::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "None",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Dict(_) => "dict",
            Literal::Name(_) => "name",
            Literal::Call(_) => "call",
        }
    }

    /// Converts plain data to a JSON value. Names and calls are rejected.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Renders the literal back as Python source.
    pub fn to_python(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s) => write!(f, "{}", python_repr(s)),
            Literal::List(items) => write!(f, "[{}]", join(items)),
            Literal::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Literal::Tuple(items) => write!(f, "({})", join(items)),
            Literal::Dict(entries) => {
                let body: Vec<String> = entries.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", body.join(", "))
            }
            Literal::Name(path) => write!(f, "{path}"),
            Literal::Call(call) => {
                let mut parts: Vec<String> = call.args.iter().map(ToString::to_string).collect();
                parts.extend(call.kwargs.iter().map(|(k, v)| format!("{k}={v}")));
                write!(f, "{}({})", call.callee, parts.join(", "))
            }
        }
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::None => serializer.serialize_none(),
            Literal::Bool(b) => serializer.serialize_bool(*b),
            Literal::Int(i) => serializer.serialize_i64(*i),
            Literal::Float(x) => serializer.serialize_f64(*x),
            Literal::Str(s) => serializer.serialize_str(s),
            Literal::List(items) | Literal::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Literal::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Literal::Name(path) => Err(S::Error::custom(format!(
                "'{path}' is a reference, not a data literal"
            ))),
            Literal::Call(call) => Err(S::Error::custom(format!(
                "'{}(...)' is a call, not a data literal",
                call.callee
            ))),
        }
    }
}

pub fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn join(items: &[Literal]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Python `repr()` of a string.
fn python_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

// ── Parser ───────────────────────────────────────────────────────────────────

/// Recursive-descent parser over significant tokens
pub struct LiteralParser<'t> {
    tokens: Vec<&'t Token>,
    pos: usize,
}

impl<'t> LiteralParser<'t> {
    /// Parse a complete expression; trailing tokens are an error.
    pub fn parse(tokens: &'t [Token]) -> Result<Literal, LiteralError> {
        let significant: Vec<&Token> = tokens
            .iter()
            .filter(|t| {
                !t.kind.is_trivia() && !matches!(t.kind, TokenKind::Newline | TokenKind::EndMarker)
            })
            .collect();
        if significant.is_empty() {
            return Err(LiteralError::Empty);
        }
        let mut parser = LiteralParser {
            tokens: significant,
            pos: 0,
        };
        let value = parser.expression_list()?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.unexpected("end of expression"));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_is_op(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.kind.is_op(op))
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last().copied())
            .map_or(0, |t| t.start.line)
    }

    fn unexpected(&self, expected: &'static str) -> LiteralError {
        LiteralError::Unexpected {
            expected,
            found: self
                .peek()
                .map_or_else(|| "end of expression".to_string(), |t| t.kind.to_string()),
            line: self.line(),
        }
    }

    fn expect_op(&mut self, op: &'static str) -> Result<(), LiteralError> {
        if self.peek_is_op(op) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(op))
        }
    }

    /// `a, b` at the top level forms a tuple, like in a `return` statement.
    fn expression_list(&mut self) -> Result<Literal, LiteralError> {
        let first = self.expression()?;
        if !self.peek_is_op(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek_is_op(",") {
            self.pos += 1;
            if self.peek().is_none() {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(Literal::Tuple(items))
    }

    fn expression(&mut self) -> Result<Literal, LiteralError> {
        if self.peek_is_op("-") || self.peek_is_op("+") {
            let negative = self.peek_is_op("-");
            let line = self.line();
            self.pos += 1;
            return match (negative, self.expression()?) {
                (true, Literal::Int(i)) => Ok(Literal::Int(-i)),
                (true, Literal::Float(x)) => Ok(Literal::Float(-x)),
                (false, value @ (Literal::Int(_) | Literal::Float(_))) => Ok(value),
                (_, other) => Err(LiteralError::Unsupported {
                    reason: format!("unary sign on {}", other.type_name()),
                    line,
                }),
            };
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Literal, LiteralError> {
        let token = self.peek().ok_or_else(|| self.unexpected("expression"))?;
        let line = token.start.line;
        match &token.kind {
            TokenKind::Number(raw) => {
                self.pos += 1;
                parse_number(raw, line)
            }
            TokenKind::String(_) => {
                let mut value = String::new();
                while let Some(TokenKind::String(raw)) = self.peek().map(|t| &t.kind) {
                    value.push_str(&decode_string(raw, line)?);
                    self.pos += 1;
                }
                Ok(Literal::Str(value))
            }
            TokenKind::Name(name) => {
                self.pos += 1;
                match name.as_str() {
                    "None" => return Ok(Literal::None),
                    "True" => return Ok(Literal::Bool(true)),
                    "False" => return Ok(Literal::Bool(false)),
                    "lambda" | "not" | "await" | "yield" => {
                        return Err(LiteralError::Unsupported {
                            reason: format!("'{name}' expression"),
                            line,
                        });
                    }
                    _ => {}
                }
                let mut path = name.clone();
                while self.peek_is_op(".") {
                    self.pos += 1;
                    match self.peek().map(|t| &t.kind) {
                        Some(TokenKind::Name(segment)) => {
                            path.push('.');
                            path.push_str(segment);
                            self.pos += 1;
                        }
                        _ => return Err(self.unexpected("attribute name")),
                    }
                }
                if self.peek_is_op("(") {
                    self.pos += 1;
                    let call = self.call_arguments(path)?;
                    if self.peek_is_op("(") || self.peek_is_op(".") || self.peek_is_op("[") {
                        return Err(LiteralError::Unsupported {
                            reason: format!("chained access on '{}(...)'", call.callee),
                            line,
                        });
                    }
                    return Ok(Literal::Call(call));
                }
                if self.peek_is_op("[") {
                    return Err(LiteralError::Unsupported {
                        reason: format!("subscript on '{path}'"),
                        line,
                    });
                }
                Ok(Literal::Name(path))
            }
            TokenKind::Op(op) if op == "(" => {
                self.pos += 1;
                if self.peek_is_op(")") {
                    self.pos += 1;
                    return Ok(Literal::Tuple(Vec::new()));
                }
                let first = self.expression()?;
                if self.peek_is_op(")") {
                    self.pos += 1;
                    return Ok(first);
                }
                let mut items = vec![first];
                while self.peek_is_op(",") {
                    self.pos += 1;
                    if self.peek_is_op(")") {
                        break;
                    }
                    items.push(self.expression()?);
                }
                self.expect_op(")")?;
                Ok(Literal::Tuple(items))
            }
            TokenKind::Op(op) if op == "[" => {
                self.pos += 1;
                let items = self.sequence("]")?;
                Ok(Literal::List(items))
            }
            TokenKind::Op(op) if op == "{" => {
                self.pos += 1;
                self.dict()
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn sequence(&mut self, close: &'static str) -> Result<Vec<Literal>, LiteralError> {
        let mut items = Vec::new();
        while !self.peek_is_op(close) {
            items.push(self.expression()?);
            if !self.peek_is_op(",") {
                break;
            }
            self.pos += 1;
        }
        self.expect_op(close)?;
        Ok(items)
    }

    fn dict(&mut self) -> Result<Literal, LiteralError> {
        let mut entries = Vec::new();
        while !self.peek_is_op("}") {
            let key = self.expression()?;
            if !self.peek_is_op(":") {
                return Err(LiteralError::Unsupported {
                    reason: "set literal".into(),
                    line: self.line(),
                });
            }
            self.pos += 1;
            let value = self.expression()?;
            entries.push((key, value));
            if !self.peek_is_op(",") {
                break;
            }
            self.pos += 1;
        }
        self.expect_op("}")?;
        Ok(Literal::Dict(entries))
    }

    fn call_arguments(&mut self, callee: String) -> Result<Call, LiteralError> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        while !self.peek_is_op(")") {
            let keyword = match (self.peek().map(|t| &t.kind), self.tokens.get(self.pos + 1)) {
                (Some(TokenKind::Name(name)), Some(next)) if next.kind.is_op("=") => {
                    Some(name.clone())
                }
                _ => None,
            };
            match keyword {
                Some(name) => {
                    self.pos += 2;
                    kwargs.push((name, self.expression()?));
                }
                None if !kwargs.is_empty() => {
                    return Err(LiteralError::Unsupported {
                        reason: format!("positional argument after keyword in '{callee}(...)'"),
                        line: self.line(),
                    });
                }
                None => {
                    if self.peek_is_op("*") || self.peek_is_op("**") {
                        return Err(LiteralError::Unsupported {
                            reason: format!("argument unpacking in '{callee}(...)'"),
                            line: self.line(),
                        });
                    }
                    args.push(self.expression()?);
                }
            }
            if !self.peek_is_op(",") {
                break;
            }
            self.pos += 1;
        }
        self.expect_op(")")?;
        Ok(Call {
            callee,
            args,
            kwargs,
        })
    }
}

// ── Scalars ──────────────────────────────────────────────────────────────────

fn parse_number(raw: &str, line: usize) -> Result<Literal, LiteralError> {
    let clean: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    let unsupported = || LiteralError::Unsupported {
        reason: format!("number '{raw}'"),
        line,
    };

    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return i64::from_str_radix(&lower[2..], radix)
            .map(Literal::Int)
            .map_err(|_| unsupported());
    }
    if lower.ends_with('j') {
        return Err(unsupported());
    }
    if let Ok(i) = lower.parse::<i64>() {
        return Ok(Literal::Int(i));
    }
    lower
        .parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| unsupported())
}

/// Decodes one string token (prefix, quotes, escapes) into its value.
fn decode_string(raw: &str, line: usize) -> Result<String, LiteralError> {
    let prefix_len = raw
        .find(|c| c == '\'' || c == '"')
        .ok_or(LiteralError::Unsupported {
            reason: "malformed string".into(),
            line,
        })?;
    let prefix = raw[..prefix_len].to_ascii_lowercase();
    if prefix.contains('f') {
        return Err(LiteralError::Unsupported {
            reason: "f-string".into(),
            line,
        });
    }
    let rest = &raw[prefix_len..];
    let quote_len = if rest.starts_with("'''") || rest.starts_with("\"\"\"") {
        3
    } else {
        1
    };
    let body = &rest[quote_len..rest.len().saturating_sub(quote_len).max(quote_len)];
    if prefix.contains('r') {
        return Ok(body.to_owned());
    }
    Ok(unescape(body))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            '0'..='7' => {
                let mut digits = next.to_string();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}
