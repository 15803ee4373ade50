//! Statement outline of a Python source file.
//!
//! The outline is a tree of logical statements built purely from layout
//! tokens: a statement ends at its `NEWLINE`, and owns the block that follows
//! when the next token is an `INDENT`. Only the statement shapes the loader
//! cares about are classified (classes, function definitions, simple
//! assignments and `return`); everything else is kept as [`StatementKind::Other`]
//! so line spans stay exact.

use std::ops::Range;

use thiserror::Error;

use super::lexer::{LexError, Token, TokenKind, Tokenizer};
use super::literal::{Literal, LiteralError, LiteralParser};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OutlineError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {token} at line {line}")]
    Unexpected { token: String, line: usize },

    #[error("decorator at line {line} is not followed by a definition")]
    DanglingDecorator { line: usize },
}

/// A decorator line (`@expr`), excluding the `@` and line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub line: usize,
    pub tokens: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Class {
        name: String,
        /// Tokens between the parentheses of the base list, if any.
        bases: Option<Range<usize>>,
    },
    Def {
        name: String,
        is_async: bool,
    },
    Assign {
        target: String,
        value: Range<usize>,
    },
    Return {
        value: Option<Range<usize>>,
    },
    Other,
}

/// One logical statement and, for compound statements, its block.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub decorators: Vec<Decorator>,
    /// First line of the statement, including decorator lines.
    pub first_line: usize,
    /// Line of the last `NEWLINE` that belongs to the statement or its block.
    pub last_line: usize,
    pub body: Vec<Statement>,
}

impl Statement {
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            StatementKind::Class { name, .. } | StatementKind::Def { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, StatementKind::Class { .. })
    }

    pub fn is_def(&self) -> bool {
        matches!(self.kind, StatementKind::Def { .. })
    }

    /// Function definition with the given name directly inside this block.
    pub fn method(&self, name: &str) -> Option<&Statement> {
        self.body
            .iter()
            .find(|s| s.is_def() && s.name() == Some(name))
    }

    pub fn methods(&self) -> impl Iterator<Item = &Statement> {
        self.body.iter().filter(|s| s.is_def())
    }

    /// The first `return` statement directly inside this block.
    pub fn first_return(&self) -> Option<&Statement> {
        self.body
            .iter()
            .find(|s| matches!(s.kind, StatementKind::Return { .. }))
    }
}

/// Tokenized source plus its statement tree.
#[derive(Debug, Clone)]
pub struct SourceOutline<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pub statements: Vec<Statement>,
}

impl<'a> SourceOutline<'a> {
    pub fn parse(source: &'a str) -> Result<Self, OutlineError> {
        let tokens = Tokenizer::tokenize(source)?;
        let statements = {
            let mut builder = Builder {
                tokens: &tokens,
                pos: 0,
            };
            builder.block(false)?
        };
        Ok(Self {
            source,
            tokens,
            statements,
        })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Top-level class with the given name.
    pub fn class(&self, name: &str) -> Option<&Statement> {
        self.statements
            .iter()
            .find(|s| s.is_class() && s.name() == Some(name))
    }

    pub fn classes(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.is_class())
    }

    /// The exact source lines `first..=last` (1-based), line breaks included.
    pub fn lines(&self, first: usize, last: usize) -> String {
        self.source
            .split_inclusive('\n')
            .skip(first.saturating_sub(1))
            .take(last.saturating_sub(first) + 1)
            .collect()
    }

    /// The complete declaration text of a statement: decorators, header, block.
    pub fn statement_text(&self, statement: &Statement) -> String {
        self.lines(statement.first_line, statement.last_line)
    }

    /// Everything after the given statement's last line.
    pub fn text_after(&self, statement: &Statement) -> String {
        self.source
            .split_inclusive('\n')
            .skip(statement.last_line)
            .collect()
    }

    /// Evaluates a token range as a data literal.
    pub fn literal(&self, range: Range<usize>) -> Result<Literal, LiteralError> {
        LiteralParser::parse(&self.tokens[range])
    }

    /// The leading dotted name of a decorator (`comp.instance_method` for
    /// `@comp.instance_method(timeout=3)`).
    pub fn decorator_path(&self, decorator: &Decorator) -> String {
        let mut path = String::new();
        for token in &self.tokens[decorator.tokens.clone()] {
            match &token.kind {
                TokenKind::Name(n) => path.push_str(n),
                TokenKind::Op(o) if o == "." => path.push('.'),
                _ => break,
            }
        }
        path
    }

    /// Base class expressions of a class statement.
    pub fn bases(&self, statement: &Statement) -> Result<Vec<Literal>, LiteralError> {
        match &statement.kind {
            StatementKind::Class {
                bases: Some(range), ..
            } => match self.literal(range.start.saturating_sub(1)..range.end + 1)? {
                Literal::Tuple(items) => Ok(items),
                single => Ok(vec![single]),
            },
            _ => Ok(Vec::new()),
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

static END_MARKER: TokenKind = TokenKind::EndMarker;

struct Builder<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl Builder<'_> {
    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(&END_MARKER, |t| &t.kind)
    }

    fn line(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |t| t.start.line)
    }

    fn unexpected(&self) -> OutlineError {
        OutlineError::Unexpected {
            token: self.peek().to_string(),
            line: self.line(),
        }
    }

    /// Index of the `INDENT` opening a block, past any blank or comment-only
    /// lines. Those lines come before the `INDENT` in the token stream.
    fn indent_ahead(&self) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .position(|t| !matches!(t.kind, TokenKind::Nl | TokenKind::Comment(_)))
            .map(|i| self.pos + i)
            .filter(|&i| self.tokens[i].kind == TokenKind::Indent)
    }

    fn block(&mut self, nested: bool) -> Result<Vec<Statement>, OutlineError> {
        let mut statements = Vec::new();
        let mut decorators: Vec<Decorator> = Vec::new();

        loop {
            match self.peek() {
                TokenKind::Nl | TokenKind::Comment(_) | TokenKind::Newline => self.pos += 1,
                TokenKind::Dedent if nested => {
                    self.pos += 1;
                    break;
                }
                TokenKind::EndMarker if !nested => break,
                TokenKind::Dedent | TokenKind::EndMarker | TokenKind::Indent => {
                    return Err(self.unexpected());
                }
                _ => {
                    let first_line = self.line();
                    let header_start = self.pos;
                    let newline = self.tokens[header_start..]
                        .iter()
                        .position(|t| t.kind == TokenKind::Newline)
                        .map(|i| header_start + i)
                        .ok_or_else(|| self.unexpected())?;
                    let mut last_line = self.tokens[newline].start.line;
                    self.pos = newline + 1;

                    if self.tokens[header_start].kind.is_op("@") {
                        decorators.push(Decorator {
                            line: first_line,
                            tokens: header_start + 1..newline,
                        });
                        continue;
                    }

                    let mut body = Vec::new();
                    if let Some(indent) = self.indent_ahead() {
                        self.pos = indent + 1;
                        body = self.block(true)?;
                        if let Some(last) = body.last() {
                            last_line = last.last_line;
                        }
                    }

                    let kind = classify(self.tokens, header_start..newline);
                    if body.is_empty() {
                        if let Some(inline) = inline_body(self.tokens, &kind, header_start..newline)
                        {
                            body = inline;
                        }
                    }

                    let decorators = std::mem::take(&mut decorators);
                    let first_line = decorators.first().map_or(first_line, |d| d.line);
                    statements.push(Statement {
                        kind,
                        decorators,
                        first_line,
                        last_line,
                        body,
                    });
                }
            }
        }

        if let Some(dangling) = decorators.first() {
            return Err(OutlineError::DanglingDecorator {
                line: dangling.line,
            });
        }
        Ok(statements)
    }
}

/// Indices of significant tokens (no comments or non-logical breaks).
fn significant(tokens: &[Token], range: Range<usize>) -> Vec<usize> {
    range.filter(|&i| !tokens[i].kind.is_trivia()).collect()
}

fn name_at(tokens: &[Token], index: Option<&usize>) -> Option<String> {
    match index.map(|&i| &tokens[i].kind) {
        Some(TokenKind::Name(n)) => Some(n.clone()),
        _ => None,
    }
}

/// Index of the first `:` at bracket depth zero.
fn header_colon(tokens: &[Token], range: Range<usize>) -> Option<usize> {
    let mut depth = 0usize;
    for i in range {
        match &tokens[i].kind {
            TokenKind::Op(o) if matches!(o.as_str(), "(" | "[" | "{") => depth += 1,
            TokenKind::Op(o) if matches!(o.as_str(), ")" | "]" | "}") => {
                depth = depth.saturating_sub(1)
            }
            TokenKind::Op(o) if o == ":" && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Index of the bracket closing the one opened at `open`.
fn matching_close(tokens: &[Token], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in open..end {
        match &tokens[i].kind {
            TokenKind::Op(o) if matches!(o.as_str(), "(" | "[" | "{") => depth += 1,
            TokenKind::Op(o) if matches!(o.as_str(), ")" | "]" | "}") => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn classify(tokens: &[Token], range: Range<usize>) -> StatementKind {
    let sig = significant(tokens, range.clone());
    let Some(&first) = sig.first() else {
        return StatementKind::Other;
    };

    match &tokens[first].kind {
        TokenKind::Name(kw) if kw == "class" => {
            let Some(name) = name_at(tokens, sig.get(1)) else {
                return StatementKind::Other;
            };
            let bases = sig
                .get(2)
                .filter(|&&i| tokens[i].kind.is_op("("))
                .and_then(|&open| {
                    matching_close(tokens, open, range.end).map(|close| open + 1..close)
                });
            StatementKind::Class { name, bases }
        }
        TokenKind::Name(kw) if kw == "def" => match name_at(tokens, sig.get(1)) {
            Some(name) => StatementKind::Def {
                name,
                is_async: false,
            },
            None => StatementKind::Other,
        },
        TokenKind::Name(kw)
            if kw == "async" && sig.get(1).is_some_and(|&i| tokens[i].kind.is_name("def")) =>
        {
            match name_at(tokens, sig.get(2)) {
                Some(name) => StatementKind::Def {
                    name,
                    is_async: true,
                },
                None => StatementKind::Other,
            }
        }
        TokenKind::Name(kw) if kw == "return" => {
            let end = statement_end(tokens, first + 1..range.end);
            let value = (first + 1..end)
                .any(|i| !tokens[i].kind.is_trivia())
                .then_some(first + 1..end);
            StatementKind::Return { value }
        }
        TokenKind::Name(target) => {
            let Some(&second) = sig.get(1) else {
                return StatementKind::Other;
            };
            if !(tokens[second].kind.is_op("=") || tokens[second].kind.is_op(":")) {
                return StatementKind::Other;
            }
            let eq = sig
                .iter()
                .skip(1)
                .find(|&&i| tokens[i].kind.is_op("="))
                .copied();
            match eq {
                Some(eq) => StatementKind::Assign {
                    target: target.clone(),
                    value: eq + 1..statement_end(tokens, eq + 1..range.end),
                },
                None => StatementKind::Other,
            }
        }
        _ => StatementKind::Other,
    }
}

/// End of a simple statement: the first `;` at depth zero, or the range end.
fn statement_end(tokens: &[Token], range: Range<usize>) -> usize {
    let mut depth = 0usize;
    for i in range.clone() {
        match &tokens[i].kind {
            TokenKind::Op(o) if matches!(o.as_str(), "(" | "[" | "{") => depth += 1,
            TokenKind::Op(o) if matches!(o.as_str(), ")" | "]" | "}") => {
                depth = depth.saturating_sub(1)
            }
            TokenKind::Op(o) if o == ";" && depth == 0 => return i,
            _ => {}
        }
    }
    range.end
}

/// Statements written on the same line as a `def`/`class` header.
fn inline_body(
    tokens: &[Token],
    kind: &StatementKind,
    range: Range<usize>,
) -> Option<Vec<Statement>> {
    if !matches!(kind, StatementKind::Def { .. } | StatementKind::Class { .. }) {
        return None;
    }
    let colon = header_colon(tokens, range.clone())?;
    let line = tokens[colon].start.line;
    let mut statements = Vec::new();
    let mut start = colon + 1;
    while start < range.end {
        let end = statement_end(tokens, start..range.end);
        if (start..end).any(|i| !tokens[i].kind.is_trivia()) {
            statements.push(Statement {
                kind: classify(tokens, start..end),
                decorators: Vec::new(),
                first_line: line,
                last_line: line,
                body: Vec::new(),
            });
        }
        start = end + 1;
    }
    Some(statements)
}
