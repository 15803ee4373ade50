//! Python-aware tokenizer with source positions.
//!
//! Produces the same token classes the CPython `tokenize` module does for the
//! subset of the language that appears in definition files: names, numbers,
//! strings (prefixed, triple-quoted, continued), comments, operators, and the
//! layout tokens `NEWLINE`, `NL`, `INDENT` and `DEDENT`.
//!
//! Columns are counted in characters, offsets in bytes. Bracket depth is only
//! tracked on operator tokens, so brackets inside strings and comments never
//! influence layout.

use std::fmt;

use thiserror::Error;

const TAB_SIZE: usize = 8;

const THREE_CHAR_OPS: &[&str] = &["**=", "//=", ">>=", "<<=", "..."];
const TWO_CHAR_OPS: &[&str] = &[
    "->", ":=", "==", "!=", "<=", ">=", "**", "//", "<<", ">>", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "@=",
];
const ONE_CHAR_OPS: &str = "()[]{}:,;.+-*/%&|^~<>=@!";

// ── Positions ────────────────────────────────────────────────────────────────

/// Source span (byte offsets into the tokenized text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// 1-based line, 0-based character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ── Tokens ───────────────────────────────────────────────────────────────────

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword
    Name(String),
    /// Numeric literal, raw text
    Number(String),
    /// String literal, raw text including prefix and quotes
    String(String),
    /// Operator or delimiter
    Op(String),
    /// `#` comment, without the line break
    Comment(String),
    /// End of a logical line
    Newline,
    /// Line break that does not end a logical line
    Nl,
    Indent,
    Dedent,
    EndMarker,
}

impl TokenKind {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self, TokenKind::Op(o) if o == op)
    }

    pub fn is_name(&self, name: &str) -> bool {
        matches!(self, TokenKind::Name(n) if n == name)
    }

    /// Tokens that carry no meaning for expression parsing.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment(_) | TokenKind::Nl)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Name(s) | TokenKind::Number(s) | TokenKind::String(s) => write!(f, "{s}"),
            TokenKind::Op(s) => write!(f, "'{s}'"),
            TokenKind::Comment(s) => write!(f, "{s}"),
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Nl => write!(f, "NL"),
            TokenKind::Indent => write!(f, "INDENT"),
            TokenKind::Dedent => write!(f, "DEDENT"),
            TokenKind::EndMarker => write!(f, "ENDMARKER"),
        }
    }
}

/// Token with span and line/column positions
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub start: Position,
    pub end: Position,
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated string literal at {0}")]
    UnterminatedString(Position),

    #[error("unexpected character '{ch}' at {at}")]
    UnexpectedCharacter { ch: char, at: Position },

    #[error("unindent does not match any outer indentation level at line {0}")]
    InconsistentDedent(usize),

    #[error("unexpected end of input inside a bracketed or continued statement")]
    UnexpectedEof,
}

// ── Tokenizer ────────────────────────────────────────────────────────────────

/// Open triple-quoted (or backslash-continued) string spanning lines.
struct PendingString {
    offset: usize,
    start: Position,
    quote: &'static str,
}

/// Line-oriented tokenizer
pub struct Tokenizer<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    indents: Vec<usize>,
    depth: usize,
    continued: bool,
    pending: Option<PendingString>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: Vec::new(),
            indents: vec![0],
            depth: 0,
            continued: false,
            pending: None,
        }
    }

    /// Tokenize entire input
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
        Tokenizer::new(input).run()
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut line_start = 0usize;
        let mut line_no = 0usize;
        let mut last_line_end = Position::new(1, 0);

        for line in self.input.split_inclusive('\n') {
            line_no += 1;
            let stop = self.tokenize_line(line, line_start, line_no)?;
            last_line_end = Position::new(line_no, line.chars().count());
            line_start += line.len();
            if stop {
                break;
            }
        }

        if self.pending.is_some() {
            let pending = self.pending.take().map(|p| p.start).unwrap_or_default();
            return Err(LexError::UnterminatedString(pending));
        }
        if self.depth > 0 || self.continued {
            return Err(LexError::UnexpectedEof);
        }

        let eof = self.input.len();
        let needs_newline = self
            .tokens
            .iter()
            .rev()
            .find(|t| !matches!(t.kind, TokenKind::Comment(_)))
            .is_some_and(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Newline | TokenKind::Nl | TokenKind::Dedent | TokenKind::Indent
                )
            });
        if needs_newline {
            self.push(TokenKind::Newline, eof, eof, last_line_end, last_line_end);
        }
        let end = Position::new(last_line_end.line + 1, 0);
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, eof, eof, end, end);
        }
        self.push(TokenKind::EndMarker, eof, eof, end, end);

        Ok(self.tokens)
    }

    /// Returns `true` when tokenization should stop (whitespace-only last line).
    fn tokenize_line(
        &mut self,
        line: &str,
        line_start: usize,
        line_no: usize,
    ) -> Result<bool, LexError> {
        let mut pos = 0usize;

        if let Some(pending) = self.pending.take() {
            match find_string_end(line, 0, pending.quote) {
                Some(end) => {
                    let text = &self.input[pending.offset..line_start + end];
                    let end_pos = Position::new(line_no, column_of(line, end));
                    self.push(
                        TokenKind::String(text.to_owned()),
                        pending.offset,
                        line_start + end,
                        pending.start,
                        end_pos,
                    );
                    pos = end;
                }
                None => {
                    if pending.quote.len() == 1 && !ends_with_continuation(line) {
                        return Err(LexError::UnterminatedString(pending.start));
                    }
                    self.pending = Some(pending);
                    return Ok(false);
                }
            }
        } else if self.depth == 0 && !self.continued {
            let (indent_end, column) = measure_indent(line);
            if indent_end == line.len() {
                // Whitespace-only final line without a line break.
                return Ok(true);
            }

            let first = line[indent_end..].chars().next().unwrap_or('\n');
            if first == '#' || first == '\r' || first == '\n' {
                self.blank_or_comment_line(line, line_start, line_no, indent_end);
                return Ok(false);
            }

            let here = Position::new(line_no, column_of(line, indent_end));
            let current = self.indents.last().copied().unwrap_or(0);
            if column > current {
                self.indents.push(column);
                self.push(
                    TokenKind::Indent,
                    line_start,
                    line_start + indent_end,
                    Position::new(line_no, 0),
                    here,
                );
            }
            while column < self.indents.last().copied().unwrap_or(0) {
                self.indents.pop();
                self.push(
                    TokenKind::Dedent,
                    line_start + indent_end,
                    line_start + indent_end,
                    here,
                    here,
                );
            }
            if column != self.indents.last().copied().unwrap_or(0) {
                return Err(LexError::InconsistentDedent(line_no));
            }
            pos = indent_end;
        } else {
            self.continued = false;
        }

        self.tokenize_rest(line, line_start, line_no, pos)?;
        Ok(false)
    }

    fn blank_or_comment_line(
        &mut self,
        line: &str,
        line_start: usize,
        line_no: usize,
        from: usize,
    ) {
        let break_at = line_break_offset(line);
        if line[from..].starts_with('#') {
            self.push(
                TokenKind::Comment(line[from..break_at].to_owned()),
                line_start + from,
                line_start + break_at,
                Position::new(line_no, column_of(line, from)),
                Position::new(line_no, column_of(line, break_at)),
            );
        }
        if break_at < line.len() {
            self.push(
                TokenKind::Nl,
                line_start + break_at,
                line_start + line.len(),
                Position::new(line_no, column_of(line, break_at)),
                Position::new(line_no, column_of(line, line.len())),
            );
        }
    }

    fn tokenize_rest(
        &mut self,
        line: &str,
        line_start: usize,
        line_no: usize,
        mut pos: usize,
    ) -> Result<(), LexError> {
        let bytes = line.as_bytes();
        while pos < line.len() {
            let c = match line[pos..].chars().next() {
                Some(c) => c,
                None => break,
            };
            if c == ' ' || c == '\t' || c == '\x0c' {
                pos += 1;
                continue;
            }

            let start_pos = Position::new(line_no, column_of(line, pos));

            if c == '#' {
                let end = line_break_offset(line);
                let comment = TokenKind::Comment(line[pos..end].to_owned());
                self.push_at(line, line_start, line_no, comment, pos, end);
                pos = end;
                continue;
            }

            if c == '\r' || c == '\n' {
                let kind = if self.depth > 0 {
                    TokenKind::Nl
                } else {
                    TokenKind::Newline
                };
                self.push_at(line, line_start, line_no, kind, pos, line.len());
                pos = line.len();
                continue;
            }

            if c == '\\' {
                let rest = &line[pos + 1..];
                if rest == "\n" || rest == "\r\n" || rest.is_empty() {
                    self.continued = true;
                    return Ok(());
                }
                return Err(LexError::UnexpectedCharacter { ch: c, at: start_pos });
            }

            if let Some((prefix_len, quote)) = string_start(&line[pos..]) {
                let body_start = pos + prefix_len + quote.len();
                match find_string_end(line, body_start, quote) {
                    Some(end) => {
                        self.push_at(
                            line,
                            line_start,
                            line_no,
                            TokenKind::String(line[pos..end].to_owned()),
                            pos,
                            end,
                        );
                        pos = end;
                    }
                    None => {
                        if quote.len() == 1 && !ends_with_continuation(line) {
                            return Err(LexError::UnterminatedString(start_pos));
                        }
                        self.pending = Some(PendingString {
                            offset: line_start + pos,
                            start: start_pos,
                            quote,
                        });
                        return Ok(());
                    }
                }
                continue;
            }

            if c.is_ascii_digit()
                || (c == '.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
            {
                let end = number_end(line, pos);
                self.push_at(
                    line,
                    line_start,
                    line_no,
                    TokenKind::Number(line[pos..end].to_owned()),
                    pos,
                    end,
                );
                pos = end;
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                let end = line[pos..]
                    .char_indices()
                    .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_'))
                    .map_or(line.len(), |(i, _)| pos + i);
                self.push_at(
                    line,
                    line_start,
                    line_no,
                    TokenKind::Name(line[pos..end].to_owned()),
                    pos,
                    end,
                );
                pos = end;
                continue;
            }

            let op = THREE_CHAR_OPS
                .iter()
                .chain(TWO_CHAR_OPS.iter())
                .find(|op| line[pos..].starts_with(**op))
                .map(|op| op.to_string())
                .or_else(|| ONE_CHAR_OPS.contains(c).then(|| c.to_string()));

            match op {
                Some(op) => {
                    match op.as_str() {
                        "(" | "[" | "{" => self.depth += 1,
                        ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                        _ => {}
                    }
                    let end = pos + op.len();
                    self.push_at(line, line_start, line_no, TokenKind::Op(op), pos, end);
                    pos = end;
                }
                None => return Err(LexError::UnexpectedCharacter { ch: c, at: start_pos }),
            }
        }
        Ok(())
    }

    fn push_at(
        &mut self,
        line: &str,
        line_start: usize,
        line_no: usize,
        kind: TokenKind,
        from: usize,
        to: usize,
    ) {
        self.push(
            kind,
            line_start + from,
            line_start + to,
            Position::new(line_no, column_of(line, from)),
            Position::new(line_no, column_of(line, to)),
        );
    }

    fn push(&mut self, kind: TokenKind, from: usize, to: usize, start: Position, end: Position) {
        self.tokens.push(Token {
            kind,
            span: Span::new(from, to),
            start,
            end,
        });
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn column_of(line: &str, offset: usize) -> usize {
    line[..offset].chars().count()
}

/// Byte offset where the line break starts (or the line length).
fn line_break_offset(line: &str) -> usize {
    line.trim_end_matches(['\n', '\r']).len()
}

fn ends_with_continuation(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).ends_with('\\')
}

/// Returns (end byte offset of the leading whitespace, tab-expanded column).
fn measure_indent(line: &str) -> (usize, usize) {
    let mut column = 0usize;
    for (i, c) in line.char_indices() {
        match c {
            ' ' => column += 1,
            '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
            '\x0c' => column = 0,
            _ => return (i, column),
        }
    }
    (line.len(), column)
}

/// Detects a string literal start: returns (prefix length, quote).
fn string_start(rest: &str) -> Option<(usize, &'static str)> {
    let prefix_len = rest
        .chars()
        .take_while(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F'))
        .count();
    if prefix_len > 2 {
        return None;
    }
    let after = &rest[prefix_len..];
    ["'''", "\"\"\"", "'", "\""]
        .into_iter()
        .find(|q| after.starts_with(q))
        .map(|q| (prefix_len, q))
}

/// Finds the byte offset just past the closing quote, honoring escapes.
fn find_string_end(line: &str, from: usize, quote: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote.len() == 1 => return None,
            _ if bytes[i..].starts_with(quote.as_bytes()) => return Some(i + quote.len()),
            _ => i += 1,
        }
    }
    None
}

fn number_end(line: &str, from: usize) -> usize {
    let bytes = line.as_bytes();
    let hex = line[from..].starts_with("0x") || line[from..].starts_with("0X");
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        let exponent_sign = !hex
            && (b == b'+' || b == b'-')
            && i > from
            && matches!(bytes[i - 1], b'e' | b'E');
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Tokenizer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn name(s: &str) -> TokenKind {
        TokenKind::Name(s.into())
    }

    fn op(s: &str) -> TokenKind {
        TokenKind::Op(s.into())
    }

    #[test]
    fn simple_assignment() {
        assert_eq!(
            kinds("a = 1\n"),
            vec![
                name("a"),
                op("="),
                TokenKind::Number("1".into()),
                TokenKind::Newline,
                TokenKind::EndMarker
            ]
        );
    }

    #[test]
    fn indent_and_dedent() {
        let ks = kinds("def f():\n    pass\nx\n");
        assert_eq!(
            ks,
            vec![
                name("def"),
                name("f"),
                op("("),
                op(")"),
                op(":"),
                TokenKind::Newline,
                TokenKind::Indent,
                name("pass"),
                TokenKind::Newline,
                TokenKind::Dedent,
                name("x"),
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn indent_token_ends_at_indent_width() {
        let tokens = Tokenizer::tokenize("if x:\n        y\n").unwrap();
        let indent = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Indent)
            .unwrap();
        assert_eq!(indent.start, Position::new(2, 0));
        assert_eq!(indent.end, Position::new(2, 8));
    }

    #[test]
    fn comment_only_lines_do_not_indent() {
        let ks = kinds("def f():\n        # note\n\n    pass\n");
        assert_eq!(
            &ks[5..],
            &[
                TokenKind::Newline,
                TokenKind::Comment("# note".into()),
                TokenKind::Nl,
                TokenKind::Nl,
                TokenKind::Indent,
                name("pass"),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn brackets_inside_strings_and_comments_are_ignored() {
        let ks = kinds("x = '(' # )\ny = 2\n");
        assert_eq!(ks[2], TokenKind::String("'('".into()));
        assert_eq!(ks[3], TokenKind::Comment("# )".into()));
        assert_eq!(ks[4], TokenKind::Newline);
    }

    #[test]
    fn newlines_inside_brackets_are_nl() {
        let ks = kinds("f(1,\n  2)\n");
        assert!(ks.contains(&TokenKind::Nl));
        assert_eq!(ks.iter().filter(|k| **k == TokenKind::Newline).count(), 1);
        assert!(!ks.contains(&TokenKind::Indent));
    }

    #[test]
    fn backslash_continuation_joins_lines() {
        let ks = kinds("a = 1 + \\\n    2\n");
        assert_eq!(ks.iter().filter(|k| **k == TokenKind::Newline).count(), 1);
        assert!(!ks.contains(&TokenKind::Indent));
    }

    #[test]
    fn triple_quoted_string_spans_lines() {
        let tokens = Tokenizer::tokenize("s = \"\"\"a\n(b\n\"\"\"\n").unwrap();
        let s = &tokens[2];
        assert_eq!(s.kind, TokenKind::String("\"\"\"a\n(b\n\"\"\"".into()));
        assert_eq!(s.start, Position::new(1, 4));
        assert_eq!(s.end, Position::new(3, 3));
        assert_eq!(tokens[3].kind, TokenKind::Newline);
    }

    #[test]
    fn prefixed_strings() {
        let ks = kinds("a = rb'\\d' + f\"{x}\"\n");
        assert_eq!(ks[2], TokenKind::String("rb'\\d'".into()));
        assert_eq!(ks[4], TokenKind::String("f\"{x}\"".into()));
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let ks = kinds("a = 'it\\'s'\n");
        assert_eq!(ks[2], TokenKind::String("'it\\'s'".into()));
    }

    #[test]
    fn missing_trailing_newline_still_emits_newline() {
        let ks = kinds("def f():\n    return 1");
        assert_eq!(
            &ks[ks.len() - 3..],
            &[TokenKind::Newline, TokenKind::Dedent, TokenKind::EndMarker]
        );
    }

    #[test]
    fn multi_char_operators() {
        let ks = kinds("def f() -> int: x **= 2\n");
        assert!(ks.contains(&op("->")));
        assert!(ks.contains(&op("**=")));
    }

    #[test]
    fn exponent_numbers() {
        let ks = kinds("x = 1e-5\n");
        assert_eq!(ks[2], TokenKind::Number("1e-5".into()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            Tokenizer::tokenize("x = 'abc\n"),
            Err(LexError::UnterminatedString(_))
        ));
        assert!(matches!(
            Tokenizer::tokenize("x = '''abc\n"),
            Err(LexError::UnterminatedString(_))
        ));
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        assert!(matches!(
            Tokenizer::tokenize("if x:\n    a\n  b\n"),
            Err(LexError::InconsistentDedent(3))
        ));
    }

    #[test]
    fn unclosed_bracket_is_an_error() {
        assert_eq!(Tokenizer::tokenize("f(1,\n"), Err(LexError::UnexpectedEof));
    }

    #[test]
    fn columns_count_characters() {
        let tokens = Tokenizer::tokenize("s = 'é'; y\n").unwrap();
        let y = tokens.iter().find(|t| t.kind == name("y")).unwrap();
        assert_eq!(y.start.column, 9);
        assert_eq!(y.span.start, 10);
    }
}
