//! Verbatim hook-body extraction.
//!
//! Hooks are captured as the exact characters the author wrote. The only
//! transformation applied is removal of the wrapping indentation, so nested
//! blocks, comments and multi-line string contents keep their layout.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::lexer::{LexError, Token, TokenKind, Tokenizer};

const TAB_SIZE: usize = 8;

static SYNC_DECORATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(?s:.)+?\ndef").unwrap());
static ASYNC_DECORATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(?s:.)+?\nasync").unwrap());

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("no signature terminator found in:\n{0}")]
    MissingSignatureEnd(String),

    #[error("no indented body found in:\n{0}")]
    MissingBody(String),
}

/// Width of the leading whitespace of `line`, with tabs expanded to 8 columns.
pub fn indent_size(line: &str) -> usize {
    let mut column = 0usize;
    for c in line.chars() {
        match c {
            '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
            c if c.is_whitespace() => column += 1,
            _ => break,
        }
    }
    column
}

/// Removes up to `size` columns of leading whitespace from every line.
///
/// When `size` is `None` the indentation of the first line is used. Lines
/// indented less than `size` lose only the whitespace they have.
pub fn outdent(code: &str, size: Option<usize>) -> String {
    let size = size.unwrap_or_else(|| indent_size(code.split('\n').next().unwrap_or("")));
    code.split('\n')
        .map(|line| strip_columns(line, indent_size(line).min(size)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_columns(line: &str, columns: usize) -> &str {
    let mut column = 0usize;
    for (offset, c) in line.char_indices() {
        if column >= columns {
            return &line[offset..];
        }
        match c {
            '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
            c if c.is_whitespace() => column += 1,
            _ => return &line[offset..],
        }
    }
    if column >= columns { "" } else { line }
}

/// The remainder of `s` after its first `n` characters.
fn skip_chars(s: &str, n: usize) -> &str {
    s.char_indices().nth(n).map_or("", |(i, _)| &s[i..])
}

/// Index of the `:` closing a `def`/`class` signature (depth zero).
fn signature_end(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match &token.kind {
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

/// Extracts the body of a function from its complete declaration text
/// (decorators, signature and block), dedented to column zero.
///
/// Three layouts are recognized after the signature's `:`:
/// a body starting on the next line, a trailing comment followed by the
/// body, and an inline body sharing the signature line.
pub fn function_body(declaration: &str) -> Result<String, ExtractError> {
    let tokens = Tokenizer::tokenize(declaration)?;
    let lines: Vec<&str> = declaration.split('\n').collect();
    let missing_body = || ExtractError::MissingBody(declaration.to_owned());

    let colon = signature_end(&tokens)
        .ok_or_else(|| ExtractError::MissingSignatureEnd(declaration.to_owned()))?;
    let first = tokens.get(colon + 1).ok_or_else(missing_body)?;
    let body_indent = || {
        tokens[colon + 1..]
            .iter()
            .find(|t| t.kind == TokenKind::Indent)
            .and_then(|t| lines.get(t.start.line - 1))
            .map(|line| indent_size(line))
            .ok_or_else(missing_body)
    };

    match &first.kind {
        TokenKind::Newline => {
            let indent = body_indent()?;
            let body = lines[first.start.line.min(lines.len())..].join("\n");
            Ok(outdent(&body, Some(indent)))
        }
        TokenKind::Comment(_) => {
            let indent = body_indent()?;
            let mut body: Vec<String> = lines[first.start.line - 1..]
                .iter()
                .map(|l| (*l).to_owned())
                .collect();
            body[0] = format!(
                "{}{}",
                " ".repeat(indent),
                skip_chars(&body[0], first.start.column)
            );
            Ok(outdent(&body.join("\n"), None))
        }
        TokenKind::EndMarker | TokenKind::Dedent => Err(missing_body()),
        _ => {
            let column = first.start.column;
            let mut body: Vec<String> = lines[first.start.line - 1..]
                .iter()
                .map(|l| (*l).to_owned())
                .collect();
            body[0] = format!("{}{}", " ".repeat(column), skip_chars(&body[0], column));
            Ok(outdent(&body.join("\n"), None))
        }
    }
}

/// Complete method source, dedented, with the decorator lines removed once.
pub fn method_source(declaration: &str, is_async: bool) -> String {
    let code = outdent(declaration, None);
    let (pattern, keyword) = if is_async {
        (&*ASYNC_DECORATORS, "async")
    } else {
        (&*SYNC_DECORATORS, "def")
    };
    pattern.replacen(&code, 1, keyword).into_owned()
}
