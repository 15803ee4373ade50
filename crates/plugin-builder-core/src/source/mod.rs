//! Static reading of Python definition files.
//!
//! Nothing in this module executes the code it reads. The pipeline is
//! lexer → outline (statement tree with line spans) → literal evaluator,
//! plus the extractor that slices hook bodies out of the original text.

pub mod extract;
pub mod lexer;
pub mod literal;
pub mod outline;

pub use extract::{ExtractError, function_body, indent_size, method_source, outdent};
pub use lexer::{LexError, Position, Span, Token, TokenKind, Tokenizer};
pub use literal::{Call, Literal, LiteralError, LiteralParser};
pub use outline::{Decorator, OutlineError, SourceOutline, Statement, StatementKind};
