//! Parser layer — the collaborator boundary plus the bundled parser.
//!
//! The analysis core only ever talks to a [`ShaderParser`]: a stable
//! interface that takes source text and returns a tagged [`ParseOutcome`].
//! Implementations must degrade to a best-effort partial structure on
//! invalid input instead of raising past this boundary.
//!
//! [`StructuralParser`] is the bundled implementation: a logos lexer and a
//! recursive-descent walk that extracts the declaration tree, including
//! method bodies, with per-construct error recovery.

mod lexer;
mod structural;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use structural::parse_source;

use crate::syntax::ParseOutcome;

/// The parser collaborator interface.
///
/// `name` is the expected shader name (the file stem); parsers use it as a
/// fallback when the declaration header itself is unreadable.
pub trait ShaderParser: Send + Sync {
    fn parse(&self, name: &str, source: &str) -> ParseOutcome;
}

/// The bundled recursive-descent structural parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralParser;

impl ShaderParser for StructuralParser {
    fn parse(&self, name: &str, source: &str) -> ParseOutcome {
        parse_source(name, source)
    }
}
