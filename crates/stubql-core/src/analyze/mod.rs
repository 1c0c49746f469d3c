//! Module: analyze
//! Responsibility: raw SQL text + bound arguments → `QueryIntent`.
//! Does not own: a full SQL grammar. The reader understands the outline of
//! SELECT / INSERT / UPDATE / DELETE and equality predicates joined by AND;
//! everything else is skipped or classified as `StatementKind::Other`.

mod lexer;
mod reader;


use crate::{intent::QueryIntent, value::Value};
use thiserror::Error as ThisError;

///
/// AnalyzeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum AnalyzeError {
    #[error("empty statement")]
    EmptyStatement,

    #[error("unterminated string literal at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unterminated quoted identifier at offset {offset}")]
    UnterminatedIdentifier { offset: usize },

    #[error("unterminated block comment at offset {offset}")]
    UnterminatedComment { offset: usize },

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid numeric literal '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("invalid placeholder at offset {offset}")]
    InvalidPlaceholder { offset: usize },

    #[error("expected {expected} at offset {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },

    #[error("statement expects {expected} argument(s), got {found}")]
    ArgumentCount { expected: usize, found: usize },
}

///
/// Analyzer
///
/// Seam between the driver and whatever understands SQL text.
/// Implementations must be pure: same input, same intent.
///

pub trait Analyzer: Send + Sync {
    fn analyze(&self, sql: &str, args: &[Value]) -> Result<QueryIntent, AnalyzeError>;
}

///
/// SqlAnalyzer
///
/// Default analyzer backed by the built-in lexer and statement reader.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SqlAnalyzer;

impl Analyzer for SqlAnalyzer {
    fn analyze(&self, sql: &str, args: &[Value]) -> Result<QueryIntent, AnalyzeError> {
        let tokens = lexer::Lexer::tokenize(sql)?;
        let tokens = reader::bind(tokens, args)?;

        reader::Reader::new(sql, tokens).read()
    }
}

impl<F> Analyzer for F
where
    F: Fn(&str, &[Value]) -> Result<QueryIntent, AnalyzeError> + Send + Sync,
{
    fn analyze(&self, sql: &str, args: &[Value]) -> Result<QueryIntent, AnalyzeError> {
        self(sql, args)
    }
}
