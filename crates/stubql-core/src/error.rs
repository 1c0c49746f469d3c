use crate::{
    analyze::AnalyzeError,
    decode::DecodeError,
    value::{ScanError, Value},
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure surfaced through the connectivity interface.
/// Nothing is retried; a mock has no transient failures.
///

#[derive(Debug, ThisError)]
pub enum Error {
    /// No registered stub matched the query.
    #[error("unstubbed query: {sql} {}", format_args_list(.args))]
    Unstubbed { sql: String, args: Vec<Value> },

    /// A literal row set could not be aligned to its columns.
    #[error("malformed literal: {0}")]
    MalformedLiteral(#[from] DecodeError),

    /// The matched stub answers with an error; passed through untouched.
    #[error(transparent)]
    Stubbed(StubError),

    /// Single-row query produced no rows.
    #[error("no rows in result set")]
    NoRows,

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("{resource} is closed")]
    Closed { resource: &'static str },
}

impl Error {
    pub(crate) fn unstubbed(sql: impl Into<String>, args: &[Value]) -> Self {
        Self::Unstubbed {
            sql: sql.into(),
            args: args.to_vec(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Unstubbed { .. } => ErrorClass::Unstubbed,
            Self::MalformedLiteral(_) => ErrorClass::MalformedLiteral,
            Self::Stubbed(_) => ErrorClass::Stubbed,
            Self::NoRows => ErrorClass::NotFound,
            Self::Analyze(_) => ErrorClass::Analyze,
            Self::Scan(_) => ErrorClass::Scan,
            Self::Closed { .. } => ErrorClass::State,
        }
    }

    #[must_use]
    pub const fn is_unstubbed(&self) -> bool {
        matches!(self, Self::Unstubbed { .. })
    }

    /// True for an empty single-row result and for a stubbed `NoRowsError`.
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows) || self.downcast_stubbed::<NoRowsError>().is_some()
    }

    /// Borrow the original stubbed error as its concrete type.
    #[must_use]
    pub fn downcast_stubbed<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Stubbed(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

fn format_args_list(args: &[Value]) -> String {
    let rendered: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Value::Text(s) => format!("'{s}'"),
            other => other.to_string(),
        })
        .collect();

    format!("[{}]", rendered.join(", "))
}

///
/// ErrorClass
///
/// Stable classification of `Error` for callers that branch on kind.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Unstubbed,
    MalformedLiteral,
    Stubbed,
    NotFound,
    Analyze,
    Scan,
    State,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unstubbed => "unstubbed",
            Self::MalformedLiteral => "malformed_literal",
            Self::Stubbed => "stubbed",
            Self::NotFound => "not_found",
            Self::Analyze => "analyze",
            Self::Scan => "scan",
            Self::State => "state",
        };
        f.write_str(label)
    }
}

///
/// StubError
///
/// Shared handle to the error a stub was declared with.
/// Cloned out of the registry for every matching query.
///

#[derive(Clone)]
pub struct StubError(Arc<dyn std::error::Error + Send + Sync + 'static>);

impl StubError {
    #[must_use]
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        let inner: &(dyn std::error::Error + 'static) = self.0.as_ref();
        inner.downcast_ref::<E>()
    }
}

impl fmt::Debug for StubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for StubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for StubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

///
/// NoRowsError
///
/// Ready-made stub response for "row not found" lookups.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ThisError)]
#[error("no rows in result set")]
pub struct NoRowsError;
