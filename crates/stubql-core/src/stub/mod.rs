//! Module: stub
//! Responsibility: stub declarations and the fluent builder that registers them.
//! Does not own: ranking (see `matcher`) or storage/locking (see `registry`).

mod builder;


use crate::{
    decode::RowSet,
    error::StubError,
    intent::StatementKind,
    value::{ColumnType, Value},
};
use derive_more::Display;
use std::{collections::BTreeMap, fmt, sync::Arc};

// re-exports
pub use builder::StubBuilder;

///
/// StubId
///
/// Registration sequence number; lower ids were registered earlier.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct StubId(pub(crate) u64);

impl StubId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// ExecResult
///
/// Outcome of a statement that returns no rows.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecResult {
    pub last_insert_id: Option<i64>,
    pub rows_affected: u64,
}

///
/// RowSource
///
/// `Decoded` rows were validated at registration. `Deferred` literals had
/// no declared width and are decoded against the query's columns.
///

#[derive(Clone, Debug)]
pub enum RowSource {
    Decoded(Arc<RowSet>),
    Deferred(Arc<str>),
}

///
/// StubResponse
///

#[derive(Clone, Debug)]
pub enum StubResponse {
    Rows(RowSource),
    Error(StubError),
    Exec(ExecResult),
}

///
/// StubPattern
///
/// Filters a stub applies to incoming queries. Empty filters are wildcards.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StubPattern {
    pub kind: StatementKind,
    pub table: Option<String>,
    pub columns: Vec<String>,
    pub predicates: BTreeMap<String, Value>,
    pub values: BTreeMap<String, Value>,
    pub priority: Option<i64>,
    pub types: Option<Vec<ColumnType>>,
}

impl StubPattern {
    #[must_use]
    pub fn new(kind: StatementKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            ..Self::default()
        }
    }

    /// Number of constraining filters; higher means narrower.
    #[must_use]
    pub fn specificity(&self) -> usize {
        usize::from(self.table.is_some())
            + self.columns.len()
            + self.predicates.len()
            + self.values.len()
    }
}

///
/// Stub
///

#[derive(Clone, Debug)]
pub struct Stub {
    pub(crate) id: StubId,
    pub(crate) pattern: StubPattern,
    pub(crate) response: StubResponse,
}

impl Stub {
    #[must_use]
    pub const fn id(&self) -> StubId {
        self.id
    }

    #[must_use]
    pub const fn pattern(&self) -> &StubPattern {
        &self.pattern
    }

    #[must_use]
    pub const fn response(&self) -> &StubResponse {
        &self.response
    }
}

impl fmt::Display for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.pattern;

        write!(f, "{} {}", self.id, p.kind)?;
        if p.columns.is_empty() {
            f.write_str(" *")?;
        } else {
            write!(f, " {}", p.columns.join(", "))?;
        }
        if let Some(table) = &p.table {
            write!(f, " FROM {table}")?;
        }
        for (i, (column, value)) in p.predicates.iter().enumerate() {
            let joiner = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {joiner} {column} = {value}")?;
        }
        for (column, value) in &p.values {
            write!(f, " SET {column} = {value}")?;
        }
        if let Some(priority) = p.priority {
            write!(f, " [priority {priority}]")?;
        }

        match &self.response {
            StubResponse::Rows(RowSource::Decoded(rows)) => write!(f, " => {} row(s)", rows.len()),
            StubResponse::Rows(RowSource::Deferred(_)) => f.write_str(" => deferred rows"),
            StubResponse::Error(err) => write!(f, " => error: {err}"),
            StubResponse::Exec(result) => write!(
                f,
                " => {} affected, last id {:?}",
                result.rows_affected, result.last_insert_id
            ),
        }
    }
}
