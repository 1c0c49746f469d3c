use crate::{
    analyze::{Analyzer, SqlAnalyzer},
    decode::{DecodeError, RowSet, literal_lines},
    driver::{Connection, Driver, Rows, Statement},
    error::Error,
    intent::QueryIntent,
    obs::DiagnosticsEvent,
    registry::{Registry, Resolved},
    stub::{ExecResult, RowSource, StubResponse},
    value::Value,
};
use std::sync::Arc;

///
/// MockDriver
///
/// Driver whose connections answer from one shared registry.
/// The DSN is accepted for interface parity and otherwise ignored.
///

#[derive(Clone)]
pub struct MockDriver {
    registry: Arc<Registry>,
    analyzer: Arc<dyn Analyzer>,
}

impl MockDriver {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            analyzer: Arc::new(SqlAnalyzer),
        }
    }

    /// Swap the SQL analyzer used by connections opened afterwards.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl Driver for MockDriver {
    type Connection = MockConnection;

    fn open(&self, _dsn: &str) -> Result<MockConnection, Error> {
        Ok(MockConnection {
            registry: Arc::clone(&self.registry),
            analyzer: Arc::clone(&self.analyzer),
            state: ConnectionState::Open,
        })
    }
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

///
/// ConnectionState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Open,
    Closed,
}

///
/// MockConnection
///

pub struct MockConnection {
    registry: Arc<Registry>,
    analyzer: Arc<dyn Analyzer>,
    state: ConnectionState,
}

impl MockConnection {
    /// Open a connection on `registry` with the default analyzer.
    #[must_use]
    pub fn open(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            analyzer: Arc::new(SqlAnalyzer),
            state: ConnectionState::Open,
        }
    }

    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    // Analyze, then resolve under the registry's read lock.
    fn resolve(&self, sql: &str, args: &[Value]) -> Result<(QueryIntent, Resolved), Error> {
        let intent = self.analyzer.analyze(sql, args)?;

        match self.registry.resolve_query(sql, args, &intent) {
            Some(resolved) => Ok((intent, resolved)),
            None => Err(Error::unstubbed(sql, args)),
        }
    }

    fn stubbed_error(&self, resolved: &Resolved) -> Option<Error> {
        match &resolved.response {
            StubResponse::Error(err) => {
                self.registry
                    .emit(&DiagnosticsEvent::StubbedError { stub: resolved.id });
                Some(Error::Stubbed(err.clone()))
            }
            _ => None,
        }
    }

    fn run_query(&self, sql: &str, args: &[Value]) -> Result<Rows, Error> {
        let (intent, resolved) = self.resolve(sql, args)?;
        if let Some(err) = self.stubbed_error(&resolved) {
            return Err(err);
        }

        let columns = if resolved.columns.is_empty() {
            intent.columns
        } else {
            resolved.columns
        };

        let rows = match resolved.response {
            StubResponse::Rows(RowSource::Decoded(rows)) => {
                check_width(&columns, &rows)?;
                Rows::decoded(columns, rows)
            }
            StubResponse::Rows(RowSource::Deferred(literal)) => {
                Rows::deferred(columns, literal, resolved.types)
            }
            StubResponse::Exec(_) | StubResponse::Error(_) => Rows::empty(columns),
        };

        Ok(rows)
    }

    fn run_execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Error> {
        let (_, resolved) = self.resolve(sql, args)?;
        if let Some(err) = self.stubbed_error(&resolved) {
            return Err(err);
        }

        // a row stub answering an exec reports its row count as affected
        let result = match resolved.response {
            StubResponse::Exec(result) => result,
            StubResponse::Rows(RowSource::Decoded(rows)) => ExecResult {
                last_insert_id: None,
                rows_affected: count(rows.len()),
            },
            StubResponse::Rows(RowSource::Deferred(literal)) => ExecResult {
                last_insert_id: None,
                rows_affected: count(literal_lines(&literal).count()),
            },
            StubResponse::Error(_) => ExecResult::default(),
        };

        Ok(result)
    }

    const fn ensure_open(&self) -> Result<(), Error> {
        match self.state {
            ConnectionState::Open => Ok(()),
            ConnectionState::Closed => Err(Error::Closed {
                resource: "connection",
            }),
        }
    }
}

// Pre-decoded rows must line up with the column names they are served under.
fn check_width(columns: &[String], rows: &RowSet) -> Result<(), Error> {
    match rows.width() {
        Some(found) if !columns.is_empty() && found != columns.len() => {
            Err(DecodeError::FieldCount {
                row: 0,
                expected: columns.len(),
                found,
            }
            .into())
        }
        _ => Ok(()),
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

impl Connection for MockConnection {
    type Statement<'c> = MockStatement<'c>;

    fn prepare(&self, sql: &str) -> Result<MockStatement<'_>, Error> {
        self.ensure_open()?;

        Ok(MockStatement {
            conn: self,
            sql: sql.to_string(),
            state: StatementState::Prepared,
        })
    }

    fn close(&mut self) -> Result<(), Error> {
        self.state = ConnectionState::Closed;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state == ConnectionState::Closed
    }
}

impl std::fmt::Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

///
/// StatementState
///
/// Prepared ⇄ Executing → Closed. A statement is Executing only while a
/// run is in progress and may run any number of times before it is closed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatementState {
    Prepared,
    Executing,
    Closed,
}

///
/// MockStatement
///

#[derive(Debug)]
pub struct MockStatement<'c> {
    conn: &'c MockConnection,
    sql: String,
    state: StatementState,
}

impl MockStatement<'_> {
    #[must_use]
    pub const fn state(&self) -> StatementState {
        self.state
    }

    fn begin(&mut self) -> Result<(), Error> {
        if self.state == StatementState::Closed {
            return Err(Error::Closed {
                resource: "statement",
            });
        }
        self.conn.ensure_open()?;
        self.state = StatementState::Executing;

        Ok(())
    }
}

impl Statement for MockStatement<'_> {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn query(&mut self, args: &[Value]) -> Result<Rows, Error> {
        self.begin()?;
        let result = self.conn.run_query(&self.sql, args);
        self.state = StatementState::Prepared;

        result
    }

    fn execute(&mut self, args: &[Value]) -> Result<ExecResult, Error> {
        self.begin()?;
        let result = self.conn.run_execute(&self.sql, args);
        self.state = StatementState::Prepared;

        result
    }

    fn close(&mut self) {
        self.state = StatementState::Closed;
    }
}
