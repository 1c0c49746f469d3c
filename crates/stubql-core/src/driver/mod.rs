//! Module: driver
//! Responsibility: the generic connectivity contract (driver → connection →
//! statement → rows) and its stub-backed implementation.
//! Does not own: SQL understanding (see `analyze`) or ranking (see `matcher`).
//!
//! Application code written against `Connection` cannot tell the mock from a
//! real driver.

mod mock;
mod rows;


use crate::{error::Error, stub::ExecResult, value::Value};

// re-exports
pub use mock::{ConnectionState, MockConnection, MockDriver, MockStatement, StatementState};
pub use rows::{Row, Rows};

///
/// Driver
///

pub trait Driver {
    type Connection: Connection;

    /// Open a connection. `dsn` is driver-specific.
    fn open(&self, dsn: &str) -> Result<Self::Connection, Error>;
}

///
/// Connection
///

pub trait Connection {
    type Statement<'c>: Statement
    where
        Self: 'c;

    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>, Error>;

    fn close(&mut self) -> Result<(), Error>;

    fn is_closed(&self) -> bool;

    /// Prepare, run once, and return the row stream.
    fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, Error> {
        let mut stmt = self.prepare(sql)?;
        stmt.query(args)
    }

    /// Prepare, run once, and return the exec outcome.
    fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Error> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute(args)
    }

    /// First row of the result, or `Error::NoRows`.
    fn query_row(&self, sql: &str, args: &[Value]) -> Result<Row, Error> {
        let mut rows = self.query(sql, args)?;
        rows.next().unwrap_or(Err(Error::NoRows))
    }
}

///
/// Statement
///

pub trait Statement {
    fn sql(&self) -> &str;

    fn query(&mut self, args: &[Value]) -> Result<Rows, Error>;

    fn execute(&mut self, args: &[Value]) -> Result<ExecResult, Error>;

    fn close(&mut self);
}
