//! Core engine for stubql: stub declarations, SQL analysis, matching, literal
//! decoding, and the mock driver that answers queries from a registry.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod analyze;
pub mod config;
pub mod decode;
pub mod driver;
pub mod error;
pub mod intent;
pub mod matcher;
pub mod obs;
pub mod registry;
pub mod stub;
pub mod value;

// re-exports
pub use error::Error;

///
/// Prelude
///
/// Everything a test needs to declare stubs and query through a connection.
/// Diagnostics, analysis, and decoding internals stay one level down.
///

pub mod prelude {
    pub use crate::{
        driver::{Connection, Driver, MockConnection, MockDriver, Row, Rows, Statement},
        error::{Error, NoRowsError},
        registry::Registry,
        stub::{ExecResult, StubBuilder, StubId},
        value::{ColumnType, FromRow, FromValue, Value},
    };
}
