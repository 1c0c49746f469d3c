use crate::{
    decode::{DecodeError, RowSet, decode_literal},
    error::{Error, StubError},
    intent::StatementKind,
    registry::Registry,
    stub::{ExecResult, RowSource, StubId, StubPattern, StubResponse},
    value::{ColumnType, Value},
};
use std::sync::Arc;

///
/// StubBuilder
///
/// By-value fluent builder. Every refinement returns a new builder; only a
/// terminal `stub_*` call touches the registry, and it does so exactly once.
///

#[must_use = "a stub is only registered by a terminal stub_* call"]
#[derive(Clone)]
pub struct StubBuilder<'r> {
    registry: &'r Registry,
    pattern: StubPattern,
}

impl<'r> StubBuilder<'r> {
    pub(crate) fn new(registry: &'r Registry, kind: StatementKind, columns: &[&str]) -> Self {
        let columns = columns.iter().map(|c| (*c).to_string()).collect();

        Self {
            registry,
            pattern: StubPattern::new(kind, columns),
        }
    }

    /// Borrow the pattern built so far.
    pub const fn pattern(&self) -> &StubPattern {
        &self.pattern
    }

    fn map_pattern(mut self, map: impl FnOnce(&mut StubPattern)) -> Self {
        map(&mut self.pattern);
        self
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Restrict to queries whose target table is exactly `table`.
    pub fn from(self, table: impl Into<String>) -> Self {
        let table = table.into();
        self.map_pattern(|p| p.table = Some(table))
    }

    /// Alias of `from` for INSERT stubs.
    pub fn into(self, table: impl Into<String>) -> Self {
        self.from(table)
    }

    /// Alias of `from` for UPDATE stubs.
    pub fn table(self, table: impl Into<String>) -> Self {
        self.from(table)
    }

    /// Require `column = value` in the WHERE clause. Repeating a column
    /// replaces its value.
    pub fn where_(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let (column, value) = (column.into(), value.into());
        self.map_pattern(|p| {
            p.predicates.insert(column, value);
        })
    }

    /// Require an INSERT value or UPDATE assignment `column = value`.
    pub fn value(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let (column, value) = (column.into(), value.into());
        self.map_pattern(|p| {
            p.values.insert(column, value);
        })
    }

    /// Rank this stub by `priority` instead of by specificity.
    pub fn priority(self, priority: i64) -> Self {
        self.map_pattern(|p| p.priority = Some(priority))
    }

    /// Declare column types for literal decoding, in column order.
    pub fn types(self, types: &[ColumnType]) -> Self {
        let types = types.to_vec();
        self.map_pattern(|p| p.types = Some(types))
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    /// Answer with rows from a literal table.
    ///
    /// With declared columns the literal is decoded now and a malformed
    /// literal registers nothing. Otherwise decoding waits for the query,
    /// whose requested columns then fix the width; declared types still
    /// apply then.
    pub fn stub_rows(self, literal: impl AsRef<str>) -> Result<StubId, Error> {
        let literal = literal.as_ref();

        let source = if self.pattern.columns.is_empty() {
            RowSource::Deferred(Arc::from(literal))
        } else {
            let width = Some(self.pattern.columns.len());
            let rows = decode_literal(literal, width, self.pattern.types.as_deref())?;
            RowSource::Decoded(Arc::new(rows))
        };

        Ok(self.register(StubResponse::Rows(source)))
    }

    /// Answer with pre-built rows. Every row must match the declared
    /// column count, or the first row's width when none is declared.
    pub fn stub_values(self, rows: Vec<Vec<Value>>) -> Result<StubId, Error> {
        let expected = if self.pattern.columns.is_empty() {
            rows.first().map_or(0, Vec::len)
        } else {
            self.pattern.columns.len()
        };

        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(DecodeError::FieldCount {
                row,
                expected,
                found: values.len(),
            }
            .into());
        }

        let source = RowSource::Decoded(Arc::new(RowSet::new(rows)));

        Ok(self.register(StubResponse::Rows(source)))
    }

    /// Answer with `err`. Callers receive it as `Error::Stubbed` and can
    /// downcast back to `E`.
    pub fn stub_error<E>(self, err: E) -> StubId
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.register(StubResponse::Error(StubError::new(err)))
    }

    /// Answer an exec statement with an insert id and affected-row count.
    pub fn stub_result(self, last_insert_id: i64, rows_affected: u64) -> StubId {
        self.register(StubResponse::Exec(ExecResult {
            last_insert_id: Some(last_insert_id),
            rows_affected,
        }))
    }

    fn register(self, response: StubResponse) -> StubId {
        self.registry.register(self.pattern, response)
    }
}
