//! Module: intent
//! Responsibility: structured, SQL-text-free description of one incoming query.
//! Does not own: lexing/parsing (see `analyze`) or stub ranking (see `matcher`).


use crate::value::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// StatementKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum StatementKind {
    #[display("SELECT")]
    Select,
    #[display("INSERT")]
    Insert,
    #[display("UPDATE")]
    Update,
    #[display("DELETE")]
    Delete,
    #[default]
    #[display("OTHER")]
    Other,
}

impl StatementKind {
    /// True for statements answered with a row set.
    #[must_use]
    pub const fn is_query(self) -> bool {
        matches!(self, Self::Select)
    }
}

///
/// QueryIntent
///
/// Parsed shape of one query with its bound arguments already substituted.
///
/// `columns` is empty when the query names no explicit column list
/// (`SELECT *`, `DELETE`). `predicates` holds equality conditions from the
/// WHERE clause only. `values` holds INSERT values / UPDATE assignments.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryIntent {
    pub kind: StatementKind,
    pub table: Option<String>,
    pub columns: Vec<String>,
    pub predicates: BTreeMap<String, Value>,
    pub values: BTreeMap<String, Value>,
}

impl QueryIntent {
    #[must_use]
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    #[must_use]
    pub fn predicate(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// True when the query did not narrow its column list.
    #[must_use]
    pub const fn any_columns(&self) -> bool {
        self.columns.is_empty()
    }

    /// Test whether the query requests `column`; a query with no explicit
    /// list requests every column.
    #[must_use]
    pub fn requests_column(&self, column: &str) -> bool {
        self.any_columns() || self.columns.iter().any(|c| c == column)
    }

    #[must_use]
    pub fn predicate_value(&self, column: &str) -> Option<&Value> {
        self.predicates.get(column)
    }
}
