//! Diagnostics sink boundary.
//!
//! This module is the only bridge between query handling and log output.

use crate::{intent::StatementKind, stub::StubId, value::Value};

///
/// DiagnosticsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum DiagnosticsEvent<'a> {
    Matched {
        stub: StubId,
        kind: StatementKind,
        sql: &'a str,
    },
    Unstubbed {
        sql: &'a str,
        args: &'a [Value],
    },
    StubbedError {
        stub: StubId,
    },
}

///
/// DiagnosticsSink
///

pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: &DiagnosticsEvent<'_>);
}

///
/// TracingSink
/// Default sink; one `tracing` event per diagnostic under target `stubql`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &DiagnosticsEvent<'_>) {
        match event {
            DiagnosticsEvent::Matched { stub, kind, sql } => {
                tracing::debug!(target: "stubql", stub = %stub, kind = %kind, sql, "stub matched");
            }
            DiagnosticsEvent::Unstubbed { sql, args } => {
                tracing::warn!(target: "stubql", sql, args = ?args, "unstubbed query");
            }
            DiagnosticsEvent::StubbedError { stub } => {
                tracing::debug!(target: "stubql", stub = %stub, "stub answered with error");
            }
        }
    }
}
