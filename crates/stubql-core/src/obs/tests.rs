use super::*;
use crate::{
    driver::{Connection, MockConnection},
    error::NoRowsError,
    registry::Registry,
    value::Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

///
/// RecordingSink
///

#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, event: &DiagnosticsEvent<'_>) {
        let line = match event {
            DiagnosticsEvent::Matched { stub, kind, .. } => format!("matched {stub} {kind}"),
            DiagnosticsEvent::Unstubbed { sql, args } => format!("unstubbed {sql} {args:?}"),
            DiagnosticsEvent::StubbedError { stub } => format!("error {stub}"),
        };
        self.lines.lock().push(line);
    }
}

fn setup() -> (Arc<Registry>, Arc<RecordingSink>, MockConnection) {
    let registry = Arc::new(Registry::new());
    let sink = Arc::new(RecordingSink::default());
    registry.set_sink(sink.clone());
    let conn = MockConnection::open(Arc::clone(&registry));

    (registry, sink, conn)
}

#[test]
fn quiet_registry_records_nothing() {
    let (_registry, sink, conn) = setup();

    assert!(conn.query("SELECT * FROM beer", &[]).is_err());
    assert!(sink.take().is_empty());
}

#[test]
fn verbose_registry_records_unstubbed_queries() {
    let (registry, sink, conn) = setup();
    registry.set_verbose(true);

    let _ = conn.query("SELECT * FROM beer WHERE id = ?", &[Value::Int(5)]);

    assert_eq!(
        sink.take(),
        ["unstubbed SELECT * FROM beer WHERE id = ? [Int(5)]"]
    );
}

#[test]
fn verbose_registry_records_matches_and_stubbed_errors() {
    let (registry, sink, conn) = setup();
    registry.set_verbose(true);
    let ok = registry.select(&[]).from("beer").stub_rows("1").unwrap();
    let bad = registry.delete().from("beer").stub_error(NoRowsError);

    conn.query_row("SELECT id FROM beer", &[]).unwrap();
    conn.execute("DELETE FROM beer", &[]).unwrap_err();

    assert_eq!(
        sink.take(),
        [
            format!("matched {ok} SELECT"),
            format!("matched {bad} DELETE"),
            format!("error {bad}"),
        ]
    );
}

#[test]
fn counters_track_outcomes_regardless_of_verbosity() {
    let (registry, sink, conn) = setup();
    registry.select(&[]).from("beer").stub_rows("1").unwrap();
    registry.delete().stub_error(NoRowsError);

    conn.query("SELECT id FROM beer", &[]).unwrap();
    conn.query("SELECT id FROM wine", &[]).unwrap_err();
    conn.execute("DELETE FROM beer", &[]).unwrap_err();

    assert_eq!(
        registry.report(),
        QueryReport {
            matched: 2,
            unstubbed: 1,
            stubbed_errors: 1,
        }
    );
    assert!(sink.take().is_empty());
}

#[test]
fn counters_survive_reset() {
    let (registry, _sink, conn) = setup();
    let _ = conn.query("SELECT * FROM t", &[]);

    registry.reset();

    assert_eq!(registry.report().unstubbed, 1);
}

#[test]
fn report_serializes_as_flat_object() {
    let report = QueryReport {
        matched: 3,
        unstubbed: 1,
        stubbed_errors: 0,
    };

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "matched": 3, "unstubbed": 1, "stubbed_errors": 0 })
    );
}

#[test]
fn tracing_sink_accepts_every_event() {
    let sink = TracingSink;
    let args = [Value::Int(1)];

    sink.record(&DiagnosticsEvent::Unstubbed {
        sql: "SELECT 1",
        args: &args,
    });
    sink.record(&DiagnosticsEvent::StubbedError {
        stub: crate::stub::StubId(1),
    });
}
