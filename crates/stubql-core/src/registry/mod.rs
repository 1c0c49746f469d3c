//! Module: registry
//! Responsibility: ordered stub storage, lifecycle (register/remove/reset),
//! and the lock discipline around matching.
//!
//! Locking: register, remove and reset take the write lock; matching takes
//! the read lock, so concurrent matches never observe a half-applied reset.
//! The registry is an ordinary value. Share it with `Arc` and hand it to
//! every connection that should see its stubs.

#[cfg(test)]
mod tests;

use crate::{
    config::RegistryConfig,
    intent::{QueryIntent, StatementKind},
    matcher,
    obs::{DiagnosticsEvent, DiagnosticsSink, QueryCounters, QueryReport, TracingSink},
    stub::{Stub, StubBuilder, StubId, StubPattern, StubResponse},
    value::{ColumnType, Value},
};
use parking_lot::RwLock;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

///
/// RegistryState
///

#[derive(Default)]
struct RegistryState {
    stubs: Vec<Stub>,
    next_id: u64,
}

///
/// Resolved
///
/// Everything the driver needs from the winning stub, copied out so the
/// read lock is released before rows are produced.
///

#[derive(Clone, Debug)]
pub struct Resolved {
    pub id: StubId,
    pub columns: Vec<String>,
    pub types: Option<Vec<ColumnType>>,
    pub response: StubResponse,
}

///
/// Registry
///

pub struct Registry {
    state: RwLock<RegistryState>,
    verbose: AtomicBool,
    sink: RwLock<Arc<dyn DiagnosticsSink>>,
    counters: QueryCounters,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            verbose: AtomicBool::new(config.verbose),
            sink: RwLock::new(Arc::new(TracingSink)),
            counters: QueryCounters::default(),
        }
    }

    // ------------------------------------------------------------------
    // Builder entrypoints
    // ------------------------------------------------------------------

    /// Start a SELECT stub; an empty column list matches any columns.
    pub fn select(&self, columns: &[&str]) -> StubBuilder<'_> {
        StubBuilder::new(self, StatementKind::Select, columns)
    }

    pub fn insert(&self, columns: &[&str]) -> StubBuilder<'_> {
        StubBuilder::new(self, StatementKind::Insert, columns)
    }

    pub fn update(&self, columns: &[&str]) -> StubBuilder<'_> {
        StubBuilder::new(self, StatementKind::Update, columns)
    }

    pub fn delete(&self) -> StubBuilder<'_> {
        StubBuilder::new(self, StatementKind::Delete, &[])
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub(crate) fn register(&self, pattern: StubPattern, response: StubResponse) -> StubId {
        let mut state = self.state.write();
        state.next_id += 1;
        let id = StubId(state.next_id);

        state.stubs.push(Stub {
            id,
            pattern,
            response,
        });

        id
    }

    /// Remove one stub; returns false if it was already gone.
    pub fn remove(&self, id: StubId) -> bool {
        let mut state = self.state.write();
        let before = state.stubs.len();
        state.stubs.retain(|stub| stub.id != id);

        state.stubs.len() != before
    }

    /// Drop every stub. Ids keep increasing across resets.
    pub fn reset(&self) {
        self.state.write().stubs.clear();
    }

    /// Borrow the registry for one test; stubs are cleared when the guard drops.
    #[must_use = "the registry is reset when the guard is dropped"]
    pub const fn scoped(&self) -> ScopedRegistry<'_> {
        ScopedRegistry { registry: self }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().stubs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Replace the sink that receives verbose diagnostics.
    pub fn set_sink(&self, sink: Arc<dyn DiagnosticsSink>) {
        *self.sink.write() = sink;
    }

    /// Render registered stubs, one per line, in registration order.
    #[must_use]
    pub fn dump(&self) -> String {
        self.state
            .read()
            .stubs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn report(&self) -> QueryReport {
        self.counters.report()
    }

    pub(crate) fn emit(&self, event: &DiagnosticsEvent<'_>) {
        match event {
            DiagnosticsEvent::Matched { .. } => self.counters.matched(),
            DiagnosticsEvent::Unstubbed { .. } => self.counters.unstubbed(),
            DiagnosticsEvent::StubbedError { .. } => self.counters.stubbed_error(),
        }

        if self.is_verbose() {
            let sink = Arc::clone(&self.sink.read());
            sink.record(event);
        }
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Pick the best stub for `intent` under the read lock.
    #[must_use]
    pub fn resolve(&self, intent: &QueryIntent) -> Option<Resolved> {
        let state = self.state.read();
        let stub = matcher::best_match(&state.stubs, intent)?;

        Some(Resolved {
            id: stub.id,
            columns: stub.pattern.columns.clone(),
            types: stub.pattern.types.clone(),
            response: stub.response.clone(),
        })
    }

    /// Resolve and emit the matching diagnostics event.
    pub(crate) fn resolve_query(
        &self,
        sql: &str,
        args: &[Value],
        intent: &QueryIntent,
    ) -> Option<Resolved> {
        let resolved = self.resolve(intent);

        match &resolved {
            Some(hit) => self.emit(&DiagnosticsEvent::Matched {
                stub: hit.id,
                kind: intent.kind,
                sql,
            }),
            None => self.emit(&DiagnosticsEvent::Unstubbed { sql, args }),
        }

        resolved
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("stubs", &self.len())
            .field("verbose", &self.is_verbose())
            .finish_non_exhaustive()
    }
}

///
/// ScopedRegistry
///
/// Scope guard returned by `Registry::scoped`. Derefs to the registry.
///

pub struct ScopedRegistry<'r> {
    registry: &'r Registry,
}

impl std::ops::Deref for ScopedRegistry<'_> {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        self.registry
    }
}

impl Drop for ScopedRegistry<'_> {
    fn drop(&mut self) {
        self.registry.reset();
    }
}
