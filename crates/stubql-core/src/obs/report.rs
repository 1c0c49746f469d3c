use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

///
/// QueryCounters
/// Lock-free counters owned by one registry; never reset by `Registry::reset`.
///

#[derive(Debug, Default)]
pub(crate) struct QueryCounters {
    matched: AtomicU64,
    unstubbed: AtomicU64,
    stubbed_errors: AtomicU64,
}

impl QueryCounters {
    pub(crate) fn matched(&self) {
        self.matched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unstubbed(&self) {
        self.unstubbed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stubbed_error(&self) {
        self.stubbed_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn report(&self) -> QueryReport {
        QueryReport {
            matched: self.matched.load(Ordering::Relaxed),
            unstubbed: self.unstubbed.load(Ordering::Relaxed),
            stubbed_errors: self.stubbed_errors.load(Ordering::Relaxed),
        }
    }
}

///
/// QueryReport
/// Point-in-time snapshot of a registry's counters.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct QueryReport {
    pub matched: u64,
    pub unstubbed: u64,
    pub stubbed_errors: u64,
}
