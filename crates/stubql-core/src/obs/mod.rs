//! Observability: verbose query diagnostics and per-registry counters.
//!
//! Matching and driver code never log directly. Every diagnostic flows
//! through `DiagnosticsEvent` into the registry, which counts it and, when
//! verbose, forwards it to the installed `DiagnosticsSink`.

mod report;
mod sink;

#[cfg(test)]
mod tests;

// re-exports
pub use report::QueryReport;
pub use sink::{DiagnosticsEvent, DiagnosticsSink, TracingSink};

pub(crate) use report::QueryCounters;
