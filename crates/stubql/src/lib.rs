//! stubql: SQL stubbing for tests.
//!
//! This is the public facade. Stubs declared through the free functions
//! below land in one process-wide registry, and every connection opened
//! with `open` or `driver` answers from it.
//!
//! Tests that touch the shared registry from parallel test threads should
//! hold `lock()` for their duration.

use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, LazyLock};
use stubql_core::{
    config::RegistryConfig,
    driver::{MockConnection, MockDriver},
    registry::Registry,
    stub::StubBuilder,
};

pub use stubql_core as core;
pub use stubql_core::Error;

static REGISTRY: LazyLock<Arc<Registry>> =
    LazyLock::new(|| Arc::new(Registry::with_config(&RegistryConfig::from_env())));

static TEST_LOCK: Mutex<()> = Mutex::new(());

//
// Registry access
//

/// The process-wide registry.
#[must_use]
pub fn registry() -> &'static Arc<Registry> {
    &REGISTRY
}

/// Start a SELECT stub on the shared registry.
pub fn select(columns: &[&str]) -> StubBuilder<'static> {
    registry().select(columns)
}

pub fn insert(columns: &[&str]) -> StubBuilder<'static> {
    registry().insert(columns)
}

pub fn update(columns: &[&str]) -> StubBuilder<'static> {
    registry().update(columns)
}

pub fn delete() -> StubBuilder<'static> {
    registry().delete()
}

/// Clear every stub on the shared registry.
pub fn reset() {
    registry().reset();
}

pub fn set_verbose(verbose: bool) {
    registry().set_verbose(verbose);
}

#[must_use]
pub fn is_verbose() -> bool {
    registry().is_verbose()
}

#[must_use]
pub fn dump() -> String {
    registry().dump()
}

//
// Connectivity
//

/// Connection on the shared registry.
#[must_use]
pub fn open() -> MockConnection {
    MockConnection::open(Arc::clone(registry()))
}

#[must_use]
pub fn driver() -> MockDriver {
    MockDriver::new(Arc::clone(registry()))
}

///
/// TestGuard
///
/// Serializes tests that share the process-wide registry. Stubs are
/// cleared and the verbose flag is restored to its configured value when
/// the guard is taken and again when it drops.
///

#[must_use = "the shared registry is only held while the guard lives"]
pub struct TestGuard {
    _lock: MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        restore();
    }
}

/// Take exclusive use of the shared registry for one test.
pub fn lock() -> TestGuard {
    let guard = TestGuard {
        _lock: TEST_LOCK.lock(),
    };
    restore();

    guard
}

fn restore() {
    reset();
    set_verbose(RegistryConfig::from_env().verbose);
}

//
// Prelude
//

pub mod prelude {
    pub use stubql_core::prelude::*;
}
