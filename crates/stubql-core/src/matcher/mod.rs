//! Module: matcher
//! Responsibility: choose the single best stub for one query intent.
//!
//! Ranking:
//! - stubs with an explicit priority outrank every stub without one;
//! - explicit stubs compare by priority, the rest by specificity;
//! - ties go to the earliest registration (lowest id).

#[cfg(test)]
mod tests;

use crate::{
    intent::QueryIntent,
    stub::{Stub, StubId, StubPattern},
};
use std::cmp::Reverse;

/// True when every filter on `pattern` is satisfied by `intent`.
#[must_use]
pub fn accepts(pattern: &StubPattern, intent: &QueryIntent) -> bool {
    if pattern.kind != intent.kind {
        return false;
    }

    if let Some(table) = &pattern.table
        && intent.table.as_ref() != Some(table)
    {
        return false;
    }

    // a query with no explicit column list accepts any column filter
    if !pattern
        .columns
        .iter()
        .all(|column| intent.requests_column(column))
    {
        return false;
    }

    let predicates_hold = pattern.predicates.iter().all(|(column, expected)| {
        intent
            .predicates
            .get(column)
            .is_some_and(|actual| expected.matches(actual))
    });
    let values_hold = pattern.values.iter().all(|(column, expected)| {
        intent
            .values
            .get(column)
            .is_some_and(|actual| expected.matches(actual))
    });

    predicates_hold && values_hold
}

/// Sort key: larger wins.
fn rank(stub: &Stub) -> (bool, i64, Reverse<StubId>) {
    let pattern = stub.pattern();

    match pattern.priority {
        Some(priority) => (true, priority, Reverse(stub.id())),
        None => (
            false,
            i64::try_from(pattern.specificity()).unwrap_or(i64::MAX),
            Reverse(stub.id()),
        ),
    }
}

/// Best stub for `intent`, or None when nothing matches.
#[must_use]
pub fn best_match<'s>(stubs: &'s [Stub], intent: &QueryIntent) -> Option<&'s Stub> {
    stubs
        .iter()
        .filter(|stub| accepts(stub.pattern(), intent))
        .max_by_key(|stub| rank(stub))
}
