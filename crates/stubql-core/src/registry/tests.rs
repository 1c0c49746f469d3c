use super::*;
use crate::{
    config::RegistryConfig,
    driver::{Connection, MockConnection},
    error::NoRowsError,
    stub::RowSource,
};
use std::{sync::Arc, thread};

fn beer_intent(id: i64) -> QueryIntent {
    QueryIntent::new(StatementKind::Select)
        .table("beer")
        .column("id")
        .predicate("id", id)
}

#[test]
fn new_registry_is_empty() {
    let registry = Registry::new();

    assert!(registry.is_empty());
    assert_eq!(registry.dump(), "");
    assert!(registry.resolve(&beer_intent(1)).is_none());
}

#[test]
fn resolve_copies_out_the_winning_stub() {
    let registry = Registry::new();
    registry.select(&[]).from("beer").stub_error(NoRowsError);
    let id = registry
        .select(&["id"])
        .from("beer")
        .where_("id", 1)
        .stub_rows("1")
        .unwrap();

    let resolved = registry.resolve(&beer_intent(1)).unwrap();

    assert_eq!(resolved.id, id);
    assert_eq!(resolved.columns, ["id"]);
    assert!(matches!(
        resolved.response,
        StubResponse::Rows(RowSource::Decoded(_))
    ));
}

#[test]
fn remove_drops_exactly_one_stub() {
    let registry = Registry::new();
    let a = registry.select(&[]).stub_rows("1").unwrap();
    let b = registry.select(&[]).stub_rows("2").unwrap();

    assert!(registry.remove(a));
    assert!(!registry.remove(a));
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry
            .resolve(&QueryIntent::new(StatementKind::Select))
            .map(|r| r.id),
        Some(b)
    );
}

#[test]
fn reset_clears_stubs_but_not_id_sequence() {
    let registry = Registry::new();
    let before = registry.select(&[]).stub_rows("1").unwrap();

    registry.reset();
    assert!(registry.is_empty());

    let after = registry.select(&[]).stub_rows("1").unwrap();
    assert!(after > before);
}

#[test]
fn reset_restores_unstubbed_behavior() {
    let registry = Arc::new(Registry::new());
    let conn = MockConnection::open(Arc::clone(&registry));
    registry.select(&[]).from("beer").stub_rows("1").unwrap();

    assert!(conn.query_row("SELECT id FROM beer", &[]).is_ok());

    registry.reset();
    let err = conn.query_row("SELECT id FROM beer", &[]).unwrap_err();
    assert!(err.is_unstubbed());
}

#[test]
fn scoped_guard_resets_on_drop() {
    let registry = Registry::new();

    {
        let scope = registry.scoped();
        scope.select(&[]).stub_rows("1").unwrap();
        assert_eq!(scope.len(), 1);
    }

    assert!(registry.is_empty());
}

#[test]
fn config_sets_initial_verbosity() {
    let quiet = Registry::new();
    let loud = Registry::with_config(&RegistryConfig { verbose: true });

    assert!(!quiet.is_verbose());
    assert!(loud.is_verbose());

    quiet.set_verbose(true);
    assert!(quiet.is_verbose());
}

#[test]
fn debug_output_summarizes_state() {
    let registry = Registry::new();
    registry.select(&[]).stub_rows("1").unwrap();

    let debug = format!("{registry:?}");
    assert!(debug.contains("stubs: 1"), "{debug}");
}

#[test]
fn concurrent_registration_keeps_ids_unique() {
    let registry = Arc::new(Registry::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..50)
                    .map(|i| {
                        registry
                            .select(&[])
                            .where_("id", t * 100 + i)
                            .stub_rows("1")
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<StubId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 400);
    assert_eq!(registry.len(), 400);
}

#[test]
fn concurrent_queries_see_all_or_nothing_of_reset() {
    let registry = Arc::new(Registry::new());
    for id in 0..20 {
        registry
            .select(&["id"])
            .from("beer")
            .where_("id", id)
            .stub_rows(id.to_string())
            .unwrap();
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let conn = MockConnection::open(registry);
                for round in 0..200 {
                    let id = round % 20;
                    match conn.query_row("SELECT id FROM beer WHERE id = ?", &[Value::Int(id)]) {
                        Ok(row) => assert_eq!(row.get::<i64>(0).unwrap(), id),
                        Err(err) => assert!(err.is_unstubbed(), "{err}"),
                    }
                }
            })
        })
        .collect();

    registry.reset();

    for reader in readers {
        reader.join().unwrap();
    }
    assert!(registry.is_empty());
}
