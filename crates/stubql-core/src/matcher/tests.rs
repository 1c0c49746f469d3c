use super::*;
use crate::{
    intent::StatementKind,
    stub::{ExecResult, StubResponse},
    value::Value,
};
use proptest::prelude::*;

///
/// Helpers
///

fn stub(id: u64, pattern: StubPattern) -> Stub {
    Stub {
        id: StubId(id),
        pattern,
        response: StubResponse::Exec(ExecResult::default()),
    }
}

fn select(columns: &[&str]) -> StubPattern {
    StubPattern::new(
        StatementKind::Select,
        columns.iter().map(|c| (*c).to_string()).collect(),
    )
}

fn beer_query(id: i64) -> QueryIntent {
    QueryIntent::new(StatementKind::Select)
        .table("beer")
        .column("id")
        .column("name")
        .column("pct")
        .predicate("id", id)
}

fn winner(stubs: &[Stub], intent: &QueryIntent) -> Option<u64> {
    best_match(stubs, intent).map(|s| s.id().get())
}

// ---- acceptance ----

#[test]
fn kind_must_match() {
    let pattern = StubPattern::new(StatementKind::Delete, Vec::new());

    assert!(!accepts(&pattern, &beer_query(1)));
}

#[test]
fn table_filter_is_exact() {
    let mut pattern = select(&[]);
    pattern.table = Some("beers".into());

    assert!(!accepts(&pattern, &beer_query(1)));

    pattern.table = Some("beer".into());
    assert!(accepts(&pattern, &beer_query(1)));
}

#[test]
fn empty_filters_are_wildcards() {
    assert!(accepts(&select(&[]), &beer_query(1)));
    assert!(accepts(&select(&[]), &QueryIntent::new(StatementKind::Select)));
}

#[test]
fn column_filter_is_a_subset_check() {
    assert!(accepts(&select(&["id", "pct"]), &beer_query(1)));
    assert!(!accepts(&select(&["id", "abv"]), &beer_query(1)));
}

#[test]
fn star_query_accepts_any_column_filter() {
    let star = QueryIntent::new(StatementKind::Select).table("beer");

    assert!(accepts(&select(&["whatever"]), &star));
}

#[test]
fn predicate_filters_need_equal_values() {
    let mut pattern = select(&[]);
    pattern.predicates.insert("id".into(), Value::Int(42));

    assert!(accepts(&pattern, &beer_query(42)));
    assert!(!accepts(&pattern, &beer_query(43)));
    assert!(!accepts(&pattern, &QueryIntent::new(StatementKind::Select)));
}

#[test]
fn numeric_predicates_compare_across_int_and_float() {
    let mut pattern = select(&[]);
    pattern.predicates.insert("id".into(), Value::Float(42.0));

    assert!(accepts(&pattern, &beer_query(42)));
}

#[test]
fn text_never_equals_number() {
    let mut pattern = select(&[]);
    pattern.predicates.insert("id".into(), Value::from("42"));

    assert!(!accepts(&pattern, &beer_query(42)));
}

#[test]
fn value_filters_match_insert_values() {
    let mut pattern = StubPattern::new(StatementKind::Insert, Vec::new());
    pattern.values.insert("name".into(), Value::from("Kirin"));

    let hit = QueryIntent::new(StatementKind::Insert)
        .table("beer")
        .column("name")
        .value("name", "Kirin");
    let miss = QueryIntent::new(StatementKind::Insert)
        .table("beer")
        .column("name")
        .value("name", "Asahi");

    assert!(accepts(&pattern, &hit));
    assert!(!accepts(&pattern, &miss));
}

// ---- ranking ----

#[test]
fn no_stubs_means_no_match() {
    assert_eq!(winner(&[], &beer_query(1)), None);
}

#[test]
fn more_specific_stub_wins() {
    let mut narrow = select(&[]);
    narrow.table = Some("beer".into());
    narrow.predicates.insert("id".into(), Value::Int(42));

    let stubs = [stub(1, select(&[])), stub(2, narrow)];

    assert_eq!(winner(&stubs, &beer_query(42)), Some(2));
    assert_eq!(winner(&stubs, &beer_query(7)), Some(1));
}

#[test]
fn equal_specificity_goes_to_earliest_registration() {
    let stubs = [stub(3, select(&["id"])), stub(5, select(&["name"]))];

    assert_eq!(winner(&stubs, &beer_query(1)), Some(3));
}

#[test]
fn explicit_priority_beats_specificity() {
    let mut narrow = select(&["id", "name", "pct"]);
    narrow.table = Some("beer".into());

    let mut broad = select(&[]);
    broad.priority = Some(0);

    let stubs = [stub(1, narrow), stub(2, broad)];

    assert_eq!(winner(&stubs, &beer_query(1)), Some(2));
}

#[test]
fn higher_priority_wins_among_explicit() {
    let mut low = select(&[]);
    low.priority = Some(1);
    let mut high = select(&[]);
    high.priority = Some(10);

    let stubs = [stub(1, high.clone()), stub(2, low), stub(3, high)];

    assert_eq!(winner(&stubs, &beer_query(1)), Some(1));
}

// ---- properties ----

fn arb_pattern() -> impl Strategy<Value = StubPattern> {
    (
        prop::option::of(Just("beer".to_string())),
        prop::sample::subsequence(vec!["id", "name", "pct"], 0..=3),
        prop::option::of(0i64..5),
        prop::option::of(-2i64..3),
    )
        .prop_map(|(table, columns, id, priority)| {
            let mut pattern = select(&columns);
            pattern.table = table;
            pattern.priority = priority;
            if let Some(id) = id {
                pattern.predicates.insert("id".into(), Value::Int(id));
            }
            pattern
        })
}

proptest! {
    #[test]
    fn best_match_is_accepted_and_unbeaten(
        patterns in prop::collection::vec(arb_pattern(), 0..12),
        id in 0i64..5,
    ) {
        let stubs: Vec<Stub> = patterns
            .into_iter()
            .enumerate()
            .map(|(i, p)| stub(i as u64 + 1, p))
            .collect();
        let intent = beer_query(id);

        match best_match(&stubs, &intent) {
            None => prop_assert!(stubs.iter().all(|s| !accepts(s.pattern(), &intent))),
            Some(best) => {
                prop_assert!(accepts(best.pattern(), &intent));
                for other in stubs.iter().filter(|s| accepts(s.pattern(), &intent)) {
                    prop_assert!(rank(best) >= rank(other));
                }
            }
        }
    }

    #[test]
    fn matching_is_deterministic(
        patterns in prop::collection::vec(arb_pattern(), 1..8),
        id in 0i64..5,
    ) {
        let stubs: Vec<Stub> = patterns
            .into_iter()
            .enumerate()
            .map(|(i, p)| stub(i as u64 + 1, p))
            .collect();
        let intent = beer_query(id);

        prop_assert_eq!(winner(&stubs, &intent), winner(&stubs, &intent));
    }
}
