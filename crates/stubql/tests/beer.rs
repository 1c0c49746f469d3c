use stubql::prelude::*;

///
/// Beer
///

#[derive(Debug, PartialEq)]
struct Beer {
    id: i64,
    name: String,
    pct: f32,
}

fn get_beer(conn: &impl Connection, id: i64) -> Result<Beer, Error> {
    let row = conn.query_row("SELECT id, name, pct FROM beer WHERE id = ?", &[Value::Int(id)])?;
    let (id, name, pct) = row.scan()?;

    Ok(Beer { id, name, pct })
}

#[test]
fn get_beer_returns_stubbed_row() {
    let _guard = stubql::lock();
    stubql::select(&["id", "name", "pct"])
        .from("beer")
        .where_("id", 42)
        .stub_rows("42,Yona Yona Ale,5.5")
        .unwrap();

    let beer = get_beer(&stubql::open(), 42).unwrap();

    assert_eq!(
        beer,
        Beer {
            id: 42,
            name: "Yona Yona Ale".to_string(),
            pct: 5.5,
        }
    );
}

#[test]
fn get_beer_passes_through_stubbed_error() {
    let _guard = stubql::lock();
    stubql::select(&[])
        .from("beer")
        .where_("id", 99)
        .stub_error(NoRowsError);

    let err = get_beer(&stubql::open(), 99).unwrap_err();

    assert!(err.is_no_rows());
    assert!(err.downcast_stubbed::<NoRowsError>().is_some());
}

#[test]
fn get_beer_without_stub_is_unstubbed() {
    let _guard = stubql::lock();

    let err = get_beer(&stubql::open(), 1).unwrap_err();

    assert!(err.is_unstubbed());
    assert!(err.to_string().contains("beer WHERE id = ?"));
}

#[test]
fn guard_clears_stubs_between_tests() {
    {
        let _guard = stubql::lock();
        stubql::select(&[]).stub_rows("1").unwrap();
        assert!(!stubql::dump().is_empty());
    }

    let _guard = stubql::lock();
    assert!(stubql::dump().is_empty());
}

#[test]
fn guard_restores_configured_verbosity() {
    let configured = stubql::core::config::RegistryConfig::from_env().verbose;

    {
        let _guard = stubql::lock();
        stubql::set_verbose(!configured);
        assert_eq!(stubql::is_verbose(), !configured);
    }

    let _guard = stubql::lock();
    assert_eq!(stubql::is_verbose(), configured);
}

#[test]
fn connections_from_driver_share_the_global_registry() {
    let _guard = stubql::lock();
    let driver = stubql::driver();
    let conn = driver.open("mock://beer").unwrap();

    stubql::select(&["name"])
        .from("beer")
        .stub_rows("Hitachino Nest\nSapporo")
        .unwrap();

    let names: Vec<(String,)> = conn
        .query("SELECT name FROM beer", &[])
        .unwrap()
        .scan_all()
        .unwrap();

    assert_eq!(
        names,
        [("Hitachino Nest".to_string(),), ("Sapporo".to_string(),)]
    );
}

#[test]
fn insert_stub_reports_exec_result() {
    let _guard = stubql::lock();
    stubql::insert(&["name", "pct"])
        .into("beer")
        .value("name", "Kirin")
        .stub_result(3, 1);

    let result = stubql::open()
        .execute(
            "INSERT INTO beer (name, pct) VALUES (?, ?)",
            &[Value::from("Kirin"), Value::from(4.9)],
        )
        .unwrap();

    assert_eq!(result.last_insert_id, Some(3));
}
