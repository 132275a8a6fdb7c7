use column_profiler::engine::{DuckDbEngine, EngineOptions, QueryExecutor};
use column_profiler::ingestion::{load_table, LoadOptions};
use column_profiler::profile::{null_count, time_range, top_k_and_cardinality};
use column_profiler::types::{ColumnIdentity, Value};
use column_profiler::ProfileError;

fn engine() -> DuckDbEngine {
    DuckDbEngine::open(EngineOptions::default()).unwrap()
}

#[test]
fn load_csv_fixture_reports_row_count() {
    let engine = engine();
    let rows = load_table(
        &engine,
        "events",
        "tests/fixtures/events.csv",
        &LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(rows, 8);
}

#[test]
fn loaded_table_is_profilable_end_to_end() {
    let engine = engine();
    load_table(
        &engine,
        "events",
        "tests/fixtures/events.csv",
        &LoadOptions::default(),
    )
    .unwrap();

    let amount = ColumnIdentity::new("events", "amount", "DOUBLE");
    assert_eq!(null_count(&engine, &amount).unwrap(), 2);

    let country = ColumnIdentity::new("events", "country", "VARCHAR");
    let summary = top_k_and_cardinality(&engine, &country, None).unwrap();
    assert_eq!(summary.top_k[0].value, Value::Text("US".to_string()));
    assert_eq!(summary.top_k[0].count, 3.0);

    let created_at = ColumnIdentity::new("events", "created_at", "TIMESTAMP");
    let range = time_range(&engine, &created_at).unwrap();
    match (&range.min, &range.max) {
        (Value::Timestamp(min), Value::Timestamp(max)) => assert!(min < max),
        other => panic!("expected timestamps, got {other:?}"),
    }
}

#[test]
fn reloading_replaces_the_existing_table() {
    let engine = engine();
    load_table(
        &engine,
        "events",
        "tests/fixtures/events.csv",
        &LoadOptions::default(),
    )
    .unwrap();
    let rows = load_table(
        &engine,
        "events",
        "tests/fixtures/events.csv",
        &LoadOptions::default(),
    )
    .unwrap();

    assert_eq!(rows, 8);
    let result = engine
        .execute("SELECT count(*) AS count FROM events")
        .unwrap();
    assert_eq!(result[0].get("count").unwrap().as_i64(), Some(8));
}

#[test]
fn invalid_table_name_is_rejected_before_loading() {
    let engine = engine();
    let err = load_table(
        &engine,
        "events\"; DROP TABLE x; --",
        "tests/fixtures/events.csv",
        &LoadOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, ProfileError::InvalidIdentifier { .. }));
}

#[test]
fn missing_file_surfaces_the_engine_diagnostic() {
    let engine = engine();
    let err = load_table(
        &engine,
        "events",
        "tests/fixtures/does_not_exist.csv",
        &LoadOptions::default(),
    )
    .unwrap_err();

    match err {
        ProfileError::Engine { message } => assert!(message.contains("does_not_exist")),
        other => panic!("expected Engine error, got {other:?}"),
    }
}
