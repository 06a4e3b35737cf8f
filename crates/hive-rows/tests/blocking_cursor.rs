use std::{path::PathBuf, sync::Arc, time::Duration};

use hive_rows::{
    client::{Fixture, ScriptedClient},
    AppError, BlockingCursor, CursorOptions, OperationState, ResultCursor, Value,
};

fn load(name: &str) -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    Fixture::load(&path).unwrap()
}

fn blocking(fixture: Fixture) -> (Arc<ScriptedClient>, BlockingCursor) {
    let op = fixture.operation.clone();
    let client = Arc::new(ScriptedClient::new(fixture));
    let options = CursorOptions::default()
        .with_page_size(2)
        .with_poll_interval(Duration::from_millis(1));
    let cursor = ResultCursor::with_options(client.clone(), op, options);
    (client, BlockingCursor::new(cursor).unwrap())
}

#[test]
fn transport_error_while_polling_surfaces_from_wait() {
    let (client, mut cursor) = blocking(load("paged_query.json"));

    // The third scripted poll is a dropped connection; the wait gives up there.
    let err = cursor.wait().unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
    assert_eq!(client.status_calls(), 3);
    assert!(!cursor.cursor().is_ready());

    // Polling is safe to repeat, so a second wait picks up where the server is.
    let status = cursor.wait().unwrap();
    assert_eq!(status.state(), Some(OperationState::Finished));
    assert_eq!(cursor.columns(), vec!["user_id", "country", "spend", "last_seen"]);
    assert_eq!(client.metadata_calls(), 1);
}

#[test]
fn iterates_all_pages_in_order() {
    let (client, mut cursor) = blocking(load("paged_query.json"));
    assert!(cursor.wait().is_err());

    let rows: Vec<_> = cursor.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(client.fetch_calls(), 2);

    let ids: Vec<_> = rows.iter().map(|r| r[0].clone()).collect();
    assert_eq!(ids, vec![Value::Int(101), Value::Int(102), Value::Int(103)]);
    assert_eq!(rows[1][1], Value::Text("DE".into()));
    assert_eq!(rows[2][1], Value::Null);
    assert_eq!(rows[2][3], Value::Null);
    assert_eq!(rows[0][2].to_json(), serde_json::json!("19.99"));
    assert!(matches!(rows[1][3], Value::Timestamp(_)));

    assert!(cursor.next().is_none());
    cursor.close().unwrap();
    assert_eq!(client.close_calls(), 0);
}

#[test]
fn iterator_stops_after_first_error() {
    let fixture: Fixture = serde_json::from_value(serde_json::json!({
        "operation": { "guid": "q" },
        "statuses": [ { "ok": { "status": { "code": "SUCCESS" }, "operation_state": "ERROR" } } ]
    }))
    .unwrap();
    let (client, mut cursor) = blocking(fixture);

    let first = cursor.next().unwrap();
    assert!(matches!(
        first,
        Err(AppError::QueryExecution {
            state: OperationState::Error,
            ..
        })
    ));
    assert!(cursor.next().is_none());
    assert_eq!(client.fetch_calls(), 0);
}

#[test]
fn close_mid_stream_releases_the_operation() {
    let (client, mut cursor) = blocking(load("paged_query.json"));
    let _ = cursor.wait();
    assert!(cursor.next_row().unwrap().is_some());

    cursor.close().unwrap();
    assert_eq!(client.close_calls(), 1);
    assert!(cursor.next().is_none());
    assert!(matches!(cursor.next_row(), Err(AppError::State(_))));
}
