//! Cursor protocol tests.
//!
//! Scripts server pages through `MockTransport` and checks how the cursor
//! consumes them.

use std::sync::Arc;

use aql_cursor::transport::RecordedRequest;
use aql_cursor::{AqlError, CursorState, Database, Method, MockTransport, Query};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    id: u32,
    total: f64,
}

fn page(id: &str, rows: Value, has_more: bool) -> Value {
    json!({"id": id, "result": rows, "hasMore": has_more, "count": 5, "error": false})
}

/// Five rows served as pages of 2, 2 and 1.
fn five_rows(id: &str) -> MockTransport {
    MockTransport::new()
        .with_response(201, page(id, json!([1, 2]), true))
        .with_response(200, page(id, json!([3, 4]), true))
        .with_response(200, page(id, json!([5]), false))
}

fn methods(requests: &[RecordedRequest]) -> Vec<Method> {
    requests.iter().map(|r| r.method).collect()
}

#[tokio::test]
async fn test_single_item_consumption_over_three_pages() {
    let mock = Arc::new(five_rows("c1"));
    let db = Database::new("shop", mock.clone());
    let mut cursor = db
        .execute(&Query::new("FOR i IN 1..5 RETURN i").with_batch_size(2))
        .await
        .unwrap();

    let mut decoded = 0;
    while cursor.fetch_one::<i64>().await.unwrap().is_some() {
        decoded += 1;
    }

    assert_eq!(decoded, 5);
    assert_eq!(cursor.fetch_one::<i64>().await.unwrap(), None);
    assert_eq!(
        methods(&mock.requests()),
        vec![Method::Post, Method::Put, Method::Put]
    );
}

#[tokio::test]
async fn test_bulk_consumption_matches_page_sizes() {
    let mock = Arc::new(five_rows("c2"));
    let db = Database::new("shop", mock.clone());
    let mut cursor = db.execute(&Query::new("FOR i IN 1..5 RETURN i")).await.unwrap();

    let mut sizes = Vec::new();
    let mut all: Vec<i64> = Vec::new();
    loop {
        let mut batch: Vec<i64> = Vec::new();
        sizes.push(cursor.fetch_batch_into(&mut batch).await.unwrap());
        all.extend(batch);
        if cursor.state() == CursorState::Exhausted {
            break;
        }
    }

    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(all, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_bulk_appends_to_existing_rows() {
    let mock = Arc::new(
        MockTransport::new().with_response(201, page("c3", json!(["b", "a", "b"]), false)),
    );
    let db = Database::new("shop", mock.clone());
    let mut cursor = db.execute(&Query::new("RETURN x")).await.unwrap();

    let mut rows = vec!["z".to_string()];
    cursor.fetch_batch_into(&mut rows).await.unwrap();

    assert_eq!(rows, vec!["z", "b", "a", "b"]);
}

#[tokio::test]
async fn test_bulk_type_mismatch_does_not_touch_cursor() {
    let mock = Arc::new(five_rows("c4"));
    let db = Database::new("shop", mock.clone());
    let mut cursor = db.execute(&Query::new("FOR i IN 1..5 RETURN i")).await.unwrap();

    let mut orders: Vec<Order> = Vec::new();
    let err = cursor.fetch_batch_into(&mut orders).await.unwrap_err();

    assert!(matches!(err, AqlError::TypeMismatch(_)));
    assert!(orders.is_empty());
    assert_eq!(cursor.read_index(), 0);
    assert_eq!(cursor.buffered(), 2);
    assert!(cursor.has_more());
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_documents_decode_into_structs() {
    let mock = Arc::new(MockTransport::new().with_response(
        201,
        json!({
            "result": [{"id": 1, "total": 9.5}, {"id": 2, "total": 20.0}],
            "hasMore": false,
            "extra": {"stats": {"fullCount": 40, "scannedIndex": 2}}
        }),
    ));
    let db = Database::new("shop", mock.clone());
    let mut cursor = db
        .execute(&Query::new("FOR o IN orders LIMIT 2 RETURN o").with_full_count(true))
        .await
        .unwrap();

    let orders: Vec<Order> = cursor.collect_all().await.unwrap();

    assert_eq!(
        orders,
        vec![Order { id: 1, total: 9.5 }, Order { id: 2, total: 20.0 }]
    );
    assert_eq!(cursor.full_count(), Some(40));
    assert_eq!(cursor.stats().scanned_index, 2);
}

#[tokio::test]
async fn test_delete_twice() {
    let mock = Arc::new(
        MockTransport::new()
            .with_response(201, page("c5", json!([1, 2]), true))
            .with_response(202, json!({"id": "c5", "error": false, "code": 202})),
    );
    let db = Database::new("shop", mock.clone());
    let mut cursor = db.execute(&Query::new("FOR i IN 1..5 RETURN i")).await.unwrap();

    cursor.delete().await.unwrap();
    let second = cursor.delete().await.unwrap_err();

    assert!(matches!(second, AqlError::InvalidState(_)));
    assert!(matches!(
        cursor.fetch_one::<i64>().await,
        Err(AqlError::InvalidState(_))
    ));
    assert_eq!(
        methods(&mock.requests()),
        vec![Method::Post, Method::Delete]
    );
}

#[tokio::test]
async fn test_delete_of_expired_cursor_is_already_gone() {
    let mock = Arc::new(
        MockTransport::new()
            .with_response(201, page("c6", json!([1]), true))
            .with_response(404, json!({"error": true, "errorNum": 1600, "code": 404})),
    );
    let db = Database::new("shop", mock.clone());
    let mut cursor = db.execute(&Query::new("FOR i IN 1..5 RETURN i")).await.unwrap();

    let err = cursor.delete().await.unwrap_err();

    assert!(err.is_already_gone());
    assert_eq!(cursor.state(), CursorState::Disposed);
}

#[tokio::test]
async fn test_independent_cursors_run_concurrently() {
    let first = Database::new("shop", Arc::new(five_rows("a")));
    let second = Database::new("shop", Arc::new(five_rows("b")));

    let run = |db: Database| async move {
        let mut cursor = db.execute(&Query::new("FOR i IN 1..5 RETURN i")).await?;
        cursor.collect_all::<i64>().await
    };

    let (a, b) = tokio::join!(run(first), run(second));
    assert_eq!(a.unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(b.unwrap(), vec![1, 2, 3, 4, 5]);
}
