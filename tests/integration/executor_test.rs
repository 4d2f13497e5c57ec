//! Query submission and validation tests.

use std::sync::Arc;

use aql_cursor::{AqlError, Database, Method, MockTransport, Query, Transaction};
use serde_json::json;

fn invalid_query_response() -> serde_json::Value {
    json!({
        "error": true,
        "code": 400,
        "errorNum": 1501,
        "errorMessage": "syntax error, unexpected identifier near 'FRO u IN users' at position 1:1"
    })
}

#[tokio::test]
async fn test_validated_execute_of_invalid_query_sends_no_cursor_request() {
    let mock = Arc::new(MockTransport::new().with_response(400, invalid_query_response()));
    let db = Database::new("shop", mock.clone());

    let result = db
        .execute(&Query::new("FRO u IN users RETURN u").with_validation(true))
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("syntax error"));
    assert!(mock
        .requests()
        .iter()
        .all(|r| !r.path.ends_with("/cursor")));
}

#[tokio::test]
async fn test_validate_distinguishes_nothing_but_parse_does() {
    let mock = Arc::new(
        MockTransport::new()
            .with_response(400, invalid_query_response())
            .with_error(AqlError::transport("connection refused"))
            .with_response(400, invalid_query_response())
            .with_error(AqlError::transport("connection refused")),
    );
    let db = Database::new("shop", mock.clone());
    let query = Query::new("FRO u IN users RETURN u");

    assert!(!db.validate(&query).await);
    assert!(!db.validate(&query).await);

    let rejected = db.parse(&query).await.unwrap_err();
    let unreachable = db.parse(&query).await.unwrap_err();
    assert!(matches!(rejected, AqlError::ServerRejected { .. }));
    assert!(unreachable.is_transport());
}

#[tokio::test]
async fn test_execute_sends_bind_vars_and_options() {
    let mock = Arc::new(
        MockTransport::new().with_response(201, json!({"result": [], "hasMore": false})),
    );
    let db = Database::new("shop", mock.clone());

    let query = Query::new("FOR u IN users FILTER u.age > @age LIMIT 5 RETURN u")
        .with_bind_var("age", 21)
        .with_full_count(true)
        .with_ttl(30);
    db.execute(&query).await.unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(
        request.payload,
        Some(json!({
            "query": "FOR u IN users FILTER u.age > @age LIMIT 5 RETURN u",
            "bindVars": {"age": 21},
            "count": false,
            "ttl": 30,
            "options": {"fullCount": true}
        }))
    );
}

#[tokio::test]
async fn test_envelope_error_on_success_status_is_rejection() {
    let mock = Arc::new(MockTransport::new().with_response(
        201,
        json!({"error": true, "code": 500, "errorNum": 4, "errorMessage": "out of memory"}),
    ));
    let db = Database::new("shop", mock.clone());

    let err = db.execute(&Query::new("RETURN 1")).await.unwrap_err();
    assert_eq!(err, AqlError::server_rejected(500, 4, "out of memory"));
}

#[tokio::test]
async fn test_transaction_round_trip() {
    let mock = Arc::new(
        MockTransport::new().with_response(200, json!({"result": 3, "error": false, "code": 200})),
    );
    let db = Database::new("shop", mock.clone());

    let tx = Transaction::new("function (params) { return params.n; }")
        .read("users")
        .with_params(json!({"n": 3}));
    let result = db.execute_transaction(&tx).await.unwrap();

    assert_eq!(result, json!(3));
    assert_eq!(mock.requests()[0].path, "/_api/transaction");
}
