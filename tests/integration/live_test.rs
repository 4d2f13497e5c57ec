//! Tests against a live server.
//!
//! Skipped unless ARANGO_URL is set.

use aql_cursor::{AqlError, ConnectionConfig, CursorState, Database, Query};

/// Helper to get the test server URL from the environment.
fn get_test_server_url() -> Option<String> {
    std::env::var("ARANGO_URL").ok()
}

/// Helper to create a database handle for the test server.
fn get_test_database() -> Option<Database> {
    let url = get_test_server_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    Database::connect(&config).ok()
}

#[tokio::test]
async fn test_live_paged_iteration() {
    let Some(db) = get_test_database() else {
        eprintln!("Skipping test: ARANGO_URL not set");
        return;
    };

    let mut cursor = db
        .execute(
            &Query::new("FOR i IN 1..5 RETURN i")
                .with_batch_size(2)
                .with_count(true),
        )
        .await
        .unwrap();

    assert_eq!(cursor.count(), Some(5));
    let rows: Vec<i64> = cursor.collect_all().await.unwrap();
    assert_eq!(rows, vec![1, 2, 3, 4, 5]);
    assert_eq!(cursor.state(), CursorState::Exhausted);
}

#[tokio::test]
async fn test_live_delete_open_cursor() {
    let Some(db) = get_test_database() else {
        eprintln!("Skipping test: ARANGO_URL not set");
        return;
    };

    let mut cursor = db
        .execute(&Query::new("FOR i IN 1..10 RETURN i").with_batch_size(2))
        .await
        .unwrap();
    assert!(cursor.has_more());

    cursor.delete().await.unwrap();
    assert!(matches!(
        cursor.fetch_one::<i64>().await,
        Err(AqlError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_live_validate() {
    let Some(db) = get_test_database() else {
        eprintln!("Skipping test: ARANGO_URL not set");
        return;
    };

    assert!(db.validate(&Query::new("FOR i IN 1..3 RETURN i")).await);
    assert!(!db.validate(&Query::new("FRO i IN 1..3 RETURN i")).await);
}
