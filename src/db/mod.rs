//! Database handle.
//!
//! A [`Database`] pairs a database name with the transport used to reach it.
//! Cursors borrow the handle for refills and deletion, so it must outlive
//! every cursor created from it.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::query::{Query, QueryExecutor, QueryParse, Transaction};
use crate::transport::{HttpTransport, Method, Response, Transport};

/// Shared, read-only handle to one database.
#[derive(Clone)]
pub struct Database {
    name: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("name", &self.name).finish()
    }
}

impl Database {
    /// Creates a handle over an injected transport.
    pub fn new(name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            transport,
        }
    }

    /// Creates a handle backed by an HTTP transport.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        tracing::debug!(base_url = transport.base_url(), "database handle created");
        Ok(Self::new(config.database(), Arc::new(transport)))
    }

    /// Returns the database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends a request through the underlying transport.
    pub async fn send(
        &self,
        resource: &str,
        id: Option<&str>,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Response> {
        tracing::debug!(
            database = %self.name,
            %method,
            resource,
            id = id.unwrap_or(""),
            "sending request"
        );
        self.transport.send(resource, id, method, payload).await
    }

    /// Returns a query executor bound to this handle.
    pub fn executor(&self) -> QueryExecutor<'_> {
        QueryExecutor::new(self)
    }

    /// Submits a query and returns a cursor over its results.
    pub async fn execute(&self, query: &Query) -> Result<Cursor<'_>> {
        self.executor().execute(query).await
    }

    /// Parses a query on the server without running it.
    pub async fn parse(&self, query: &Query) -> Result<QueryParse> {
        self.executor().parse(query).await
    }

    /// Returns true if the server accepts the query.
    pub async fn validate(&self, query: &Query) -> bool {
        self.executor().validate(query).await
    }

    /// Runs a transaction and returns its result.
    pub async fn execute_transaction(&self, transaction: &Transaction) -> Result<Value> {
        self.executor().execute_transaction(transaction).await
    }

    /// Runs a query and collects every row into a vector.
    ///
    /// Convenience for small result sets; the server cursor is drained, so
    /// nothing is left to delete.
    pub async fn query_all<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        let mut cursor = self.execute(query).await?;
        cursor.collect_all().await
    }
}
