//! Query submission and validation.
//!
//! Turns [`Query`] and [`Transaction`] requests into server calls and wraps
//! query results in a [`Cursor`].

use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use super::{Query, QueryParse, Transaction};
use crate::cursor::envelope::{rejection, ErrorEnvelope};
use crate::cursor::{Cursor, CursorEnvelope, CURSOR_RESOURCE};
use crate::db::Database;
use crate::error::{AqlError, Result};
use crate::transport::{Method, Response};

/// Resource name of the query parsing API.
const QUERY_RESOURCE: &str = "query";

/// Resource name of the transaction API.
const TRANSACTION_RESOURCE: &str = "transaction";

/// Query executor that validates and submits queries against one database.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'a> {
    db: &'a Database,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Submits a query and returns a cursor holding the first batch.
    ///
    /// Queries flagged with `validate` are parsed on the server first; if the
    /// parse fails, its error is returned and the query is never submitted.
    pub async fn execute(&self, query: &Query) -> Result<Cursor<'a>> {
        if query.is_blank() {
            return Err(AqlError::invalid_argument("cannot execute an empty query"));
        }

        if query.validate {
            self.parse(query).await?;
        }

        let payload = serde_json::to_value(query)
            .map_err(|e| AqlError::invalid_argument(format!("query cannot be encoded: {}", e)))?;

        let start = Instant::now();
        let response = self
            .db
            .send(CURSOR_RESOURCE, None, Method::Post, Some(&payload))
            .await?;
        let envelope = CursorEnvelope::from_response(&response)?;
        let cursor = Cursor::from_envelope(self.db, envelope, start.elapsed())?;

        debug!(
            cursor = cursor.id().unwrap_or("-"),
            rows = cursor.buffered(),
            has_more = cursor.has_more(),
            "query submitted"
        );

        Ok(cursor)
    }

    /// Parses a query on the server without executing it.
    ///
    /// A query the server refuses comes back as `ServerRejected` with the
    /// server's message, distinct from a `Transport` failure.
    pub async fn parse(&self, query: &Query) -> Result<QueryParse> {
        let response = self.submit_parse(query).await?;

        serde_json::from_value::<Option<QueryParse>>(response.body)
            .map(Option::unwrap_or_default)
            .map_err(|e| AqlError::decode(format!("Malformed parse response: {}", e)))
    }

    /// Returns true only if the server accepted the query.
    ///
    /// Transport failures and syntax errors both yield false; call
    /// [`QueryExecutor::parse`] to tell them apart. The response body is not
    /// inspected beyond its error flag.
    pub async fn validate(&self, query: &Query) -> bool {
        match self.submit_parse(query).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "query failed validation");
                false
            }
        }
    }

    /// Sends a parse request and returns the response if the server accepted it.
    async fn submit_parse(&self, query: &Query) -> Result<Response> {
        if query.is_blank() {
            return Err(AqlError::invalid_argument("cannot parse an empty query"));
        }

        let payload = serde_json::json!({ "query": query.aql });
        let response = self
            .db
            .send(QUERY_RESOURCE, None, Method::Post, Some(&payload))
            .await?;

        if response.status != 200 {
            return Err(rejection(&response));
        }

        let status: ErrorEnvelope =
            serde_json::from_value(response.body.clone()).unwrap_or_default();
        if status.error {
            return Err(rejection(&response));
        }

        Ok(response)
    }

    /// Runs a transaction as a single request and returns its result.
    pub async fn execute_transaction(&self, transaction: &Transaction) -> Result<Value> {
        if transaction.action.trim().is_empty() {
            return Err(AqlError::invalid_argument(
                "transaction action must not be empty",
            ));
        }

        let payload = serde_json::to_value(transaction).map_err(|e| {
            AqlError::invalid_argument(format!("transaction cannot be encoded: {}", e))
        })?;
        let response = self
            .db
            .send(TRANSACTION_RESOURCE, None, Method::Post, Some(&payload))
            .await?;

        if !response.is_success() {
            return Err(rejection(&response));
        }

        let envelope: TransactionEnvelope =
            serde_json::from_value::<Option<_>>(response.body.clone())
                .map_err(|e| AqlError::decode(format!("Malformed transaction response: {}", e)))?
                .unwrap_or_default();
        if envelope.error {
            return Err(rejection(&response));
        }

        Ok(envelope.result)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TransactionEnvelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: bool,
}
