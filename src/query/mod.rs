//! Query and transaction requests.
//!
//! Defines the request bodies sent to the server and the executor that
//! submits them.

pub mod executor;

pub use executor::QueryExecutor;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An AQL query with its bind variables and cursor options.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// The AQL text.
    #[serde(rename = "query")]
    pub aql: String,

    /// Values for `@name` placeholders.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub bind_vars: Map<String, Value>,

    /// Ask the server to report the total result count.
    pub count: bool,

    /// Maximum rows per batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,

    /// Server-side cursor lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    #[serde(skip_serializing_if = "QueryOptions::is_empty")]
    pub options: QueryOptions,

    /// Parse the query on the server before executing it. Client-side only.
    #[serde(skip)]
    pub validate: bool,
}

/// Extra query options.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Compute the number of matches ignoring the outermost LIMIT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_count: Option<bool>,
}

impl QueryOptions {
    fn is_empty(&self) -> bool {
        self.full_count.is_none()
    }
}

impl Query {
    /// Creates a query from AQL text.
    pub fn new(aql: impl Into<String>) -> Self {
        Self {
            aql: aql.into(),
            ..Default::default()
        }
    }

    /// Binds a value to `@name`.
    pub fn with_bind_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind_vars.insert(name.into(), value.into());
        self
    }

    /// Requests the total result count.
    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets the server-side cursor lifetime.
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl = Some(ttl_secs);
        self
    }

    /// Requests the full count ignoring LIMIT.
    pub fn with_full_count(mut self, full_count: bool) -> Self {
        self.options.full_count = Some(full_count);
        self
    }

    /// Validates the query on the server before executing it.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Returns true if there is no AQL text to run.
    pub fn is_blank(&self) -> bool {
        self.aql.trim().is_empty()
    }
}

/// Collections a transaction declares up front.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TransactionCollections {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub write: Vec<String>,
}

/// A server-side JavaScript transaction.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub collections: TransactionCollections,

    /// JavaScript function source to run.
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_sync: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_timeout: Option<u64>,
}

impl Transaction {
    /// Creates a transaction running `action`.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    /// Declares a collection read by the transaction.
    pub fn read(mut self, collection: impl Into<String>) -> Self {
        self.collections.read.push(collection.into());
        self
    }

    /// Declares a collection written by the transaction.
    pub fn write(mut self, collection: impl Into<String>) -> Self {
        self.collections.write.push(collection.into());
        self
    }

    /// Sets the parameters passed to the action.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_wait_for_sync(mut self, wait_for_sync: bool) -> Self {
        self.wait_for_sync = Some(wait_for_sync);
        self
    }

    pub fn with_lock_timeout(mut self, lock_timeout_secs: u64) -> Self {
        self.lock_timeout = Some(lock_timeout_secs);
        self
    }
}

/// What the server reports after parsing a query without running it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryParse {
    #[serde(default)]
    pub parsed: bool,

    /// Collections the query touches.
    #[serde(default, deserialize_with = "null_as_default")]
    pub collections: Vec<String>,

    /// Bind parameter names the query expects.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bind_vars: Vec<String>,

    /// Abstract syntax tree as returned by the server.
    #[serde(default)]
    pub ast: Value,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
