//! aql-cursor - a client-side driver for AQL queries over HTTP.
//!
//! Queries are submitted through a [`Database`] handle and their results are
//! consumed through a [`Cursor`] that pages batches in from the server.
//!
//! ```rust,ignore
//! use aql_cursor::{ConnectionConfig, Database, Query};
//!
//! let config = ConnectionConfig::from_connection_string("http://root@localhost:8529/_db/shop")?;
//! let db = Database::connect(&config)?;
//!
//! let mut cursor = db
//!     .execute(&Query::new("FOR u IN users RETURN u").with_batch_size(100))
//!     .await?;
//! while let Some(user) = cursor.fetch_one::<serde_json::Value>().await? {
//!     println!("{user}");
//! }
//! ```

pub mod config;
pub mod cursor;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod transport;

pub use config::{Config, ConnectionConfig};
pub use cursor::{Cursor, CursorState, Stats};
pub use db::Database;
pub use error::{AqlError, Result};
pub use query::{Query, QueryExecutor, QueryParse, Transaction};
pub use transport::{HttpTransport, Method, MockTransport, Response, Transport};
