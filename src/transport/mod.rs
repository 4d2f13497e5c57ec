//! Transport abstraction for the database's HTTP interface.
//!
//! The driver core only ever talks to the server through the [`Transport`]
//! trait, so the cursor protocol can be driven against a scripted
//! [`MockTransport`] as easily as against a live server.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// HTTP methods the transport can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Post,
    Put,
    Patch,
    Delete,
    Get,
    Head,
    Options,
}

impl Method {
    /// Returns the method as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// A decoded server response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// JSON body, `Value::Null` when the body was empty.
    pub body: Value,
}

impl Response {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The `send` capability the driver depends on.
///
/// Implementations must be thread-safe (Send + Sync) so one database handle can
/// be shared by cursors driven from different tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `payload` to `<base>/<resource>[/<id>]` and returns the decoded response.
    ///
    /// Only channel failures are errors here; non-2xx statuses come back as a
    /// `Response` for the caller to interpret.
    async fn send(
        &self,
        resource: &str,
        id: Option<&str>,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Response>;
}

/// Builds `<base>/<resource>` or `<base>/<resource>/<id>`.
pub fn build_path(base: &str, resource: &str, id: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    let resource = resource.trim_matches('/');
    match id.filter(|id| !id.is_empty()) {
        Some(id) => format!("{}/{}/{}", base, resource, id),
        None => format!("{}/{}", base, resource),
    }
}

/// Parses a raw response body, treating an empty body as JSON null.
pub(crate) fn parse_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| {
        crate::error::AqlError::decode(format!("Response body is not valid JSON: {}", e))
    })
}
