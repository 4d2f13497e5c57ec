//! reqwest-backed transport.
//!
//! Talks to a live server over HTTP(S) with basic authentication.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{build_path, parse_body, Method, Response, Transport};
use crate::config::ConnectionConfig;
use crate::error::{AqlError, Result};

/// HTTP transport bound to one database's API base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    user: Option<String>,
    password: Option<String>,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport from a connection config.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout()?)
            .build()
            .map_err(|e| AqlError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url(),
            user: config.user.clone(),
            password: config.password.clone(),
            client,
        })
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        resource: &str,
        id: Option<&str>,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Response> {
        let url = build_path(&self.base_url, resource, id);

        let mut request = self.client.request(method.into(), &url);
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_ref());
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AqlError::transport(format!("{} {} timed out", method, url))
            } else if e.is_connect() {
                AqlError::transport(format!("Failed to connect to {}: {}", url, e))
            } else {
                AqlError::transport(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AqlError::transport(format!("Failed to read response: {}", e)))?;

        tracing::debug!(%method, %url, status, "request completed");

        Ok(Response::new(status, parse_body(&text)?))
    }
}
