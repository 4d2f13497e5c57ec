//! Mock transport for testing.
//!
//! Replays scripted responses in order and records every request, so tests
//! can assert on batch-fetch sequencing without a server.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{build_path, Method, Response, Transport};
use crate::error::{AqlError, Result};

/// Base prefix used for recorded paths.
const MOCK_BASE: &str = "/_api";

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
}

/// A transport that returns predefined responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Creates a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body.
    pub fn with_response(self, status: u16, body: Value) -> Self {
        self.push_response(status, body);
        self
    }

    /// Queues a channel failure.
    pub fn with_error(self, error: AqlError) -> Self {
        self.push_error(error);
        self
    }

    /// Queues a response on a shared mock.
    pub fn push_response(&self, status: u16, body: Value) {
        self.lock_responses().push_back(Ok(Response::new(status, body)));
    }

    /// Queues a channel failure on a shared mock.
    pub fn push_error(&self, error: AqlError) {
        self.lock_responses().push_back(Err(error));
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// Returns the number of scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.lock_responses().len()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Response>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        resource: &str,
        id: Option<&str>,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Response> {
        let path = build_path(MOCK_BASE, resource, id);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedRequest {
                method,
                path: path.clone(),
                payload: payload.cloned(),
            });

        self.lock_responses().pop_front().unwrap_or_else(|| {
            Err(AqlError::transport(format!(
                "no scripted response for {} {}",
                method, path
            )))
        })
    }
}
