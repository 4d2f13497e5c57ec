//! Response envelope types.
//!
//! Defines the structures the server wraps around result batches, statistics,
//! and envelope-level errors.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AqlError, Result};
use crate::transport::Response;

/// One cursor response: a batch of rows plus pagination and statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorEnvelope {
    /// Server-side cursor id; absent when the whole result fit in one batch.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    /// Raw rows of the current batch.
    #[serde(default)]
    pub result: Vec<Value>,

    /// Whether further batches exist.
    #[serde(default)]
    pub has_more: bool,

    /// Total result count, only present when the query asked for counting.
    #[serde(default)]
    pub count: Option<u64>,

    /// Statistics and warnings.
    #[serde(default)]
    pub extra: Extra,

    /// Whether the result came from the query cache.
    #[serde(default)]
    pub cached: bool,

    #[serde(default)]
    pub error: bool,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub error_num: Option<u32>,

    #[serde(default)]
    pub code: Option<u16>,
}

/// The `extra` attribute of a cursor response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Extra {
    #[serde(default)]
    pub stats: Stats,

    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// Execution statistics, cumulative as reported by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub writes_executed: u64,

    #[serde(default)]
    pub writes_ignored: u64,

    #[serde(default)]
    pub scanned_full: u64,

    #[serde(default)]
    pub scanned_index: u64,

    #[serde(default)]
    pub filtered: u64,

    /// Matching rows ignoring LIMIT; only present when `fullCount` was requested.
    #[serde(default)]
    pub full_count: Option<u64>,

    /// Server-side execution time in seconds.
    #[serde(default)]
    pub execution_time: Option<f64>,
}

/// A warning raised while the query ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    #[serde(default)]
    pub code: u32,

    #[serde(default)]
    pub message: String,
}

/// The generic error envelope every endpoint can return.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: bool,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub error_num: Option<u32>,

    #[serde(default)]
    pub code: Option<u16>,
}

impl CursorEnvelope {
    /// Decodes a successful response into an envelope.
    ///
    /// An envelope that carries `error: true` is turned into `ServerRejected`
    /// even when the HTTP status looked fine.
    pub fn from_response(response: &Response) -> Result<Self> {
        if !response.is_success() {
            return Err(rejection(response));
        }

        let envelope: Self = serde_json::from_value(response.body.clone())
            .map_err(|e| AqlError::decode(format!("Malformed cursor envelope: {}", e)))?;

        if envelope.error {
            return Err(AqlError::server_rejected(
                envelope.code.unwrap_or(response.status),
                envelope.error_num.unwrap_or_default(),
                envelope
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "unknown server error".to_string()),
            ));
        }

        Ok(envelope)
    }
}

/// Converts a non-success response into a `ServerRejected` error.
///
/// Falls back to the raw status when the body is not an error envelope.
pub fn rejection(response: &Response) -> AqlError {
    let envelope: ErrorEnvelope =
        serde_json::from_value(response.body.clone()).unwrap_or_default();

    let message = envelope
        .error_message
        .unwrap_or_else(|| format!("unexpected HTTP status {}", response.status));

    AqlError::server_rejected(
        envelope.code.unwrap_or(response.status),
        envelope.error_num.unwrap_or_default(),
        message,
    )
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "cursor id must be a string or number, got {}",
            other
        ))),
    }
}
