//! Error types for aql-cursor.
//!
//! Defines the main error enum used throughout the driver. Transport failures
//! and server-side rejections are kept apart so callers can tell a broken
//! channel from a query the server refused.

use thiserror::Error;

/// Main error type for driver operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AqlError {
    /// A required input was missing or empty (blank query, empty transaction action).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid for the cursor's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The channel could not complete the request (connect, timeout, I/O).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with an error envelope.
    #[error("Server rejected request (HTTP {status}, error {error_num}): {message}")]
    ServerRejected {
        /// HTTP status or envelope `code`.
        status: u16,
        /// Server-specific `errorNum`, 0 when absent.
        error_num: u32,
        /// Server-reported `errorMessage`.
        message: String,
    },

    /// A result row could not be decoded into the requested type.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// The server no longer knows the cursor (HTTP 404 on delete).
    #[error("Cursor {id} does not exist on the server")]
    AlreadyGone {
        /// Identifier of the cursor that was targeted.
        id: String,
    },

    /// A response body was not a well-formed envelope.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AqlError {
    /// Creates an invalid argument error with the given message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an invalid state error with the given message.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a server rejection from envelope fields.
    pub fn server_rejected(status: u16, error_num: u32, message: impl Into<String>) -> Self {
        Self::ServerRejected {
            status,
            error_num,
            message: message.into(),
        }
    }

    /// Creates a type mismatch error with the given message.
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for the informational "cursor already gone" outcome.
    pub fn is_already_gone(&self) -> bool {
        matches!(self, Self::AlreadyGone { .. })
    }

    /// Returns true when the channel itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "Invalid Argument",
            Self::InvalidState(_) => "Invalid State",
            Self::Transport(_) => "Transport Error",
            Self::ServerRejected { .. } => "Server Error",
            Self::TypeMismatch(_) => "Type Mismatch",
            Self::AlreadyGone { .. } => "Already Gone",
            Self::Decode(_) => "Decode Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using AqlError.
pub type Result<T> = std::result::Result<T, AqlError>;
