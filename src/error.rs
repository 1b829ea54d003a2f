//! Error types for the gateway.
//!
//! Store and configuration failures are hard errors. Dispatch only escalates an
//! unregistered principal; everything an action can hit is folded into a failed
//! [`ActionResult`](crate::dispatch::ActionResult) through [`ActionError`].

use crate::remote::{EntityKind, RemoteError};
use thiserror::Error;

/// Context store persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Errors escalated past the dispatcher to the transport
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("principal {0} not registered")]
    UnauthorizedPrincipal(String),
}

/// Action-level failures, reported to callers as failed results
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("failed to {operation} {kind}: {source}")]
    Remote {
        operation: &'static str,
        kind: EntityKind,
        #[source]
        source: RemoteError,
    },

    #[error("action {action} timed out after {after:?}")]
    Timeout {
        action: String,
        after: std::time::Duration,
    },
}

impl ActionError {
    /// Validation failure for a single parameter
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ActionError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn remote(operation: &'static str, kind: EntityKind, source: RemoteError) -> Self {
        ActionError::Remote {
            operation,
            kind,
            source,
        }
    }
}

/// Top-level errors for configuration, logging, serving and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Remote client error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
