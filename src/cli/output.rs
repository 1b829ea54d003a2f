//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a message for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ContextNotFound(id) => format!("error: no context with id '{}'", id),
        ApiError::InvalidArgument(msg) => format!("error: {}", msg),
        other => format!("error: {}", other),
    }
}

/// Process exit code for an error
pub fn exit_code(e: &ApiError) -> i32 {
    match e {
        ApiError::ContextNotFound(_) | ApiError::InvalidArgument(_) => 2,
        ApiError::ConfigError(_) => 78,
        _ => 1,
    }
}
