//! Transport failure taxonomy and normalization into display text.

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Shown when a failure carries no usable message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Closed set of ways a transport call can fail. The normalizer matches on
/// the variant tag rather than probing error internals at runtime.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server rejected the request and supplied a structured body.
    #[error("{message}")]
    Server { code: ErrorCode, message: String },
    /// The request never produced a usable response.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Unexpected(String),
}

impl From<ApiError> for TransportError {
    fn from(value: ApiError) -> Self {
        Self::Server {
            code: value.code,
            message: value.message,
        }
    }
}

/// Collapse a transport failure into one human-readable string: the
/// server-supplied message verbatim when present, the failure's own display
/// text otherwise, and a fixed fallback when even that is empty.
pub fn error_message(failure: &TransportError) -> String {
    match failure {
        TransportError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
        other => {
            let text = other.to_string();
            if text.trim().is_empty() {
                FALLBACK_ERROR_MESSAGE.to_string()
            } else {
                text
            }
        }
    }
}
