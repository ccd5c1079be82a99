//! Error types for the driver API client.
//!
//! # Design
//! Every backend call ends in an `ApiResult`. The three transport-level
//! failure classes (server rejected, unreachable, malformed request) and
//! schema mismatches on otherwise successful responses all share one
//! channel; `Display` yields the user-facing message for each.

use thiserror::Error;

/// Fixed message for calls that were dispatched but never answered.
pub const NO_RESPONSE_MESSAGE: &str = "No response from server";

/// Outcome of a backend call: `Ok(data)` or a failure carrying its message.
pub type ApiResult<T> = Result<T, ApiError>;

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request left the process but no response arrived.
    #[error("{}", NO_RESPONSE_MESSAGE)]
    Unreachable,

    /// The request could not be built or dispatched.
    #[error("{0}")]
    Malformed(String),

    /// A 2xx response whose body does not match the operation's schema.
    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
}

/// Coarse classification of an `ApiError`, for callers that branch on the
/// failure class rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ServerRejected,
    Unreachable,
    MalformedRequest,
    InvalidPayload,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Server { .. } => FailureKind::ServerRejected,
            ApiError::Unreachable => FailureKind::Unreachable,
            ApiError::Malformed(_) => FailureKind::MalformedRequest,
            ApiError::InvalidPayload(_) => FailureKind::InvalidPayload,
        }
    }

    /// The message a screen would show in its failure notification.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of a server rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors loading a `ClientConfig` from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("base URL must not be empty")]
    EmptyBaseUrl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_message_is_fixed() {
        assert_eq!(ApiError::Unreachable.message(), NO_RESPONSE_MESSAGE);
    }

    #[test]
    fn server_message_is_passed_through_verbatim() {
        let err = ApiError::Server {
            status: 422,
            message: "Email already taken".to_string(),
        };
        assert_eq!(err.message(), "Email already taken");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.kind(), FailureKind::ServerRejected);
    }

    #[test]
    fn malformed_keeps_underlying_text() {
        let err = ApiError::Malformed("relative URL without a base".to_string());
        assert_eq!(err.message(), "relative URL without a base");
        assert_eq!(err.status(), None);
    }
}
