//! Error types for the document server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nestdb_core::CoreError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the document server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request body is malformed.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// The request body was refused before it was parsed.
    #[error("{message}")]
    BodyRejected {
        /// Status reported by the body extractor.
        status: StatusCode,
        /// Reason reported by the body extractor.
        message: String,
    },

    /// Store or persistence failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The listener could not be bound.
    #[error("cannot listen on {addr}: {message}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying failure.
        message: String,
    },

    /// Certificate generation or TLS setup failed.
    #[error("tls error: {0}")]
    Tls(String),

    /// In-flight requests did not finish within the grace period.
    #[error("in-flight requests did not finish within {grace:?}")]
    ShutdownTimeout {
        /// The grace period that elapsed.
        grace: Duration,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Creates a bind error.
    pub fn bind(addr: impl Into<String>, message: impl ToString) -> Self {
        Self::Bind {
            addr: addr.into(),
            message: message.to_string(),
        }
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::BodyRejected { status, .. } => *status,
            ServerError::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::Core(CoreError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            ServerError::Core(CoreError::InvalidDocument { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

/// JSON response envelope: `{"error": bool, "message"?: string, ...fields}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    /// Whether the request failed.
    pub error: bool,
    /// Human-readable failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation-specific fields.
    #[serde(flatten)]
    pub fields: T,
}

/// Envelope without extra fields.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoFields {}

impl<T: Serialize> Envelope<T> {
    /// Successful envelope.
    pub fn ok(fields: T) -> Self {
        Self {
            error: false,
            message: None,
            fields,
        }
    }

    /// Failed envelope carrying the error message.
    pub fn failed(err: &ServerError, fields: T) -> Self {
        Self {
            error: true,
            message: Some(err.to_string()),
            fields,
        }
    }
}

impl ServerError {
    /// Converts the error into a response whose envelope also carries `fields`.
    pub fn into_response_with<T: Serialize>(self, fields: T) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(Envelope::failed(&self, fields))).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.into_response_with(NoFields {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::BadRequest("bad".into()).is_client_error());
        assert!(ServerError::Tls("oops".into()).is_server_error());
        assert!(!ServerError::BadRequest("bad".into()).is_server_error());
    }

    #[test]
    fn core_errors_map_to_statuses() {
        assert_eq!(
            ServerError::from(CoreError::not_found("a")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(CoreError::already_exists("a")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServerError::from(CoreError::invalid_document("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(CoreError::locked(std::path::Path::new("p"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn core_message_is_passed_through() {
        let err = ServerError::from(CoreError::not_found("users"));
        assert_eq!(err.to_string(), "no such resource: [users]");
    }

    #[test]
    fn envelope_shape() {
        let ok = serde_json::to_value(Envelope::ok(NoFields {})).unwrap();
        assert_eq!(ok, serde_json::json!({"error": false}));

        let err = ServerError::BadRequest("missing name".into());
        let failed = serde_json::to_value(Envelope::failed(&err, NoFields {})).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"error": true, "message": "invalid request: missing name"})
        );
    }

    #[test]
    fn shutdown_timeout_display() {
        let err = ServerError::ShutdownTimeout {
            grace: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("5s"));
    }
}
