//! Server and request error types.

use http::StatusCode;
use planner_bind::BindingError;
use planner_config::ConfigError;
use thiserror::Error;

use crate::response::{self, Response};
use crate::store::StoreError;

/// Errors that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listen address could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O failure while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The logging subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// Errors a handler returns instead of a response.
///
/// Every variant renders as `{"error": "<message>"}` with the matching
/// status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be bound to its descriptors.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// The request was well formed but semantically invalid.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Binding(e) => e.status_code(),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(e) => e.status_code(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as a JSON response.
    ///
    /// Server-side failures are logged here and their details are not sent
    /// to the client.
    #[must_use]
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
            return response::error(status, "internal server error");
        }
        response::error(status, &self.to_string())
    }
}
