//! Binding error types.
//!
//! A [`BindingError`] names the source that failed, the phase of the bind
//! pipeline it failed in, and carries a message that can be sent to the
//! client as-is.

use crate::coerce::CoercionError;
use http::StatusCode;
use std::fmt;

/// Where a value was being read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The JSON request body
    Body,
    /// Path parameters (e.g., `/calendars/{id}`)
    Params,
    /// Query string parameters
    Query,
    /// HTTP headers
    Headers,
}

impl Source {
    /// All sources, in the order the binder processes them.
    pub const ORDER: [Source; 4] = [Self::Body, Self::Params, Self::Query, Self::Headers];
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Params => write!(f, "path params"),
            Self::Query => write!(f, "query params"),
            Self::Headers => write!(f, "headers"),
        }
    }
}

/// Stage of the bind pipeline that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The body was missing or was not well-formed JSON.
    Decode,
    /// A present raw value could not be converted to the field type.
    Coerce,
    /// A declared constraint was violated.
    Validate,
    /// The descriptor itself is malformed (a programming error).
    Descriptor,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => write!(f, "decode"),
            Self::Coerce => write!(f, "coerce"),
            Self::Validate => write!(f, "validate"),
            Self::Descriptor => write!(f, "descriptor"),
        }
    }
}

/// Error returned by [`Binder::bind`](crate::Binder::bind).
///
/// Only the first failure of a bind call is ever reported.
///
/// # Example
///
/// ```rust
/// use planner_bind::{BindingError, Phase, Source};
/// use http::StatusCode;
///
/// let err = BindingError::missing_body();
/// assert_eq!(err.source(), Source::Body);
/// assert_eq!(err.phase(), Phase::Decode);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "missing request body");
/// ```
#[derive(Debug, Clone)]
pub struct BindingError {
    source: Source,
    kind: BindingErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingErrorKind {
    /// Body requested but empty
    MissingBody,
    /// Body is not valid JSON for the descriptor
    MalformedBody,
    /// Raw value could not be converted
    Coercion,
    /// Constraint violated
    Validation,
    /// Descriptor table is unusable
    Descriptor,
}

impl BindingError {
    /// Creates an error for a body that was requested but not sent.
    #[must_use]
    pub fn missing_body() -> Self {
        Self {
            source: Source::Body,
            kind: BindingErrorKind::MissingBody,
            field: None,
            message: "missing request body".to_string(),
        }
    }

    /// Creates an error for a body that failed to decode.
    #[must_use]
    pub fn malformed_body(details: impl fmt::Display) -> Self {
        Self {
            source: Source::Body,
            kind: BindingErrorKind::MalformedBody,
            field: None,
            message: format!("invalid JSON body: {details}"),
        }
    }

    /// Creates an error for a value that could not be coerced.
    #[must_use]
    pub fn coercion(source: Source, field: impl Into<String>, error: &CoercionError) -> Self {
        let field = field.into();
        Self {
            source,
            kind: BindingErrorKind::Coercion,
            message: format!("invalid {source}: field '{field}': {error}"),
            field: Some(field),
        }
    }

    /// Creates an error for a violated constraint.
    #[must_use]
    pub fn validation(source: Source, field: impl Into<String>, details: impl fmt::Display) -> Self {
        let field = field.into();
        Self {
            source,
            kind: BindingErrorKind::Validation,
            message: format!("{source} validation failed: field '{field}': {details}"),
            field: Some(field),
        }
    }

    /// Creates an error for a violated struct-level constraint.
    #[must_use]
    pub fn validation_general(source: Source, details: impl fmt::Display) -> Self {
        Self {
            source,
            kind: BindingErrorKind::Validation,
            message: format!("{source} validation failed: {details}"),
            field: None,
        }
    }

    /// Creates an error for a malformed descriptor.
    #[must_use]
    pub fn descriptor(source: Source, field: impl Into<String>, details: impl fmt::Display) -> Self {
        let field = field.into();
        Self {
            source,
            kind: BindingErrorKind::Descriptor,
            message: format!("invalid {source} descriptor: field '{field}': {details}"),
            field: Some(field),
        }
    }

    /// Returns the source that failed.
    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    /// Returns the phase that failed.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.kind {
            BindingErrorKind::MissingBody | BindingErrorKind::MalformedBody => Phase::Decode,
            BindingErrorKind::Coercion => Phase::Coerce,
            BindingErrorKind::Validation => Phase::Validate,
            BindingErrorKind::Descriptor => Phase::Descriptor,
        }
    }

    /// Returns the external name of the offending field, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the display-ready message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the client caused this error.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.kind != BindingErrorKind::Descriptor
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Client errors map to `400 Bad Request`; malformed descriptors map to
    /// `500 Internal Server Error`.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Returns the error code suitable for logs and error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindingErrorKind::MissingBody => "MISSING_BODY",
            BindingErrorKind::MalformedBody => "MALFORMED_BODY",
            BindingErrorKind::Coercion => "INVALID_PARAMETER",
            BindingErrorKind::Validation => "VALIDATION_FAILED",
            BindingErrorKind::Descriptor => "INVALID_DESCRIPTOR",
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BindingError {}
