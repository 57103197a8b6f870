//! Request middleware.
//!
//! The chain wrapped around every routed request, outermost first:
//!
//! | Stage | Behavior |
//! |-------|----------|
//! | [`recover`] | Turns a panic into `500 {"error":"internal server error"}` |
//! | [`log_request`] | Emits one `info` event with method, path, status, size, duration |
//! | [`Cors`] | Answers `OPTIONS` preflights and adds `Access-Control-*` headers |

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use http::header::{self, HeaderName};
use http::{HeaderValue, Method, StatusCode};
use hyper::body::Body;
use planner_config::CorsConfig;

use crate::response::{self, Response};

/// Runs `inner`, converting a panic into a 500 response.
pub async fn recover<F>(inner: F) -> Response
where
    F: Future<Output = Response>,
{
    match AssertUnwindSafe(inner).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(panic = %panic_message(panic.as_ref()), "handler panicked");
            response::error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Runs `inner` and logs the finished request.
pub async fn log_request<F>(method: &Method, path: &str, inner: F) -> Response
where
    F: Future<Output = Response>,
{
    let started = Instant::now();
    let response = inner.await;

    let bytes = response.body().size_hint().exact().unwrap_or(0);
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    tracing::info!(
        method = %method,
        path,
        status = response.status().as_u16(),
        bytes,
        elapsed_ms,
        "request completed"
    );
    response
}

/// Cross-origin headers built once from [`CorsConfig`].
#[derive(Debug, Clone)]
pub struct Cors {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
}

impl Cors {
    /// Builds the header values. Entries that are not valid header values
    /// are skipped with a warning.
    #[must_use]
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allow_origin: header_value(&config.allowed_origin, "*"),
            allow_methods: header_value(&config.allowed_methods.join(", "), "GET, POST, OPTIONS"),
            allow_headers: header_value(&config.allowed_headers.join(", "), "Content-Type"),
            max_age: HeaderValue::from(config.max_age_secs),
        }
    }

    /// Answers a preflight request, or returns `None` for anything else.
    pub fn preflight(&self, method: &Method) -> Option<Response> {
        if *method != Method::OPTIONS {
            return None;
        }
        let mut response = response::empty(StatusCode::NO_CONTENT);
        self.apply(&mut response);
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
        Some(response)
    }

    /// Adds the `Access-Control-Allow-*` headers to a response.
    pub fn apply(&self, response: &mut Response) {
        let headers = response.headers_mut();
        let entries: [(HeaderName, &HeaderValue); 3] = [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin),
            (header::ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers),
        ];
        for (name, value) in entries {
            headers.insert(name, value.clone());
        }
    }

    /// Runs `inner` unless the request is a preflight, then decorates the
    /// response.
    pub async fn handle<F>(&self, method: &Method, inner: F) -> Response
    where
        F: Future<Output = Response>,
    {
        if let Some(response) = self.preflight(method) {
            return response;
        }
        let mut response = inner.await;
        self.apply(&mut response);
        response
    }
}

impl Default for Cors {
    fn default() -> Self {
        Self::new(&CorsConfig::default())
    }
}

fn header_value(raw: &str, fallback: &'static str) -> HeaderValue {
    HeaderValue::from_str(raw).unwrap_or_else(|_| {
        tracing::warn!(value = raw, "ignoring invalid CORS header value");
        HeaderValue::from_static(fallback)
    })
}
