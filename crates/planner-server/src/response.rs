//! Response helpers.
//!
//! All handlers answer with JSON. Errors use the flat
//! `{"error": "<message>"}` envelope.

use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::Serialize;

/// Response body type used throughout the server.
pub type ResponseBody = Full<Bytes>;

/// HTTP response type used throughout the server.
pub type Response = http::Response<ResponseBody>;

const JSON: &str = "application/json";

/// Serializes `value` as the body of a response with the given status.
///
/// A value that fails to serialize yields a 500 error response.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => with_body(status, Bytes::from(body)),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            error(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode response")
        }
    }
}

/// Builds a `{"error": message}` response.
pub fn error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "error": message });
    with_body(status, Bytes::from(body.to_string()))
}

/// Builds an empty response.
pub fn empty(status: StatusCode) -> Response {
    let mut response = http::Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Reads a response body into bytes.
pub async fn into_bytes(response: Response) -> Bytes {
    match response.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

fn with_body(status: StatusCode, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
    response
}
