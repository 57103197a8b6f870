//! Echo endpoint.
//!
//! Binds all four request sources and returns what was bound. Useful for
//! checking the binder end to end from a client.

use std::sync::Arc;

use http::StatusCode;
use planner_bind::{Bind, Binder, RequestParts};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::{self, Response};

/// JSON body.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct EchoBody {
    /// Text to echo back.
    #[validate(length(min = 1))]
    pub message: String,
}

/// Path parameters.
#[derive(Debug, Default, Bind, Serialize, Validate)]
pub struct EchoParams {
    /// The `{id}` segment.
    #[validate(required)]
    pub id: Option<String>,
}

/// Query parameters.
#[derive(Debug, Default, Bind, Serialize, Validate)]
pub struct EchoQuery {
    /// Caller name.
    #[validate(required)]
    pub name: Option<String>,
    /// Caller age.
    #[validate(range(min = 18, max = 99))]
    pub age: Option<i32>,
}

/// Headers.
#[derive(Debug, Default, Bind, Serialize, Validate)]
pub struct EchoHeaders {
    /// The `Authorization` header.
    #[bind(key = "Authorization")]
    #[validate(required)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct Echo {
    body: EchoBody,
    params: EchoParams,
    query: EchoQuery,
    headers: EchoHeaders,
}

/// `POST /api/echo/{id}`
pub async fn echo(_state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut body = EchoBody::default();
    let mut params = EchoParams::default();
    let mut query = EchoQuery::default();
    let mut headers = EchoHeaders::default();

    Binder::new(&parts)
        .body(&mut body)
        .params(&mut params)
        .query(&mut query)
        .headers(&mut headers)
        .bind()?;

    Ok(response::json(
        StatusCode::OK,
        &Echo {
            body,
            params,
            query,
            headers,
        },
    ))
}
