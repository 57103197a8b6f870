//! Liveness endpoint.

use std::sync::Arc;

use http::StatusCode;
use planner_bind::RequestParts;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::{self, Response};

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

/// `GET /api/health`
pub async fn health(_state: Arc<AppState>, _parts: RequestParts) -> Result<Response, ApiError> {
    Ok(response::json(StatusCode::OK, &Health { status: "ok" }))
}
