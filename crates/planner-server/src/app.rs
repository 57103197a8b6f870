//! Request handling independent of the socket layer.
//!
//! [`App`] takes a complete `http::Request`, reads its body under the
//! configured size and time limits, runs it through the middleware chain
//! and the route table, and always produces a response. The server feeds
//! it hyper requests; tests feed it in-memory ones.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use planner_bind::RequestParts;
use planner_config::PlannerConfig;

use crate::handlers;
use crate::middleware::{self, Cors};
use crate::response::{self, Response};
use crate::routes::{RouteMatch, Router};
use crate::store::{CalendarStore, InMemoryCalendarStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// State shared by all handlers.
pub struct AppState {
    store: Arc<dyn CalendarStore>,
}

impl AppState {
    /// Creates state around a calendar store.
    #[must_use]
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// The calendar store.
    #[must_use]
    pub fn store(&self) -> &dyn CalendarStore {
        self.store.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryCalendarStore::new()))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// The meeting planner application.
pub struct App {
    state: Arc<AppState>,
    router: Router,
    cors: Cors,
    max_body_bytes: usize,
    request_timeout: Duration,
}

impl App {
    /// Creates the application with an empty in-memory store.
    #[must_use]
    pub fn new(config: &PlannerConfig) -> Self {
        Self::with_state(config, AppState::default())
    }

    /// Creates the application around existing state.
    #[must_use]
    pub fn with_state(config: &PlannerConfig, state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            router: handlers::api_router(),
            cors: Cors::new(&config.cors),
            max_body_bytes: config.server.max_body_bytes,
            request_timeout: Duration::from_millis(config.server.request_timeout_ms),
        }
    }

    /// Shared handler state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The route table, for registering extra routes.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Handles one request.
    pub async fn handle<B>(&self, request: Request<B>) -> Response
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (head, body) = request.into_parts();
        let method = head.method.clone();
        let path = head.uri.path().to_string();

        let routed = async {
            let body = match self.read_body(body).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            self.route(head.method, head.uri, head.headers, body).await
        };

        middleware::recover(middleware::log_request(
            &method,
            &path,
            self.cors.handle(&method, routed),
        ))
        .await
    }

    async fn read_body<B>(&self, body: B) -> Result<Bytes, Response>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let limited = Limited::new(body, self.max_body_bytes);
        match tokio::time::timeout(self.request_timeout, limited.collect()).await {
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::debug!(limit = self.max_body_bytes, "request body too large");
                Err(response::error(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "request body too large",
                ))
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read request body");
                Err(response::error(
                    StatusCode::BAD_REQUEST,
                    "failed to read request body",
                ))
            }
            Err(_) => {
                tracing::warn!("request body read timed out");
                Err(response::error(
                    StatusCode::REQUEST_TIMEOUT,
                    "request body read timed out",
                ))
            }
        }
    }

    async fn route(&self, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
        let path = uri.path().to_string();
        match self.router.match_route(&method, &path) {
            RouteMatch::Found {
                handler,
                pattern,
                params,
            } => {
                tracing::debug!(route = pattern, "route matched");
                let parts = RequestParts::new(method, uri, headers, body, params);
                let call = handler(Arc::clone(&self.state), parts);

                match tokio::time::timeout(self.request_timeout, call).await {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => e.into_response(),
                    Err(_) => {
                        tracing::warn!(route = pattern, "handler timed out");
                        response::error(StatusCode::GATEWAY_TIMEOUT, "request timed out")
                    }
                }
            }
            RouteMatch::MethodNotAllowed(allowed) => {
                let mut response =
                    response::error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                response
            }
            RouteMatch::NotFound => response::error(StatusCode::NOT_FOUND, "not found"),
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.router.len())
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
