//! Route table.
//!
//! Patterns are `/`-separated segments where `{name}` captures one segment
//! as a path parameter. Routes are tried in registration order and the
//! first one whose pattern and method both match wins. A path that matches
//! some pattern under a different method yields
//! [`RouteMatch::MethodNotAllowed`].
//!
//! ```text
//! GET  /api/calendars/{id}        -> id = "0b5b..."
//! POST /api/calendars/{id}/votes  -> id = "0b5b..."
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use http::Method;
use planner_bind::{PathParams, RequestParts};

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::Response;

/// Type-erased request handler.
pub type Handler =
    Box<dyn Fn(Arc<AppState>, RequestParts) -> BoxFuture<'static, Result<Response, ApiError>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

struct Route {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handler: Handler,
}

impl Route {
    fn capture(&self, path: &[&str]) -> Option<PathParams> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, value) in self.segments.iter().zip(path) {
            match segment {
                Segment::Static(expected) if expected.as_str() == *value => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => params.push(name.as_str(), decode_segment(value)),
            }
        }
        Some(params)
    }
}

/// Percent-decodes a captured segment. Bytes that do not decode to UTF-8
/// leave the segment as received.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Outcome of [`Router::match_route`].
pub enum RouteMatch<'a> {
    /// A route matched both path and method.
    Found {
        /// The route's handler.
        handler: &'a Handler,
        /// The pattern that matched, e.g. `/api/calendars/{id}`.
        pattern: &'a str,
        /// Captured path parameters.
        params: PathParams,
    },
    /// The path is known but not for this method.
    MethodNotAllowed(Vec<Method>),
    /// No pattern matches the path.
    NotFound,
}

/// Ordered list of routes.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `method` and `pattern`.
    pub fn add<F, Fut>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(Arc<AppState>, RequestParts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            segments: parse_pattern(pattern),
            handler: Box::new(move |state, parts| Box::pin(handler(state, parts))),
        });
        self
    }

    /// Registers a `GET` route.
    pub fn get<F, Fut>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(Arc<AppState>, RequestParts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        self.add(Method::GET, pattern, handler)
    }

    /// Registers a `POST` route.
    pub fn post<F, Fut>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(Arc<AppState>, RequestParts) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        self.add(Method::POST, pattern, handler)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route for a request.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let segments = split_path(path);
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.capture(&segments) else {
                continue;
            };
            if route.method == *method {
                return RouteMatch::Found {
                    handler: &route.handler,
                    pattern: &route.pattern,
                    params,
                };
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed(allowed)
        }
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|segment| {
            match segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(segment.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;
    use http::StatusCode;

    async fn ok(_state: Arc<AppState>, _parts: RequestParts) -> Result<Response, ApiError> {
        Ok(response::empty(StatusCode::OK))
    }

    fn router() -> Router {
        let mut router = Router::new();
        router
            .get("/api/calendars", ok)
            .post("/api/calendars", ok)
            .get("/api/calendars/{id}", ok)
            .post("/api/calendars/{id}/votes", ok);
        router
    }

    #[test]
    fn test_parse_pattern() {
        assert_eq!(
            parse_pattern("/api/calendars/{id}/votes"),
            vec![
                Segment::Static("api".to_string()),
                Segment::Static("calendars".to_string()),
                Segment::Param("id".to_string()),
                Segment::Static("votes".to_string()),
            ]
        );
    }

    #[test]
    fn test_static_match() {
        let router = router();
        match router.match_route(&Method::POST, "/api/calendars") {
            RouteMatch::Found { pattern, params, .. } => {
                assert_eq!(pattern, "/api/calendars");
                assert!(params.is_empty());
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn test_param_capture() {
        let router = router();
        match router.match_route(&Method::POST, "/api/calendars/abc/votes") {
            RouteMatch::Found { pattern, params, .. } => {
                assert_eq!(pattern, "/api/calendars/{id}/votes");
                assert_eq!(params.get("id"), Some("abc"));
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn test_param_percent_decoded() {
        let mut router = Router::new();
        router.get("/api/weather/{location}", ok);
        match router.match_route(&Method::GET, "/api/weather/San%20Francisco") {
            RouteMatch::Found { params, .. } => {
                assert_eq!(params.get("location"), Some("San Francisco"));
            }
            _ => panic!("expected a match"),
        }
        match router.match_route(&Method::GET, "/api/weather/%FF") {
            RouteMatch::Found { params, .. } => {
                assert_eq!(params.get("location"), Some("%FF"));
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let router = router();
        assert!(matches!(
            router.match_route(&Method::GET, "/api/calendars/"),
            RouteMatch::Found { .. }
        ));
    }

    #[test]
    fn test_method_not_allowed() {
        let router = router();
        match router.match_route(&Method::DELETE, "/api/calendars") {
            RouteMatch::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::GET, Method::POST]);
            }
            _ => panic!("expected 405"),
        }
    }

    #[test]
    fn test_not_found() {
        let router = router();
        assert!(matches!(
            router.match_route(&Method::GET, "/api/calendars/abc/missing"),
            RouteMatch::NotFound
        ));
        assert!(matches!(
            router.match_route(&Method::GET, "/"),
            RouteMatch::NotFound
        ));
    }

    #[test]
    fn test_len() {
        assert_eq!(router().len(), 4);
        assert!(Router::new().is_empty());
    }
}
