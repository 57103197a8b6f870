//! End-to-end binding tests over all four sources.

use planner_bind::{Bind, Binder, Phase, RequestParts, Source};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
struct CalendarDraft {
    #[validate(length(min = 3))]
    title: String,
    #[serde(default)]
    #[validate(length(min = 1), custom(function = "planner_bind::validate::calendar_dates"))]
    dates: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
struct SlotBody {
    #[validate(custom(function = "planner_bind::validate::rfc3339"))]
    start_date: String,
}

#[derive(Debug, Default, Bind, Validate)]
struct AgeQuery {
    #[validate(range(min = 18, max = 99))]
    age: Option<i32>,
}

#[derive(Debug, Default, Bind, Validate)]
struct OptionalQuery {
    limit: Option<u32>,
    include_votes: Option<bool>,
}

#[derive(Debug, Default, Bind, Validate)]
struct RequiredQuery {
    #[validate(required)]
    name: Option<String>,
}

#[derive(Debug, Default, Bind, Validate)]
struct AuthHeaders {
    #[validate(required)]
    authorization: Option<String>,
}

#[derive(Debug, Default, Bind, Validate)]
struct IdParams {
    #[validate(required, custom(function = "planner_bind::validate::uuid"))]
    id: Option<String>,
}

#[derive(Debug, Default, Bind, Validate)]
struct MixedCaseQuery {
    #[allow(non_snake_case)]
    userId: Option<String>,
}

fn parts_with_body(body: &str) -> RequestParts {
    RequestParts::builder()
        .method(http::Method::POST)
        .uri("/api/calendars")
        .body(body.to_string())
        .build()
}

#[test]
fn test_body_success_populates_descriptor() {
    let parts = parts_with_body(r#"{"title": "Team Sync", "dates": ["2025-01-05"]}"#);
    let mut draft = CalendarDraft::default();

    Binder::new(&parts).body(&mut draft).bind().unwrap();

    assert_eq!(draft.title, "Team Sync");
    assert_eq!(draft.dates, vec!["2025-01-05".to_string()]);
}

#[test]
fn test_body_title_too_short() {
    let parts = parts_with_body(r#"{"title": "AB", "dates": ["2025-01-05"]}"#);
    let mut draft = CalendarDraft::default();

    let err = Binder::new(&parts).body(&mut draft).bind().unwrap_err();

    assert_eq!(err.source(), Source::Body);
    assert_eq!(err.phase(), Phase::Validate);
    assert_eq!(err.field(), Some("title"));
    assert_eq!(
        err.to_string(),
        "body validation failed: field 'title': length must be at least 3"
    );
}

#[test]
fn test_body_reports_first_declared_field() {
    let parts = parts_with_body(r#"{"title": "AB"}"#);
    let mut draft = CalendarDraft::default();

    let err = Binder::new(&parts).body(&mut draft).bind().unwrap_err();

    assert_eq!(err.field(), Some("title"));
    assert_eq!(
        err.to_string(),
        "body validation failed: field 'title': length must be at least 3"
    );
}

#[test]
fn test_body_bad_date_element() {
    let parts = parts_with_body(r#"{"title": "Team Sync", "dates": ["2025-01-05", "soon"]}"#);
    let mut draft = CalendarDraft::default();

    let err = Binder::new(&parts).body(&mut draft).bind().unwrap_err();

    assert_eq!(err.field(), Some("dates"));
    assert!(err.to_string().contains("YYYY-MM-DD"));
}

#[test]
fn test_missing_body() {
    let parts = parts_with_body("");
    let mut draft = CalendarDraft::default();

    let err = Binder::new(&parts).body(&mut draft).bind().unwrap_err();

    assert_eq!(err.phase(), Phase::Decode);
    assert_eq!(err.to_string(), "missing request body");
}

#[test]
fn test_malformed_body() {
    let parts = parts_with_body(r#"{"title": "#);
    let mut draft = CalendarDraft::default();

    let err = Binder::new(&parts).body(&mut draft).bind().unwrap_err();

    assert_eq!(err.source(), Source::Body);
    assert_eq!(err.phase(), Phase::Decode);
    assert!(err.to_string().starts_with("invalid JSON body: "));
}

#[test]
fn test_query_range_violation_after_coercion() {
    let parts = RequestParts::builder().uri("/?age=17").build();
    let mut query = AgeQuery::default();

    let err = Binder::new(&parts).query(&mut query).bind().unwrap_err();

    assert_eq!(err.source(), Source::Query);
    assert_eq!(err.phase(), Phase::Validate);
    assert_eq!(err.field(), Some("age"));
    assert!(err.to_string().contains("value must be between 18 and 99"));
    assert_eq!(query.age, None);
}

#[test]
fn test_query_not_an_integer() {
    let parts = RequestParts::builder().uri("/?age=abc").build();
    let mut query = AgeQuery::default();

    let err = Binder::new(&parts).query(&mut query).bind().unwrap_err();

    assert_eq!(err.phase(), Phase::Coerce);
    assert_eq!(
        err.to_string(),
        "invalid query params: field 'age': cannot parse as integer"
    );
}

#[test]
fn test_query_overflow_is_coercion_error() {
    let parts = RequestParts::builder().uri("/?age=99999999999").build();
    let mut query = AgeQuery::default();

    let err = Binder::new(&parts).query(&mut query).bind().unwrap_err();

    assert_eq!(err.phase(), Phase::Coerce);
}

#[test]
fn test_optional_absent_left_unset() {
    let parts = RequestParts::builder().uri("/api/calendars").build();
    let mut query = OptionalQuery {
        limit: Some(5),
        include_votes: Some(true),
    };

    Binder::new(&parts).query(&mut query).bind().unwrap();

    assert_eq!(query.limit, None);
    assert_eq!(query.include_votes, None);
}

#[test]
fn test_required_absent_names_source() {
    let parts = RequestParts::builder().uri("/?other=1").build();
    let mut query = RequiredQuery::default();

    let err = Binder::new(&parts).query(&mut query).bind().unwrap_err();

    assert_eq!(err.source(), Source::Query);
    assert!(err.to_string().starts_with("query params validation failed"));
    assert!(err.to_string().contains("required value missing"));
}

#[test]
fn test_missing_authorization_header() {
    let parts = RequestParts::builder().build();
    let mut headers = AuthHeaders::default();

    let err = Binder::new(&parts).headers(&mut headers).bind().unwrap_err();

    assert_eq!(err.source(), Source::Headers);
    assert_eq!(err.field(), Some("Authorization"));
    assert!(err.to_string().contains("required value missing"));
}

#[test]
fn test_header_lookup_ignores_case() {
    for name in ["authorization", "Authorization", "AUTHORIZATION"] {
        let parts = RequestParts::builder().header(name, "token-1").build();
        let mut headers = AuthHeaders::default();

        Binder::new(&parts).headers(&mut headers).bind().unwrap();

        assert_eq!(headers.authorization.as_deref(), Some("token-1"));
    }
}

#[test]
fn test_default_key_is_lowercased_ident() {
    let lower = RequestParts::builder().uri("/?userid=u-1").build();
    let exact = RequestParts::builder().uri("/?userId=u-1").build();
    let mut query = MixedCaseQuery::default();

    Binder::new(&lower).query(&mut query).bind().unwrap();
    assert_eq!(query.userId.as_deref(), Some("u-1"));

    Binder::new(&exact).query(&mut query).bind().unwrap();
    assert_eq!(query.userId, None);
}

#[test]
fn test_rfc3339_accepted_and_rejected() {
    let ok = parts_with_body(r#"{"start_date": "2025-01-05T10:00:00Z"}"#);
    let bad = parts_with_body(r#"{"start_date": "2025-01-05"}"#);
    let mut slot = SlotBody::default();

    Binder::new(&ok).body(&mut slot).bind().unwrap();
    assert_eq!(slot.start_date, "2025-01-05T10:00:00Z");

    let err = Binder::new(&bad).body(&mut slot).bind().unwrap_err();
    assert_eq!(err.field(), Some("start_date"));
    assert!(err.to_string().contains("does not match RFC3339 format"));
}

#[test]
fn test_body_error_wins_over_query_error() {
    let parts = RequestParts::builder()
        .method(http::Method::POST)
        .uri("/api/calendars?age=abc")
        .body("not json")
        .build();
    let mut draft = CalendarDraft::default();
    let mut query = AgeQuery::default();

    // Registration order does not change processing order.
    let err = Binder::new(&parts)
        .query(&mut query)
        .body(&mut draft)
        .bind()
        .unwrap_err();

    assert_eq!(err.source(), Source::Body);
    assert_eq!(err.phase(), Phase::Decode);
}

#[test]
fn test_later_sources_untouched_after_failure() {
    let parts = RequestParts::builder()
        .uri("/api/calendars/not-a-uuid?name=Ada")
        .path_param("id", "not-a-uuid")
        .build();
    let mut params = IdParams::default();
    let mut query = RequiredQuery::default();

    let err = Binder::new(&parts)
        .params(&mut params)
        .query(&mut query)
        .bind()
        .unwrap_err();

    assert_eq!(err.source(), Source::Params);
    assert_eq!(err.field(), Some("id"));
    assert_eq!(query.name, None);
}

#[test]
fn test_all_sources_together() {
    let parts = RequestParts::builder()
        .method(http::Method::POST)
        .uri("/api/echo/0b5b4a44-5a43-4a53-9a9c-2f6a4e1b8d11?name=Ada&age=30")
        .path_param("id", "0b5b4a44-5a43-4a53-9a9c-2f6a4e1b8d11")
        .header("Authorization", "Bearer t")
        .body(r#"{"title": "Retro", "dates": ["2025-03-01"]}"#)
        .build();
    let mut draft = CalendarDraft::default();
    let mut params = IdParams::default();
    let mut query = AgeQuery::default();
    let mut headers = AuthHeaders::default();

    Binder::new(&parts)
        .headers(&mut headers)
        .query(&mut query)
        .params(&mut params)
        .body(&mut draft)
        .bind()
        .unwrap();

    assert_eq!(draft.title, "Retro");
    assert_eq!(
        params.id.as_deref(),
        Some("0b5b4a44-5a43-4a53-9a9c-2f6a4e1b8d11")
    );
    assert_eq!(query.age, Some(30));
    assert_eq!(headers.authorization.as_deref(), Some("Bearer t"));
}
