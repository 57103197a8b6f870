//! The bind pipeline.
//!
//! [`Binder`] collects up to four descriptors and fills them from one
//! request. Sources are always processed Body, Params, Query, Headers no
//! matter which order they were registered in, and the first failure stops
//! the pipeline.

use crate::coerce::CoercionError;
use crate::descriptor::{Bind, FieldSpec};
use crate::error::{BindingError, Phase, Source};
use crate::params::PathParams;
use crate::parts::RequestParts;
use crate::validate::{field_order, first_violation};
use http::header::HeaderName;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use validator::{Validate, ValidationErrors};

/// Binds request data into caller-owned descriptors.
///
/// Each descriptor is replaced only once its source has been decoded,
/// coerced and validated, so a descriptor is never left half-filled.
///
/// # Example
///
/// ```rust
/// use planner_bind::{Bind, Binder, RequestParts};
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Debug, Default, Deserialize, Validate)]
/// struct EchoBody {
///     #[validate(length(min = 1))]
///     message: String,
/// }
///
/// #[derive(Debug, Default, Bind, Validate)]
/// struct EchoQuery {
///     #[validate(required)]
///     name: Option<String>,
///     #[validate(range(min = 18, max = 99))]
///     age: Option<u32>,
/// }
///
/// let parts = RequestParts::builder()
///     .uri("/api/echo/1?name=Ada&age=36")
///     .body(r#"{"message":"hello"}"#)
///     .build();
///
/// let mut body = EchoBody::default();
/// let mut query = EchoQuery::default();
/// Binder::new(&parts).query(&mut query).body(&mut body).bind()?;
///
/// assert_eq!(body.message, "hello");
/// assert_eq!(query.name.as_deref(), Some("Ada"));
/// assert_eq!(query.age, Some(36));
/// # Ok::<(), planner_bind::BindingError>(())
/// ```
pub struct Binder<'r, 't> {
    parts: &'r RequestParts,
    body: Option<&'t mut dyn BodyTarget>,
    params: Option<&'t mut dyn FieldTarget>,
    query: Option<&'t mut dyn FieldTarget>,
    headers: Option<&'t mut dyn FieldTarget>,
}

impl<'r, 't> Binder<'r, 't> {
    /// Starts a bind over `parts` with no descriptors.
    pub fn new(parts: &'r RequestParts) -> Self {
        Self {
            parts,
            body: None,
            params: None,
            query: None,
            headers: None,
        }
    }

    /// Binds the JSON body into `target`.
    pub fn body<B>(mut self, target: &'t mut B) -> Self
    where
        B: DeserializeOwned + Validate + 't,
    {
        self.body = Some(target);
        self
    }

    /// Binds path parameters into `target`.
    pub fn params<P>(mut self, target: &'t mut P) -> Self
    where
        P: Bind + Validate + 't,
    {
        self.params = Some(target);
        self
    }

    /// Binds query parameters into `target`.
    pub fn query<Q>(mut self, target: &'t mut Q) -> Self
    where
        Q: Bind + Validate + 't,
    {
        self.query = Some(target);
        self
    }

    /// Binds headers into `target`.
    pub fn headers<H>(mut self, target: &'t mut H) -> Self
    where
        H: Bind + Validate + 't,
    {
        self.headers = Some(target);
        self
    }

    /// Runs the pipeline.
    pub fn bind(self) -> Result<(), BindingError> {
        let Self {
            parts,
            mut body,
            mut params,
            mut query,
            mut headers,
        } = self;

        for source in Source::ORDER {
            let outcome = match source {
                Source::Body => body.take().map(|target| target.bind_body(parts)),
                Source::Params => params
                    .take()
                    .map(|target| target.bind_fields(&Lookup::Params(parts.path_params()), source)),
                Source::Query => query
                    .take()
                    .map(|target| target.bind_fields(&Lookup::Query(parts.query_pairs()), source)),
                Source::Headers => headers
                    .take()
                    .map(|target| target.bind_fields(&Lookup::Headers(parts.headers()), source)),
            };
            if let Some(outcome) = outcome {
                outcome.map_err(log_failure)?;
            }
        }
        Ok(())
    }
}

fn log_failure(err: BindingError) -> BindingError {
    if err.phase() == Phase::Descriptor {
        tracing::error!(
            source = %err.source(),
            field = err.field().unwrap_or_default(),
            error = %err,
            "invalid binding descriptor"
        );
    } else {
        tracing::debug!(
            source = %err.source(),
            phase = %err.phase(),
            error = %err,
            "request binding failed"
        );
    }
    err
}

/// Decodes and validates a JSON body without going through a [`Binder`].
pub fn bind_body<T>(parts: &RequestParts) -> Result<T, BindingError>
where
    T: DeserializeOwned + Validate,
{
    let body = parts.body();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(BindingError::missing_body());
    }
    let value: T = serde_json::from_slice(body).map_err(BindingError::malformed_body)?;
    value
        .validate()
        .map_err(|errors| body_violation(&errors, field_order::<T>()))?;
    Ok(value)
}

fn body_violation(errors: &ValidationErrors, order: &[&str]) -> BindingError {
    match first_violation(errors, order) {
        Some(v) if v.path.is_empty() => BindingError::validation_general(Source::Body, v.reason),
        Some(v) => BindingError::validation(Source::Body, v.path, v.reason),
        None => BindingError::validation_general(Source::Body, errors),
    }
}

trait BodyTarget {
    fn bind_body(&mut self, parts: &RequestParts) -> Result<(), BindingError>;
}

impl<T: DeserializeOwned + Validate> BodyTarget for T {
    fn bind_body(&mut self, parts: &RequestParts) -> Result<(), BindingError> {
        *self = bind_body(parts)?;
        Ok(())
    }
}

trait FieldTarget {
    fn bind_fields(&mut self, lookup: &Lookup<'_>, source: Source) -> Result<(), BindingError>;
}

impl<T: Bind + Validate> FieldTarget for T {
    fn bind_fields(&mut self, lookup: &Lookup<'_>, source: Source) -> Result<(), BindingError> {
        *self = fill(lookup, source)?;
        Ok(())
    }
}

/// Raw string lookup for one non-body source.
enum Lookup<'a> {
    Params(&'a PathParams),
    Query(Vec<(String, String)>),
    Headers(&'a HeaderMap),
}

impl Lookup<'_> {
    /// Returns the first non-empty value for `key`.
    fn get(&self, key: &str) -> Result<Option<Cow<'_, str>>, CoercionError> {
        let raw = match self {
            Self::Params(params) => params.get(key).map(Cow::Borrowed),
            Self::Query(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| Cow::Borrowed(v.as_str())),
            Self::Headers(headers) => {
                let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
                    return Ok(None);
                };
                match headers.get(&name) {
                    Some(value) => Some(Cow::Borrowed(
                        std::str::from_utf8(value.as_bytes()).map_err(|_| CoercionError::Text)?,
                    )),
                    None => None,
                }
            }
        };
        Ok(raw.filter(|v| !v.is_empty()))
    }
}

fn check_keys<T>(source: Source, fields: &[FieldSpec<T>], keys: &[String]) -> Result<(), BindingError> {
    for (index, (field, key)) in fields.iter().zip(keys).enumerate() {
        if key.is_empty() {
            return Err(BindingError::descriptor(source, field.ident(), "empty lookup key"));
        }
        if source == Source::Headers && HeaderName::from_bytes(key.as_bytes()).is_err() {
            return Err(BindingError::descriptor(source, key.as_str(), "invalid header name"));
        }
        let duplicate = keys[..index].iter().any(|earlier| {
            if source == Source::Headers {
                earlier.eq_ignore_ascii_case(key)
            } else {
                earlier == key
            }
        });
        if duplicate {
            return Err(BindingError::descriptor(source, key.as_str(), "duplicate lookup key"));
        }
    }
    Ok(())
}

fn fill<T: Bind + Validate>(lookup: &Lookup<'_>, source: Source) -> Result<T, BindingError> {
    let fields = T::fields();
    let keys: Vec<String> = fields.iter().map(|f| f.lookup_key(source)).collect();
    check_keys(source, &fields, &keys)?;

    let mut target = T::default();
    for (field, key) in fields.iter().zip(&keys) {
        let raw = lookup
            .get(key)
            .map_err(|e| BindingError::coercion(source, key.as_str(), &e))?;
        let Some(raw) = raw else {
            continue;
        };
        field
            .assign(&mut target, &raw)
            .map_err(|e| BindingError::coercion(source, key.as_str(), &e))?;
    }

    if let Err(errors) = target.validate() {
        let order: Vec<&str> = fields.iter().map(FieldSpec::ident).collect();
        return Err(match first_violation(&errors, &order) {
            Some(v) if v.field.is_empty() => BindingError::validation_general(source, v.reason),
            Some(v) => {
                let name = match order.iter().position(|ident| *ident == v.field) {
                    Some(index) => format!("{}{}", keys[index], &v.path[v.field.len()..]),
                    None => v.path,
                };
                BindingError::validation(source, name, v.reason)
            }
            None => BindingError::validation_general(source, errors),
        });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Coerce;
    use serde::Deserialize;

    #[derive(Debug, Default, Validate)]
    struct Auth {
        #[validate(required)]
        authorization: Option<String>,
        request_id: Option<String>,
    }

    impl Bind for Auth {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new("authorization", |t: &mut Self, raw: &str| {
                    t.authorization = Coerce::coerce(raw)?;
                    Ok(())
                }),
                FieldSpec::new("request_id", |t: &mut Self, raw: &str| {
                    t.request_id = Coerce::coerce(raw)?;
                    Ok(())
                }),
            ]
        }
    }

    #[derive(Debug, Default, Validate)]
    struct Broken {
        a: Option<String>,
        b: Option<String>,
    }

    impl Bind for Broken {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new("a", |t: &mut Self, raw: &str| {
                    t.a = Coerce::coerce(raw)?;
                    Ok(())
                })
                .with_key("X-Thing"),
                FieldSpec::new("b", |t: &mut Self, raw: &str| {
                    t.b = Coerce::coerce(raw)?;
                    Ok(())
                })
                .with_key("x-thing"),
            ]
        }
    }

    #[derive(Debug, Default, Validate)]
    struct BadHeader {
        a: Option<String>,
    }

    impl Bind for BadHeader {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![FieldSpec::new("a", |t: &mut Self, raw: &str| {
                t.a = Coerce::coerce(raw)?;
                Ok(())
            })
            .with_key("not a header")]
        }
    }

    #[derive(Debug, Default, Deserialize, Validate)]
    struct Note {
        #[validate(length(min = 1))]
        text: String,
    }

    #[test]
    fn test_headers_default_keys() {
        let parts = RequestParts::builder()
            .header("authorization", "Bearer abc")
            .header("request-id", "r-1")
            .build();
        let mut auth = Auth::default();

        Binder::new(&parts).headers(&mut auth).bind().unwrap();

        assert_eq!(auth.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(auth.request_id.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_required_header_missing() {
        let parts = RequestParts::builder().build();
        let mut auth = Auth::default();

        let err = Binder::new(&parts).headers(&mut auth).bind().unwrap_err();

        assert_eq!(err.source(), Source::Headers);
        assert_eq!(err.phase(), Phase::Validate);
        assert_eq!(err.field(), Some("Authorization"));
        assert!(err.to_string().contains("required value missing"));
    }

    #[test]
    fn test_empty_header_value_is_absent() {
        let parts = RequestParts::builder().header("Authorization", "").build();
        let mut auth = Auth::default();

        let err = Binder::new(&parts).headers(&mut auth).bind().unwrap_err();

        assert_eq!(err.phase(), Phase::Validate);
    }

    #[test]
    fn test_duplicate_header_keys_are_descriptor_errors() {
        let parts = RequestParts::builder().build();
        let mut broken = Broken::default();

        let err = Binder::new(&parts).headers(&mut broken).bind().unwrap_err();

        assert_eq!(err.phase(), Phase::Descriptor);
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_keys_differ_by_case_for_query() {
        let parts = RequestParts::builder()
            .uri("/?X-Thing=1&x-thing=2")
            .build();
        let mut broken = Broken::default();

        Binder::new(&parts).query(&mut broken).bind().unwrap();

        assert_eq!(broken.a.as_deref(), Some("1"));
        assert_eq!(broken.b.as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_header_key() {
        let parts = RequestParts::builder().build();
        let mut bad = BadHeader::default();

        let err = Binder::new(&parts).headers(&mut bad).bind().unwrap_err();

        assert_eq!(err.phase(), Phase::Descriptor);
        assert_eq!(err.field(), Some("not a header"));
    }

    #[test]
    fn test_whitespace_body_is_missing() {
        let parts = RequestParts::builder().body("  \n").build();

        let err = bind_body::<Note>(&parts).unwrap_err();

        assert_eq!(err.to_string(), "missing request body");
    }

    #[test]
    fn test_body_descriptor_untouched_on_failure() {
        let parts = RequestParts::builder().body(r#"{"text":""}"#).build();
        let mut note = Note {
            text: "kept".to_string(),
        };

        let err = Binder::new(&parts).body(&mut note).bind().unwrap_err();

        assert_eq!(err.field(), Some("text"));
        assert_eq!(note.text, "kept");
    }
}
