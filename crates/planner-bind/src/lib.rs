//! # Planner Bind
//!
//! Typed request binding for the meeting planner backend.
//!
//! Every handler describes what it needs from a request as up to four plain
//! structs (descriptors) and hands them to a [`Binder`]. The binder fills them
//! from the request and checks their declared constraints, failing fast with
//! a single [`BindingError`].
//!
//! ## Sources
//!
//! | Source | Descriptor bound | Lookup |
//! |--------|------------------|--------|
//! | Body | `Deserialize + Validate` | JSON decode of the whole body |
//! | Params | `Bind + Validate` | path segment captured by `{name}` |
//! | Query | `Bind + Validate` | first value of the query key |
//! | Headers | `Bind + Validate` | case-insensitive header name |
//!
//! Sources are processed in exactly that order. A failure in one source
//! means later sources are never looked at.
//!
//! ## Keys
//!
//! A params or query field is looked up by its lowercased identifier, a
//! header field by the canonical header form of its identifier
//! (`x_request_id` becomes `X-Request-Id`). `#[bind(key = "...")]` overrides
//! either. Absent and empty values leave the field at its default.
//!
//! ## Example
//!
//! ```rust
//! use planner_bind::{Bind, Binder, Phase, RequestParts, Source};
//! use validator::Validate;
//!
//! #[derive(Debug, Default, Bind, Validate)]
//! struct AuthHeaders {
//!     #[validate(required)]
//!     authorization: Option<String>,
//! }
//!
//! let parts = RequestParts::builder().build();
//! let mut headers = AuthHeaders::default();
//!
//! let err = Binder::new(&parts).headers(&mut headers).bind().unwrap_err();
//! assert_eq!(err.source(), Source::Headers);
//! assert_eq!(err.phase(), Phase::Validate);
//! assert_eq!(
//!     err.to_string(),
//!     "headers validation failed: field 'Authorization': required value missing"
//! );
//! ```
//!
//! ## Errors
//!
//! | Phase | Cause | Status |
//! |-------|-------|--------|
//! | `Decode` | body missing or not JSON | 400 |
//! | `Coerce` | value present but not convertible | 400 |
//! | `Validate` | first violated constraint | 400 |
//! | `Descriptor` | invalid or duplicate key in a descriptor | 500 |

#![doc(html_root_url = "https://docs.rs/planner-bind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

extern crate self as planner_bind;

mod binder;
mod coerce;
mod descriptor;
mod error;
mod params;
mod parts;
pub mod validate;

pub use binder::{bind_body, Binder};
pub use coerce::{Coerce, CoercionError};
pub use descriptor::{canonical_header_key, default_key, AssignFn, Bind, FieldSpec};
pub use error::{BindingError, Phase, Source};
pub use params::PathParams;
pub use parts::{RequestParts, RequestPartsBuilder};

/// Derives [`Bind`] for a struct with named fields.
///
/// Field attributes:
///
/// - `#[bind(key = "X-Api-Key")]` looks the field up under an explicit key.
/// - `#[bind(skip)]` leaves the field out of binding entirely.
pub use planner_macros::Bind;
