//! Derive macros for meeting planner request descriptors.
//!
//! `#[derive(Bind)]` turns a plain struct into a params, query or header
//! descriptor for `planner_bind::Binder`. For every named field it emits an
//! entry in `Bind::fields()`: the field identifier, an optional explicit key
//! and a coercion function built on `planner_bind::Coerce`.
//!
//! # Example
//!
//! ```rust,ignore
//! use planner_bind::Bind;
//! use validator::Validate;
//!
//! #[derive(Debug, Default, Bind, Validate)]
//! struct EchoHeaders {
//!     #[bind(key = "Authorization")]
//!     #[validate(required)]
//!     auth_token: Option<String>,
//! }
//! ```
//!
//! # Compile-time checks
//!
//! - Only structs with named fields can derive `Bind`.
//! - Every bound field type must implement `Coerce`; anything else is a
//!   type error pointing at the field.
//! - Explicit keys must be non-empty string literals and unique.

mod bind;
mod parse;

use proc_macro::TokenStream;

/// Derives `planner_bind::Bind`.
///
/// # Attributes
///
/// - `#[bind(key = "...")]`: look the field up under this key instead of the
///   one derived from its identifier.
/// - `#[bind(skip)]`: never bind this field; it keeps its `Default` value.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl ::planner_bind::Bind for EchoHeaders {
///     fn fields() -> Vec<::planner_bind::FieldSpec<Self>> {
///         vec![
///             ::planner_bind::FieldSpec::new("auth_token", |target: &mut Self, raw: &str| {
///                 target.auth_token = <Option<String> as ::planner_bind::Coerce>::coerce(raw)?;
///                 Ok(())
///             })
///             .with_key("Authorization"),
///         ]
///     }
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    bind::expand_bind(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
