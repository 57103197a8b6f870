//! Field tables for params, query and header descriptors.
//!
//! A descriptor is a plain struct. [`Bind`] lists its fields as
//! [`FieldSpec`]s: the Rust identifier, an optional explicit lookup key and a
//! function that coerces a raw string into the field. `#[derive(Bind)]`
//! generates the table; it can also be written by hand.
//!
//! ```rust
//! use planner_bind::{Bind, Coerce, FieldSpec};
//!
//! #[derive(Default)]
//! struct Paging {
//!     limit: Option<u32>,
//! }
//!
//! impl Bind for Paging {
//!     fn fields() -> Vec<FieldSpec<Self>> {
//!         vec![FieldSpec::new("limit", |target: &mut Self, raw: &str| {
//!             target.limit = Coerce::coerce(raw)?;
//!             Ok(())
//!         })]
//!     }
//! }
//!
//! assert_eq!(Paging::fields()[0].ident(), "limit");
//! ```

use crate::coerce::CoercionError;
use crate::error::Source;
use std::fmt;

/// Coerces a raw value into one field of `T`.
pub type AssignFn<T> = fn(&mut T, &str) -> Result<(), CoercionError>;

/// One bindable field of a descriptor.
pub struct FieldSpec<T> {
    ident: &'static str,
    key: Option<&'static str>,
    assign: AssignFn<T>,
}

impl<T> FieldSpec<T> {
    /// Creates a field whose key is derived from `ident`.
    pub fn new(ident: &'static str, assign: AssignFn<T>) -> Self {
        Self {
            ident,
            key: None,
            assign,
        }
    }

    /// Overrides the derived lookup key.
    pub fn with_key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    /// Returns the Rust identifier of the field.
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// Returns the explicit key, if one was declared.
    pub fn explicit_key(&self) -> Option<&'static str> {
        self.key
    }

    /// Returns the key used to look the field up in `source`.
    pub fn lookup_key(&self, source: Source) -> String {
        match self.key {
            Some(key) => key.to_string(),
            None => default_key(self.ident, source),
        }
    }

    /// Coerces `raw` and stores it in `target`.
    pub fn assign(&self, target: &mut T, raw: &str) -> Result<(), CoercionError> {
        (self.assign)(target, raw)
    }
}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("ident", &self.ident)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A struct the binder can fill from params, query or headers.
///
/// `Default` provides the "unset" value of every field before binding.
pub trait Bind: Default {
    /// Returns the bindable fields in declaration order.
    fn fields() -> Vec<FieldSpec<Self>>;
}

/// Derives the lookup key for a field without an explicit key.
///
/// Params and query use the lowercased identifier; headers use canonical
/// header casing with underscores turned into dashes.
///
/// ```rust
/// use planner_bind::{default_key, Source};
///
/// assert_eq!(default_key("UserId", Source::Query), "userid");
/// assert_eq!(default_key("x_request_id", Source::Headers), "X-Request-Id");
/// ```
pub fn default_key(ident: &str, source: Source) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    match source {
        Source::Headers => canonical_header_key(&ident.replace('_', "-")),
        Source::Body | Source::Params | Source::Query => ident.to_lowercase(),
    }
}

/// Canonical MIME header casing: first letter and every letter after a dash
/// uppercased, the rest lowercased.
///
/// ```rust
/// use planner_bind::canonical_header_key;
///
/// assert_eq!(canonical_header_key("content-TYPE"), "Content-Type");
/// assert_eq!(canonical_header_key("authorization"), "Authorization");
/// ```
pub fn canonical_header_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Coerce;

    #[derive(Debug, Default)]
    struct Filter {
        days: Option<u8>,
        city: String,
    }

    impl Bind for Filter {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new("days", |t: &mut Self, raw: &str| {
                    t.days = Coerce::coerce(raw)?;
                    Ok(())
                }),
                FieldSpec::new("city", |t: &mut Self, raw: &str| {
                    t.city = Coerce::coerce(raw)?;
                    Ok(())
                })
                .with_key("location"),
            ]
        }
    }

    #[test]
    fn test_default_key_lowercases() {
        assert_eq!(default_key("Age", Source::Query), "age");
        assert_eq!(default_key("user_id", Source::Params), "user_id");
        assert_eq!(default_key("r#type", Source::Query), "type");
    }

    #[test]
    fn test_default_header_key() {
        assert_eq!(default_key("authorization", Source::Headers), "Authorization");
        assert_eq!(default_key("x_request_id", Source::Headers), "X-Request-Id");
        assert_eq!(default_key("ETAG", Source::Headers), "Etag");
    }

    #[test]
    fn test_canonical_header_key() {
        assert_eq!(canonical_header_key("x-forwarded-for"), "X-Forwarded-For");
        assert_eq!(canonical_header_key("AUTHORIZATION"), "Authorization");
        assert_eq!(canonical_header_key(""), "");
    }

    #[test]
    fn test_field_spec_lookup_key() {
        let fields = Filter::fields();

        assert_eq!(fields[0].lookup_key(Source::Query), "days");
        assert_eq!(fields[1].lookup_key(Source::Query), "location");
        assert_eq!(fields[1].explicit_key(), Some("location"));
    }

    #[test]
    fn test_field_spec_assign() {
        let fields = Filter::fields();
        let mut filter = Filter::default();

        fields[0].assign(&mut filter, "3").unwrap();
        fields[1].assign(&mut filter, "oslo").unwrap();

        assert_eq!(filter.days, Some(3));
        assert_eq!(filter.city, "oslo");
        assert_eq!(
            fields[0].assign(&mut filter, "300"),
            Err(CoercionError::Unsigned)
        );
    }
}
