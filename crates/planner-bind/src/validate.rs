//! Constraint checking on top of the `validator` crate.
//!
//! Descriptors declare constraints with `#[derive(Validate)]`. This module
//! supplies the format validators the handlers need (`rfc3339`,
//! `calendar_date`, `calendar_dates`, `uuid`) and reduces a
//! [`ValidationErrors`] tree to the single violation the binder reports.
//!
//! ```rust
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct Slot {
//!     #[validate(custom(function = "planner_bind::validate::rfc3339"))]
//!     start_date: String,
//! }
//!
//! let ok = Slot { start_date: "2025-01-05T10:00:00Z".into() };
//! let bad = Slot { start_date: "2025-01-05".into() };
//! assert!(ok.validate().is_ok());
//! assert!(bad.validate().is_err());
//! ```

use chrono::{DateTime, NaiveDate};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde_json::Value;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Key `validator` uses for struct-level (schema) errors.
const STRUCT_LEVEL: &str = "__all__";

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// The value must be an RFC 3339 timestamp such as `2025-01-05T10:00:00Z`.
pub fn rfc3339(value: &str) -> Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| invalid("rfc3339", "does not match RFC3339 format"))
}

/// The value must be a calendar date in `YYYY-MM-DD` form.
pub fn calendar_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid("calendar_date", "does not match YYYY-MM-DD format"))
}

/// Every element must be a calendar date in `YYYY-MM-DD` form.
pub fn calendar_dates(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|v| calendar_date(v))
}

/// The value must be a UUID.
pub fn uuid(value: &str) -> Result<(), ValidationError> {
    ::uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| invalid("uuid", "must be a valid UUID"))
}

/// Every element must be a UUID.
pub fn uuids(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|v| uuid(v))
}

/// A single reported constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Top-level field identifier as known to `validator`; empty for
    /// struct-level checks.
    pub field: String,
    /// Full path, e.g. `time_slots[0].end_date`.
    pub path: String,
    /// Human-readable reason.
    pub reason: String,
}

/// One step of a violation path. Indices compare as numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Step {
    Index(usize),
    Name(String),
}

struct Entry<'a> {
    field: String,
    path: String,
    steps: Vec<Step>,
    error: &'a ValidationError,
}

struct Prefix<'p> {
    field: &'p str,
    path: &'p str,
    steps: &'p [Step],
}

fn collect<'a>(errors: &'a ValidationErrors, prefix: Option<&Prefix<'_>>, out: &mut Vec<Entry<'a>>) {
    for (key, kind) in errors.errors() {
        let key = key.to_string();
        let (field, path, steps) = match prefix {
            Some(p) if key == STRUCT_LEVEL => (p.field.to_string(), p.path.to_string(), p.steps.to_vec()),
            Some(p) => {
                let mut steps = p.steps.to_vec();
                steps.push(Step::Name(key.clone()));
                (p.field.to_string(), format!("{}.{key}", p.path), steps)
            }
            None if key == STRUCT_LEVEL => (String::new(), String::new(), Vec::new()),
            None => (key.clone(), key.clone(), vec![Step::Name(key.clone())]),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| Entry {
                    field: field.clone(),
                    path: path.clone(),
                    steps: steps.clone(),
                    error,
                }));
            }
            ValidationErrorsKind::Struct(inner) => {
                let prefix = Prefix {
                    field: &field,
                    path: &path,
                    steps: &steps,
                };
                collect(inner, Some(&prefix), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let item_path = format!("{path}[{index}]");
                    let mut item_steps = steps.clone();
                    item_steps.push(Step::Index(*index));
                    let prefix = Prefix {
                        field: &field,
                        path: &item_path,
                        steps: &item_steps,
                    };
                    collect(inner, Some(&prefix), out);
                }
            }
        }
    }
}

/// Picks the first violation out of `errors`.
///
/// Fields listed in `order` come first, in that order; everything else
/// follows by path, with list indices compared numerically. Violations on
/// the same path keep the order `validator` reported them in.
pub fn first_violation(errors: &ValidationErrors, order: &[&str]) -> Option<Violation> {
    let mut entries = Vec::new();
    collect(errors, None, &mut entries);

    let rank = |field: &str| {
        order
            .iter()
            .position(|ident| *ident == field)
            .unwrap_or(order.len())
    };
    entries.sort_by(|a, b| {
        rank(&a.field)
            .cmp(&rank(&b.field))
            .then_with(|| a.steps.cmp(&b.steps))
    });

    entries.into_iter().next().map(|entry| Violation {
        reason: describe(entry.error),
        field: entry.field,
        path: entry.path,
    })
}

/// Records the field names a `Deserialize` struct declares.
struct FieldNames<'a>(&'a mut &'static [&'static str]);

impl<'de> Deserializer<'de> for FieldNames<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.0 = fields;
        Err(de::Error::custom("field names recorded"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Field names of `T` in declaration order, as serde sees them.
///
/// Empty for anything that does not deserialize as a plain struct, such as
/// sequences, maps or structs with flattened fields.
pub fn field_order<T: DeserializeOwned>() -> &'static [&'static str] {
    let mut fields: &'static [&'static str] = &[];
    // The deserializer always fails once it has seen the field list.
    let _ = T::deserialize(FieldNames(&mut fields));
    fields
}

fn render(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turns a `validator` error into a client-facing reason.
pub fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(render);

    match &*error.code {
        "required" => "required value missing".to_string(),
        "length" => match (param("equal"), param("min"), param("max")) {
            (Some(equal), _, _) => format!("length must be exactly {equal}"),
            (None, Some(min), Some(max)) => format!("length must be between {min} and {max}"),
            (None, Some(min), None) => format!("length must be at least {min}"),
            (None, None, Some(max)) => format!("length must be at most {max}"),
            (None, None, None) => "invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("value must be between {min} and {max}"),
            (Some(min), None) => format!("value must be at least {min}"),
            (None, Some(max)) => format!("value must be at most {max}"),
            (None, None) => "value out of range".to_string(),
        },
        "email" => "must be a valid email address".to_string(),
        "url" => "must be a valid URL".to_string(),
        code => format!("failed '{code}' constraint"),
    }
}
