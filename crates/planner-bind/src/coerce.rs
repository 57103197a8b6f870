//! Conversion of raw textual values into typed descriptor fields.
//!
//! Path segments, query values and header values all arrive as strings.
//! [`Coerce`] is implemented for every field type a descriptor may declare;
//! any other type fails to compile when used in a `#[derive(Bind)]` struct.

use thiserror::Error;

/// Error produced when a raw value cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// Not a base-10 signed integer, or out of range for the width.
    #[error("cannot parse as integer")]
    Integer,
    /// Not a base-10 unsigned integer, or out of range for the width.
    #[error("cannot parse as unsigned")]
    Unsigned,
    /// Not a decimal floating point number.
    #[error("cannot parse as float")]
    Float,
    /// Not one of the accepted boolean spellings.
    #[error("cannot parse as bool")]
    Bool,
    /// Raw bytes are not UTF-8 text.
    #[error("value is not valid UTF-8")]
    Text,
}

/// A field type that can be produced from a raw string.
///
/// # Example
///
/// ```rust
/// use planner_bind::{Coerce, CoercionError};
///
/// assert_eq!(i32::coerce("-42"), Ok(-42));
/// assert_eq!(u8::coerce("256"), Err(CoercionError::Unsigned));
/// assert_eq!(bool::coerce("T"), Ok(true));
/// assert_eq!(Option::<u16>::coerce("7"), Ok(Some(7)));
/// ```
pub trait Coerce: Sized {
    /// Converts the raw value.
    fn coerce(raw: &str) -> Result<Self, CoercionError>;
}

impl Coerce for String {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        Ok(raw.to_owned())
    }
}

macro_rules! coerce_parse {
    ($error:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Coerce for $ty {
                fn coerce(raw: &str) -> Result<Self, CoercionError> {
                    raw.parse::<$ty>().map_err(|_| $error)
                }
            }
        )+
    };
}

coerce_parse!(CoercionError::Integer => i8, i16, i32, i64, i128, isize);
coerce_parse!(CoercionError::Unsigned => u8, u16, u32, u64, u128, usize);
coerce_parse!(CoercionError::Float => f32, f64);

impl Coerce for bool {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(CoercionError::Bool),
        }
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        T::coerce(raw).map(Some)
    }
}
