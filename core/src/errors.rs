//! Errors raised at the explicit edges of the API.
//!
//! Probing operations (`try_get`, `try_convert`, `can_get`, `try_create`)
//! report failure with `None`/`false` and never build an [`Error`]. Only the
//! operations that promise a value (`get`, `convert`, the `TryFrom` casts and
//! the `get_*` union accessors) turn that soft failure into an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No conversion exists from the stored or source type to the requested one.
    #[error("cannot convert {from} to {to}")]
    InvalidCast {
        from: &'static str,
        to: &'static str,
    },

    /// The value lies outside the range of a bounded value type.
    #[error("value out of range for Decimal64 (mantissa {mantissa}, scale {scale})")]
    Overflow { mantissa: i128, scale: u32 },
}

impl Error {
    pub(crate) fn invalid_cast<T: ?Sized + 'static>(from: &'static str) -> Self {
        Error::InvalidCast {
            from,
            to: core::any::type_name::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cast_message() {
        let err = Error::invalid_cast::<i32>("alloc::string::String");
        assert_eq!(err.to_string(), "cannot convert alloc::string::String to i32");
    }

    #[test]
    fn test_overflow_message() {
        let err = Error::Overflow {
            mantissa: 1 << 60,
            scale: 2,
        };
        assert!(err.to_string().contains("Decimal64"));
    }
}
