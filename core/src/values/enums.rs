use core::fmt;

use super::Value;

/// Integer types that can back an [`Enumeration`].
pub trait EnumRepr: Copy + PartialEq + fmt::Display + Send + Sync + 'static {
    fn to_i64(self) -> Option<i64>;
    fn to_u64(self) -> Option<u64>;
    fn from_i64(value: i64) -> Option<Self>;
    fn from_u64(value: u64) -> Option<Self>;
}

macro_rules! impl_enum_repr {
    ($($ty:ty),+) => {$(
        impl EnumRepr for $ty {
            fn to_i64(self) -> Option<i64> {
                i64::try_from(self).ok()
            }

            fn to_u64(self) -> Option<u64> {
                u64::try_from(self).ok()
            }

            fn from_i64(value: i64) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }

            fn from_u64(value: u64) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }
        }
    )+};
}

impl_enum_repr!(i8, i16, i32, i64, u8, u16, u32, u64);

/// A fieldless enum with named members and an integer representation.
///
/// Implement it with [`impl_enum_value!`](crate::impl_enum_value), which also
/// registers the enum as an inline [`Value`].
pub trait Enumeration: Value + Copy {
    type Repr: EnumRepr;

    fn members() -> &'static [(&'static str, Self)];

    fn to_repr(self) -> Self::Repr;

    /// The member with the given representation. Values that name no member
    /// are rejected.
    fn from_repr(repr: Self::Repr) -> Option<Self> {
        Self::members()
            .iter()
            .find(|(_, member)| member.to_repr() == repr)
            .map(|(_, member)| *member)
    }

    fn name(self) -> Option<&'static str> {
        let repr = self.to_repr();
        Self::members()
            .iter()
            .find(|(_, member)| member.to_repr() == repr)
            .map(|(name, _)| *name)
    }

    /// Parses a member name (ignoring ASCII case) or a numeric representation.
    fn parse_member(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some((_, member)) = Self::members()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
        {
            return Some(*member);
        }
        let repr = match text.parse::<i64>() {
            Ok(wide) => Self::Repr::from_i64(wide),
            Err(_) => text.parse::<u64>().ok().and_then(Self::Repr::from_u64),
        };
        repr.and_then(Self::from_repr)
    }
}

/// Implements [`Enumeration`] and [`Value`] for a fieldless `Copy` enum.
///
/// ```
/// use morph_core::{impl_enum_value, Variant};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red = 1, Green = 2 }
///
/// impl_enum_value!(Color: u8 { Red, Green });
///
/// assert_eq!(Variant::new(Color::Green).try_get::<i32>(), Some(2));
/// assert_eq!(Variant::from("red").try_get::<Color>(), Some(Color::Red));
/// ```
#[macro_export]
macro_rules! impl_enum_value {
    ($ty:ty : $repr:ty { $($member:ident),+ $(,)? }) => {
        impl $crate::Enumeration for $ty {
            type Repr = $repr;

            fn members() -> &'static [(&'static str, Self)] {
                &[$((stringify!($member), <$ty>::$member)),+]
            }

            fn to_repr(self) -> $repr {
                self as $repr
            }
        }

        impl $crate::Value for $ty {
            const KIND: $crate::ValueKind = $crate::ValueKind::Enum;

            fn shape() -> $crate::Shape<Self> {
                $crate::Shape::bits()
            }

            fn create_converter() -> ::std::boxed::Box<dyn $crate::Converter> {
                ::std::boxed::Box::new($crate::convert::EnumConverter::<Self>::new())
            }

            fn value_hash(&self, state: &mut dyn ::core::hash::Hasher) {
                state.write_u64(*self as $repr as u64);
            }

            fn fmt_value(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match $crate::Enumeration::name(*self) {
                    ::core::option::Option::Some(name) => f.write_str(name),
                    ::core::option::Option::None => {
                        ::core::fmt::Display::fmt(&$crate::Enumeration::to_repr(*self), f)
                    }
                }
            }
        }
    };
}

/// Implements [`Value`] for a type stored by reference.
///
/// The `parse` form additionally converts from strings through `FromStr`.
#[macro_export]
macro_rules! impl_value {
    ($ty:ty) => {
        impl $crate::Value for $ty {}
    };
    ($ty:ty, parse) => {
        impl $crate::Value for $ty {
            fn create_converter() -> ::std::boxed::Box<dyn $crate::Converter> {
                ::std::boxed::Box::new($crate::convert::ParseConverter::<Self>::new())
            }
        }
    };
}
