//! [`Value`] for the built-in types.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use rust_decimal::Decimal;

use super::{Shape, Value};
use crate::convert::{
    BoolConverter, CharConverter, Converter, Decimal64Converter, DecimalConverter,
    DurationConverter, F32Converter, F64Converter, I64Converter, IntConverter, NullableConverter,
    SharedConverter, StringConverter, TimeConverter, U64Converter, format_duration, format_time,
};
use crate::decimal::Decimal64;
use crate::types::ValueKind;

macro_rules! inline_value {
    ($($ty:ty => $kind:ident, $converter:expr;)+) => {$(
        impl Value for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn shape() -> Shape<Self> {
                Shape::bits()
            }

            fn create_converter() -> Box<dyn Converter> {
                Box::new($converter)
            }

            fn value_hash(&self, mut state: &mut dyn Hasher) {
                self.hash(&mut state);
            }

            fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    )+};
}

inline_value! {
    bool => Bool, BoolConverter;
    char => Char, CharConverter;
    i8 => Int8, IntConverter::<i8>::new();
    i16 => Int16, IntConverter::<i16>::new();
    i32 => Int32, IntConverter::<i32>::new();
    i64 => Int64, I64Converter;
    u8 => UInt8, IntConverter::<u8>::new();
    u16 => UInt16, IntConverter::<u16>::new();
    u32 => UInt32, IntConverter::<u32>::new();
    u64 => UInt64, U64Converter;
    Decimal64 => Decimal64, Decimal64Converter;
}

macro_rules! float_value {
    ($($ty:ty => $kind:ident, $converter:expr;)+) => {$(
        impl Value for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn shape() -> Shape<Self> {
                Shape::bits()
            }

            fn create_converter() -> Box<dyn Converter> {
                Box::new($converter)
            }

            // Identical bits or numeric equality, so NaN equals itself and
            // the two zeros are equal.
            fn value_eq(&self, other: &Self) -> bool {
                self.to_bits() == other.to_bits() || self == other
            }

            fn value_hash(&self, state: &mut dyn Hasher) {
                let bits = if *self == 0.0 { 0 } else { self.to_bits() as u64 };
                state.write_u64(bits);
            }

            fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    )+};
}

float_value! {
    f32 => Float32, F32Converter;
    f64 => Float64, F64Converter;
}

impl Value for Decimal {
    const KIND: ValueKind = ValueKind::Decimal;

    fn shape() -> Shape<Self> {
        Shape::decimal()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(DecimalConverter)
    }

    fn value_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Value for String {
    const KIND: ValueKind = ValueKind::String;

    fn create_converter() -> Box<dyn Converter> {
        Box::new(StringConverter)
    }

    fn value_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// String literals fit inline as a fat pointer.
impl Value for &'static str {
    const KIND: ValueKind = ValueKind::String;

    fn shape() -> Shape<Self> {
        Shape::bits()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(StringConverter)
    }

    fn value_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl Value for Duration {
    const KIND: ValueKind = ValueKind::Duration;

    fn shape() -> Shape<Self> {
        Shape::bits()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(DurationConverter)
    }

    fn value_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(*self))
    }
}

impl Value for SystemTime {
    const KIND: ValueKind = ValueKind::Time;

    fn shape() -> Shape<Self> {
        Shape::bits()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(TimeConverter)
    }

    fn value_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    /// Times without an RFC 3339 form print in their debug form.
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_time(*self) {
            Some(text) => f.write_str(&text),
            None => fmt::Debug::fmt(self, f),
        }
    }
}

impl<T: Value> Value for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn shape() -> Shape<Self> {
        Shape::nullable()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(NullableConverter::<T>::new())
    }

    fn value_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.value_eq(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn value_hash(&self, state: &mut dyn Hasher) {
        match self {
            Some(value) => {
                state.write_u8(1);
                value.value_hash(state);
            }
            None => state.write_u8(0),
        }
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(value) => value.fmt_value(f),
            None => Ok(()),
        }
    }
}

impl<T: Value> Value for Arc<T> {
    const KIND: ValueKind = T::KIND;

    fn shape() -> Shape<Self> {
        Shape::wrapper()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(SharedConverter::<T>::new())
    }

    fn value_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).value_eq(other)
    }

    fn value_hash(&self, state: &mut dyn Hasher) {
        (**self).value_hash(state);
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt_value(f)
    }
}
