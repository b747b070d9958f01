//! The [`Variant`] cell.
//!
//! A variant holds one value of any [`Value`] type, or nothing. Small `Copy`
//! values (primitives, enums, compact decimals, short plain structs) are
//! copied into the cell's inline buffer. Single-pointer wrappers keep their
//! pointer. Everything else is shared behind an `Arc`. Which of these a type
//! gets is decided once, by the encoding registry.
//!
//! The null cell holds no value: it has no type, equals only itself, and
//! refuses every extraction.

pub mod encoding;
pub mod raw;
pub mod registry;

#[cfg(test)]
mod encoding_test;
#[cfg(test)]
mod variant_test;

use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem::size_of;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use rust_decimal::Decimal;
use static_assertions::const_assert;

pub use encoding::{Encoding, TypedEncoding};
pub use raw::RawBits;
pub use registry::EncodingId;

use crate::convert::{Converter, UnionConverter, convert_dyn};
use crate::decimal::Decimal64;
use crate::errors::Error;
use crate::types::{TypeInfo, ValueKind};
use crate::union::{CaseValue, ConstructibleUnion, TypeUnion};
use crate::values::{DynValue, Shape, Value};

/// What the cell's inline buffer is paired with.
#[derive(Clone)]
pub(crate) enum Slot {
    Null,
    /// The buffer holds a value packed by this encoding.
    Encoded(&'static dyn Encoding),
    /// A shared value; the buffer is unused.
    Object(Arc<dyn DynValue>),
    /// A wrapper's pointer; the buffer holds the wrapper's encoding id.
    Wrapped(Arc<dyn Any + Send + Sync>),
}

/// How a cell stores its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    Null,
    /// Copied into the inline buffer.
    Inline,
    /// A wrapper pointer stored by identity.
    Wrapped,
    /// Shared behind an `Arc`.
    Boxed,
}

#[derive(Clone)]
pub struct Variant {
    slot: Slot,
    bits: RawBits,
}

const_assert!(size_of::<Variant>() <= 48);

impl Variant {
    /// The cell that holds no value.
    pub const NULL: Variant = Variant {
        slot: Slot::Null,
        bits: RawBits::ZERO,
    };

    /// Stores `value` using its type's registered encoding.
    pub fn new<T: Value>(value: T) -> Self {
        registry::encoding::<T>().encode(value)
    }

    pub(crate) fn from_parts(slot: Slot, bits: RawBits) -> Self {
        Variant { slot, bits }
    }

    pub(crate) fn boxed<T: Value>(value: T) -> Self {
        Variant {
            slot: Slot::Object(Arc::new(value)),
            bits: RawBits::ZERO,
        }
    }

    pub(crate) fn slot(&self) -> &Slot {
        &self.slot
    }

    pub(crate) fn bits(&self) -> &RawBits {
        &self.bits
    }

    pub fn is_null(&self) -> bool {
        matches!(self.slot, Slot::Null)
    }

    pub fn storage(&self) -> Storage {
        match self.slot {
            Slot::Null => Storage::Null,
            Slot::Encoded(_) => Storage::Inline,
            Slot::Wrapped(_) => Storage::Wrapped,
            Slot::Object(_) => Storage::Boxed,
        }
    }

    /// The encoding the payload is stored under, or `None` for the null cell.
    pub fn encoding(&self) -> Option<&'static dyn Encoding> {
        match &self.slot {
            Slot::Null => None,
            Slot::Encoded(encoding) => Some(*encoding),
            Slot::Object(object) => object.storage_encoding(),
            Slot::Wrapped(_) => EncodingId::from_bits(self.bits.uint()).and_then(registry::by_id),
        }
    }

    /// The runtime type of the stored value; [`TypeInfo::unknown`] for null.
    pub fn type_info(&self) -> TypeInfo {
        match &self.slot {
            Slot::Null => TypeInfo::unknown(),
            Slot::Object(object) => object.type_info(),
            _ => self
                .encoding()
                .map_or_else(TypeInfo::unknown, |encoding| encoding.runtime_type(self)),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match &self.slot {
            Slot::Null => ValueKind::Null,
            Slot::Object(object) => object.kind(),
            _ => self
                .encoding()
                .map_or(ValueKind::Object, |encoding| encoding.kind()),
        }
    }

    /// Materializes the stored value.
    pub fn decode(&self) -> Option<Box<dyn DynValue>> {
        match &self.slot {
            Slot::Null => None,
            Slot::Object(object) => Some(object.clone_box()),
            _ => self.encoding()?.decode(self),
        }
    }

    /// Hands the stored value to `f` without materializing it.
    pub(crate) fn visit(&self, f: &mut dyn FnMut(&dyn DynValue) -> bool) -> bool {
        match &self.slot {
            Slot::Null => false,
            Slot::Object(object) => f(&**object),
            _ => self
                .encoding()
                .is_some_and(|encoding| encoding.visit(self, f)),
        }
    }

    /// Extracts the value as a `T`.
    ///
    /// Tries, in order: an exact decode through `T`'s own encoding, a direct
    /// downcast of a shared value, then the conversion engine applied to the
    /// stored value. The null cell yields `None` for every `T`.
    pub fn try_get<T: Value>(&self) -> Option<T> {
        if self.is_null() {
            return None;
        }
        if let Some(value) = registry::encoding::<T>().decode_exact(self) {
            return Some(value);
        }
        if let Slot::Object(object) = &self.slot {
            if let Some(value) = object.downcast_ref::<T>() {
                return Some(value.clone());
            }
        }
        let mut out = None;
        self.visit(&mut |value| {
            out = convert_dyn::<T>(value);
            out.is_some()
        });
        out
    }

    pub fn get<T: Value>(&self) -> Result<T, Error> {
        self.try_get()
            .ok_or_else(|| Error::invalid_cast::<T>(self.type_info().name()))
    }

    pub fn can_get<T: Value>(&self) -> bool {
        self.try_get::<T>().is_some()
    }

    // ------------------------------------------------------------------------
    // Typed views. Each yields the type's default when the value cannot be
    // converted.
    // ------------------------------------------------------------------------

    pub fn bool_value(&self) -> bool {
        self.try_get().unwrap_or_default()
    }

    pub fn i32_value(&self) -> i32 {
        self.try_get().unwrap_or_default()
    }

    pub fn i64_value(&self) -> i64 {
        self.try_get().unwrap_or_default()
    }

    pub fn u64_value(&self) -> u64 {
        self.try_get().unwrap_or_default()
    }

    pub fn f64_value(&self) -> f64 {
        self.try_get().unwrap_or_default()
    }

    pub fn decimal_value(&self) -> Decimal {
        self.try_get().unwrap_or_default()
    }

    pub fn string_value(&self) -> String {
        self.try_get().unwrap_or_default()
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::NULL
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (false, false) => {
                self.visit(&mut |mine| other.visit(&mut |theirs| mine.dyn_eq(theirs)))
            }
            _ => false,
        }
    }
}

impl Eq for Variant {}

impl Hash for Variant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let state: &mut dyn Hasher = state;
        if !self.visit(&mut |value| {
            value.dyn_hash(state);
            true
        }) {
            state.write_u8(0);
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.visit(&mut |value| {
            result = value.dyn_fmt(f);
            true
        });
        result
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Variant(null)");
        }
        write!(f, "Variant({}: {})", self.type_info(), self)
    }
}

// ============================================================================
// The cell as a value and as an open union
// ============================================================================

impl Value for Variant {
    const KIND: ValueKind = ValueKind::Union;

    fn shape() -> Shape<Self> {
        Shape::variant()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(UnionConverter::<Variant>::open())
    }

    fn value_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl TypeUnion for Variant {
    fn case_type(&self) -> TypeInfo {
        Variant::type_info(self)
    }

    fn case_value(&self) -> Option<CaseValue<'_>> {
        match &self.slot {
            Slot::Null => None,
            Slot::Object(object) => Some(CaseValue::Borrowed(&**object)),
            _ => self.decode().map(CaseValue::Owned),
        }
    }

    fn try_get<T: Value>(&self) -> Option<T> {
        Variant::try_get(self)
    }
}

impl ConstructibleUnion for Variant {
    /// Absent values (`None`, an undefined union) do not become the null cell.
    fn try_create_dyn(value: &dyn DynValue) -> Option<Self> {
        let cell = value.to_variant();
        (!cell.is_null()).then_some(cell)
    }
}

// ============================================================================
// Casts
// ============================================================================

macro_rules! variant_casts {
    ($($ty:ty),+ $(,)?) => {$(
        impl From<$ty> for Variant {
            fn from(value: $ty) -> Self {
                Variant::new(value)
            }
        }

        impl TryFrom<Variant> for $ty {
            type Error = Error;

            fn try_from(cell: Variant) -> Result<Self, Error> {
                cell.get()
            }
        }

        impl TryFrom<&Variant> for $ty {
            type Error = Error;

            fn try_from(cell: &Variant) -> Result<Self, Error> {
                cell.get()
            }
        }
    )+};
}

variant_casts!(
    bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Decimal, Decimal64, String,
    Duration, SystemTime,
);

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::new(value.to_owned())
    }
}

impl<T: Value> From<Option<T>> for Variant {
    fn from(value: Option<T>) -> Self {
        Variant::new(value)
    }
}
