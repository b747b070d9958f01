use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::convert::{Converter, ReferenceConverter, converter_of};
use crate::types::{TypeInfo, ValueKind};
use crate::union::ConstructibleUnion;
use crate::variant::Variant;
use crate::variant::encoding::{
    BitsEncoding, DecimalEncoding, Encoding, NullableEncoding, TypedEncoding, UnionEncoding,
    VariantEncoding, WrapperEncoding,
};
use crate::variant::registry;

/// A type that can be stored in a [`Variant`] and take part in conversions.
///
/// Everything the runtime needs to know about a type is declared here: how
/// its values are laid out in a cell ([`Value::shape`]), which converter
/// handles it, and how its values compare, hash and print.
pub trait Value: Any + Clone + PartialEq + fmt::Debug + Send + Sync {
    const KIND: ValueKind = ValueKind::Object;

    /// The storage strategy requested for this type.
    ///
    /// The request is a hint: a `Bits` or `Wrapper` shape that does not fit
    /// the cell falls back to reference storage.
    fn shape() -> Shape<Self> {
        Shape::Reference
    }

    /// Builds the converter used for this type. Called at most once per type
    /// per process, outside any lock.
    fn create_converter() -> Box<dyn Converter> {
        Box::new(ReferenceConverter::<Self>::new())
    }

    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }

    /// Feeds the value into `state`. The default hashes nothing, so equal
    /// values of a type without `Hash` still hash alike.
    fn value_hash(&self, state: &mut dyn Hasher) {
        let _ = state;
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Storage strategy requested by [`Value::shape`].
///
/// Each case carries the typed encoding that implements it; the encoding
/// registry picks one of them (or reference storage) when the type is first
/// used.
pub enum Shape<T: 'static> {
    /// `Option<T>`: `None` is the null cell, `Some` stores like `T`.
    Nullable(Box<dyn TypedEncoding<T>>),
    /// A single shared pointer, stored by identity next to an encoding id.
    Wrapper(Box<dyn TypedEncoding<T>>),
    /// A plain `Copy` value copied into the cell.
    Bits(Box<dyn TypedEncoding<T>>),
    /// The full-width decimal, compacted when it fits.
    Decimal(Box<dyn TypedEncoding<T>>),
    /// A cell stored inside a cell is the cell itself.
    Variant(Box<dyn TypedEncoding<T>>),
    /// A union stores its active case value.
    Union(Box<dyn TypedEncoding<T>>),
    /// A shared reference to the value.
    Reference,
}

impl<T: Value + Copy> Shape<T> {
    pub fn bits() -> Self {
        Shape::Bits(Box::new(BitsEncoding::<T>::new()))
    }
}

impl<T: Value + Wrapper> Shape<T> {
    pub fn wrapper() -> Self {
        Shape::Wrapper(Box::new(WrapperEncoding::<T>::new()))
    }
}

impl<T: Value> Shape<Option<T>> {
    pub fn nullable() -> Self {
        Shape::Nullable(Box::new(NullableEncoding::<T>::new()))
    }
}

impl<U: ConstructibleUnion> Shape<U> {
    pub fn union() -> Self {
        Shape::Union(Box::new(UnionEncoding::<U>::new()))
    }
}

impl Shape<Decimal> {
    pub fn decimal() -> Self {
        Shape::Decimal(Box::new(DecimalEncoding))
    }
}

impl Shape<Variant> {
    pub fn variant() -> Self {
        Shape::Variant(Box::new(VariantEncoding))
    }
}

impl<T: 'static> fmt::Debug for Shape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Nullable(_) => "Nullable",
            Shape::Wrapper(_) => "Wrapper",
            Shape::Bits(_) => "Bits",
            Shape::Decimal(_) => "Decimal",
            Shape::Variant(_) => "Variant",
            Shape::Union(_) => "Union",
            Shape::Reference => "Reference",
        };
        f.write_str(name)
    }
}

/// A type that is exactly one shared pointer.
///
/// Wrapper values are stored by moving the pointer into the cell, so a
/// round trip hands back the same allocation.
pub trait Wrapper: Sized {
    type Inner: Any + Send + Sync;

    fn into_inner(self) -> Arc<Self::Inner>;
    fn from_inner(inner: Arc<Self::Inner>) -> Self;
}

impl<T: Any + Send + Sync> Wrapper for Arc<T> {
    type Inner = T;

    fn into_inner(self) -> Arc<T> {
        self
    }

    fn from_inner(inner: Arc<T>) -> Self {
        inner
    }
}

/// Object-safe view of a [`Value`].
///
/// Implemented for every `Value`; the conversion engine and the cell work
/// with `&dyn DynValue` wherever the concrete type is erased.
pub trait DynValue: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_info(&self) -> TypeInfo;
    fn kind(&self) -> ValueKind;
    fn converter(&self) -> &'static dyn Converter;
    fn clone_box(&self) -> Box<dyn DynValue>;
    fn dyn_eq(&self, other: &dyn DynValue) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn to_variant(&self) -> Variant;
    /// The encoding a boxed value of this type is stored under.
    fn storage_encoding(&self) -> Option<&'static dyn Encoding>;
}

impl<T: Value> DynValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn converter(&self) -> &'static dyn Converter {
        converter_of::<T>()
    }

    fn clone_box(&self) -> Box<dyn DynValue> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn DynValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self.value_eq(other))
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        core::any::TypeId::of::<T>().hash(&mut state);
        self.value_hash(state);
    }

    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_value(f)
    }

    fn to_variant(&self) -> Variant {
        Variant::new(self.clone())
    }

    fn storage_encoding(&self) -> Option<&'static dyn Encoding> {
        registry::encoding::<T>().storage()
    }
}

impl dyn DynValue {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_info())?;
        self.dyn_fmt(f)?;
        f.write_str(")")
    }
}

impl Clone for Box<dyn DynValue> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
