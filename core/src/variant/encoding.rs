//! Storage strategies for [`Variant`] cells.
//!
//! Every storable type is assigned exactly one [`TypedEncoding`] by the
//! registry. The typed side packs and unpacks values of the static type; the
//! dynamic side ([`Encoding`]) lets a cell inspect its payload without
//! knowing that type.

use core::any::Any;
use core::fmt;
use core::hash::Hasher;
use core::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rust_decimal::Decimal;

use super::raw::RawBits;
use super::registry::{self, EncodingId};
use super::{Slot, Variant};
use crate::convert::{Target, convert_into};
use crate::decimal::Decimal64;
use crate::types::{TypeInfo, ValueKind};
use crate::union::ConstructibleUnion;
use crate::values::{DynValue, Value, Wrapper};

/// Type-erased view of a storage encoding.
///
/// Only `visit` is required; everything else is derived from the decoded
/// payload.
pub trait Encoding: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    /// The static type of the values this encoding stores.
    fn type_info(&self) -> TypeInfo;

    fn kind(&self) -> ValueKind;

    /// Short name of the strategy, for diagnostics.
    fn strategy(&self) -> &'static str;

    /// Hands the cell's payload to `f` without boxing it.
    ///
    /// Returns what `f` returns, or `false` when the cell does not hold a
    /// payload in this encoding's format.
    fn visit(&self, cell: &Variant, f: &mut dyn FnMut(&dyn DynValue) -> bool) -> bool;

    /// Called once by the registry when the encoding is published.
    fn on_registered(&self, id: EncodingId) {
        let _ = id;
    }

    fn decode(&self, cell: &Variant) -> Option<Box<dyn DynValue>> {
        let mut out = None;
        self.visit(cell, &mut |value| {
            out = Some(value.clone_box());
            true
        });
        out
    }

    /// The type of the stored value, which may be more specific than
    /// [`Encoding::type_info`].
    fn runtime_type(&self, cell: &Variant) -> TypeInfo {
        let mut info = self.type_info();
        self.visit(cell, &mut |value| {
            info = value.type_info();
            true
        });
        info
    }

    fn is_null(&self, cell: &Variant) -> bool {
        !self.visit(cell, &mut |_| true)
    }

    /// Fills `target` with the payload, directly or through the conversion
    /// engine.
    fn try_get_into(&self, cell: &Variant, target: &mut Target<'_>) -> bool {
        self.visit(cell, &mut |value| {
            target.assign(value) || convert_into(value, target)
        })
    }

    fn can_convert_to(&self, cell: &Variant, target: &mut Target<'_>) -> bool {
        self.try_get_into(cell, target)
    }

    fn fmt_value(&self, cell: &Variant, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.visit(cell, &mut |value| {
            result = value.dyn_fmt(f);
            true
        });
        result
    }

    fn eq_value(&self, cell: &Variant, other: &dyn DynValue) -> bool {
        self.visit(cell, &mut |value| value.dyn_eq(other))
    }

    fn eq_cells(&self, cell: &Variant, other: &Variant) -> bool {
        self.visit(cell, &mut |value| other.visit(&mut |theirs| value.dyn_eq(theirs)))
    }

    fn hash_cell(&self, cell: &Variant, state: &mut dyn Hasher) {
        self.visit(cell, &mut |value| {
            value.dyn_hash(state);
            true
        });
    }
}

/// The statically typed side of an encoding.
pub trait TypedEncoding<T>: Send + Sync + 'static {
    fn strategy(&self) -> &'static str;

    fn encode(&'static self, value: T) -> Variant;

    /// Extracts a `T` only when the cell holds exactly this encoding's
    /// format. No conversion is attempted.
    fn decode_exact(&self, cell: &Variant) -> Option<T>;

    /// The encoding cells written by [`TypedEncoding::encode`] carry, when
    /// values of `T` are stored as themselves.
    fn storage(&'static self) -> Option<&'static dyn Encoding> {
        None
    }
}

// ============================================================================
// Bits
// ============================================================================

/// Copies a small `Copy` value into the cell.
pub struct BitsEncoding<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value + Copy> BitsEncoding<T> {
    pub(crate) fn new() -> Self {
        BitsEncoding {
            _marker: PhantomData,
        }
    }

    fn unpack(&self, cell: &Variant) -> Option<T> {
        match cell.slot() {
            Slot::Encoded(encoding) if encoding.as_any().is::<Self>() => {
                // SAFETY: only `BitsEncoding::<T>::encode` writes cells tagged
                // with this encoding type, and it packs a `T`.
                Some(unsafe { cell.bits().unpack::<T>() })
            }
            _ => None,
        }
    }
}

impl<T: Value + Copy> Encoding for BitsEncoding<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn strategy(&self) -> &'static str {
        "bits"
    }

    fn visit(&self, cell: &Variant, f: &mut dyn FnMut(&dyn DynValue) -> bool) -> bool {
        match self.unpack(cell) {
            Some(value) => f(&value),
            None => false,
        }
    }
}

impl<T: Value + Copy> TypedEncoding<T> for BitsEncoding<T> {
    fn strategy(&self) -> &'static str {
        "bits"
    }

    fn encode(&'static self, value: T) -> Variant {
        Variant::from_parts(Slot::Encoded(self), RawBits::pack(value))
    }

    fn decode_exact(&self, cell: &Variant) -> Option<T> {
        self.unpack(cell)
    }

    fn storage(&'static self) -> Option<&'static dyn Encoding> {
        Some(self)
    }
}

// ============================================================================
// Reference
// ============================================================================

/// Stores the value behind a shared reference.
pub struct ReferenceEncoding<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value> ReferenceEncoding<T> {
    pub(crate) fn new() -> Self {
        ReferenceEncoding {
            _marker: PhantomData,
        }
    }
}

impl<T: Value> Encoding for ReferenceEncoding<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn strategy(&self) -> &'static str {
        "reference"
    }

    fn visit(&self, cell: &Variant, f: &mut dyn FnMut(&dyn DynValue) -> bool) -> bool {
        match cell.slot() {
            Slot::Object(object) if object.is::<T>() => f(&**object),
            _ => false,
        }
    }
}

impl<T: Value> TypedEncoding<T> for ReferenceEncoding<T> {
    fn strategy(&self) -> &'static str {
        "reference"
    }

    fn encode(&'static self, value: T) -> Variant {
        Variant::boxed(value)
    }

    fn decode_exact(&self, cell: &Variant) -> Option<T> {
        match cell.slot() {
            Slot::Object(object) => object.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }

    fn storage(&'static self) -> Option<&'static dyn Encoding> {
        Some(self)
    }
}

// ============================================================================
// Wrapper
// ============================================================================

/// Stores the single pointer of a [`Wrapper`] type by identity.
///
/// The pointer alone does not say which wrapper type it came from (two
/// wrappers may share an inner type), so the cell also carries the id the
/// registry assigned to this encoding.
pub struct WrapperEncoding<T> {
    id: OnceCell<EncodingId>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value + Wrapper> WrapperEncoding<T> {
    pub(crate) fn new() -> Self {
        WrapperEncoding {
            id: OnceCell::new(),
            _marker: PhantomData,
        }
    }

    fn owns(&self, cell: &Variant) -> bool {
        self.id
            .get()
            .is_some_and(|id| id.to_bits() == cell.bits().uint())
    }

    fn unwrap(&self, cell: &Variant) -> Option<T> {
        match cell.slot() {
            Slot::Wrapped(inner) if self.owns(cell) => {
                let inner = Arc::clone(inner).downcast::<T::Inner>().ok()?;
                Some(T::from_inner(inner))
            }
            Slot::Object(object) => object.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }
}

impl<T: Value + Wrapper> Encoding for WrapperEncoding<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn strategy(&self) -> &'static str {
        "wrapper"
    }

    fn visit(&self, cell: &Variant, f: &mut dyn FnMut(&dyn DynValue) -> bool) -> bool {
        match self.unwrap(cell) {
            Some(value) => f(&value),
            None => false,
        }
    }

    fn on_registered(&self, id: EncodingId) {
        let _ = self.id.set(id);
    }
}

impl<T: Value + Wrapper> TypedEncoding<T> for WrapperEncoding<T> {
    fn strategy(&self) -> &'static str {
        "wrapper"
    }

    fn encode(&'static self, value: T) -> Variant {
        match self.id.get() {
            Some(id) => {
                let inner: Arc<dyn Any + Send + Sync> = value.into_inner();
                Variant::from_parts(Slot::Wrapped(inner), RawBits::from_uint(id.to_bits()))
            }
            // Not yet registered; fall back to a plain reference.
            None => Variant::boxed(value),
        }
    }

    fn decode_exact(&self, cell: &Variant) -> Option<T> {
        self.unwrap(cell)
    }

    fn storage(&'static self) -> Option<&'static dyn Encoding> {
        Some(self)
    }
}

// ============================================================================
// Nullable
// ============================================================================

/// `None` is the null cell; `Some(v)` is stored exactly as `v`.
pub struct NullableEncoding<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value> NullableEncoding<T> {
    pub(crate) fn new() -> Self {
        NullableEncoding {
            _marker: PhantomData,
        }
    }
}

impl<T: Value> TypedEncoding<Option<T>> for NullableEncoding<T> {
    fn strategy(&self) -> &'static str {
        "nullable"
    }

    fn encode(&'static self, value: Option<T>) -> Variant {
        match value {
            Some(value) => Variant::new(value),
            None => Variant::NULL,
        }
    }

    fn decode_exact(&self, cell: &Variant) -> Option<Option<T>> {
        if cell.is_null() {
            return None;
        }
        registry::encoding::<T>().decode_exact(cell).map(Some)
    }
}

// ============================================================================
// Decimal
// ============================================================================

/// Stores a [`Decimal`] inline as a [`Decimal64`] when it fits, and behind a
/// shared reference otherwise.
pub struct DecimalEncoding;

impl DecimalEncoding {
    fn unpack(&self, cell: &Variant) -> Option<Decimal> {
        match cell.slot() {
            Slot::Encoded(encoding) if encoding.as_any().is::<Self>() => {
                Decimal64::from_bits(cell.bits().uint()).map(Decimal64::to_decimal)
            }
            Slot::Object(object) => object.downcast_ref::<Decimal>().copied(),
            _ => None,
        }
    }
}

impl Encoding for DecimalEncoding {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Decimal>()
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Decimal
    }

    fn strategy(&self) -> &'static str {
        "decimal"
    }

    fn visit(&self, cell: &Variant, f: &mut dyn FnMut(&dyn DynValue) -> bool) -> bool {
        match self.unpack(cell) {
            Some(value) => f(&value),
            None => false,
        }
    }
}

impl TypedEncoding<Decimal> for DecimalEncoding {
    fn strategy(&self) -> &'static str {
        "decimal"
    }

    fn encode(&'static self, value: Decimal) -> Variant {
        match Decimal64::from_decimal(value) {
            Some(compact) => {
                Variant::from_parts(Slot::Encoded(self), RawBits::from_uint(compact.to_bits()))
            }
            None => Variant::boxed(value),
        }
    }

    fn decode_exact(&self, cell: &Variant) -> Option<Decimal> {
        self.unpack(cell)
    }

    fn storage(&'static self) -> Option<&'static dyn Encoding> {
        Some(self)
    }
}

// ============================================================================
// Variant and unions
// ============================================================================

/// A cell stored in a cell is the same cell.
pub struct VariantEncoding;

impl TypedEncoding<Variant> for VariantEncoding {
    fn strategy(&self) -> &'static str {
        "variant"
    }

    fn encode(&'static self, value: Variant) -> Variant {
        value
    }

    fn decode_exact(&self, cell: &Variant) -> Option<Variant> {
        Some(cell.clone())
    }
}

/// A union is stored as its active case value; an undefined union is the
/// null cell. When the case value alone would lift back into a different
/// case (two cases of the same type), the union itself is boxed instead.
pub struct UnionEncoding<U> {
    _marker: PhantomData<fn() -> U>,
}

impl<U: ConstructibleUnion> UnionEncoding<U> {
    pub(crate) fn new() -> Self {
        UnionEncoding {
            _marker: PhantomData,
        }
    }

    fn lift(&self, cell: &Variant) -> Option<U> {
        let mut out = None;
        cell.visit(&mut |value| {
            out = U::try_create_dyn(value);
            out.is_some()
        });
        out
    }
}

impl<U: ConstructibleUnion> TypedEncoding<U> for UnionEncoding<U> {
    fn strategy(&self) -> &'static str {
        "union"
    }

    fn encode(&'static self, value: U) -> Variant {
        let cell = match value.case_value() {
            Some(case) => case.to_variant(),
            None => return Variant::NULL,
        };
        match self.lift(&cell) {
            Some(lifted) if lifted.value_eq(&value) => cell,
            _ => Variant::boxed(value),
        }
    }

    fn decode_exact(&self, cell: &Variant) -> Option<U> {
        if let Slot::Object(object) = cell.slot() {
            if let Some(value) = object.downcast_ref::<U>() {
                return Some(value.clone());
            }
        }
        self.lift(cell)
    }
}
