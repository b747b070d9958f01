//! The conversion engine.
//!
//! Every [`Value`] type has one [`Converter`], created on first use and kept
//! for the life of the process. A conversion asks the source type's converter
//! first ("convert yourself to this target"), then the target type's
//! converter ("build yourself from this source"). The first to fill the
//! target wins; if neither does, the conversion fails without an error.
//!
//! Converters hand values between each other through a [`Target`], a typed
//! output slot whose static type is erased. Numeric converters reach
//! unfamiliar numeric targets through an intermediate type (usually `i64`),
//! re-entering the engine with [`pivot`].

mod enums;
mod primitive;
mod union;


use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;
use std::sync::{PoisonError, RwLock};

use hashbrown::HashMap;
use lazy_static::lazy_static;
use tracing::{debug, trace};

pub use enums::EnumConverter;
pub use primitive::{
    BoolConverter, CharConverter, Decimal64Converter, DecimalConverter, DurationConverter,
    F32Converter, F64Converter, I64Converter, IntConverter, StringConverter, TimeConverter,
    U64Converter,
};
pub(crate) use primitive::{format_duration, format_time};
pub use union::{NullableConverter, SharedConverter, UnionConverter};

use crate::errors::Error;
use crate::types::{TypeInfo, ValueKind};
use crate::values::{DynValue, Value};

/// Per-type conversion logic.
///
/// Both directions default to plain assignment: a converter that knows
/// nothing else still hands a value of the target's own type through.
pub trait Converter: Send + Sync + 'static {
    /// The type this converter serves.
    fn type_info(&self) -> TypeInfo;

    /// Converts `source`, a value of this converter's type, into `target`.
    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        target.assign(source)
    }

    /// Builds a value of this converter's type in `target` from `source`.
    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        target.assign(source)
    }
}

/// A typed output slot with the type erased.
///
/// Wraps an `&mut Option<T>`; a converter fills it with [`Target::put`]
/// after checking the type with [`Target::is`].
pub struct Target<'a> {
    info: TypeInfo,
    kind: ValueKind,
    slot: &'a mut dyn Any,
    assign: fn(&dyn DynValue, &mut dyn Any) -> bool,
    converter: fn() -> &'static dyn Converter,
}

impl<'a> Target<'a> {
    pub fn new<T: Value>(slot: &'a mut Option<T>) -> Self {
        Target {
            info: TypeInfo::of::<T>(),
            kind: T::KIND,
            slot,
            assign: assign_clone::<T>,
            converter: converter_of::<T>,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.info.is::<T>()
    }

    /// Stores `value` if the target has type `T`.
    pub fn put<T: 'static>(&mut self, value: T) -> bool {
        match self.slot.downcast_mut::<Option<T>>() {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn put_opt<T: 'static>(&mut self, value: Option<T>) -> bool {
        value.is_some_and(|value| self.put(value))
    }

    /// Stores a clone of `source` if it already has the target's type.
    pub fn assign(&mut self, source: &dyn DynValue) -> bool {
        (self.assign)(source, &mut *self.slot)
    }

    /// The target type's converter.
    pub fn converter(&self) -> &'static dyn Converter {
        (self.converter)()
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.info)
    }
}

fn assign_clone<T: Value>(source: &dyn DynValue, slot: &mut dyn Any) -> bool {
    match (source.downcast_ref::<T>(), slot.downcast_mut::<Option<T>>()) {
        (Some(value), Some(slot)) => {
            *slot = Some(value.clone());
            true
        }
        _ => false,
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Converts `source` into `target`: the source's converter first, then the
/// target's.
pub fn convert_into(source: &dyn DynValue, target: &mut Target<'_>) -> bool {
    if source.converter().try_convert_to(source, target) {
        return true;
    }
    if target.converter().try_convert_from(source, target) {
        return true;
    }
    trace!(from = %source.type_info(), to = %target.type_info(), "no conversion");
    false
}

/// Continues a conversion from an intermediate value.
pub fn pivot<P: Value>(value: P, target: &mut Target<'_>) -> bool {
    convert_into(&value, target)
}

pub fn convert_dyn<T: Value>(source: &dyn DynValue) -> Option<T> {
    let mut out = None;
    convert_into(source, &mut Target::new(&mut out));
    out
}

/// Converts `source` to a `T`, or `None` when no conversion applies.
///
/// Unions take part transparently: a union source converts through its
/// active case, and a union target is built from the first case the source
/// converts to.
pub fn try_convert<S: Value, T: Value>(source: &S) -> Option<T> {
    convert_dyn(source)
}

pub fn convert<S: Value, T: Value>(source: &S) -> Result<T, Error> {
    try_convert(source).ok_or_else(|| Error::invalid_cast::<T>(type_name::<S>()))
}

// ============================================================================
// Converter registry
// ============================================================================

lazy_static! {
    static ref CONVERTERS: RwLock<HashMap<TypeId, &'static dyn Converter>> =
        RwLock::new(HashMap::new());
}

/// The converter for `T`, created and published on first use.
pub fn converter_of<T: Value>() -> &'static dyn Converter {
    let key = TypeId::of::<T>();
    if let Some(found) = CONVERTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return *found;
    }

    let candidate = T::create_converter();

    let mut converters = CONVERTERS.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(found) = converters.get(&key) {
        trace!(ty = type_name::<T>(), "discarding duplicate converter");
        return *found;
    }
    let converter: &'static dyn Converter = Box::leak(candidate);
    converters.insert(key, converter);
    drop(converters);

    debug!(ty = type_name::<T>(), "converter published");
    converter
}

// ============================================================================
// Generic converters
// ============================================================================

/// Base behaviour only: values of the type pass through unchanged.
pub struct ReferenceConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value> ReferenceConverter<T> {
    pub fn new() -> Self {
        ReferenceConverter {
            _marker: PhantomData,
        }
    }
}

impl<T: Value> Default for ReferenceConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> Converter for ReferenceConverter<T> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// Builds values from strings through [`FromStr`].
pub struct ParseConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value + FromStr> ParseConverter<T> {
    pub fn new() -> Self {
        ParseConverter {
            _marker: PhantomData,
        }
    }
}

impl<T: Value + FromStr> Default for ParseConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value + FromStr> Converter for ParseConverter<T> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let text = match source.downcast_ref::<String>() {
            Some(text) => text.as_str(),
            None => match source.downcast_ref::<&'static str>() {
                Some(text) => *text,
                None => return false,
            },
        };
        target.put_opt(text.trim().parse::<T>().ok())
    }
}
