//! The union capability protocol.
//!
//! A type is union-like when it implements [`TypeUnion`]: it reports the type
//! of its active case and exposes that case's value. [`ConstructibleUnion`]
//! adds construction from an arbitrary value, and [`ClosedUnion`] adds the
//! fixed list of case types the conversion engine uses to lift values that
//! need converting first.
//!
//! [`Variant`](crate::Variant) is the open union; [`OneOf2`], [`OneOf3`],
//! [`OneOf4`] and `Result<T, E>` are closed ones.

mod one_of;
mod result;


use core::fmt;
use core::ops::Deref;

use smallvec::SmallVec;

pub use one_of::{OneOf2, OneOf3, OneOf4};

use crate::convert::convert_dyn;
use crate::types::TypeInfo;
use crate::values::{DynValue, Value};

/// The value of a union's active case.
pub enum CaseValue<'a> {
    /// Borrowed from the union.
    Borrowed(&'a dyn DynValue),
    /// Materialized from a packed representation.
    Owned(Box<dyn DynValue>),
}

impl Deref for CaseValue<'_> {
    type Target = dyn DynValue;

    fn deref(&self) -> &Self::Target {
        match self {
            CaseValue::Borrowed(value) => *value,
            CaseValue::Owned(value) => &**value,
        }
    }
}

impl fmt::Debug for CaseValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

pub trait TypeUnion: Value {
    /// The type of the active case, or [`TypeInfo::unknown`] when no case is
    /// active.
    fn case_type(&self) -> TypeInfo;

    fn case_value(&self) -> Option<CaseValue<'_>>;

    /// The active case value when it is exactly a `T`.
    fn try_get<T: Value>(&self) -> Option<T> {
        let case = self.case_value()?;
        case.downcast_ref::<T>().cloned()
    }
}

pub trait ConstructibleUnion: TypeUnion {
    /// Builds the union with `value` as its active case, when `value`'s type
    /// is one of the cases.
    fn try_create_dyn(value: &dyn DynValue) -> Option<Self>;

    fn try_create<T: Value>(value: T) -> Option<Self> {
        Self::try_create_dyn(&value)
    }
}

pub trait ClosedUnion: ConstructibleUnion {
    fn cases() -> SmallVec<[Case<Self>; 4]>;
}

/// One case of a closed union: its type and how to lift an arbitrary value
/// into it through conversion.
pub struct Case<U> {
    info: TypeInfo,
    lift: fn(&dyn DynValue) -> Option<U>,
}

impl<U: ConstructibleUnion> Case<U> {
    pub fn of<T: Value>() -> Self {
        Case {
            info: TypeInfo::of::<T>(),
            lift: lift_into::<U, T>,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    /// Converts `source` to this case's type and builds the union from it.
    pub fn lift(&self, source: &dyn DynValue) -> Option<U> {
        (self.lift)(source)
    }
}

impl<U> fmt::Debug for Case<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Case({})", self.info)
    }
}

fn lift_into<U: ConstructibleUnion, T: Value>(source: &dyn DynValue) -> Option<U> {
    U::try_create(convert_dyn::<T>(source)?)
}
