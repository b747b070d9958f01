//! `Result<T, E>` as a closed two-case union. An `Ok` and an `Err` of the
//! same type are told apart only by the case; construction prefers `Ok`.

use core::fmt;
use core::hash::Hasher;

use smallvec::{SmallVec, smallvec};

use super::{Case, CaseValue, ClosedUnion, ConstructibleUnion, TypeUnion};
use crate::convert::{Converter, UnionConverter};
use crate::types::{TypeInfo, ValueKind};
use crate::values::{DynValue, Shape, Value};

impl<T: Value, E: Value> Value for Result<T, E> {
    const KIND: ValueKind = ValueKind::Union;

    fn shape() -> Shape<Self> {
        Shape::union()
    }

    fn create_converter() -> Box<dyn Converter> {
        Box::new(UnionConverter::<Self>::closed())
    }

    fn value_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ok(mine), Ok(theirs)) => mine.value_eq(theirs),
            (Err(mine), Err(theirs)) => mine.value_eq(theirs),
            _ => false,
        }
    }

    fn value_hash(&self, state: &mut dyn Hasher) {
        match self {
            Ok(value) => {
                state.write_u8(1);
                value.value_hash(state);
            }
            Err(error) => {
                state.write_u8(2);
                error.value_hash(state);
            }
        }
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ok(value) => value.fmt_value(f),
            Err(error) => error.fmt_value(f),
        }
    }
}

impl<T: Value, E: Value> TypeUnion for Result<T, E> {
    fn case_type(&self) -> TypeInfo {
        match self {
            Ok(_) => TypeInfo::of::<T>(),
            Err(_) => TypeInfo::of::<E>(),
        }
    }

    fn case_value(&self) -> Option<CaseValue<'_>> {
        Some(match self {
            Ok(value) => CaseValue::Borrowed(value),
            Err(error) => CaseValue::Borrowed(error),
        })
    }
}

impl<T: Value, E: Value> ConstructibleUnion for Result<T, E> {
    fn try_create_dyn(value: &dyn DynValue) -> Option<Self> {
        if let Some(value) = value.downcast_ref::<T>() {
            return Some(Ok(value.clone()));
        }
        value.downcast_ref::<E>().map(|error| Err(error.clone()))
    }
}

impl<T: Value, E: Value> ClosedUnion for Result<T, E> {
    fn cases() -> SmallVec<[Case<Self>; 4]> {
        smallvec![Case::of::<T>(), Case::of::<E>()]
    }
}
