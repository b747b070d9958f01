use core::marker::PhantomData;
use std::sync::Arc;

use smallvec::SmallVec;

use super::{Converter, Target, convert_dyn, convert_into};
use crate::types::TypeInfo;
use crate::union::{Case, ClosedUnion, ConstructibleUnion};
use crate::values::{DynValue, Value};

/// Converts into and out of a union type.
///
/// Out of a union, the active case value is extracted directly when it
/// already has the target type and converted otherwise. Into a union, a
/// source whose type is a case is wrapped directly; failing that, each case
/// is tried in declaration order, converting the source to that case's type.
/// Open unions have no case list and only accept direct wrapping.
pub struct UnionConverter<U> {
    cases: SmallVec<[Case<U>; 4]>,
}

impl<U: ConstructibleUnion> UnionConverter<U> {
    pub fn open() -> Self {
        UnionConverter {
            cases: SmallVec::new(),
        }
    }
}

impl<U: ClosedUnion> UnionConverter<U> {
    pub fn closed() -> Self {
        UnionConverter { cases: U::cases() }
    }
}

impl<U: ConstructibleUnion> Converter for UnionConverter<U> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<U>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let Some(union) = source.downcast_ref::<U>() else {
            return false;
        };
        let Some(case) = union.case_value() else {
            return false;
        };
        target.assign(&*case) || convert_into(&*case, target)
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        if let Some(union) = U::try_create_dyn(source) {
            return target.put(union);
        }
        self.cases
            .iter()
            .any(|case| case.lift(source).is_some_and(|union| target.put(union)))
    }
}

/// `Option<T>`: `Some` converts as its content, `None` never converts.
pub struct NullableConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value> NullableConverter<T> {
    pub fn new() -> Self {
        NullableConverter {
            _marker: PhantomData,
        }
    }
}

impl<T: Value> Default for NullableConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> Converter for NullableConverter<T> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Option<T>>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        match source.downcast_ref::<Option<T>>() {
            Some(Some(value)) => convert_into(value, target),
            _ => false,
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        target.put_opt(convert_dyn::<T>(source).map(Some))
    }
}

/// `Arc<T>` converts as the shared `T`.
pub struct SharedConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Value> SharedConverter<T> {
    pub fn new() -> Self {
        SharedConverter {
            _marker: PhantomData,
        }
    }
}

impl<T: Value> Default for SharedConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> Converter for SharedConverter<T> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Arc<T>>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        match source.downcast_ref::<Arc<T>>() {
            Some(shared) => convert_into(&**shared, target),
            None => false,
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        target.put_opt(convert_dyn::<T>(source).map(Arc::new))
    }
}
