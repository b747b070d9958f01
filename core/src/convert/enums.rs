use core::marker::PhantomData;

use super::{Converter, Target, convert_dyn, pivot};
use crate::types::{TypeInfo, ValueKind};
use crate::values::{DynValue, EnumRepr, Enumeration};

/// Converts an enum to its member name or its representation, and back.
///
/// Numeric targets are reached through the representation widened to `i64`
/// (or `u64` when it does not fit). Integers, including other enums, must
/// name a member to convert into the enum.
pub struct EnumConverter<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E: Enumeration> EnumConverter<E> {
    pub fn new() -> Self {
        EnumConverter {
            _marker: PhantomData,
        }
    }
}

impl<E: Enumeration> Default for EnumConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Enumeration> Converter for EnumConverter<E> {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<E>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<E>() else {
            return false;
        };
        if target.is::<E>() {
            return target.put(value);
        }
        if target.is::<String>() {
            let text = match value.name() {
                Some(name) => name.to_owned(),
                None => value.to_repr().to_string(),
            };
            return target.put(text);
        }
        if !target.kind().is_numeric() {
            return false;
        }
        let repr = value.to_repr();
        match repr.to_i64() {
            Some(wide) => pivot(wide, target),
            None => repr.to_u64().is_some_and(|wide| pivot(wide, target)),
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        if let Some(text) = source.downcast_ref::<String>() {
            return target.put_opt(E::parse_member(text));
        }
        if let Some(text) = source.downcast_ref::<&'static str>() {
            return target.put_opt(E::parse_member(text));
        }
        let repr = if let Some(&wide) = source.downcast_ref::<i64>() {
            E::Repr::from_i64(wide)
        } else if let Some(&wide) = source.downcast_ref::<u64>() {
            E::Repr::from_u64(wide)
        } else if source.kind().is_integer() || source.kind() == ValueKind::Enum {
            convert_dyn::<i64>(source)
                .and_then(E::Repr::from_i64)
                .or_else(|| convert_dyn::<u64>(source).and_then(E::Repr::from_u64))
        } else {
            None
        };
        target.put_opt(repr.and_then(E::from_repr))
    }
}
