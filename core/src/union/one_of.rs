use core::fmt;
use core::hash::Hasher;

use smallvec::{SmallVec, smallvec};

use super::{Case, CaseValue, ClosedUnion, ConstructibleUnion, TypeUnion};
use crate::convert::{Converter, UnionConverter};
use crate::errors::Error;
use crate::types::{TypeInfo, ValueKind};
use crate::values::{DynValue, Shape, Value};

macro_rules! one_of {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($case:ident($ty:ident) = $kind:literal => $value:ident, $as_case:ident, $get_case:ident;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name<$($ty),+> {
            /// No case is active.
            Undefined,
            $($case($ty),)+
        }

        impl<$($ty),+> Default for $name<$($ty),+> {
            fn default() -> Self {
                $name::Undefined
            }
        }

        impl<$($ty),+> $name<$($ty),+> {
            /// The 1-based index of the active case, or 0 when undefined.
            pub fn kind(&self) -> u8 {
                match self {
                    $name::Undefined => 0,
                    $($name::$case(_) => $kind,)+
                }
            }

            pub fn is_defined(&self) -> bool {
                !matches!(self, $name::Undefined)
            }

            $(
                /// The case value, or the type's default when another case
                /// is active.
                pub fn $value(&self) -> $ty
                where
                    $ty: Clone + Default,
                {
                    match self {
                        $name::$case(value) => value.clone(),
                        _ => <$ty>::default(),
                    }
                }

                pub fn $as_case(&self) -> Option<&$ty> {
                    match self {
                        $name::$case(value) => Some(value),
                        _ => None,
                    }
                }
            )+
        }

        impl<$($ty: Value),+> $name<$($ty),+> {
            $(
                pub fn $get_case(&self) -> Result<$ty, Error> {
                    self.$as_case()
                        .cloned()
                        .ok_or_else(|| Error::invalid_cast::<$ty>(self.case_type().name()))
                }
            )+
        }

        impl<$($ty: Value),+> Value for $name<$($ty),+> {
            const KIND: ValueKind = ValueKind::Union;

            fn shape() -> Shape<Self> {
                Shape::union()
            }

            fn create_converter() -> Box<dyn Converter> {
                Box::new(UnionConverter::<Self>::closed())
            }

            fn value_eq(&self, other: &Self) -> bool {
                match (self, other) {
                    ($name::Undefined, $name::Undefined) => true,
                    $(($name::$case(mine), $name::$case(theirs)) => mine.value_eq(theirs),)+
                    _ => false,
                }
            }

            fn value_hash(&self, state: &mut dyn Hasher) {
                state.write_u8(self.kind());
                match self {
                    $name::Undefined => {}
                    $($name::$case(value) => value.value_hash(state),)+
                }
            }

            fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $name::Undefined => Ok(()),
                    $($name::$case(value) => value.fmt_value(f),)+
                }
            }
        }

        impl<$($ty: Value),+> TypeUnion for $name<$($ty),+> {
            fn case_type(&self) -> TypeInfo {
                match self {
                    $name::Undefined => TypeInfo::unknown(),
                    $($name::$case(_) => TypeInfo::of::<$ty>(),)+
                }
            }

            fn case_value(&self) -> Option<CaseValue<'_>> {
                match self {
                    $name::Undefined => None,
                    $($name::$case(value) => Some(CaseValue::Borrowed(value)),)+
                }
            }
        }

        impl<$($ty: Value),+> ConstructibleUnion for $name<$($ty),+> {
            /// Picks the first case whose type is exactly the value's type.
            fn try_create_dyn(value: &dyn DynValue) -> Option<Self> {
                $(
                    if let Some(value) = value.downcast_ref::<$ty>() {
                        return Some($name::$case(value.clone()));
                    }
                )+
                None
            }
        }

        impl<$($ty: Value),+> ClosedUnion for $name<$($ty),+> {
            fn cases() -> SmallVec<[Case<Self>; 4]> {
                smallvec![$(Case::of::<$ty>()),+]
            }
        }

        impl<$($ty: Value),+> fmt::Display for $name<$($ty),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.fmt_value(f)
            }
        }
    };
}

one_of! {
    /// A value of one of two types.
    OneOf2 {
        First(A) = 1 => first, as_first, get_first;
        Second(B) = 2 => second, as_second, get_second;
    }
}

one_of! {
    /// A value of one of three types.
    OneOf3 {
        First(A) = 1 => first, as_first, get_first;
        Second(B) = 2 => second, as_second, get_second;
        Third(C) = 3 => third, as_third, get_third;
    }
}

one_of! {
    /// A value of one of four types.
    OneOf4 {
        First(A) = 1 => first, as_first, get_first;
        Second(B) = 2 => second, as_second, get_second;
        Third(C) = 3 => third, as_third, get_third;
        Fourth(D) = 4 => fourth, as_fourth, get_fourth;
    }
}
