use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

/// Runtime descriptor of a concrete type.
///
/// Two descriptors are equal iff they describe the same `TypeId`; the name is
/// carried only for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// The descriptor reported by cells that hold no value.
    pub fn unknown() -> Self {
        TypeInfo {
            id: TypeId::of::<dyn Any>(),
            name: "unknown",
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn is_unknown(&self) -> bool {
        self.id == TypeId::of::<dyn Any>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Coarse category of a stored value, used for fast dispatch on
/// primitive-like payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Null = 0,
    Bool = 1,
    Char = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    UInt8 = 7,
    UInt16 = 8,
    UInt32 = 9,
    UInt64 = 10,
    Float32 = 11,
    Float64 = 12,
    Decimal = 13,
    Decimal64 = 14,
    String = 15,
    Duration = 16,
    Time = 17,
    Enum = 18,
    Union = 19,
    Object = 20,
}

impl ValueKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::Int8
                | ValueKind::Int16
                | ValueKind::Int32
                | ValueKind::Int64
                | ValueKind::UInt8
                | ValueKind::UInt16
                | ValueKind::UInt32
                | ValueKind::UInt64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                ValueKind::Float32 | ValueKind::Float64 | ValueKind::Decimal | ValueKind::Decimal64
            )
    }

    /// Numbers plus `bool` and `char`: the kinds that share the `i64` pivot.
    pub fn is_scalar(self) -> bool {
        self.is_numeric() || matches!(self, ValueKind::Bool | ValueKind::Char)
    }
}
