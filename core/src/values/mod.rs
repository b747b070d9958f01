pub mod enums;
pub mod impls;
pub mod value;
pub use enums::{EnumRepr, Enumeration};
pub use value::{DynValue, Shape, Value, Wrapper};
