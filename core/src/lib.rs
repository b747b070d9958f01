//! Runtime value cells and type-directed conversions for union types.
//!
//! The crate is organized in four layers:
//!
//! - [`variant`]: the [`Variant`] cell, a fixed-size container that stores
//!   primitives and small plain structs inline and everything else behind a
//!   shared reference, plus the process-wide encoding registry.
//! - [`values`]: the [`Value`] trait every storable type implements, and its
//!   object-safe counterpart [`DynValue`].
//! - [`union`]: the capability protocol that makes a type "union-like"
//!   ([`TypeUnion`], [`ConstructibleUnion`], [`ClosedUnion`]) and the closed
//!   sum types [`OneOf2`], [`OneOf3`] and [`OneOf4`].
//! - [`convert`]: the generic conversion engine behind [`try_convert`].
//!
//! # Example
//!
//! ```
//! use morph_core::{Variant, OneOf2, try_convert};
//!
//! let cell = Variant::new(3_i32);
//! assert_eq!(cell.try_get::<i64>(), Some(3));
//!
//! let cell = Variant::from("3");
//! assert_eq!(cell.try_get::<f64>(), Some(3.0));
//!
//! let small: OneOf2<i32, String> = OneOf2::First(3);
//! let wide: Option<OneOf2<i64, f64>> = try_convert(&small);
//! assert_eq!(wide, Some(OneOf2::First(3_i64)));
//! ```

pub mod convert;
pub mod decimal;
pub mod errors;
pub mod types;
pub mod union;
pub mod values;
pub mod variant;


pub use convert::{
    Converter, Target, convert, convert_dyn, convert_into, converter_of, pivot, try_convert,
};
pub use decimal::Decimal64;
pub use errors::Error;
pub use rust_decimal::Decimal;
pub use types::{TypeInfo, ValueKind};
pub use union::{
    Case, CaseValue, ClosedUnion, ConstructibleUnion, OneOf2, OneOf3, OneOf4, TypeUnion,
};
pub use values::{DynValue, EnumRepr, Enumeration, Shape, Value, Wrapper};
pub use variant::encoding::{Encoding, TypedEncoding};
pub use variant::{EncodingId, Storage, Variant};
