//! Morph - typed value cells and conversions between them
//!
//! # Overview
//!
//! Morph stores values of arbitrary types in a fixed-size [`Variant`] cell
//! and converts between types through per-type converters. Common uses:
//!
//! - Heterogeneous columns and property bags
//! - Loosely typed input (strings, numbers) bound to typed fields
//! - Sum types whose cases convert as a whole
//!
//! # Quick Start
//!
//! ```
//! use morph::{OneOf2, Variant, try_convert};
//!
//! // Primitives and small decimals live inline in the cell.
//! let cell = Variant::new(42_i32);
//! assert_eq!(cell.try_get::<f64>(), Some(42.0));
//! assert_eq!(cell.to_string(), "42");
//!
//! // Strings parse into numbers on extraction.
//! assert_eq!(Variant::from(" 7 ").try_get::<u8>(), Some(7));
//!
//! // A union converts through its active case.
//! let value: OneOf2<i32, String> = OneOf2::Second(String::from("1.5"));
//! let wide: Option<OneOf2<i64, f64>> = try_convert(&value);
//! assert_eq!(wide, Some(OneOf2::Second(1.5)));
//! ```
//!
//! # Custom types
//!
//! Implement [`Value`] to store a type in a cell. The default shape boxes
//! the value; small `Copy` types can ask for inline storage, and enums get
//! everything from [`impl_enum_value!`]:
//!
//! ```
//! use morph::{Shape, Value, Variant, impl_enum_value};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Value for Point {
//!     fn shape() -> Shape<Self> {
//!         Shape::bits()
//!     }
//! }
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Suit {
//!     Hearts = 1,
//!     Spades = 2,
//! }
//!
//! impl_enum_value!(Suit: u8 { Hearts, Spades });
//!
//! let cell = Variant::new(Point { x: 1, y: 2 });
//! assert_eq!(cell.try_get::<Point>(), Some(Point { x: 1, y: 2 }));
//!
//! let cell = Variant::from("spades");
//! assert_eq!(cell.try_get::<Suit>(), Some(Suit::Spades));
//! ```

pub use morph_core::{
    Case, CaseValue, ClosedUnion, ConstructibleUnion, Converter, Decimal, Decimal64, DynValue,
    Encoding, EncodingId, EnumRepr, Enumeration, Error, OneOf2, OneOf3, OneOf4, Shape, Storage,
    Target, TypeInfo, TypeUnion, TypedEncoding, Value, ValueKind, Variant, Wrapper, convert,
    convert_dyn, convert_into, converter_of, pivot, try_convert,
};
pub use morph_core::{impl_enum_value, impl_value};

pub use morph_core::{types, union, values, variant};
