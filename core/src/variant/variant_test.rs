use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use crate::decimal::Decimal64;
use crate::errors::Error;
use crate::types::{TypeInfo, ValueKind};
use crate::union::OneOf2;
use crate::variant::{Storage, Variant};

fn hash_of(cell: &Variant) -> u64 {
    let mut hasher = DefaultHasher::new();
    cell.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// Null
// ============================================================================

#[test]
fn test_null_refuses_everything() {
    let null = Variant::NULL;
    assert!(null.is_null());
    assert_eq!(null.storage(), Storage::Null);
    assert_eq!(null.kind(), ValueKind::Null);
    assert!(null.type_info().is_unknown());
    assert!(null.encoding().is_none());
    assert!(null.decode().is_none());

    assert_eq!(null.try_get::<i32>(), None);
    assert_eq!(null.try_get::<String>(), None);
    assert_eq!(null.try_get::<Option<i32>>(), None);
    assert_eq!(null.try_get::<Variant>(), None);
    assert!(!null.can_get::<i64>());
}

#[test]
fn test_null_equals_only_null() {
    assert_eq!(Variant::NULL, Variant::default());
    assert_ne!(Variant::NULL, Variant::new(0_i32));
    assert_eq!(Variant::NULL.to_string(), "");
    assert_eq!(format!("{:?}", Variant::NULL), "Variant(null)");
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn test_primitives_are_inline() {
    for cell in [
        Variant::new(true),
        Variant::new('x'),
        Variant::new(7_u8),
        Variant::new(-7_i64),
        Variant::new(1.5_f32),
        Variant::new(Decimal64::new(15, 1)),
    ] {
        assert_eq!(cell.storage(), Storage::Inline, "{:?}", cell);
    }
}

fn round_trip<T: crate::values::Value>(value: T) -> Option<T> {
    Variant::new(value).try_get::<T>()
}

macro_rules! assert_round_trips {
    ($($ty:ty: [$($value:expr),+ $(,)?];)+) => {$($(
        assert_eq!(
            round_trip::<$ty>($value),
            Some($value),
            "{} {:?}",
            stringify!($ty),
            $value
        );
    )+)+};
}

#[test]
fn test_boundary_values_round_trip() {
    assert_round_trips! {
        bool: [false, true];
        char: ['\0', 'a', char::MAX];
        i8: [i8::MIN, 0, i8::MAX];
        i16: [i16::MIN, 0, i16::MAX];
        i32: [i32::MIN, 0, i32::MAX];
        i64: [i64::MIN, 0, i64::MAX];
        u8: [u8::MIN, u8::MAX];
        u16: [u16::MIN, u16::MAX];
        u32: [u32::MIN, u32::MAX];
        u64: [u64::MIN, u64::MAX];
        f32: [f32::MIN, -0.0, 0.0, f32::MIN_POSITIVE, f32::MAX, f32::INFINITY, f32::NEG_INFINITY];
        f64: [f64::MIN, -0.0, 0.0, f64::MIN_POSITIVE, f64::MAX, f64::INFINITY, f64::NEG_INFINITY];
        Decimal: [Decimal::MIN, Decimal::ZERO, Decimal::MAX, Decimal::new(1, 28)];
        Decimal64: [
            Decimal64::new(Decimal64::MIN_MANTISSA, 0),
            Decimal64::ZERO,
            Decimal64::new(Decimal64::MAX_MANTISSA, 0),
            Decimal64::new(Decimal64::MAX_MANTISSA, Decimal64::MAX_SCALE),
        ];
    }
}

#[test]
fn test_negative_zero_keeps_its_sign() {
    assert!(round_trip(-0.0_f32).unwrap().is_sign_negative());
    assert!(round_trip(-0.0_f64).unwrap().is_sign_negative());
}

#[test]
fn test_nan_payloads_survive() {
    let wide = f64::from_bits(0x7ff8_0000_0000_1234);
    assert_eq!(round_trip(wide).unwrap().to_bits(), wide.to_bits());
    assert_eq!(round_trip(f64::NAN).unwrap().to_bits(), f64::NAN.to_bits());

    let narrow = f32::from_bits(0x7fc0_0abc);
    assert_eq!(round_trip(narrow).unwrap().to_bits(), narrow.to_bits());
    assert_eq!(round_trip(f32::NAN).unwrap().to_bits(), f32::NAN.to_bits());
}

#[test]
fn test_wide_decimals_are_boxed() {
    for value in [Decimal::MIN, Decimal::MAX] {
        let cell = Variant::new(value);
        assert_eq!(cell.storage(), Storage::Boxed);
        assert_eq!(cell.try_get::<Decimal>(), Some(value));
    }
    let cell = Variant::new(Decimal64::new(Decimal64::MIN_MANTISSA, Decimal64::MAX_SCALE));
    assert_eq!(cell.storage(), Storage::Inline);
    assert_eq!(
        cell.try_get::<Decimal>(),
        Some(Decimal::new(Decimal64::MIN_MANTISSA, Decimal64::MAX_SCALE))
    );
}

#[test]
fn test_strings_are_boxed() {
    let cell = Variant::from("hello");
    assert_eq!(cell.storage(), Storage::Boxed);
    assert_eq!(cell.type_info(), TypeInfo::of::<String>());
    assert_eq!(cell.kind(), ValueKind::String);
}

#[test]
fn test_small_decimal_is_compacted() {
    let small = Variant::new(Decimal::new(12345, 2));
    assert_eq!(small.storage(), Storage::Inline);
    assert_eq!(small.try_get::<Decimal>(), Some(Decimal::new(12345, 2)));
    assert_eq!(small.type_info(), TypeInfo::of::<Decimal>());

    let large = Variant::new(Decimal::MAX);
    assert_eq!(large.storage(), Storage::Boxed);
    assert_eq!(large.try_get::<Decimal>(), Some(Decimal::MAX));
}

#[test]
fn test_shared_pointer_keeps_identity() {
    let shared = Arc::new(String::from("shared"));
    let cell = Variant::new(Arc::clone(&shared));
    assert_eq!(cell.storage(), Storage::Wrapped);

    let back = cell.try_get::<Arc<String>>().unwrap();
    assert!(Arc::ptr_eq(&shared, &back));
    assert_eq!(cell.try_get::<String>(), Some(String::from("shared")));
}

#[test]
fn test_option_stores_like_its_content() {
    let some = Variant::new(Some(5_i32));
    assert_eq!(some, Variant::new(5_i32));
    assert_eq!(some.type_info(), TypeInfo::of::<i32>());
    assert_eq!(some.try_get::<Option<i32>>(), Some(Some(5)));

    assert!(Variant::new(None::<i32>).is_null());
}

#[test]
fn test_variant_inside_variant_is_identity() {
    let inner = Variant::new(9_i32);
    let outer = Variant::new(inner.clone());
    assert_eq!(outer, inner);
    assert_eq!(outer.type_info(), TypeInfo::of::<i32>());
    assert_eq!(outer.try_get::<Variant>(), Some(inner));
}

#[test]
fn test_union_stores_active_case() {
    let cell = Variant::new(OneOf2::<i32, String>::First(3));
    assert_eq!(cell, Variant::new(3_i32));
    assert!(Variant::new(OneOf2::<i32, String>::Undefined).is_null());
}

#[test]
fn test_union_with_repeated_case_type_keeps_its_case() {
    let err: Result<String, String> = Err(String::from("boom"));
    let cell = Variant::new(err.clone());
    assert_eq!(cell.storage(), Storage::Boxed);
    assert_eq!(cell.type_info(), TypeInfo::of::<Result<String, String>>());
    assert_eq!(cell.try_get::<Result<String, String>>(), Some(err));
    assert_eq!(cell.try_get::<String>(), Some(String::from("boom")));

    let second = OneOf2::<i32, i32>::Second(5);
    let cell = Variant::new(second.clone());
    assert_eq!(cell.try_get::<OneOf2<i32, i32>>(), Some(second));
    assert_eq!(cell.try_get::<i64>(), Some(5));

    // The first case still lifts back unambiguously.
    let first = Variant::new(OneOf2::<i32, i32>::First(5));
    assert_eq!(first, Variant::new(5_i32));
    assert_eq!(first.try_get::<OneOf2<i32, i32>>(), Some(OneOf2::First(5)));
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn test_try_get_exact_and_converted() {
    let cell = Variant::new(3_i32);
    assert_eq!(cell.try_get::<i32>(), Some(3));
    assert_eq!(cell.try_get::<i64>(), Some(3));
    assert_eq!(cell.try_get::<f64>(), Some(3.0));
    assert_eq!(cell.try_get::<String>(), Some(String::from("3")));
    assert_eq!(cell.try_get::<Variant>(), Some(cell.clone()));
}

#[test]
fn test_try_get_parses_strings() {
    let cell = Variant::from("3");
    assert_eq!(cell.try_get::<f64>(), Some(3.0));
    assert_eq!(cell.try_get::<i32>(), Some(3));
    assert_eq!(cell.try_get::<bool>(), None);
    assert_eq!(Variant::from("abc").try_get::<i32>(), None);
}

#[test]
fn test_try_get_into_union() {
    let cell = Variant::new(3_i32);
    assert_eq!(
        cell.try_get::<OneOf2<i64, f64>>(),
        Some(OneOf2::First(3_i64))
    );
    assert_eq!(
        cell.try_get::<OneOf2<String, i32>>(),
        Some(OneOf2::Second(3))
    );
}

#[test]
fn test_get_reports_invalid_cast() {
    let cell = Variant::from("abc");
    let err = cell.get::<i32>().unwrap_err();
    assert_eq!(
        err,
        Error::InvalidCast {
            from: "alloc::string::String",
            to: "i32",
        }
    );
    assert_eq!(Variant::new(8_u16).get::<u32>(), Ok(8));
}

#[test]
fn test_typed_views_default_on_failure() {
    let cell = Variant::from("12");
    assert_eq!(cell.i32_value(), 12);
    assert_eq!(cell.i64_value(), 12);
    assert_eq!(cell.u64_value(), 12);
    assert_eq!(cell.f64_value(), 12.0);
    assert_eq!(cell.decimal_value(), Decimal::from(12));
    assert_eq!(cell.string_value(), "12");
    assert!(!cell.bool_value());

    assert_eq!(Variant::NULL.i32_value(), 0);
    assert_eq!(Variant::NULL.string_value(), "");
}

#[test]
fn test_casts() {
    let cell: Variant = 42_i64.into();
    assert_eq!(i64::try_from(&cell), Ok(42));
    assert_eq!(u8::try_from(cell.clone()), Ok(42));
    assert!(bool::try_from(Variant::from("maybe")).is_err());

    let cell: Variant = Some(1.5_f64).into();
    assert_eq!(f64::try_from(cell), Ok(1.5));
}

// ============================================================================
// Equality, hashing, formatting
// ============================================================================

#[test]
fn test_equality_is_type_strict() {
    assert_eq!(Variant::new(3_i32), Variant::new(3_i32));
    assert_ne!(Variant::new(3_i32), Variant::new(3_i64));
    assert_eq!(Variant::from("a"), Variant::new(String::from("a")));
}

#[test]
fn test_float_cells_compare_by_value() {
    assert_eq!(Variant::new(f64::NAN), Variant::new(f64::NAN));
    assert_eq!(Variant::new(0.0_f64), Variant::new(-0.0_f64));
    assert_eq!(hash_of(&Variant::new(0.0_f64)), hash_of(&Variant::new(-0.0_f64)));
}

#[test]
fn test_compact_decimal_equality_ignores_scale() {
    let a = Variant::new(Decimal::new(15, 1));
    let b = Variant::new(Decimal::new(150, 2));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn test_display_and_debug() {
    assert_eq!(Variant::new(3_i32).to_string(), "3");
    assert_eq!(Variant::new(true).to_string(), "true");
    assert_eq!(Variant::new(Decimal::new(125, 2)).to_string(), "1.25");
    assert_eq!(format!("{:?}", Variant::new(3_i32)), "Variant(i32: 3)");
}
