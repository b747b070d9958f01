use std::str::FromStr;

use morph::{Decimal, Decimal64, Error, Variant, convert, impl_value, try_convert};
use pretty_assertions::assert_eq;

/// A user type that only knows how to parse itself.
#[derive(Debug, Clone, PartialEq)]
struct Celsius(f64);

impl FromStr for Celsius {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, ()> {
        let number = text.strip_suffix('C').ok_or(())?;
        number.trim().parse().map(Celsius).map_err(|_| ())
    }
}

impl_value!(Celsius, parse);

/// Boxed, with no conversions of its own.
#[derive(Debug, Clone, PartialEq)]
struct Opaque(Vec<u8>);

impl_value!(Opaque);

macro_rules! converts {
    ($name:ident, $from:ty => $to:ty, $value:expr, $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let source: $from = $value;
            assert_eq!(try_convert::<$from, $to>(&source), $expected);
        }
    };
}

converts!(int_widens, i32 => i64, 3, Some(3));
converts!(int_to_double, i32 => f64, 3, Some(3.0));
converts!(int_to_text, i32 => String, 3, Some(String::from("3")));
converts!(text_to_double, String => f64, String::from("3"), Some(3.0));
converts!(text_is_trimmed, String => i16, String::from("  -9\n"), Some(-9));
converts!(double_truncates, f64 => i32, 3.99, Some(3));
converts!(nan_to_single_fails, f64 => f32, f64::NAN, None);
converts!(huge_double_to_single_fails, f64 => f32, 1e300, None);
converts!(
    decimal_bound_fails,
    f64 => Decimal,
    7.922_816_251_426_434e28,
    None,
);
converts!(u64_max_to_i64_fails, u64 => i64, u64::MAX, None);
converts!(
    decimal_to_compact,
    Decimal => Decimal64,
    Decimal::new(-42, 1),
    Some(Decimal64::new(-42, 1)),
);
converts!(bool_formats_lowercase, bool => String, false, Some(String::from("false")));

#[test]
fn parse_only_types_accept_text() {
    assert_eq!(
        try_convert::<String, Celsius>(&String::from("21.5C")),
        Some(Celsius(21.5))
    );
    assert_eq!(try_convert::<&'static str, Celsius>(&"4 C"), Some(Celsius(4.0)));
    assert_eq!(try_convert::<String, Celsius>(&String::from("21.5F")), None);
    assert_eq!(try_convert::<f64, Celsius>(&21.5), None);

    let cell = Variant::from("30C");
    assert_eq!(cell.try_get::<Celsius>(), Some(Celsius(30.0)));
}

#[test]
fn opaque_types_only_pass_through() {
    let value = Opaque(vec![1, 2, 3]);
    assert_eq!(try_convert::<Opaque, Opaque>(&value), Some(value.clone()));
    assert_eq!(try_convert::<Opaque, String>(&value), None);

    let cell = Variant::new(value.clone());
    assert_eq!(cell.try_get::<Opaque>(), Some(value));
    assert!(!cell.can_get::<i32>());
}

#[test]
fn convert_names_both_types() {
    let err = convert::<Opaque, i32>(&Opaque(Vec::new())).unwrap_err();
    assert!(matches!(err, Error::InvalidCast { to: "i32", .. }));
    assert!(err.to_string().contains("i32"));
}

proptest::proptest! {
    #[test]
    fn cell_text_parses_back(x in proptest::num::i32::ANY) {
        let text = Variant::new(x).string_value();
        proptest::prop_assert_eq!(Variant::from(text.as_str()).try_get::<i32>(), Some(x));
    }

    #[test]
    fn compact_decimals_survive_a_cell(mantissa in -1_000_000_i64..1_000_000, scale in 0_u32..10) {
        let value = Decimal::new(mantissa, scale);
        proptest::prop_assert_eq!(Variant::new(value).try_get::<Decimal>(), Some(value));
    }
}
