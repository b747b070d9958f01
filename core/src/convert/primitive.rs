//! Converters for the built-in scalar types.
//!
//! `i64` is the pivot: narrow integers, `bool`, `char` and enums reach any
//! numeric target by widening to `i64` and re-entering the engine. `u64`
//! values beyond `i64::MAX` and floats outside the integer range have no
//! pivot and only convert where a direct rule applies. Durations and times
//! pivot through whole nanoseconds in an `i64`.

use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use super::{Converter, Target, convert_dyn, pivot};
use crate::decimal::Decimal64;
use crate::types::{TypeInfo, ValueKind};
use crate::values::{DynValue, Value};

/// 2^63: the first `f64` above the `i64` range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
/// 2^64: the first `f64` above the `u64` range.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;
/// `Decimal::MAX` rounded to the nearest float. The rounding makes the bound
/// slightly loose; values at the bound fail in `Decimal::from_f64`.
const DECIMAL_BOUND_F64: f64 = 79_228_162_514_264_337_593_543_950_335.0;
const DECIMAL_BOUND_F32: f32 = 79_228_162_514_264_337_593_543_950_335.0;

/// Truncates toward zero when the result fits in an `i64`.
fn f64_to_i64(value: f64) -> Option<i64> {
    (value >= -I64_BOUND && value < I64_BOUND).then(|| value as i64)
}

fn f64_to_u64(value: f64) -> Option<u64> {
    (value > -1.0 && value < U64_BOUND).then(|| value as u64)
}

fn f64_to_f32(value: f64) -> Option<f32> {
    (value >= f32::MIN as f64 && value <= f32::MAX as f64).then(|| value as f32)
}

fn f64_to_decimal(value: f64) -> Option<Decimal> {
    if value >= -DECIMAL_BOUND_F64 && value <= DECIMAL_BOUND_F64 {
        Decimal::from_f64(value)
    } else {
        None
    }
}

fn f32_to_decimal(value: f32) -> Option<Decimal> {
    if value >= -DECIMAL_BOUND_F32 && value <= DECIMAL_BOUND_F32 {
        Decimal::from_f32(value)
    } else {
        None
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Borrows the text of a string source.
fn source_text(source: &dyn DynValue) -> Option<&str> {
    if let Some(text) = source.downcast_ref::<String>() {
        return Some(text);
    }
    source.downcast_ref::<&'static str>().copied()
}

// ============================================================================
// Narrow integers
// ============================================================================

/// `i8`, `i16`, `i32`, `u8`, `u16` and `u32`, all pivoting through `i64`.
pub struct IntConverter<I> {
    _marker: PhantomData<fn() -> I>,
}

impl<I> IntConverter<I> {
    pub fn new() -> Self {
        IntConverter {
            _marker: PhantomData,
        }
    }
}

impl<I> Default for IntConverter<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Converter for IntConverter<I>
where
    I: Value + Copy + Into<i64> + TryFrom<i64> + FromStr + fmt::Display,
{
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<I>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<I>() else {
            return false;
        };
        if target.is::<I>() {
            return target.put(value);
        }
        if target.is::<String>() {
            return target.put(value.to_string());
        }
        if target.kind().is_scalar() {
            return pivot::<i64>(value.into(), target);
        }
        false
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        if let Some(text) = source_text(source) {
            return target.put_opt(text.trim().parse::<I>().ok());
        }
        let kind = source.kind();
        if !kind.is_scalar() && kind != ValueKind::Enum {
            return false;
        }
        let wide = match source.downcast_ref::<i64>() {
            Some(&wide) => Some(wide),
            None => convert_dyn::<i64>(source),
        };
        target.put_opt(wide.and_then(|wide| I::try_from(wide).ok()))
    }
}

// ============================================================================
// i64 and u64
// ============================================================================

pub struct I64Converter;

impl Converter for I64Converter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<i64>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<i64>() else {
            return false;
        };
        if target.is::<i64>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.is::<f64>() {
            target.put(value as f64)
        } else if target.is::<f32>() {
            target.put(value as f32)
        } else if target.is::<Decimal>() {
            target.put(Decimal::from(value))
        } else if target.is::<Decimal64>() {
            target.put_opt(Decimal64::from_i64(value))
        } else if target.is::<u64>() {
            target.put_opt(u64::try_from(value).ok())
        } else if target.is::<bool>() {
            target.put(value != 0)
        } else if target.is::<char>() {
            target.put_opt(u32::try_from(value).ok().and_then(char::from_u32))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            text.trim().parse::<i64>().ok()
        } else if let Some(&value) = source.downcast_ref::<u64>() {
            i64::try_from(value).ok()
        } else if let Some(&value) = source.downcast_ref::<f64>() {
            f64_to_i64(value)
        } else if let Some(&value) = source.downcast_ref::<f32>() {
            f64_to_i64(value as f64)
        } else if let Some(value) = source.downcast_ref::<Decimal>() {
            value.trunc().to_i64()
        } else if let Some(value) = source.downcast_ref::<Decimal64>() {
            value.to_decimal().trunc().to_i64()
        } else if let Some(&value) = source.downcast_ref::<bool>() {
            Some(value as i64)
        } else if let Some(&value) = source.downcast_ref::<char>() {
            Some(value as i64)
        } else {
            None
        };
        target.put_opt(value)
    }
}

pub struct U64Converter;

impl Converter for U64Converter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<u64>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<u64>() else {
            return false;
        };
        if target.is::<u64>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.is::<f64>() {
            target.put(value as f64)
        } else if target.is::<f32>() {
            target.put(value as f32)
        } else if target.is::<Decimal>() {
            target.put(Decimal::from(value))
        } else if target.is::<bool>() {
            target.put(value != 0)
        } else if target.kind().is_scalar() {
            i64::try_from(value).is_ok_and(|wide| pivot(wide, target))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            text.trim().parse::<u64>().ok()
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            u64::try_from(value).ok()
        } else if let Some(&value) = source.downcast_ref::<f64>() {
            f64_to_u64(value)
        } else if let Some(&value) = source.downcast_ref::<f32>() {
            f64_to_u64(value as f64)
        } else if let Some(value) = source.downcast_ref::<Decimal>() {
            value.trunc().to_u64()
        } else if let Some(value) = source.downcast_ref::<Decimal64>() {
            value.to_decimal().trunc().to_u64()
        } else if let Some(&value) = source.downcast_ref::<bool>() {
            Some(value as u64)
        } else if let Some(&value) = source.downcast_ref::<char>() {
            Some(value as u64)
        } else {
            None
        };
        target.put_opt(value)
    }
}

// ============================================================================
// Floats
// ============================================================================

pub struct F64Converter;

impl Converter for F64Converter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<f64>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<f64>() else {
            return false;
        };
        if target.is::<f64>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.is::<f32>() {
            target.put_opt(f64_to_f32(value))
        } else if target.is::<Decimal>() {
            target.put_opt(f64_to_decimal(value))
        } else if target.is::<Decimal64>() {
            target.put_opt(f64_to_decimal(value).and_then(Decimal64::from_decimal))
        } else if target.is::<i64>() {
            target.put_opt(f64_to_i64(value))
        } else if target.is::<u64>() {
            target.put_opt(f64_to_u64(value))
        } else if target.is::<bool>() {
            target.put(value != 0.0)
        } else if target.kind().is_integer() {
            f64_to_i64(value).is_some_and(|wide| pivot(wide, target))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            text.trim().parse::<f64>().ok()
        } else if let Some(&value) = source.downcast_ref::<f32>() {
            Some(value as f64)
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            Some(value as f64)
        } else if let Some(&value) = source.downcast_ref::<u64>() {
            Some(value as f64)
        } else if let Some(value) = source.downcast_ref::<Decimal>() {
            value.to_f64()
        } else if let Some(value) = source.downcast_ref::<Decimal64>() {
            value.to_f64()
        } else {
            None
        };
        target.put_opt(value)
    }
}

pub struct F32Converter;

impl Converter for F32Converter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<f32>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<f32>() else {
            return false;
        };
        if target.is::<f32>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.is::<f64>() {
            target.put(value as f64)
        } else if target.is::<Decimal>() {
            target.put_opt(f32_to_decimal(value))
        } else if target.is::<Decimal64>() {
            target.put_opt(f32_to_decimal(value).and_then(Decimal64::from_decimal))
        } else if target.is::<i64>() {
            target.put_opt(f64_to_i64(value as f64))
        } else if target.is::<u64>() {
            target.put_opt(f64_to_u64(value as f64))
        } else if target.is::<bool>() {
            target.put(value != 0.0)
        } else if target.kind().is_integer() {
            f64_to_i64(value as f64).is_some_and(|wide| pivot(wide, target))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            text.trim().parse::<f32>().ok()
        } else if let Some(&value) = source.downcast_ref::<f64>() {
            f64_to_f32(value)
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            Some(value as f32)
        } else if let Some(&value) = source.downcast_ref::<u64>() {
            Some(value as f32)
        } else if let Some(value) = source.downcast_ref::<Decimal>() {
            value.to_f32()
        } else if let Some(value) = source.downcast_ref::<Decimal64>() {
            value.to_decimal().to_f32()
        } else {
            None
        };
        target.put_opt(value)
    }
}

// ============================================================================
// Decimals
// ============================================================================

pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Decimal>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<Decimal>() else {
            return false;
        };
        if target.is::<Decimal>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.is::<Decimal64>() {
            target.put_opt(Decimal64::from_decimal(value))
        } else if target.is::<f64>() {
            target.put_opt(value.to_f64())
        } else if target.is::<f32>() {
            target.put_opt(value.to_f32())
        } else if target.is::<i64>() {
            target.put_opt(value.trunc().to_i64())
        } else if target.is::<u64>() {
            target.put_opt(value.trunc().to_u64())
        } else if target.is::<bool>() {
            target.put(!value.is_zero())
        } else if target.kind().is_integer() {
            value.trunc().to_i64().is_some_and(|wide| pivot(wide, target))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            Decimal::from_str(text.trim()).ok()
        } else if let Some(value) = source.downcast_ref::<Decimal64>() {
            Some(value.to_decimal())
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            Some(Decimal::from(value))
        } else if let Some(&value) = source.downcast_ref::<u64>() {
            Some(Decimal::from(value))
        } else if let Some(&value) = source.downcast_ref::<f64>() {
            f64_to_decimal(value)
        } else if let Some(&value) = source.downcast_ref::<f32>() {
            f32_to_decimal(value)
        } else {
            None
        };
        target.put_opt(value)
    }
}

/// Everything beyond the compact form itself goes through [`Decimal`].
pub struct Decimal64Converter;

impl Converter for Decimal64Converter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Decimal64>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<Decimal64>() else {
            return false;
        };
        if target.is::<Decimal64>() {
            target.put(value)
        } else if target.is::<Decimal>() {
            target.put(value.to_decimal())
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.kind().is_scalar() {
            pivot(value.to_decimal(), target)
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            text.trim().parse::<Decimal64>().ok()
        } else if let Some(&value) = source.downcast_ref::<Decimal>() {
            Decimal64::from_decimal(value)
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            Decimal64::from_i64(value)
        } else if source.kind().is_scalar() {
            convert_dyn::<Decimal>(source).and_then(Decimal64::from_decimal)
        } else {
            None
        };
        target.put_opt(value)
    }
}

// ============================================================================
// bool, char and strings
// ============================================================================

/// Formats as `true`/`false`; parses either spelling in any ASCII case.
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<bool>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<bool>() else {
            return false;
        };
        if target.is::<bool>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.kind().is_numeric() {
            pivot(value as i64, target)
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            parse_bool(text)
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            Some(value != 0)
        } else if let Some(&value) = source.downcast_ref::<u64>() {
            Some(value != 0)
        } else if let Some(&value) = source.downcast_ref::<f64>() {
            Some(value != 0.0)
        } else if let Some(&value) = source.downcast_ref::<f32>() {
            Some(value != 0.0)
        } else if let Some(value) = source.downcast_ref::<Decimal>() {
            Some(!value.is_zero())
        } else if let Some(value) = source.downcast_ref::<Decimal64>() {
            Some(value.mantissa() != 0)
        } else {
            None
        };
        target.put_opt(value)
    }
}

/// A `char` is a one-character string or an integer code point.
pub struct CharConverter;

impl Converter for CharConverter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<char>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<char>() else {
            return false;
        };
        if target.is::<char>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(value.to_string())
        } else if target.kind().is_integer() {
            pivot(value as i64, target)
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = if let Some(text) = source_text(source) {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        } else if let Some(&value) = source.downcast_ref::<i64>() {
            u32::try_from(value).ok().and_then(char::from_u32)
        } else if let Some(&value) = source.downcast_ref::<u64>() {
            u32::try_from(value).ok().and_then(char::from_u32)
        } else {
            None
        };
        target.put_opt(value)
    }
}

/// Serves both `String` and `&'static str`. Only strings and `char`s become
/// strings here; every other type formats itself in its own converter.
pub struct StringConverter;

impl Converter for StringConverter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<String>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        match source_text(source) {
            Some(text) if target.is::<String>() => target.put(text.to_owned()),
            _ => false,
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        if !target.is::<String>() {
            return false;
        }
        if let Some(text) = source_text(source) {
            return target.put(text.to_owned());
        }
        match source.downcast_ref::<char>() {
            Some(value) => target.put(value.to_string()),
            None => false,
        }
    }
}

// ============================================================================
// Durations and times
// ============================================================================

const NANOS_PER_SEC: i64 = 1_000_000_000;
const SECS_PER_DAY: i64 = 86_400;

/// Accepts `source` as an `i64` nanosecond count: the value itself, or any
/// integer that converts to one.
fn source_nanos(source: &dyn DynValue) -> Option<i64> {
    if let Some(&value) = source.downcast_ref::<i64>() {
        return Some(value);
    }
    if source.kind().is_integer() {
        convert_dyn::<i64>(source)
    } else {
        None
    }
}

/// `digits` exactly `len` ASCII digits long, parsed.
fn fixed_digits<N: FromStr>(digits: &str, len: usize) -> Option<N> {
    (digits.len() == len && digits.bytes().all(|b| b.is_ascii_digit()))
        .then(|| digits.parse().ok())
        .flatten()
}

/// Nanoseconds from one to nine fractional digits.
fn parse_fraction(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 9 {
        return None;
    }
    let value: u32 = fixed_digits(digits, digits.len())?;
    Some(value * 10_u32.pow(9 - digits.len() as u32))
}

/// `.` and the fractional digits without trailing zeros; empty for whole
/// seconds.
fn fraction_suffix(nanos: u32) -> String {
    if nanos == 0 {
        return String::new();
    }
    let digits = format!("{nanos:09}");
    format!(".{}", digits.trim_end_matches('0'))
}

/// Formats as seconds with an `s` suffix, such as `90s` or `1.5s`.
pub(crate) fn format_duration(value: Duration) -> String {
    format!("{}{}s", value.as_secs(), fraction_suffix(value.subsec_nanos()))
}

fn parse_duration(text: &str) -> Option<Duration> {
    let seconds = text.trim().strip_suffix('s')?;
    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, parse_fraction(fraction)?),
        None => (seconds, 0),
    };
    let whole: u64 = fixed_digits(whole, whole.len())?;
    Some(Duration::new(whole, fraction))
}

fn duration_nanos(value: Duration) -> Option<i64> {
    i64::try_from(value.as_nanos()).ok()
}

fn nanos_duration(nanos: i64) -> Option<Duration> {
    u64::try_from(nanos).ok().map(Duration::from_nanos)
}

/// `Duration` to and from text and integer nanoseconds. Negative counts
/// and counts beyond `i64::MAX` nanoseconds fail.
pub struct DurationConverter;

impl Converter for DurationConverter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Duration>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<Duration>() else {
            return false;
        };
        if target.is::<Duration>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put(format_duration(value))
        } else if target.kind().is_integer() {
            duration_nanos(value).is_some_and(|nanos| pivot(nanos, target))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = match source_text(source) {
            Some(text) => parse_duration(text),
            None => source_nanos(source).and_then(nanos_duration),
        };
        target.put_opt(value)
    }
}

/// Seconds and nanoseconds relative to the Unix epoch, with the nanoseconds
/// always counting forward.
fn unix_parts(value: SystemTime) -> Option<(i64, u32)> {
    match value.duration_since(UNIX_EPOCH) {
        Ok(after) => Some((i64::try_from(after.as_secs()).ok()?, after.subsec_nanos())),
        Err(before) => {
            let before = before.duration();
            let secs = -i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => Some((secs, 0)),
                nanos => Some((secs.checked_sub(1)?, 1_000_000_000 - nanos)),
            }
        }
    }
}

fn from_unix_parts(secs: i64, nanos: u32) -> Option<SystemTime> {
    let time = if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::from_secs(secs.unsigned_abs()))?
    } else {
        UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))?
    };
    time.checked_add(Duration::from_nanos(u64::from(nanos)))
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let days = days + 719_468;
    let era = days.div_euclid(146_097);
    let day_of_era = days.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * shifted_month + 2) / 5 + 1) as u32;
    let month = (if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = year - i64::from(month <= 2);
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let shifted_month = i64::from((month + 9) % 12);
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Formats as an RFC 3339 UTC timestamp, such as `2023-11-14T22:13:20Z`.
/// Times outside years 0 to 9999 have no text form.
pub(crate) fn format_time(value: SystemTime) -> Option<String> {
    let (secs, nanos) = unix_parts(value)?;
    let (year, month, day) = civil_from_days(secs.div_euclid(SECS_PER_DAY));
    if !(0..=9999).contains(&year) {
        return None;
    }
    let clock = secs.rem_euclid(SECS_PER_DAY);
    Some(format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}{}Z",
        clock / 3_600,
        clock / 60 % 60,
        clock % 60,
        fraction_suffix(nanos),
    ))
}

fn parse_time(text: &str) -> Option<SystemTime> {
    let text = text.trim().strip_suffix('Z')?;
    let (date, clock) = text.split_once('T')?;
    let (clock, nanos) = match clock.split_once('.') {
        Some((clock, fraction)) => (clock, parse_fraction(fraction)?),
        None => (clock, 0),
    };

    let mut date = date.split('-');
    let year: i64 = fixed_digits(date.next()?, 4)?;
    let month: u32 = fixed_digits(date.next()?, 2)?;
    let day: u32 = fixed_digits(date.next()?, 2)?;
    let mut clock = clock.split(':');
    let hour: i64 = fixed_digits(clock.next()?, 2)?;
    let minute: i64 = fixed_digits(clock.next()?, 2)?;
    let second: i64 = fixed_digits(clock.next()?, 2)?;
    if date.next().is_some() || clock.next().is_some() {
        return None;
    }
    if !(1..=12).contains(&month)
        || !(1..=days_in_month(year, month)).contains(&day)
        || hour > 23
        || minute > 59
        || second > 59
    {
        return None;
    }

    let secs = days_from_civil(year, month, day) * SECS_PER_DAY
        + hour * 3_600
        + minute * 60
        + second;
    from_unix_parts(secs, nanos)
}

fn time_nanos(value: SystemTime) -> Option<i64> {
    let (secs, nanos) = unix_parts(value)?;
    secs.checked_mul(NANOS_PER_SEC)?
        .checked_add(i64::from(nanos))
}

fn nanos_time(nanos: i64) -> Option<SystemTime> {
    let secs = nanos.div_euclid(NANOS_PER_SEC);
    let nanos = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    from_unix_parts(secs, nanos)
}

/// `SystemTime` to and from RFC 3339 UTC text and integer nanoseconds
/// since the Unix epoch.
pub struct TimeConverter;

impl Converter for TimeConverter {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<SystemTime>()
    }

    fn try_convert_to(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        let Some(&value) = source.downcast_ref::<SystemTime>() else {
            return false;
        };
        if target.is::<SystemTime>() {
            target.put(value)
        } else if target.is::<String>() {
            target.put_opt(format_time(value))
        } else if target.kind().is_integer() {
            time_nanos(value).is_some_and(|nanos| pivot(nanos, target))
        } else {
            false
        }
    }

    fn try_convert_from(&self, source: &dyn DynValue, target: &mut Target<'_>) -> bool {
        if target.assign(source) {
            return true;
        }
        let value = match source_text(source) {
            Some(text) => parse_time(text),
            None => source_nanos(source).and_then(nanos_time),
        };
        target.put_opt(value)
    }
}
